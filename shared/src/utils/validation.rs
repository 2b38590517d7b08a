//! Field-level validation errors and common validators

use serde::Serialize;
use std::fmt;

/// A validation failure attached to a (possibly dotted) field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding a single error
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Append errors from a nested structure, prefixing their paths
    pub fn merge(&mut self, prefix: &str, other: ValidationErrors) {
        for error in other.errors {
            let field = if error.field.is_empty() {
                prefix.to_string()
            } else if prefix.is_empty() {
                error.field
            } else {
                format!("{}.{}", prefix, error.field)
            };
            self.errors.push(FieldError::new(field, error.message));
        }
    }

    /// Order errors by field path, keeping the order within a field
    pub fn sort_by_field(&mut self) {
        self.errors.sort_by(|a, b| a.field.cmp(&b.field));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Common validation functions
pub mod validators {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static ALPHA_ES_REGEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Za-zÁÉÍÑÓÚÜáéíñóúü ]+$").expect("alpha regex"));

    /// Letters of the Spanish alphabet and spaces only
    pub fn is_alpha_with_spaces(value: &str) -> bool {
        ALPHA_ES_REGEX.is_match(value)
    }
}
