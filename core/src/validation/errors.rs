//! Conversion of `validator` and `serde` failures into field errors.

use std::borrow::Cow;

use serde_json::Value;
use sigma_shared::utils::validation::ValidationErrors;
use validator::{ValidationError, ValidationErrorsKind};

pub const REQUIRED: &str = "Required";

/// Key under which `validator` files struct level (schema) errors
const SCHEMA_KEY: &str = "__all__";

/// Param naming the field a schema error belongs to
pub(crate) const FIELD_PARAM: &str = "field";

/// Flatten `validator` errors into dotted paths such as
/// `properties.0.address.municipality`, sorted by path.
pub fn collect(errors: validator::ValidationErrors) -> ValidationErrors {
    let mut collected = ValidationErrors::new();
    append(&mut collected, "", errors);
    collected.sort_by_field();
    collected
}

/// Errors of an optional validation run, empty on success
pub fn collect_result(result: Result<(), validator::ValidationErrors>) -> ValidationErrors {
    match result {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => collect(errors),
    }
}

fn append(target: &mut ValidationErrors, prefix: &str, errors: validator::ValidationErrors) {
    for (field, kind) in errors.into_errors() {
        let schema = field == SCHEMA_KEY;
        let path = if schema {
            prefix.to_string()
        } else {
            join(prefix, &field)
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let field = if schema {
                        join(&path, schema_field(&error))
                    } else {
                        path.clone()
                    };
                    target.add(field, message(&error));
                }
            }
            ValidationErrorsKind::Struct(nested) => append(target, &path, *nested),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    append(target, &join(&path, &index.to_string()), *nested);
                }
            }
        }
    }
}

fn join(prefix: &str, field: &str) -> String {
    match (prefix.is_empty(), field.is_empty()) {
        (true, _) => field.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}.{}", prefix, field),
    }
}

fn schema_field(error: &ValidationError) -> &str {
    error
        .params
        .get(FIELD_PARAM)
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// A struct level error attached to `field`
pub(crate) fn field_error(
    field: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> ValidationError {
    let mut error = ValidationError::new(field);
    error.message = Some(message.into());
    error.add_param(FIELD_PARAM.into(), &field);
    error
}

/// The attribute message when one is set, otherwise one built from the
/// error code and its params
fn message(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |name: &str| error.params.get(name).map(number);

    match error.code.as_ref() {
        "required" => REQUIRED.to_string(),
        "email" => super::INVALID_EMAIL.to_string(),
        "length" => match (param("equal"), param("min"), param("max")) {
            (Some(equal), _, _) => format!("Must have a length of {}", equal),
            (None, Some(min), Some(max)) => length_between(min, max),
            (None, Some(min), None) => format!("Must have a length of at least {}", min),
            (None, None, Some(max)) => format!("Must have a length of at most {}", max),
            _ => "Invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {}", min, max),
            (Some(min), None) => format!("Must be greater than or equal to {}", min),
            (None, Some(max)) => format!("Must be less than or equal to {}", max),
            _ => "Out of range".to_string(),
        },
        code => code.to_string(),
    }
}

pub(crate) fn length_between(min: impl std::fmt::Display, max: impl std::fmt::Display) -> String {
    format!("Must have a length between {} and {}", min, max)
}

/// Render a numeric param without a trailing `.0`
fn number(value: &Value) -> String {
    match value.as_f64() {
        Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
        _ => value.to_string(),
    }
}

/// Shape errors reported by `serde` while reading a request. A missing
/// field becomes a `Required` error on that field.
pub fn from_serde(error: serde_json::Error) -> ValidationErrors {
    let message = error.to_string();
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next());
    match missing {
        Some(field) => ValidationErrors::single(field, REQUIRED),
        None => ValidationErrors::single("", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Inner {
        #[validate(range(min = 0, max = 9))]
        bed: i64,
    }

    #[derive(Debug, Deserialize, Validate)]
    #[validate(schema(function = "check_outer", skip_on_field_errors = false))]
    struct Outer {
        #[validate(length(min = 1, max = 3))]
        name: String,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    fn check_outer(outer: &Outer) -> Result<(), ValidationError> {
        if outer.items.is_empty() {
            return Err(field_error("items", "Must not be empty"));
        }
        Ok(())
    }

    fn fields(errors: &ValidationErrors) -> Vec<(&str, &str)> {
        errors
            .errors()
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect()
    }

    #[test]
    fn test_nested_list_paths() {
        let outer = Outer {
            name: "abcd".to_string(),
            items: vec![Inner { bed: 1 }, Inner { bed: 12 }],
        };
        let errors = collect(outer.validate().unwrap_err());
        assert_eq!(
            fields(&errors),
            vec![
                ("items.1.bed", "Must be between 0 and 9"),
                ("name", "Must have a length between 1 and 3"),
            ]
        );
    }

    #[test]
    fn test_schema_errors_name_their_field() {
        let outer = Outer {
            name: "ab".to_string(),
            items: vec![],
        };
        let errors = collect(outer.validate().unwrap_err());
        assert_eq!(fields(&errors), vec![("items", "Must not be empty")]);
    }

    #[test]
    fn test_serde_missing_field() {
        let error = serde_json::from_value::<Inner>(serde_json::json!({})).unwrap_err();
        assert_eq!(fields(&from_serde(error)), vec![("bed", REQUIRED)]);

        let error = serde_json::from_value::<Inner>(serde_json::json!({ "bed": "x" })).unwrap_err();
        assert_eq!(from_serde(error).errors()[0].field, "");
    }
}
