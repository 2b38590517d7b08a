//! Field level deserializers and custom validators shared by the schemas.

use phonenumber::{Mode, PhoneNumber};
use serde::{de, Deserialize, Deserializer};
use sigma_shared::utils::validation::validators;
use validator::ValidationError;

use super::{INVALID_NAME, INVALID_PHONE};

/// Trimmed string; a missing or null value reads as empty
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).unwrap_or_default())
}

/// Trimmed optional string
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

/// Integer given either as a JSON number or as a numeric string, the way
/// query parameters arrive
pub fn coerced<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<NumberOrText>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(NumberOrText::Number(n)) => n.as_f64(),
        Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().ok(),
    };
    match number {
        Some(n) if n.fract() == 0.0 => Ok(Some(n as i64)),
        Some(_) => Err(de::Error::custom("Expected integer, received float")),
        None => Err(de::Error::custom("Expected number")),
    }
}

/// Parse a phone number in international format and return it as E.164
pub fn normalize_phone(value: &str) -> Option<String> {
    let parsed = value.trim().parse::<PhoneNumber>().ok()?;
    if !phonenumber::is_valid(&parsed) {
        return None;
    }
    Some(parsed.format().mode(Mode::E164).to_string())
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    match normalize_phone(value) {
        Some(_) => Ok(()),
        None => Err(coded("phone", INVALID_PHONE)),
    }
}

/// Letters of the Spanish alphabet and spaces
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    if validators::is_alpha_with_spaces(value) {
        Ok(())
    } else {
        Err(coded("name", INVALID_NAME))
    }
}

fn coded(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Bound {
        #[serde(default, deserialize_with = "coerced")]
        gte: Option<i64>,
        #[serde(default, deserialize_with = "trimmed")]
        label: String,
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 650-253-0000").as_deref(), Some("+16502530000"));
        assert_eq!(normalize_phone(" +44 20 7031 3000 ").as_deref(), Some("+442070313000"));
        assert_eq!(normalize_phone("555"), None);
        assert_eq!(normalize_phone("not a phone"), None);
    }

    #[test]
    fn test_coerced_numbers() {
        let bound: Bound = serde_json::from_value(json!({ "gte": " 4 ", "label": "  a " })).unwrap();
        assert_eq!(bound.gte, Some(4));
        assert_eq!(bound.label, "a");

        let bound: Bound = serde_json::from_value(json!({ "gte": 7 })).unwrap();
        assert_eq!(bound.gte, Some(7));
        assert_eq!(bound.label, "");

        assert!(serde_json::from_value::<Bound>(json!({ "gte": 2.5 })).is_err());
        assert!(serde_json::from_value::<Bound>(json!({ "gte": "two" })).is_err());
    }

    #[test]
    fn test_name_and_phone_validators() {
        assert!(validate_name("José María").is_ok());
        assert_eq!(
            validate_name("R2D2").unwrap_err().message.as_deref(),
            Some(INVALID_NAME)
        );
        assert!(validate_phone("+16502530000").is_ok());
        assert!(validate_phone("12").is_err());
    }
}
