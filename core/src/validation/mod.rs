//! Request schemas.
//!
//! Each request is deserialized into a typed struct deriving
//! [`validator::Validate`], checked, and converted into a validated domain
//! input. Failures carry every field error with dotted paths
//! (`properties.0.address.municipality`).

pub mod auth;
pub mod errors;
pub mod fields;
pub mod post;
pub mod search;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sigma_shared::utils::validation::ValidationErrors;
use validator::Validate;

use crate::domain::value_objects::ImageRef;

pub use auth::{
    parse_agent_update, parse_email, parse_login, parse_password_code, parse_password_reset,
    parse_registration, Credentials, PasswordCodeCheck, PasswordReset, Registration,
};
pub use fields::normalize_phone;
pub use post::{parse_new_post, parse_post_changes};
pub use search::parse_search_filter;

pub const INVALID_EMAIL: &str = "Invalid email";
pub const INVALID_PHONE: &str = "Must be a valid phone number";
pub const INVALID_NAME: &str = "Must only contain alphabetic characters and spaces";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Deserialize `value` as `T` and run its validators
pub(crate) fn read<'a, T>(value: &'a Value) -> Result<T, ValidationErrors>
where
    T: Deserialize<'a> + Validate,
{
    let request = T::deserialize(value).map_err(errors::from_serde)?;
    request.validate().map_err(errors::collect)?;
    Ok(request)
}

/// `{ url, size }` reference to a stored image. The size cap is enforced by
/// the services so that they can report which image failed.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ImageRequest {
    #[serde(default, deserialize_with = "fields::trimmed")]
    #[validate(length(min = 1, max = 2048))]
    pub url: String,

    #[validate(required, range(min = 0))]
    pub size: Option<i64>,
}

impl ImageRequest {
    pub(crate) fn into_image(self) -> ImageRef {
        ImageRef::new(self.url, self.size.unwrap_or_default() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_image() {
        let image: ImageRequest = read(&json!({ "url": " /uploads/a.png ", "size": 1024 })).unwrap();
        assert_eq!(image.into_image(), ImageRef::new("/uploads/a.png", 1024));

        let errors = read::<ImageRequest>(&json!({ "url": "" })).unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["size", "url"]);
    }

    #[test]
    fn test_read_rejects_non_objects() {
        let errors = read::<ImageRequest>(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.errors()[0].field, "");
    }
}
