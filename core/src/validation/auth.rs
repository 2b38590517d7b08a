use serde::Deserialize;
use serde_json::Value;
use sigma_shared::utils::validation::ValidationErrors;
use validator::{Validate, ValidationErrors as FieldErrors};

use super::errors::REQUIRED;
use super::fields::{normalize_phone, trimmed, trimmed_opt, validate_name, validate_phone};
use super::{read, ImageRequest};
use crate::domain::entities::{AgentProfile, AgentProfileUpdate, UserType};

/// Validated sign up request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Client {
        email: String,
        password: String,
    },
    Agent {
        email: String,
        password: String,
        profile: AgentProfile,
    },
}

impl Registration {
    pub fn email(&self) -> &str {
        match self {
            Registration::Client { email, .. } | Registration::Agent { email, .. } => email,
        }
    }

    pub fn user_type(&self) -> UserType {
        match self {
            Registration::Client { .. } => UserType::Client,
            Registration::Agent { .. } => UserType::Agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCodeCheck {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub email: String,
    pub password: String,
}

/// Sign up body, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegisterRequest {
    Client(ClientRegisterRequest),
    Agent(AgentRegisterRequest),
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        match self {
            RegisterRequest::Client(request) => request.validate(),
            RegisterRequest::Agent(request) => request.validate(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClientRegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, max = 20))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub repassword: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AgentRegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, max = 20))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub repassword: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20), custom(function = "validate_name"))]
    pub firstname: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20), custom(function = "validate_name"))]
    pub lastname: String,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 250))]
    pub bio: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(required, nested)]
    pub avatar: Option<ImageRequest>,
}

/// `{ type: "client" | "agent", email, password, repassword, ...agent fields }`
pub fn parse_registration(value: &Value) -> Result<Registration, ValidationErrors> {
    let registration = match read::<RegisterRequest>(value)? {
        RegisterRequest::Client(request) => Registration::Client {
            email: request.email,
            password: request.password,
        },
        RegisterRequest::Agent(request) => {
            let Some(avatar) = request.avatar else {
                return Err(ValidationErrors::single("avatar", REQUIRED));
            };
            Registration::Agent {
                email: request.email,
                password: request.password,
                profile: AgentProfile {
                    firstname: request.firstname,
                    lastname: request.lastname,
                    phone: e164(request.phone),
                    bio: request.bio.filter(|bio| !bio.is_empty()),
                    avatar: avatar.into_image(),
                },
            }
        }
    };
    Ok(registration)
}

/// Agent profile update; every field but `phone` is optional
#[derive(Debug, Deserialize, Validate)]
pub struct AgentUpdateRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 20), custom(function = "validate_name"))]
    pub firstname: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 20), custom(function = "validate_name"))]
    pub lastname: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 250))]
    pub bio: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(nested)]
    pub avatar: Option<ImageRequest>,
}

pub fn parse_agent_update(value: &Value) -> Result<AgentProfileUpdate, ValidationErrors> {
    let request: AgentUpdateRequest = read(value)?;
    Ok(AgentProfileUpdate {
        firstname: request.firstname,
        lastname: request.lastname,
        bio: request.bio,
        phone: e164(request.phone),
        avatar: request.avatar.map(ImageRequest::into_image),
    })
}

/// `{ email, password }`. The password is only checked for presence.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

pub fn parse_login(value: &Value) -> Result<Credentials, ValidationErrors> {
    let request: LoginRequest = read(value)?;
    Ok(Credentials {
        email: request.email,
        password: request.password,
    })
}

/// `{ email }`
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
}

pub fn parse_email(value: &Value) -> Result<String, ValidationErrors> {
    read::<EmailRequest>(value).map(|request| request.email)
}

/// `{ email, code }` with a six character code
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordCodeRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(equal = 6))]
    pub code: String,
}

pub fn parse_password_code(value: &Value) -> Result<PasswordCodeCheck, ValidationErrors> {
    let request: PasswordCodeRequest = read(value)?;
    Ok(PasswordCodeCheck {
        email: request.email,
        code: request.code,
    })
}

/// `{ email, password, repassword }`
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, max = 20))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub repassword: String,
}

pub fn parse_password_reset(value: &Value) -> Result<PasswordReset, ValidationErrors> {
    let request: PasswordResetRequest = read(value)?;
    Ok(PasswordReset {
        email: request.email,
        password: request.password,
    })
}

/// Validated phones always normalize
fn e164(phone: String) -> String {
    normalize_phone(&phone).unwrap_or(phone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ImageRef;
    use crate::validation::{INVALID_EMAIL, INVALID_NAME, INVALID_PHONE, PASSWORDS_DO_NOT_MATCH};
    use serde_json::json;

    fn fields(errors: &ValidationErrors) -> Vec<&str> {
        errors.errors().iter().map(|e| e.field.as_str()).collect()
    }

    fn message<'a>(errors: &'a ValidationErrors, field: &str) -> &'a str {
        errors
            .errors()
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
            .unwrap()
    }

    fn agent_body() -> Value {
        json!({
            "type": "agent",
            "email": " agent@example.com ",
            "password": "secret1",
            "repassword": "secret1",
            "firstname": "José",
            "lastname": "Martí Pérez",
            "phone": "+1 650 253 0000",
            "avatar": { "url": "/uploads/avatar.png", "size": 2048 }
        })
    }

    #[test]
    fn test_client_registration() {
        let body = json!({
            "type": "client",
            "email": "client@example.com",
            "password": "secret1",
            "repassword": "secret1"
        });
        let registration = parse_registration(&body).unwrap();
        assert_eq!(
            registration,
            Registration::Client {
                email: "client@example.com".to_string(),
                password: "secret1".to_string(),
            }
        );
        assert_eq!(registration.user_type(), UserType::Client);
    }

    #[test]
    fn test_agent_registration_normalizes_fields() {
        let registration = parse_registration(&agent_body()).unwrap();
        match registration {
            Registration::Agent { email, profile, .. } => {
                assert_eq!(email, "agent@example.com");
                assert_eq!(profile.phone, "+16502530000");
                assert_eq!(profile.bio, None);
                assert_eq!(profile.avatar, ImageRef::new("/uploads/avatar.png", 2048));
            }
            other => panic!("expected agent, got {:?}", other),
        }
    }

    #[test]
    fn test_agent_registration_reports_every_field() {
        let mut body = agent_body();
        body["firstname"] = json!("J0sé");
        body["phone"] = json!("12");
        body["avatar"] = json!({ "url": "/a.png" });
        body["email"] = json!("nope");

        let errors = parse_registration(&body).unwrap_err();
        assert_eq!(fields(&errors), vec!["avatar.size", "email", "firstname", "phone"]);
        assert_eq!(message(&errors, "email"), INVALID_EMAIL);
        assert_eq!(message(&errors, "firstname"), INVALID_NAME);
        assert_eq!(message(&errors, "phone"), INVALID_PHONE);
    }

    #[test]
    fn test_agent_registration_requires_avatar() {
        let mut body = agent_body();
        body.as_object_mut().unwrap().remove("avatar");
        let errors = parse_registration(&body).unwrap_err();
        assert_eq!(fields(&errors), vec!["avatar"]);
        assert_eq!(errors.errors()[0].message, "Required");
    }

    #[test]
    fn test_registration_requires_a_known_type() {
        let errors = parse_registration(&json!({ "email": "a@b.co" })).unwrap_err();
        assert_eq!(fields(&errors), vec!["type"]);

        let errors = parse_registration(&json!({ "type": "admin" })).unwrap_err();
        assert!(errors.errors()[0].message.contains("admin"));
    }

    #[test]
    fn test_password_mismatch_is_reported_on_repassword() {
        let errors = parse_password_reset(&json!({
            "email": "a@b.co",
            "password": "secret1",
            "repassword": "secret2"
        }))
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["repassword"]);
        assert_eq!(errors.errors()[0].message, PASSWORDS_DO_NOT_MATCH);
    }

    #[test]
    fn test_agent_update_requires_phone_only() {
        let update = parse_agent_update(&json!({ "phone": "+16502530000", "bio": "" })).unwrap();
        assert_eq!(update.phone, "+16502530000");
        assert_eq!(update.bio, Some(String::new()));
        assert_eq!(update.firstname, None);
        assert_eq!(update.avatar, None);

        let errors = parse_agent_update(&json!({ "bio": "x".repeat(251) })).unwrap_err();
        assert_eq!(fields(&errors), vec!["bio", "phone"]);
    }

    #[test]
    fn test_password_code_length() {
        let ok = parse_password_code(&json!({ "email": "a@b.co", "code": "123456" })).unwrap();
        assert_eq!(ok.code, "123456");

        let errors = parse_password_code(&json!({ "email": "a@b.co", "code": "12345" })).unwrap_err();
        assert_eq!(fields(&errors), vec!["code"]);
        assert_eq!(errors.errors()[0].message, "Must have a length of 6");
    }

    #[test]
    fn test_login_only_checks_presence() {
        let credentials = parse_login(&json!({ "email": "a@b.co", "password": "x" })).unwrap();
        assert_eq!(credentials.password, "x");
        assert_eq!(
            fields(&parse_login(&json!({ "email": "a@b.co" })).unwrap_err()),
            vec!["password"]
        );
    }
}
