use serde::Serialize;

use sigma_core::User;

use super::user::UserDto;

/// Body of a successful login or password reset; the refresh token travels
/// in a cookie
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// `{ "user": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct UserEnvelope {
    pub user: UserDto,
}

impl From<User> for UserEnvelope {
    fn from(user: User) -> Self {
        Self { user: user.into() }
    }
}

/// Payload rendered by the page an emailed verification link opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationPage {
    /// `verified`, `already_verified` or `failed`
    pub status: &'static str,
    pub message: &'static str,
}
