//! Configuration for the authentication service

use std::time::Duration;

use sigma_shared::{AuthConfig, MailConfig};

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Public origin used to build verification links
    pub origin: String,
    /// How long a mailed password code stays valid
    pub password_code_ttl: Duration,
    /// How long a confirmed reset waits for the new password
    pub pending_password_ttl: Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            password_code_ttl: Duration::from_secs(120),
            pending_password_ttl: Duration::from_secs(90),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthServiceConfig {
    pub fn new(auth: &AuthConfig, mail: &MailConfig) -> Self {
        Self {
            origin: mail.origin.trim_end_matches('/').to_string(),
            password_code_ttl: Duration::from_secs(auth.password_code_ttl),
            pending_password_ttl: Duration::from_secs(auth.pending_password_ttl),
            bcrypt_cost: auth.bcrypt_cost,
        }
    }

    /// Link mailed to confirm an account
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/api/auth/verify/{}", self.origin, token)
    }
}
