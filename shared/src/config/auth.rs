//! Authentication configuration: JWT keys, token lifetimes and the refresh cookie

use serde::{Deserialize, Serialize};

use super::environment::Environment;

const DEFAULT_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";
const DEFAULT_VERIFICATION_SECRET: &str = "dev-verification-secret-change-in-production";

/// JWT configuration for the three token kinds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,

    /// Secret used to sign refresh tokens
    pub refresh_secret: String,

    /// Secret used to sign email verification tokens
    pub verification_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// Verification token expiry time in seconds
    pub verification_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            verification_secret: String::from(DEFAULT_VERIFICATION_SECRET),
            access_token_expiry: 600,        // 10 minutes
            refresh_token_expiry: 3_888_000, // 45 days
            verification_token_expiry: 300,  // 5 minutes
            issuer: String::from("sigma"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with the three signing secrets
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        verification_secret: impl Into<String>,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            verification_secret: verification_secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables, falling back to development secrets
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_secret: std::env::var("JWT_ACCESS_SECRET").unwrap_or(defaults.access_secret),
            refresh_secret: std::env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            verification_secret: std::env::var("JWT_VERIFICATION_SECRET")
                .unwrap_or(defaults.verification_secret),
            access_token_expiry: env_i64("JWT_ACCESS_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_i64("JWT_REFRESH_EXPIRY", defaults.refresh_token_expiry),
            verification_token_expiry: env_i64(
                "JWT_VERIFICATION_EXPIRY",
                defaults.verification_token_expiry,
            ),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if any secret is still a development default (security warning)
    pub fn is_using_default_secrets(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET
            || self.refresh_secret == DEFAULT_REFRESH_SECRET
            || self.verification_secret == DEFAULT_VERIFICATION_SECRET
    }
}

/// Refresh token cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Cookie name
    pub name: String,

    /// Cookie path
    pub path: String,

    /// Secure flag (HTTPS only)
    pub secure: bool,

    /// HttpOnly flag
    pub http_only: bool,

    /// SameSite attribute ("Strict", "Lax" or "None")
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: String::from("refresh_token"),
            path: String::from("/"),
            secure: false,
            http_only: true,
            same_site: String::from("Strict"),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Refresh cookie configuration
    pub cookie: CookieConfig,

    /// Seconds before an unused password reset code is deleted
    pub password_code_ttl: u64,

    /// Seconds a confirmed password reset stays open
    pub pending_password_ttl: u64,

    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            cookie: CookieConfig::default(),
            password_code_ttl: 120,
            pending_password_ttl: 90,
            bcrypt_cost: 10,
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env(environment: Environment) -> Self {
        let defaults = Self::default();
        let cookie = CookieConfig {
            secure: std::env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(environment.is_production()),
            ..Default::default()
        };

        Self {
            jwt: JwtConfig::from_env(),
            cookie,
            password_code_ttl: env_i64("PASSWORD_CODE_TTL", defaults.password_code_ttl as i64)
                as u64,
            pending_password_ttl: env_i64(
                "PENDING_PASSWORD_TTL",
                defaults.pending_password_ttl as i64,
            ) as u64,
            bcrypt_cost: env_i64("BCRYPT_COST", defaults.bcrypt_cost as i64) as u32,
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
