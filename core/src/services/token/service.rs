//! Main token service implementation

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{AccessClaims, Session, SessionClaims, TokenKind, VerificationCode};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Service for signing and verifying JWTs
pub struct TokenService {
    config: TokenServiceConfig,
    access: Keys,
    refresh: Keys,
    verification: Keys,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    pub fn new(config: TokenServiceConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            access: Keys::from_secret(&config.access_secret),
            refresh: Keys::from_secret(&config.refresh_secret),
            verification: Keys::from_secret(&config.verification_secret),
            config,
            validation,
        }
    }

    /// Refresh token lifetime in seconds, used for the cookie `Max-Age`
    pub fn refresh_token_ttl(&self) -> i64 {
        self.config.refresh_token_expiry
    }

    /// Generates an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, DomainError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.config.access_token_expiry,
            iss: self.config.issuer.clone(),
        };
        self.encode_jwt(&claims, &self.access)
    }

    /// Generates a refresh token bound to the session's current code
    pub fn generate_refresh_token(&self, session: &Session) -> Result<String, DomainError> {
        let claims = self.session_claims(
            session.user_id,
            session.id,
            &session.code,
            self.config.refresh_token_expiry,
        );
        self.encode_jwt(&claims, &self.refresh)
    }

    /// Generates an email verification token for a stored code
    pub fn generate_verification_token(&self, code: &VerificationCode) -> Result<String, DomainError> {
        let claims = self.session_claims(
            code.user_id,
            code.id,
            &code.code,
            self.config.verification_token_expiry,
        );
        self.encode_jwt(&claims, &self.verification)
    }

    /// Verifies an access token and returns the claims
    ///
    /// # Returns
    ///
    /// * `Ok(AccessClaims)` - The decoded claims if valid
    /// * `Err(TokenError::Expired)` - The signature is valid but `exp` passed
    /// * `Err(TokenError::Invalid)` - Anything else
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, DomainError> {
        self.decode_jwt(token, &self.access, TokenKind::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<SessionClaims, DomainError> {
        self.decode_jwt(token, &self.refresh, TokenKind::Refresh)
    }

    pub fn verify_verification_token(&self, token: &str) -> Result<SessionClaims, DomainError> {
        self.decode_jwt(token, &self.verification, TokenKind::Verification)
    }

    fn session_claims(&self, user_id: Uuid, record_id: Uuid, code: &str, ttl: i64) -> SessionClaims {
        let now = Utc::now().timestamp();
        SessionClaims {
            sub: user_id.to_string(),
            sid: record_id.to_string(),
            code: code.to_string(),
            iat: now,
            exp: now + ttl,
            iss: self.config.issuer.clone(),
        }
    }

    /// Encodes claims into a JWT
    fn encode_jwt<T: Serialize>(&self, claims: &T, keys: &Keys) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &keys.encoding)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    fn decode_jwt<T: DeserializeOwned>(
        &self,
        token: &str,
        keys: &Keys,
        kind: TokenKind,
    ) -> Result<T, DomainError> {
        decode::<T>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::Token(TokenError::Expired(kind)),
                _ => DomainError::Token(TokenError::Invalid(kind)),
            })
    }
}
