//! One-time codes: email verification and password reset.

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Number of digits in a password reset code
pub const PASSWORD_CODE_LENGTH: usize = 6;

/// Pending email verification. At most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            code: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }
}

/// Password reset code. Only the SHA-256 hash of the digits is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
}

impl PasswordCode {
    /// Generates a new code, returning the record and the plain digits to mail
    pub fn generate(user_id: Uuid) -> (Self, String) {
        let mut rng = rand::thread_rng();
        let plain: String = (0..PASSWORD_CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();

        let record = Self {
            id: Uuid::new_v4(),
            user_id,
            code_hash: Self::hash(&plain),
            created_at: Utc::now(),
        };
        (record, plain)
    }

    pub fn hash(code: &str) -> String {
        hex::encode(Sha256::digest(code.as_bytes()))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.code_hash.as_bytes(), Self::hash(candidate).as_bytes())
    }
}
