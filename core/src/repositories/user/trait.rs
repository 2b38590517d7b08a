//! User repository trait: accounts, verification codes and password codes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{PasswordCode, User, VerificationCode};
use crate::errors::DomainError;

/// Repository trait for user persistence operations
///
/// Operations that touch more than one table (`register`,
/// `complete_verification`) must be atomic.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by their (trimmed) email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Store a new user together with its verification code.
    ///
    /// An unverified account with the same email is deleted first, in the
    /// same transaction.
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(AuthError::UserAlreadyExists)` - A verified account owns the email
    async fn register(&self, user: User, code: VerificationCode) -> Result<User, DomainError>;

    /// The pending verification code of a user
    async fn find_verification_code(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, DomainError>;

    /// Replace the pending verification code of a user
    async fn replace_verification_code(&self, code: VerificationCode) -> Result<(), DomainError>;

    /// Mark the user as verified and delete the code, atomically
    ///
    /// # Returns
    /// * `Ok(true)` - The code existed and was consumed
    /// * `Ok(false)` - The code was consumed concurrently
    async fn complete_verification(&self, user_id: Uuid, code_id: Uuid) -> Result<bool, DomainError>;

    /// Persist profile fields, password hash and flags of an existing user
    async fn update(&self, user: User) -> Result<User, DomainError>;

    /// Store a password code, replacing any previous code of the same user
    async fn save_password_code(&self, code: PasswordCode) -> Result<(), DomainError>;

    async fn find_password_code(&self, user_id: Uuid) -> Result<Option<PasswordCode>, DomainError>;

    /// Delete one password code by id. Returns whether it still existed.
    async fn delete_password_code(&self, code_id: Uuid) -> Result<bool, DomainError>;

    /// Set or clear the pending password flag
    async fn set_pending_password(&self, user_id: Uuid, pending: bool) -> Result<(), DomainError>;

    /// Store a new password hash if, and only if, a reset is pending; the
    /// flag is cleared in the same statement.
    ///
    /// # Returns
    /// * `Ok(true)` - Password replaced
    /// * `Ok(false)` - No reset was pending
    async fn reset_password(&self, user_id: Uuid, password_hash: &str) -> Result<bool, DomainError>;
}
