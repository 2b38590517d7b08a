//! Session repository trait for refresh token rotation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Session;
use crate::errors::DomainError;

/// Repository trait for login sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> Result<Session, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Replace the session code with `new_code` only while it still equals
    /// `expected`. Two concurrent refreshes with the same token cannot both
    /// succeed.
    ///
    /// # Returns
    /// * `Ok(true)` - The code was rotated
    /// * `Ok(false)` - Unknown session or stale code
    async fn rotate_code(&self, id: Uuid, expected: &str, new_code: &str) -> Result<bool, DomainError>;

    /// Delete the session if its code still equals `code`
    async fn delete(&self, id: Uuid, code: &str) -> Result<bool, DomainError>;
}
