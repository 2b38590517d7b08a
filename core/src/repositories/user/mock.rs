//! Mock implementation of UserRepository for testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{PasswordCode, User, VerificationCode};
use crate::errors::{AuthError, DomainError};

use super::trait_::UserRepository;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    verification_codes: HashMap<Uuid, VerificationCode>,
    password_codes: HashMap<Uuid, PasswordCode>,
}

/// Mock user repository for testing
#[derive(Clone, Default)]
pub struct MockUserRepository {
    state: Arc<RwLock<State>>,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing registration
    pub async fn insert(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn register(&self, user: User, code: VerificationCode) -> Result<User, DomainError> {
        let mut state = self.state.write().await;

        let existing = state.users.values().find(|u| u.email == user.email).cloned();
        if let Some(existing) = existing {
            if existing.verified {
                return Err(AuthError::UserAlreadyExists.into());
            }
            state.users.remove(&existing.id);
            state.verification_codes.remove(&existing.id);
            state.password_codes.remove(&existing.id);
        }

        state.verification_codes.insert(user.id, code);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_verification_code(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, DomainError> {
        Ok(self.state.read().await.verification_codes.get(&user_id).cloned())
    }

    async fn replace_verification_code(&self, code: VerificationCode) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.verification_codes.insert(code.user_id, code);
        Ok(())
    }

    async fn complete_verification(&self, user_id: Uuid, code_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;

        match state.verification_codes.get(&user_id) {
            Some(code) if code.id == code_id => {}
            _ => return Ok(false),
        }
        state.verification_codes.remove(&user_id);
        if let Some(user) = state.users.get_mut(&user_id) {
            user.verify();
        }
        Ok(true)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user.id) {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }

        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save_password_code(&self, code: PasswordCode) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.password_codes.insert(code.user_id, code);
        Ok(())
    }

    async fn find_password_code(&self, user_id: Uuid) -> Result<Option<PasswordCode>, DomainError> {
        Ok(self.state.read().await.password_codes.get(&user_id).cloned())
    }

    async fn delete_password_code(&self, code_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let owner = state
            .password_codes
            .iter()
            .find(|(_, code)| code.id == code_id)
            .map(|(user_id, _)| *user_id);
        Ok(owner
            .and_then(|user_id| state.password_codes.remove(&user_id))
            .is_some())
    }

    async fn set_pending_password(&self, user_id: Uuid, pending: bool) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.pending_password = pending;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn reset_password(&self, user_id: Uuid, password_hash: &str) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user_id) {
            Some(user) if user.pending_password => {
                user.password_hash = password_hash.to_string();
                user.pending_password = false;
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
