//! Main authentication service implementation

use std::sync::Arc;
use std::time::Duration;

use sigma_shared::utils::masking::mask_email;
use uuid::Uuid;

use crate::domain::entities::{
    AgentProfileUpdate, PasswordCode, Session, TokenKind, User, VerificationCode,
};
use crate::domain::value_objects::{DeviceInfo, ImageRef};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{SessionRepository, UserRepository};
use crate::services::mail::MailServiceTrait;
use crate::services::token::TokenService;
use crate::validation::{PasswordReset, Registration};

use super::config::AuthServiceConfig;

/// Result of following a verification link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
    Failed,
}

/// Tokens and user returned by a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Tokens returned by a refresh
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service for managing the complete account flow
pub struct AuthService<U, S, M>
where
    U: UserRepository + 'static,
    S: SessionRepository,
    M: MailServiceTrait + 'static,
{
    /// User repository for database operations
    user_repository: Arc<U>,
    /// Session repository backing refresh tokens
    session_repository: Arc<S>,
    /// Outgoing mail
    mail_service: Arc<M>,
    /// Token service for JWT management
    token_service: Arc<TokenService>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, S, M> AuthService<U, S, M>
where
    U: UserRepository + 'static,
    S: SessionRepository,
    M: MailServiceTrait + 'static,
{
    /// Create a new authentication service
    pub fn new(
        user_repository: Arc<U>,
        session_repository: Arc<S>,
        mail_service: Arc<M>,
        token_service: Arc<TokenService>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            session_repository,
            mail_service,
            token_service,
            config,
        }
    }

    /// Register a client or an agent and mail the verification link
    ///
    /// A stale unverified account with the same email is replaced.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Account stored; mail failures are only logged
    /// * `Err(AuthError::UserAlreadyExists)` - A verified account owns the email
    /// * `Err(DomainError::FileTooLarge)` - The agent avatar exceeds 5MB
    pub async fn register(&self, registration: Registration) -> DomainResult<()> {
        let user = match registration {
            Registration::Client { email, password } => {
                let hash = self.hash_password(password).await?;
                User::new_client(email, hash)
            }
            Registration::Agent {
                email,
                password,
                profile,
            } => {
                check_image_size(&profile.avatar)?;
                let hash = self.hash_password(password).await?;
                User::new_agent(email, hash, profile)
            }
        };

        let code = VerificationCode::new(user.id);
        let user = self.user_repository.register(user, code.clone()).await?;

        tracing::info!(
            user_id = %user.id,
            user_type = %user.user_type,
            event = "user_registered",
            "Registered new user"
        );

        self.send_verification_link(&user.email, &code)
    }

    /// Follow a verification link
    ///
    /// Never fails on bad input: invalid, expired or stale tokens yield
    /// `VerificationOutcome::Failed`. Only storage errors are returned.
    pub async fn verify_email(&self, token: &str) -> DomainResult<VerificationOutcome> {
        let claims = match self.token_service.verify_verification_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected verification token");
                return Ok(VerificationOutcome::Failed);
            }
        };
        let (Some(user_id), Some(code_id)) = (claims.user_id(), claims.record_id()) else {
            return Ok(VerificationOutcome::Failed);
        };

        let Some(user) = self.user_repository.find_by_id(user_id).await? else {
            return Ok(VerificationOutcome::Failed);
        };
        if user.verified {
            return Ok(VerificationOutcome::AlreadyVerified);
        }

        let stored = self.user_repository.find_verification_code(user_id).await?;
        match stored {
            Some(code) if code.id == code_id && code.matches(&claims.code) => {}
            _ => return Ok(VerificationOutcome::Failed),
        }

        if !self
            .user_repository
            .complete_verification(user_id, code_id)
            .await?
        {
            return Ok(VerificationOutcome::Failed);
        }

        tracing::info!(user_id = %user_id, event = "user_verified", "Email verified");
        Ok(VerificationOutcome::Verified)
    }

    /// Issue a fresh verification code and mail a new link
    pub async fn resend_verification(&self, email: &str) -> DomainResult<()> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.verified {
            return Err(AuthError::AlreadyVerified.into());
        }

        let code = VerificationCode::new(user.id);
        self.user_repository
            .replace_verification_code(code.clone())
            .await?;
        self.send_verification_link(&user.email, &code)
    }

    /// Authenticate a verified user and open a session
    ///
    /// Unknown email, unverified account and wrong password are reported
    /// the same way.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: DeviceInfo,
    ) -> DomainResult<LoginResult> {
        let user = match self.user_repository.find_by_email(email).await? {
            Some(user) if user.verified => user,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };

        if !self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?
        {
            tracing::warn!(
                email = %mask_email(email),
                event = "login_failed",
                "Login rejected: bad password"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        self.open_session(user, device).await
    }

    /// Rotate the session code behind a refresh token and issue new tokens
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::Invalid(Refresh))` - Bad token, unknown session or stale code
    /// * `Err(TokenError::Expired(Refresh))` - The token has expired
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<RefreshResult> {
        let claims = self.token_service.verify_refresh_token(refresh_token)?;
        let session_id = claims.record_id().ok_or_else(invalid_refresh)?;

        let new_code = Session::generate_code();
        if !self
            .session_repository
            .rotate_code(session_id, &claims.code, &new_code)
            .await?
        {
            tracing::warn!(
                session_id = %session_id,
                event = "refresh_rejected",
                "Refresh token does not match the session"
            );
            return Err(invalid_refresh());
        }

        let session = self
            .session_repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(invalid_refresh)?;

        Ok(RefreshResult {
            access_token: self.token_service.generate_access_token(session.user_id)?,
            refresh_token: self.token_service.generate_refresh_token(&session)?,
        })
    }

    /// Delete the session behind a refresh token
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        let claims = self.token_service.verify_refresh_token(refresh_token)?;
        let session_id = claims.record_id().ok_or_else(invalid_refresh)?;

        if !self
            .session_repository
            .delete(session_id, &claims.code)
            .await?
        {
            return Err(invalid_refresh());
        }

        tracing::info!(session_id = %session_id, event = "logout", "Session closed");
        Ok(())
    }

    pub async fn current_user(&self, user_id: Uuid) -> DomainResult<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    /// The signed-in user, provided it is an agent
    ///
    /// # Returns
    ///
    /// * `Err(AuthError::NotAnAgent)` - A client account
    pub async fn require_agent(&self, user_id: Uuid) -> DomainResult<User> {
        let user = self.current_user(user_id).await?;
        if !user.is_agent() {
            return Err(AuthError::NotAnAgent.into());
        }
        Ok(user)
    }

    /// Update the profile of an agent
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: AgentProfileUpdate,
    ) -> DomainResult<User> {
        let mut user = self.require_agent(user_id).await?;
        if let Some(avatar) = &update.avatar {
            check_image_size(avatar)?;
        }

        if let Some(previous) = user.apply_profile_update(update) {
            tracing::debug!(user_id = %user_id, url = %previous.url, "Avatar replaced");
        }
        self.user_repository.update(user).await
    }

    /// Mail a password reset code. Unknown emails succeed silently.
    pub async fn request_password_reset(&self, email: &str) -> DomainResult<()> {
        let Some(user) = self.user_repository.find_by_email(email).await? else {
            tracing::debug!(
                email = %mask_email(email),
                "Password reset requested for unknown email"
            );
            return Ok(());
        };

        let (code, plain) = PasswordCode::generate(user.id);
        let code_id = code.id;
        self.user_repository.save_password_code(code).await?;

        let users = Arc::clone(&self.user_repository);
        schedule(self.config.password_code_ttl, async move {
            if let Err(e) = users.delete_password_code(code_id).await {
                tracing::error!(error = %e, "Failed to expire password code");
            }
        });

        let mail = Arc::clone(&self.mail_service);
        let email = user.email;
        tokio::spawn(async move {
            if let Err(e) = mail.send_password_code(&email, &plain).await {
                tracing::error!(
                    email = %mask_email(&email),
                    error = %e,
                    event = "mail_failed",
                    "Failed to send password code"
                );
            }
        });
        Ok(())
    }

    /// Consume a password code and allow a reset for a short while
    pub async fn confirm_password_code(&self, email: &str, code: &str) -> DomainResult<()> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::PasswordCodeRejected)?;

        let stored = self
            .user_repository
            .find_password_code(user.id)
            .await?
            .filter(|stored| stored.matches(code))
            .ok_or(AuthError::PasswordCodeRejected)?;

        if !self.user_repository.delete_password_code(stored.id).await? {
            return Err(AuthError::PasswordCodeRejected.into());
        }
        self.user_repository
            .set_pending_password(user.id, true)
            .await?;

        let users = Arc::clone(&self.user_repository);
        let user_id = user.id;
        schedule(self.config.pending_password_ttl, async move {
            if let Err(e) = users.set_pending_password(user_id, false).await {
                tracing::error!(error = %e, "Failed to clear pending password");
            }
        });

        Ok(())
    }

    /// Store the new password of a confirmed reset and log the user in
    pub async fn reset_password(
        &self,
        reset: PasswordReset,
        device: DeviceInfo,
    ) -> DomainResult<LoginResult> {
        let user = match self.user_repository.find_by_email(&reset.email).await? {
            Some(user) if user.pending_password => user,
            _ => return Err(AuthError::PasswordResetRejected.into()),
        };

        let hash = self.hash_password(reset.password).await?;
        if !self.user_repository.reset_password(user.id, &hash).await? {
            return Err(AuthError::PasswordResetRejected.into());
        }

        tracing::info!(user_id = %user.id, event = "password_reset", "Password replaced");

        let user = self.current_user(user.id).await?;
        self.open_session(user, device).await
    }

    async fn open_session(&self, user: User, device: DeviceInfo) -> DomainResult<LoginResult> {
        let session = self
            .session_repository
            .create(Session::new(user.id, device))
            .await?;

        tracing::info!(
            user_id = %user.id,
            session_id = %session.id,
            event = "login",
            "Session opened"
        );

        Ok(LoginResult {
            access_token: self.token_service.generate_access_token(user.id)?,
            refresh_token: self.token_service.generate_refresh_token(&session)?,
            user,
        })
    }

    /// Mail the verification link in the background; the caller never
    /// waits on delivery
    fn send_verification_link(&self, email: &str, code: &VerificationCode) -> DomainResult<()> {
        let token = self.token_service.generate_verification_token(code)?;
        let link = self.config.verification_link(&token);

        let mail = Arc::clone(&self.mail_service);
        let email = email.to_string();
        tokio::spawn(async move {
            if let Err(e) = mail.send_verification_link(&email, &link).await {
                tracing::error!(
                    email = %mask_email(&email),
                    error = %e,
                    event = "mail_failed",
                    "Failed to send verification link"
                );
            }
        });
        Ok(())
    }

    async fn hash_password(&self, password: String) -> DomainResult<String> {
        let cost = self.config.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    async fn verify_password(&self, password: String, hash: String) -> DomainResult<bool> {
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?;
        // A corrupt stored hash is treated as a mismatch
        Ok(verified.unwrap_or(false))
    }
}

fn invalid_refresh() -> DomainError {
    TokenError::Invalid(TokenKind::Refresh).into()
}

fn check_image_size(image: &ImageRef) -> DomainResult<()> {
    if image.exceeds_max_size() {
        return Err(DomainError::FileTooLarge { index: None });
    }
    Ok(())
}

/// Run `task` once `delay` has elapsed
fn schedule<F>(delay: Duration, task: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task.await;
    });
}
