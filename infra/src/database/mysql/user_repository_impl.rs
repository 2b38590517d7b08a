//! MySQL implementation of the UserRepository trait.
//!
//! Users live in `users`, agent profiles in `agents`; the pending
//! verification and password codes have one row per user in their own
//! tables. Every child row cascades with its user.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use sigma_core::domain::entities::{AgentProfile, PasswordCode, User, UserType, VerificationCode};
use sigma_core::domain::value_objects::ImageRef;
use sigma_core::errors::{AuthError, DomainError};
use sigma_core::repositories::UserRepository;

use super::{db_error, is_unique_violation, parse_column, parse_uuid};

const SELECT_USER: &str = r#"
    SELECT u.id, u.email, u.password_hash, u.user_type, u.verified,
           u.pending_password, u.created_at, u.updated_at,
           a.firstname, a.lastname, a.phone, a.bio, a.avatar_url, a.avatar_size
    FROM users u
    LEFT JOIN agents a ON a.user_id = u.id
"#;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a joined users/agents row to a User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        let get = |e: sqlx::Error| DomainError::internal(format!("Failed to read user row: {}", e));

        let id: String = row.try_get("id").map_err(get)?;
        let user_type: String = row.try_get("user_type").map_err(get)?;
        let user_type: UserType = parse_column("user_type", &user_type)?;

        let firstname: Option<String> = row.try_get("firstname").map_err(get)?;
        let agent = match (user_type, firstname) {
            (UserType::Agent, Some(firstname)) => Some(AgentProfile {
                firstname,
                lastname: row.try_get("lastname").map_err(get)?,
                phone: row.try_get("phone").map_err(get)?,
                bio: row.try_get("bio").map_err(get)?,
                avatar: ImageRef::new(
                    row.try_get::<String, _>("avatar_url").map_err(get)?,
                    row.try_get::<u64, _>("avatar_size").map_err(get)?,
                ),
            }),
            _ => None,
        };

        Ok(User {
            id: parse_uuid(&id)?,
            email: row.try_get("email").map_err(get)?,
            password_hash: row.try_get("password_hash").map_err(get)?,
            user_type,
            verified: row.try_get("verified").map_err(get)?,
            pending_password: row.try_get("pending_password").map_err(get)?,
            agent,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(get)?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(get)?,
        })
    }

    fn row_to_verification_code(row: &MySqlRow) -> Result<VerificationCode, DomainError> {
        let get = |e: sqlx::Error| {
            DomainError::internal(format!("Failed to read verification code row: {}", e))
        };
        let id: String = row.try_get("id").map_err(get)?;
        let user_id: String = row.try_get("user_id").map_err(get)?;

        Ok(VerificationCode {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            code: row.try_get("code").map_err(get)?,
            created_at: row.try_get("created_at").map_err(get)?,
        })
    }

    fn row_to_password_code(row: &MySqlRow) -> Result<PasswordCode, DomainError> {
        let get =
            |e: sqlx::Error| DomainError::internal(format!("Failed to read password code row: {}", e));
        let id: String = row.try_get("id").map_err(get)?;
        let user_id: String = row.try_get("user_id").map_err(get)?;

        Ok(PasswordCode {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            code_hash: row.try_get("code_hash").map_err(get)?,
            created_at: row.try_get("created_at").map_err(get)?,
        })
    }

    async fn insert_agent(
        tx: &mut Transaction<'_, MySql>,
        user_id: Uuid,
        profile: &AgentProfile,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO agents (user_id, firstname, lastname, phone, bio, avatar_url, avatar_size)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(&profile.firstname)
        .bind(&profile.lastname)
        .bind(&profile.phone)
        .bind(profile.bio.as_deref())
        .bind(&profile.avatar.url)
        .bind(profile.avatar.size)
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to insert agent profile"))?;
        Ok(())
    }

    async fn find_one(&self, condition: &str, value: String) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE {} LIMIT 1", SELECT_USER, condition);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.find_one("u.id = ?", id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("u.email = ?", email.to_string()).await
    }

    async fn register(&self, user: User, code: VerificationCode) -> Result<User, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let existing = sqlx::query("SELECT id, verified FROM users WHERE email = ? FOR UPDATE")
            .bind(&user.email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to look up email"))?;

        if let Some(row) = existing {
            let verified: bool = row
                .try_get("verified")
                .map_err(db_error("Failed to read verified flag"))?;
            if verified {
                return Err(AuthError::UserAlreadyExists.into());
            }

            // An abandoned registration gives its email back
            let stale: String = row.try_get("id").map_err(db_error("Failed to read user id"))?;
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(&stale)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to delete unverified user"))?;
            tracing::debug!(stale_user_id = %stale, "Replaced unverified registration");
        }

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, user_type, verified,
                pending_password, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .bind(user.verified)
        .bind(user.pending_password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserAlreadyExists.into()
            } else {
                db_error("Failed to insert user")(e)
            }
        })?;

        if let Some(profile) = &user.agent {
            Self::insert_agent(&mut tx, user.id, profile).await?;
        }

        sqlx::query(
            "INSERT INTO verification_codes (id, user_id, code, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(code.id.to_string())
        .bind(code.user_id.to_string())
        .bind(&code.code)
        .bind(code.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert verification code"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit registration"))?;

        Ok(user)
    }

    async fn find_verification_code(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let row = sqlx::query(
            "SELECT id, user_id, code, created_at FROM verification_codes WHERE user_id = ? LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find verification code"))?;

        row.as_ref().map(Self::row_to_verification_code).transpose()
    }

    async fn replace_verification_code(&self, code: VerificationCode) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO verification_codes (id, user_id, code, created_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                id = VALUES(id), code = VALUES(code), created_at = VALUES(created_at)
            "#,
        )
        .bind(code.id.to_string())
        .bind(code.user_id.to_string())
        .bind(&code.code)
        .bind(code.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to replace verification code"))?;
        Ok(())
    }

    async fn complete_verification(&self, user_id: Uuid, code_id: Uuid) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let deleted = sqlx::query("DELETE FROM verification_codes WHERE id = ? AND user_id = ?")
            .bind(code_id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete verification code"))?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET verified = TRUE, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to mark user verified"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit verification"))?;
        Ok(true)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                password_hash = ?,
                verified = ?,
                pending_password = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.password_hash)
        .bind(user.verified)
        .bind(user.pending_password)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update user"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }

        if let Some(profile) = &user.agent {
            sqlx::query(
                r#"
                UPDATE agents SET
                    firstname = ?, lastname = ?, phone = ?, bio = ?,
                    avatar_url = ?, avatar_size = ?
                WHERE user_id = ?
                "#,
            )
            .bind(&profile.firstname)
            .bind(&profile.lastname)
            .bind(&profile.phone)
            .bind(profile.bio.as_deref())
            .bind(&profile.avatar.url)
            .bind(profile.avatar.size)
            .bind(user.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update agent profile"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit user update"))?;
        Ok(user)
    }

    async fn save_password_code(&self, code: PasswordCode) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO password_codes (id, user_id, code_hash, created_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                id = VALUES(id), code_hash = VALUES(code_hash), created_at = VALUES(created_at)
            "#,
        )
        .bind(code.id.to_string())
        .bind(code.user_id.to_string())
        .bind(&code.code_hash)
        .bind(code.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save password code"))?;
        Ok(())
    }

    async fn find_password_code(&self, user_id: Uuid) -> Result<Option<PasswordCode>, DomainError> {
        let row = sqlx::query(
            "SELECT id, user_id, code_hash, created_at FROM password_codes WHERE user_id = ? LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find password code"))?;

        row.as_ref().map(Self::row_to_password_code).transpose()
    }

    async fn delete_password_code(&self, code_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM password_codes WHERE id = ?")
            .bind(code_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete password code"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_pending_password(&self, user_id: Uuid, pending: bool) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET pending_password = ?, updated_at = ? WHERE id = ?")
            .bind(pending)
            .bind(Utc::now())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to set pending password flag"))?;
        Ok(())
    }

    async fn reset_password(&self, user_id: Uuid, password_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = ?, pending_password = FALSE, updated_at = ?
            WHERE id = ? AND pending_password = TRUE
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to reset password"))?;
        Ok(result.rows_affected() > 0)
    }
}
