//! MySQL implementation of the SessionRepository trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sigma_core::domain::entities::Session;
use sigma_core::domain::value_objects::DeviceInfo;
use sigma_core::errors::DomainError;
use sigma_core::repositories::SessionRepository;

use super::{db_error, parse_uuid};

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &MySqlRow) -> Result<Session, DomainError> {
        let get = |e: sqlx::Error| DomainError::internal(format!("Failed to read session row: {}", e));
        let id: String = row.try_get("id").map_err(get)?;
        let user_id: String = row.try_get("user_id").map_err(get)?;

        Ok(Session {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            code: row.try_get("code").map_err(get)?,
            device: DeviceInfo {
                browser: row.try_get("browser").map_err(get)?,
                os: row.try_get("os").map_err(get)?,
                cpu: row.try_get("cpu").map_err(get)?,
            },
            created_at: row.try_get("created_at").map_err(get)?,
            updated_at: row.try_get("updated_at").map_err(get)?,
        })
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, code, browser, os, cpu, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.code)
        .bind(session.device.browser.as_deref())
        .bind(session.device.os.as_deref())
        .bind(session.device.cpu.as_deref())
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create session"))?;

        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, code, browser, os, cpu, created_at, updated_at
            FROM sessions
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find session"))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn rotate_code(&self, id: Uuid, expected: &str, new_code: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE sessions SET code = ?, updated_at = ? WHERE id = ? AND code = ?")
            .bind(new_code)
            .bind(Utc::now())
            .bind(id.to_string())
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to rotate session code"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid, code: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ? AND code = ?")
            .bind(id.to_string())
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete session"))?;

        Ok(result.rows_affected() == 1)
    }
}
