//! Login session backing a refresh token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::DeviceInfo;

/// A login session. Refresh tokens embed the session id and its current
/// `code`; rotating the code invalidates every token issued before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub device: DeviceInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Opens a new session with a fresh random code
    pub fn new(user_id: Uuid, device: DeviceInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            code: Self::generate_code(),
            device,
            created_at: now,
            updated_at: now,
        }
    }

    /// Random opaque code
    pub fn generate_code() -> String {
        Uuid::new_v4().to_string()
    }
}
