//! User entity representing a registered client or agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::ImageRef;

/// Represents the type of user in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Private person, may publish a single post
    Client,
    /// Real estate agent with a public profile
    Agent,
}

impl UserType {
    /// Maximum number of posts a user of this type can keep published
    pub fn max_posts(&self) -> usize {
        match self {
            UserType::Client => 1,
            UserType::Agent => 35,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Agent => "agent",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(UserType::Client),
            "agent" => Ok(UserType::Agent),
            _ => Err(format!("Invalid user type: {}", s)),
        }
    }
}

/// Public profile data carried by agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub firstname: String,
    pub lastname: String,
    /// E.164 formatted phone number
    pub phone: String,
    pub bio: Option<String>,
    pub avatar: ImageRef,
}

/// Partial update of an agent profile. `phone` is always provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub bio: Option<String>,
    pub phone: String,
    pub avatar: Option<ImageRef>,
}

/// User entity representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Trimmed email address, unique among users
    pub email: String,

    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Client or agent
    pub user_type: UserType,

    /// Whether the email address has been verified
    pub verified: bool,

    /// Set while a confirmed password reset is waiting for the new password
    pub pending_password: bool,

    /// Profile data, present for agents only
    pub agent: Option<AgentProfile>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, unverified client
    pub fn new_client(email: String, password_hash: String) -> Self {
        Self::new(email, password_hash, UserType::Client, None)
    }

    /// Creates a new, unverified agent
    pub fn new_agent(email: String, password_hash: String, profile: AgentProfile) -> Self {
        Self::new(email, password_hash, UserType::Agent, Some(profile))
    }

    fn new(
        email: String,
        password_hash: String,
        user_type: UserType,
        agent: Option<AgentProfile>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            user_type,
            verified: false,
            pending_password: false,
            agent,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_agent(&self) -> bool {
        self.user_type == UserType::Agent
    }

    /// Maximum number of posts this user may publish
    pub fn max_posts(&self) -> usize {
        self.user_type.max_posts()
    }

    /// Marks the email as verified
    pub fn verify(&mut self) {
        self.verified = true;
        self.updated_at = Utc::now();
    }

    /// Applies a profile update and returns the avatar it replaced, if any.
    ///
    /// Returns `None` without touching anything when the user is not an agent.
    pub fn apply_profile_update(&mut self, update: AgentProfileUpdate) -> Option<ImageRef> {
        let profile = self.agent.as_mut()?;

        if let Some(firstname) = update.firstname {
            profile.firstname = firstname;
        }
        if let Some(lastname) = update.lastname {
            profile.lastname = lastname;
        }
        if let Some(bio) = update.bio {
            profile.bio = if bio.is_empty() { None } else { Some(bio) };
        }
        profile.phone = update.phone;

        let replaced = update
            .avatar
            .map(|avatar| std::mem::replace(&mut profile.avatar, avatar));

        self.updated_at = Utc::now();
        replaced
    }
}
