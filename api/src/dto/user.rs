use serde::Serialize;
use uuid::Uuid;

use sigma_core::{User, UserType};

/// Public representation of an account
///
/// Clients only expose their id and type; agents add their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(flatten)]
    pub profile: Option<AgentProfileDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfileDto {
    pub firstname: String,
    pub lastname: String,
    /// Avatar url
    pub avatar: String,
    pub phone: String,
    pub bio: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        let profile = match user.user_type {
            UserType::Agent => user.agent.as_ref().map(|agent| AgentProfileDto {
                firstname: agent.firstname.clone(),
                lastname: agent.lastname.clone(),
                avatar: agent.avatar.url.clone(),
                phone: agent.phone.clone(),
                bio: agent.bio.clone().unwrap_or_default(),
            }),
            UserType::Client => None,
        };

        Self {
            id: user.id,
            user_type: user.user_type,
            profile,
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_core::{AgentProfile, ImageRef};

    #[test]
    fn test_client_exposes_id_and_type() {
        let user = User::new_client("ana@example.com".to_string(), "hash".to_string());
        let json = serde_json::to_value(UserDto::from(&user)).unwrap();

        assert_eq!(json["type"], "client");
        assert_eq!(json["id"], user.id.to_string());
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_agent_profile_is_flattened() {
        let user = User::new_agent(
            "ana@example.com".to_string(),
            "hash".to_string(),
            AgentProfile {
                firstname: "Ana".to_string(),
                lastname: "Pérez".to_string(),
                phone: "+16502530000".to_string(),
                bio: None,
                avatar: ImageRef::new("/uploads/ana.png", 2048),
            },
        );
        let json = serde_json::to_value(UserDto::from(&user)).unwrap();

        assert_eq!(json["type"], "agent");
        assert_eq!(json["firstname"], "Ana");
        assert_eq!(json["avatar"], "/uploads/ana.png");
        assert_eq!(json["bio"], "");
        assert!(json.get("email").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
