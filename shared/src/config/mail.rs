//! Outgoing mail configuration

use serde::{Deserialize, Serialize};

/// Mail delivery backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Write messages to the log instead of delivering them
    Log,
    /// Deliver through an HTTP mail relay
    Http,
}

impl std::str::FromStr for MailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" | "mock" => Ok(MailProvider::Log),
            "http" | "relay" => Ok(MailProvider::Http),
            _ => Err(format!("Invalid mail provider: {}", s)),
        }
    }
}

/// Mail configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Delivery backend
    pub provider: MailProvider,

    /// Sender mailbox, rendered as `Sigma <user>`
    pub user: String,

    /// Relay endpoint for the HTTP provider
    #[serde(default)]
    pub api_url: Option<String>,

    /// Relay API key for the HTTP provider
    #[serde(default)]
    pub api_key: Option<String>,

    /// Public origin used to build verification links
    pub origin: String,

    /// Maximum delivery attempts
    pub max_retries: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Log,
            user: String::from("no-reply@sigma.local"),
            api_url: None,
            api_key: None,
            origin: String::from("http://localhost:3000"),
            max_retries: 3,
            request_timeout_secs: 30,
        }
    }
}

impl MailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("MAIL_PROVIDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider),
            user: std::env::var("MAIL_USER").unwrap_or(defaults.user),
            api_url: std::env::var("MAIL_API_URL").ok(),
            api_key: std::env::var("MAIL_API_KEY").ok(),
            origin: std::env::var("APP_ORIGIN").unwrap_or(defaults.origin),
            max_retries: std::env::var("MAIL_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            request_timeout_secs: defaults.request_timeout_secs,
        }
    }

    /// The `From` header value
    pub fn sender(&self) -> String {
        format!("Sigma <{}>", self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_format() {
        let config = MailConfig {
            user: "mail@sigma.cu".to_string(),
            ..Default::default()
        };
        assert_eq!(config.sender(), "Sigma <mail@sigma.cu>");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("http".parse::<MailProvider>().unwrap(), MailProvider::Http);
        assert_eq!("LOG".parse::<MailProvider>().unwrap(), MailProvider::Log);
        assert!("smtp".parse::<MailProvider>().is_err());
    }
}
