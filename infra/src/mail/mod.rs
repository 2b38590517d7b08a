//! Mail Service Module
//!
//! Delivers the two transactional messages the backend sends: the account
//! verification link and the password reset code.
//!
//! - **Log**: writes a line per message instead of delivering it, for
//!   development
//! - **HTTP relay**: JSON POST to a mail relay with retries
//!
//! Recipients are masked in every log line.

use async_trait::async_trait;
use serde::Serialize;

use sigma_core::MailServiceTrait;
use sigma_shared::config::{MailConfig, MailProvider};

pub mod http;
pub mod log;

pub use http::{HttpMailConfig, HttpMailService};
pub use log::LogMailService;

#[cfg(test)]
mod tests;

/// A rendered message, ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl MailMessage {
    pub fn verification(from: &str, to: &str, link: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Complete your account verification".to_string(),
            html: format!(
                "<p>Welcome to Sigma!</p>\
                 <p>Confirm your email address to activate your account:</p>\
                 <p><a href=\"{link}\">{link}</a></p>\
                 <p>The link expires in 5 minutes.</p>",
                link = link
            ),
        }
    }

    pub fn password_code(from: &str, to: &str, code: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Password reset".to_string(),
            html: format!(
                "<p>Use this code to reset your Sigma password:</p>\
                 <h2>{}</h2>\
                 <p>The code expires in 2 minutes. If you did not ask for it, ignore this email.</p>",
                code
            ),
        }
    }
}

/// The configured mail backend
pub enum MailService {
    Log(LogMailService),
    Http(HttpMailService),
}

impl MailService {
    pub fn provider_name(&self) -> &'static str {
        match self {
            MailService::Log(_) => "log",
            MailService::Http(_) => "http",
        }
    }

    async fn deliver(&self, message: MailMessage) -> Result<(), String> {
        let result = match self {
            MailService::Log(service) => service.send(&message).await,
            MailService::Http(service) => service.send(&message).await,
        };
        result.map_err(|e| e.to_string())
    }

    fn sender(&self) -> &str {
        match self {
            MailService::Log(service) => service.sender(),
            MailService::Http(service) => service.sender(),
        }
    }
}

#[async_trait]
impl MailServiceTrait for MailService {
    async fn send_verification_link(&self, to: &str, link: &str) -> Result<(), String> {
        self.deliver(MailMessage::verification(self.sender(), to, link))
            .await
    }

    async fn send_password_code(&self, to: &str, code: &str) -> Result<(), String> {
        self.deliver(MailMessage::password_code(self.sender(), to, code))
            .await
    }
}

/// Create the mail service selected by the configuration
///
/// An HTTP relay without endpoint or key falls back to the log backend.
pub fn create_mail_service(config: &MailConfig) -> MailService {
    match config.provider {
        MailProvider::Log => MailService::Log(LogMailService::new(config.sender())),
        MailProvider::Http => match HttpMailConfig::from_mail_config(config)
            .and_then(HttpMailService::new)
        {
            Ok(service) => MailService::Http(service),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize HTTP mail service");
                tracing::warn!("Falling back to log mail service");
                MailService::Log(LogMailService::new(config.sender()))
            }
        },
    }
}
