//! HTTP mail relay
//!
//! Posts every message as JSON to a relay endpoint, authenticated with a
//! bearer key.
//!
//! ## Features
//!
//! - Retries with exponential backoff on rate limiting, server errors and
//!   network failures
//! - No retry on other client errors
//! - Recipients masked in logs

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use sigma_shared::utils::masking::mask_email;
use sigma_shared::MailConfig;

use super::MailMessage;
use crate::InfrastructureError;

/// HTTP relay configuration
#[derive(Debug, Clone)]
pub struct HttpMailConfig {
    /// Relay endpoint receiving the JSON messages
    pub api_url: String,
    /// Bearer key
    pub api_key: String,
    /// `From` header value
    pub sender: String,
    /// Maximum delivery attempts
    pub max_retries: u32,
    /// Delay before the first retry, doubled after every failure
    pub retry_delay_ms: u64,
    /// Timeout for relay requests in seconds
    pub request_timeout_secs: u64,
}

impl HttpMailConfig {
    pub fn from_mail_config(config: &MailConfig) -> Result<Self, InfrastructureError> {
        let api_url = config
            .api_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| InfrastructureError::Config("MAIL_API_URL not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| InfrastructureError::Config("MAIL_API_KEY not set".to_string()))?;

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(InfrastructureError::Config(
                "MAIL_API_URL must be an http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_key,
            sender: config.sender(),
            max_retries: config.max_retries.max(1),
            retry_delay_ms: 1000,
            request_timeout_secs: config.request_timeout_secs,
        })
    }
}

/// Mail delivery through an HTTP relay
pub struct HttpMailService {
    client: Client,
    config: HttpMailConfig,
}

impl HttpMailService {
    pub fn new(config: HttpMailConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(api_url = %config.api_url, "HTTP mail service initialized");
        Ok(Self { client, config })
    }

    pub fn sender(&self) -> &str {
        &self.config.sender
    }

    pub async fn send(&self, message: &MailMessage) -> Result<(), InfrastructureError> {
        info!(
            to = %mask_email(&message.to),
            subject = %message.subject,
            "Sending mail via HTTP relay"
        );
        self.send_with_retry(message).await
    }

    /// Send with retry logic
    async fn send_with_retry(&self, message: &MailMessage) -> Result<(), InfrastructureError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                "Sending mail attempt {}/{} to {}",
                attempts,
                self.config.max_retries,
                mask_email(&message.to)
            );

            let failure = match self
                .client
                .post(&self.config.api_url)
                .bearer_auth(&self.config.api_key)
                .json(message)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    info!(
                        to = %mask_email(&message.to),
                        event = "mail_sent",
                        "Mail delivered to relay"
                    );
                    return Ok(());
                }
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable(status) {
                        error!(status = %status, "Mail relay rejected the message");
                        return Err(InfrastructureError::Mail(format!(
                            "Relay rejected the message: {}",
                            status
                        )));
                    }
                    format!("relay answered {}", status)
                }
                Err(e) => e.to_string(),
            };

            error!(
                "Failed to send mail (attempt {}/{}): {}",
                attempts, self.config.max_retries, failure
            );
            if attempts >= self.config.max_retries {
                return Err(InfrastructureError::Mail(format!(
                    "Failed to send mail after {} attempts: {}",
                    attempts, failure
                )));
            }

            warn!("Retrying mail delivery after {:?}", delay);
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

/// Rate limiting and server errors are worth another attempt
pub(crate) fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
