//! Log mail service for development
//!
//! Messages are written to the log instead of being delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sigma_shared::utils::masking::mask_email;

use super::MailMessage;
use crate::InfrastructureError;

#[derive(Clone)]
pub struct LogMailService {
    sender: String,
    /// Number of messages written so far
    message_count: Arc<AtomicU64>,
}

impl LogMailService {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message_count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub async fn send(&self, message: &MailMessage) -> Result<(), InfrastructureError> {
        self.message_count.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            to = %mask_email(&message.to),
            subject = %message.subject,
            event = "mail_logged",
            "Mail not delivered (log provider)"
        );
        Ok(())
    }
}
