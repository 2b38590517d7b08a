//! Outgoing mail

use async_trait::async_trait;

/// Trait for transactional mail delivery
#[async_trait]
pub trait MailServiceTrait: Send + Sync {
    /// Send the account verification link
    async fn send_verification_link(&self, to: &str, link: &str) -> Result<(), String>;
    /// Send a password reset code
    async fn send_password_code(&self, to: &str, code: &str) -> Result<(), String>;
}

#[cfg(any(test, feature = "testing"))]
pub use mock::{MockMailService, SentMail};

#[cfg(any(test, feature = "testing"))]
mod mock {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::MailServiceTrait;

    /// Polls made while waiting for a background delivery, 5ms apart
    const WAIT_POLLS: usize = 200;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentMail {
        VerificationLink { to: String, link: String },
        PasswordCode { to: String, code: String },
    }

    /// Records every message instead of sending it
    #[derive(Clone, Default)]
    pub struct MockMailService {
        sent: Arc<Mutex<Vec<SentMail>>>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockMailService {
        pub fn new() -> Self {
            Self::default()
        }

        /// A mail service whose every delivery fails
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// A mail service that takes `delay` to deliver each message
        pub fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<SentMail> {
            self.sent.lock().unwrap().clone()
        }

        /// The last password code sent to `to`
        pub fn last_code(&self, to: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|mail| match mail {
                SentMail::PasswordCode { to: t, code } if t == to => Some(code),
                _ => None,
            })
        }

        /// Wait for the background delivery of at least `count` messages
        pub async fn wait_for_sent(&self, count: usize) -> Vec<SentMail> {
            for _ in 0..WAIT_POLLS {
                let sent = self.sent();
                if sent.len() >= count {
                    return sent;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            self.sent()
        }

        /// Wait for the verification link sent to `to`
        pub async fn wait_for_link(&self, to: &str) -> Option<String> {
            self.wait_for_links(to, 1).await.pop()
        }

        /// Wait until `count` verification links were sent to `to`, oldest first
        pub async fn wait_for_links(&self, to: &str, count: usize) -> Vec<String> {
            for _ in 0..WAIT_POLLS {
                let links = self.links(to);
                if links.len() >= count {
                    return links;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            self.links(to)
        }

        /// Wait for the password code sent to `to`
        pub async fn wait_for_code(&self, to: &str) -> Option<String> {
            for _ in 0..WAIT_POLLS {
                if let Some(code) = self.last_code(to) {
                    return Some(code);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            None
        }

        fn links(&self, to: &str) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|mail| match mail {
                    SentMail::VerificationLink { to: t, link } if t == to => Some(link),
                    _ => None,
                })
                .collect()
        }

        async fn deliver(&self, mail: SentMail) -> Result<(), String> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.record(mail)
        }

        fn record(&self, mail: SentMail) -> Result<(), String> {
            if self.fail {
                return Err("mail relay unavailable".to_string());
            }
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }

    #[async_trait]
    impl MailServiceTrait for MockMailService {
        async fn send_verification_link(&self, to: &str, link: &str) -> Result<(), String> {
            self.deliver(SentMail::VerificationLink {
                to: to.to_string(),
                link: link.to_string(),
            })
            .await
        }

        async fn send_password_code(&self, to: &str, code: &str) -> Result<(), String> {
            self.deliver(SentMail::PasswordCode {
                to: to.to_string(),
                code: code.to_string(),
            })
            .await
        }
    }
}
