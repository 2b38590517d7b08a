//! Tests for provider selection and message rendering

use sigma_core::MailServiceTrait;
use sigma_shared::config::{MailConfig, MailProvider};

use crate::mail::{create_mail_service, LogMailService, MailMessage, MailService};

#[test]
fn test_log_provider_by_default() {
    let service = create_mail_service(&MailConfig::default());
    assert_eq!(service.provider_name(), "log");
}

#[test]
fn test_http_provider_without_endpoint_falls_back_to_log() {
    let config = MailConfig {
        provider: MailProvider::Http,
        ..MailConfig::default()
    };
    assert_eq!(create_mail_service(&config).provider_name(), "log");
}

#[test]
fn test_http_provider() {
    let config = MailConfig {
        provider: MailProvider::Http,
        api_url: Some("https://relay.local/send".to_string()),
        api_key: Some("key".to_string()),
        ..MailConfig::default()
    };
    assert_eq!(create_mail_service(&config).provider_name(), "http");
}

#[tokio::test]
async fn test_log_service_counts_messages() {
    let log = LogMailService::new("Sigma <mail@sigma.cu>");
    let service = MailService::Log(log.clone());

    service
        .send_verification_link("ana@example.com", "http://localhost:3000/api/auth/verify/abc")
        .await
        .unwrap();
    service
        .send_password_code("ana@example.com", "123456")
        .await
        .unwrap();

    assert_eq!(log.message_count(), 2);
}

#[test]
fn test_messages() {
    let link = "http://localhost:3000/api/auth/verify/abc";
    let verification = MailMessage::verification("Sigma <mail@sigma.cu>", "ana@example.com", link);
    assert_eq!(verification.subject, "Complete your account verification");
    assert!(verification.html.contains(&format!("href=\"{}\"", link)));
    assert_eq!(verification.from, "Sigma <mail@sigma.cu>");

    let code = MailMessage::password_code("Sigma <mail@sigma.cu>", "ana@example.com", "042917");
    assert_eq!(code.subject, "Password reset");
    assert!(code.html.contains("042917"));
}
