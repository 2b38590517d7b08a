//! Unit tests for the token service

use uuid::Uuid;

use crate::domain::entities::{Session, TokenKind, VerificationCode};
use crate::domain::value_objects::DeviceInfo;
use crate::errors::{DomainError, TokenError};
use crate::services::token::{TokenService, TokenServiceConfig};

fn service() -> TokenService {
    TokenService::new(TokenServiceConfig::default())
}

#[test]
fn test_access_token_round_trip() {
    let service = service();
    let user_id = Uuid::new_v4();

    let token = service.generate_access_token(user_id).unwrap();
    let claims = service.verify_access_token(&token).unwrap();

    assert_eq!(claims.user_id(), Some(user_id));
    assert_eq!(claims.iss, "sigma");
    assert_eq!(claims.exp - claims.iat, 600);
}

#[test]
fn test_refresh_token_carries_session() {
    let service = service();
    let session = Session::new(Uuid::new_v4(), DeviceInfo::default());

    let token = service.generate_refresh_token(&session).unwrap();
    let claims = service.verify_refresh_token(&token).unwrap();

    assert_eq!(claims.user_id(), Some(session.user_id));
    assert_eq!(claims.record_id(), Some(session.id));
    assert_eq!(claims.code, session.code);
}

#[test]
fn test_keys_are_not_interchangeable() {
    let service = service();
    let session = Session::new(Uuid::new_v4(), DeviceInfo::default());
    let refresh = service.generate_refresh_token(&session).unwrap();
    let verification = service
        .generate_verification_token(&VerificationCode::new(session.user_id))
        .unwrap();

    assert_eq!(
        service.verify_access_token(&refresh).unwrap_err(),
        DomainError::Token(TokenError::Invalid(TokenKind::Access))
    );
    assert_eq!(
        service.verify_refresh_token(&verification).unwrap_err(),
        DomainError::Token(TokenError::Invalid(TokenKind::Refresh))
    );
}

#[test]
fn test_expired_token() {
    let config = TokenServiceConfig {
        refresh_token_expiry: -60,
        ..TokenServiceConfig::default()
    };
    let service = TokenService::new(config);
    let session = Session::new(Uuid::new_v4(), DeviceInfo::default());
    let token = service.generate_refresh_token(&session).unwrap();

    assert_eq!(
        service.verify_refresh_token(&token).unwrap_err(),
        DomainError::Token(TokenError::Expired(TokenKind::Refresh))
    );
}

#[test]
fn test_malformed_token() {
    assert_eq!(
        service().verify_verification_token("not-a-jwt").unwrap_err(),
        DomainError::Token(TokenError::Invalid(TokenKind::Verification))
    );
}

#[test]
fn test_foreign_issuer_is_rejected() {
    let foreign = TokenService::new(TokenServiceConfig {
        issuer: "someone-else".to_string(),
        ..TokenServiceConfig::default()
    });
    let token = foreign.generate_access_token(Uuid::new_v4()).unwrap();
    assert!(service().verify_access_token(&token).is_err());
}
