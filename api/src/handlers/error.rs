//! Mapping of domain errors to HTTP responses
//!
//! Every error body is an [`ErrorResponse`]: a stable `error` code, a
//! human readable `message` and optional `details`.

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};

use sigma_core::errors::{AuthError, DomainError, PostError, TokenError};
use sigma_core::TokenKind;
use sigma_shared::{error_codes, ErrorResponse};

pub const INVALID_JSON_BODY: &str = "Invalid JSON body";
pub const INVALID_QUERY: &str = "Invalid query";
pub const INVALID_PARAMETERS: &str = "Invalid or missing required parameters";
pub const FILE_TOO_LARGE: &str = "File exceeds the maximum allowed size";
pub const INVALID_REFRESH_TOKEN: &str = "Invalid or missing refresh token";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const UNEXPECTED_ERROR: &str = "An unexpected error ocurred";

fn respond(status: StatusCode, body: ErrorResponse) -> HttpResponse {
    HttpResponse::build(status).json(body)
}

fn simple(status: StatusCode, code: &str, message: impl Into<String>) -> HttpResponse {
    respond(status, ErrorResponse::new(code, message))
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Validation(errors) => {
            tracing::debug!(fields = errors.errors().len(), "Request failed validation");
            respond(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(error_codes::VALIDATION_ERROR, INVALID_PARAMETERS)
                    .add_detail("fields", errors.errors()),
            )
        }
        DomainError::FileTooLarge { index } => {
            let mut body = ErrorResponse::new(error_codes::MAX_FILE_SIZE, FILE_TOO_LARGE);
            if let Some(index) = index {
                body = body.add_detail("index", index);
            }
            respond(StatusCode::BAD_REQUEST, body)
        }
        DomainError::NotFound { resource } => simple(
            StatusCode::NOT_FOUND,
            error_codes::NOT_FOUND,
            format!("{} not found", resource),
        ),
        DomainError::Auth(auth_error) => handle_auth_error(auth_error),
        DomainError::Token(token_error) => handle_token_error(token_error),
        DomainError::Post(post_error) => handle_post_error(post_error),
        DomainError::Internal { message } => {
            tracing::error!(error = %message, event = "internal_error", "Request failed");
            internal_error()
        }
    }
}

fn handle_auth_error(error: AuthError) -> HttpResponse {
    let message = error.to_string();
    match error {
        AuthError::UserNotFound => simple(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, message),
        AuthError::UserAlreadyExists | AuthError::AlreadyVerified => {
            simple(StatusCode::CONFLICT, error_codes::CONFLICT, message)
        }
        AuthError::InvalidCredentials => {
            simple(StatusCode::UNAUTHORIZED, error_codes::BAD_CREDENTIALS, message)
        }
        AuthError::PasswordCodeRejected | AuthError::PasswordResetRejected => {
            simple(StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED, message)
        }
        AuthError::NotAnAgent => simple(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, message),
    }
}

fn handle_token_error(error: TokenError) -> HttpResponse {
    match error {
        TokenError::Missing(TokenKind::Refresh) | TokenError::Invalid(TokenKind::Refresh) => simple(
            StatusCode::BAD_REQUEST,
            error_codes::TOKEN_INVALID,
            INVALID_REFRESH_TOKEN,
        ),
        TokenError::Missing(_) => {
            simple(StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED, UNAUTHORIZED)
        }
        TokenError::Invalid(_) => simple(
            StatusCode::UNAUTHORIZED,
            error_codes::TOKEN_INVALID,
            error.to_string(),
        ),
        TokenError::Expired(_) => simple(
            StatusCode::UNAUTHORIZED,
            error_codes::TOKEN_EXPIRED,
            error.to_string(),
        ),
        TokenError::GenerationFailed => {
            tracing::error!(event = "token_generation_failed", "Failed to sign a token");
            internal_error()
        }
    }
}

fn handle_post_error(error: PostError) -> HttpResponse {
    let message = error.to_string();
    match error {
        PostError::NotFound => simple(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, message),
        PostError::NotAuthor => simple(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, message),
        PostError::MaxPostLength { limit } => respond(
            StatusCode::FORBIDDEN,
            ErrorResponse::new(error_codes::MAX_POST_LENGTH, message).add_detail("limit", limit),
        ),
        PostError::TypeMismatch => {
            simple(StatusCode::BAD_REQUEST, error_codes::BAD_REQUEST, message)
        }
    }
}

fn internal_error() -> HttpResponse {
    simple(
        StatusCode::INTERNAL_SERVER_ERROR,
        error_codes::INTERNAL_ERROR,
        UNEXPECTED_ERROR,
    )
}

/// 400 for a body that is not valid JSON
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request body");
    let response = simple(
        StatusCode::BAD_REQUEST,
        error_codes::INVALID_BODY,
        INVALID_JSON_BODY,
    );
    InternalError::from_response(err, response).into()
}

/// 400 for a search query whose `data` parameter is not JSON
pub fn invalid_query() -> HttpResponse {
    simple(StatusCode::BAD_REQUEST, error_codes::INVALID_QUERY, INVALID_QUERY)
}

/// JSON 404 for unknown routes
pub async fn not_found() -> HttpResponse {
    simple(
        StatusCode::NOT_FOUND,
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use sigma_core::ValidationErrors;

    async fn body_of(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_validation_errors_carry_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Invalid email");
        errors.add("repassword", "Passwords do not match");

        let response = handle_domain_error(errors.into());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], INVALID_PARAMETERS);
        assert_eq!(body["details"]["fields"][1]["field"], "repassword");
        assert_eq!(body["details"]["fields"][1]["message"], "Passwords do not match");
    }

    #[actix_rt::test]
    async fn test_file_too_large_carries_index() {
        let response = handle_domain_error(DomainError::FileTooLarge { index: Some(3) });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["details"]["index"], 3);

        let body = body_of(handle_domain_error(DomainError::FileTooLarge { index: None })).await;
        assert!(body.get("details").is_none());
    }

    #[actix_rt::test]
    async fn test_refresh_token_errors() {
        let response = handle_domain_error(TokenError::Invalid(TokenKind::Refresh).into());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await["message"], INVALID_REFRESH_TOKEN);

        let response = handle_domain_error(TokenError::Expired(TokenKind::Refresh).into());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await["message"], "The refresh token has expired");
    }

    #[actix_rt::test]
    async fn test_access_token_errors() {
        let response = handle_domain_error(TokenError::Missing(TokenKind::Access).into());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await["message"], UNAUTHORIZED);

        let response = handle_domain_error(TokenError::Invalid(TokenKind::Access).into());
        assert_eq!(body_of(response).await["message"], "Invalid access token");

        let response = handle_domain_error(TokenError::Expired(TokenKind::Access).into());
        assert_eq!(body_of(response).await["message"], "The access token has expired");
    }

    #[test]
    fn test_status_codes() {
        let cases: Vec<(DomainError, StatusCode)> = vec![
            (AuthError::UserAlreadyExists.into(), StatusCode::CONFLICT),
            (AuthError::AlreadyVerified.into(), StatusCode::CONFLICT),
            (AuthError::UserNotFound.into(), StatusCode::NOT_FOUND),
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::PasswordCodeRejected.into(), StatusCode::UNAUTHORIZED),
            (AuthError::PasswordResetRejected.into(), StatusCode::UNAUTHORIZED),
            (AuthError::NotAnAgent.into(), StatusCode::FORBIDDEN),
            (PostError::NotFound.into(), StatusCode::NOT_FOUND),
            (PostError::NotAuthor.into(), StatusCode::FORBIDDEN),
            (PostError::MaxPostLength { limit: 1 }.into(), StatusCode::FORBIDDEN),
            (PostError::TypeMismatch.into(), StatusCode::BAD_REQUEST),
            (DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
            (TokenError::GenerationFailed.into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(handle_domain_error(error.clone()).status(), status, "{:?}", error);
        }
    }

    #[actix_rt::test]
    async fn test_internal_errors_hide_details() {
        let body = body_of(handle_domain_error(DomainError::internal("pool timed out"))).await;
        assert_eq!(body["message"], UNEXPECTED_ERROR);
        assert!(!body.to_string().contains("pool timed out"));
    }
}
