//! MySQL implementations of the core repository traits.

mod post_repository_impl;
mod session_repository_impl;
mod user_repository_impl;

pub use post_repository_impl::MySqlPostRepository;
pub use session_repository_impl::MySqlSessionRepository;
pub use user_repository_impl::MySqlUserRepository;

#[cfg(test)]
pub(crate) use post_repository_impl::search_query;

use std::str::FromStr;

use sigma_core::DomainError;
use uuid::Uuid;

/// Map a failed query to an internal error, logging the cause
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        DomainError::internal(format!("{}: {}", context, e))
    }
}

/// Ids are stored as `CHAR(36)`
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::internal(format!("Invalid UUID: {}", e)))
}

/// Decode an enum stored as text
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e| DomainError::internal(format!("Invalid {} column: {}", column, e)))
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
