use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use sigma_core::validation::parse_search_filter;
use sigma_core::{
    MailServiceTrait, PostRepository, SessionRepository, UserRepository, ValidationErrors,
};
use sigma_shared::Pagination;

use crate::dto::PostsEnvelope;
use crate::handlers::{error::invalid_query, handle_domain_error};
use crate::routes::AppState;

/// Raw query string of a search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// JSON encoded filters
    pub data: Option<String>,
    pub page: Option<String>,
}

/// Filters used when the query carries none
fn default_filters() -> Value {
    serde_json::json!({ "type": "sale" })
}

/// Decode the `data` parameter; `None` when it is not a JSON object with a
/// truthy `type`
fn decode_filters(data: Option<&str>) -> Option<Value> {
    let Some(data) = data.filter(|data| !data.is_empty()) else {
        return Some(default_filters());
    };
    let value: Value = serde_json::from_str(data).ok()?;
    value.get("type").filter(|post_type| is_truthy(post_type))?;
    Some(value)
}

/// `null`, `false`, `0` and `""` do not name a post type
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 1-based page, pages below 1 read as the first one
fn parse_page(page: Option<&str>) -> Result<Pagination, ValidationErrors> {
    match page.map(str::trim).filter(|page| !page.is_empty()) {
        None => Ok(Pagination::page(1)),
        Some(page) => page
            .parse::<i64>()
            .map(|page| Pagination::page(page.clamp(1, u32::MAX as i64) as u32))
            .map_err(|_| ValidationErrors::single("page", "Must be a number")),
    }
}

/// Handler for GET /api/search?data=<json>&page=N
///
/// `data` defaults to `{"type":"sale"}`. Pages hold 12 posts, newest first.
///
/// # Errors
///
/// - 400 Invalid query (undecodable `data` or no `type`)
/// - 400 Invalid or missing required parameters (filter fields)
pub async fn search<U, S, P, M>(
    state: web::Data<AppState<U, S, P, M>>,
    query: web::Query<SearchQuery>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PostRepository + 'static,
    M: MailServiceTrait + 'static,
{
    let Some(filters) = decode_filters(query.data.as_deref()) else {
        return invalid_query();
    };
    let pagination = match parse_page(query.page.as_deref()) {
        Ok(pagination) => pagination,
        Err(errors) => return handle_domain_error(errors.into()),
    };
    let filter = match parse_search_filter(&filters) {
        Ok(filter) => filter,
        Err(errors) => return handle_domain_error(errors.into()),
    };

    match state.post_service.search(&filter, pagination).await {
        Ok(posts) => HttpResponse::Ok().json(PostsEnvelope::from(posts)),
        Err(error) => handle_domain_error(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_filters() {
        assert_eq!(decode_filters(None), Some(default_filters()));
        assert_eq!(decode_filters(Some("")), Some(default_filters()));
        assert_eq!(
            decode_filters(Some(r#"{"type":"rent"}"#)),
            Some(serde_json::json!({ "type": "rent" }))
        );
        assert_eq!(decode_filters(Some("{type:")), None);
        assert_eq!(decode_filters(Some(r#"{"address":{}}"#)), None);
        assert_eq!(decode_filters(Some("[1,2]")), None);
    }

    #[test]
    fn test_decode_filters_rejects_falsy_type() {
        for data in [
            r#"{"type":null}"#,
            r#"{"type":false}"#,
            r#"{"type":""}"#,
            r#"{"type":0}"#,
        ] {
            assert_eq!(decode_filters(Some(data)), None, "{}", data);
        }
        assert!(decode_filters(Some(r#"{"type":"exchange"}"#)).is_some());
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None).unwrap().offset(), 0);
        assert_eq!(parse_page(Some("3")).unwrap().offset(), 24);
        assert_eq!(parse_page(Some("0")).unwrap().page, 1);
        assert_eq!(parse_page(Some("-4")).unwrap().page, 1);
        assert_eq!(parse_page(Some("two")).unwrap_err().errors()[0].field, "page");
    }
}
