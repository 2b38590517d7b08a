//! Type definitions shared by the api and core crates
//!
//! - `pagination` - Page/offset arithmetic for list endpoints
//! - `response` - Small acknowledgement and health envelopes

pub mod pagination;
pub mod response;

pub use pagination::Pagination;
pub use response::{HealthResponse, OkResponse, SuccessResponse};
