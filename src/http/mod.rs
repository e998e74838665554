//! HTTP protocol layer module
//!
//! Error value and response writers shared by every handler.

pub mod error;
pub mod response;

// Re-export commonly used types
pub use error::{HttpError, HttpResult, E_INSUFFICIENT_QUERY, E_INVALID_QUERY};
pub use response::{build_health_response, with_server_name, write_error, write_response};
