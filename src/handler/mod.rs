//! Request handler module
//!
//! Routing, request extraction, address parsing and result formatting.

pub mod extract;
pub mod format;
pub mod parse;
pub mod router;

// Re-export main entry point
pub use format::{format_parsed, FormattedResult, OutputFormat};
pub use parse::{MultiParserHandler, ParserHandler};
pub use router::handle_request;
