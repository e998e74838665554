//! Address parsing collaborators
//!
//! The parsing engine and the sanitizer are black boxes to the rest of the
//! service. Handlers only see these two traits, so a native engine, a remote
//! one or a test double can sit behind them.

mod sanitize;

#[cfg(feature = "libpostal")]
mod libpostal;

pub use sanitize::{DefaultSanitizer, SanitizeError, E_QUERY_TOO_LONG};

#[cfg(feature = "libpostal")]
pub use libpostal::LibpostalParser;

use serde::{Deserialize, Serialize};

/// One labeled fragment of a parsed address, in engine emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedComponent {
    pub label: String,
    pub value: String,
}

impl ParsedComponent {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Address parsing engine
///
/// Implementations must be callable from several requests at once.
pub trait AddressParser: Send + Sync {
    /// Split `address` into labeled components, preserving engine order.
    ///
    /// Never called with an empty string.
    fn parse_address(&self, address: &str) -> Vec<ParsedComponent>;
}

/// Free-text address normalization applied before parsing
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, raw: &str) -> Result<String, SanitizeError>;
}
