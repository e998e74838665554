//! Default address sanitizer
//!
//! Strips control and invisible formatting characters, folds whitespace runs
//! into single spaces and trims. Input over the configured length is rejected.

use std::fmt;

use super::Sanitizer;

/// Input longer than `max_length` characters
pub const E_QUERY_TOO_LONG: &str = "E_QUERY_TOO_LONG";

/// Sanitization failure, carried through to the client as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeError {
    message: String,
}

impl SanitizeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SanitizeError {}

#[derive(Debug, Clone)]
pub struct DefaultSanitizer {
    /// Maximum input length in characters, 0 disables the check
    max_length: usize,
}

impl DefaultSanitizer {
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Default for DefaultSanitizer {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Sanitizer for DefaultSanitizer {
    fn sanitize(&self, raw: &str) -> Result<String, SanitizeError> {
        if self.max_length > 0 && raw.chars().count() > self.max_length {
            return Err(SanitizeError::new(E_QUERY_TOO_LONG));
        }

        let mut clean = String::with_capacity(raw.len());
        let mut pending_space = false;

        for c in raw.chars() {
            let c = match c {
                '\n' | '\r' | '\t' => ' ',
                other => other,
            };
            if c.is_whitespace() {
                pending_space = !clean.is_empty();
                continue;
            }
            if c.is_control() || is_format_char(c) {
                continue;
            }
            if pending_space {
                clean.push(' ');
                pending_space = false;
            }
            clean.push(c);
        }

        Ok(clean)
    }
}

/// Zero-width, bidi and other invisible formatting code points
const fn is_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}
