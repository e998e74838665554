// Test doubles for the parser, sanitizer and logger seams

use std::sync::Mutex;

use crate::logger::StatusLogger;
use crate::postal::{AddressParser, ParsedComponent};

/// Returns the same components for every address and records each call
pub struct FakeParser {
    components: Vec<ParsedComponent>,
    calls: Mutex<Vec<String>>,
}

impl FakeParser {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            components: pairs
                .iter()
                .map(|(label, value)| ParsedComponent::new(*label, *value))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fixture used across handler tests
    pub fn chicago() -> Self {
        Self::new(&[("city", "Chicago"), ("street", "Main"), ("city", "Loop")])
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl AddressParser for FakeParser {
    fn parse_address(&self, address: &str) -> Vec<ParsedComponent> {
        assert!(!address.is_empty(), "parser must not see empty input");
        self.calls.lock().unwrap().push(address.to_string());
        self.components.clone()
    }
}

/// Echoes the address back as a single `road` component
pub struct EchoParser;

impl AddressParser for EchoParser {
    fn parse_address(&self, address: &str) -> Vec<ParsedComponent> {
        vec![ParsedComponent::new("road", address)]
    }
}

pub struct PanickingParser;

impl AddressParser for PanickingParser {
    fn parse_address(&self, _address: &str) -> Vec<ParsedComponent> {
        panic!("engine crashed");
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl StatusLogger for RecordingLogger {
    fn status(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}
