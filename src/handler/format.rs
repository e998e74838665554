//! Response formatting
//!
//! Turns the parser's ordered (label, value) pairs into the grouped
//! `{label: [values...]}` shape.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::postal::ParsedComponent;

/// Output shape selected by the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Raw component list in parser order
    Components,
    /// Components grouped by label
    Keys,
}

impl OutputFormat {
    /// `keys` selects grouping, anything else (or nothing) the raw list
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("keys") => Self::Keys,
            _ => Self::Components,
        }
    }
}

/// Label to values multi-map
///
/// Labels keep first-seen order and values keep encounter order within a
/// label. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedResult {
    entries: Vec<(String, Vec<String>)>,
}

impl FormattedResult {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append `value` under `label`, creating the label on first sight
    pub fn push(&mut self, label: &str, value: &str) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .entries
                .push((label.to_string(), vec![value.to_string()])),
        }
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, values)| values.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FormattedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, values) in &self.entries {
            map.serialize_entry(label, values)?;
        }
        map.end()
    }
}

/// Group parsed components by label
pub fn format_parsed(parsed: &[ParsedComponent]) -> FormattedResult {
    let mut rsp = FormattedResult::new();
    for component in parsed {
        rsp.push(&component.label, &component.value);
    }
    rsp
}
