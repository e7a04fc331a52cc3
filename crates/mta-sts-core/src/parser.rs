//! Policy document line parser.
//!
//! Splits a raw policy document into `key: value` pairs, enforcing the
//! per-line length limit. Malformed input never fails the caller: defective
//! lines are dropped and recorded on the [`Validation`] accumulator, and all
//! otherwise-valid pairs are preserved.

use crate::config::PolicyConfig;
use crate::validator::Validation;

/// A single `key: value` line from a policy document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    key: String,
    value: String,
}

impl Pair {
    /// Parse a line into a pair, requiring a colon separator and non-empty
    /// trimmed key and value
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let (key, value) = line.split_once(':')?;
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() || value.is_empty() {
            return None;
        }

        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// The pair key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The pair value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Split a policy document into valid pairs
///
/// Lines are CRLF-separated. A line longer than the configured maximum is
/// rejected whole (recorded as an error, not truncated mid-line); a line
/// without a valid `key: value` shape is dropped with an error. Blank lines
/// are skipped silently.
#[must_use]
pub fn parse_pairs(body: &str, config: &PolicyConfig, validation: &mut Validation) -> Vec<Pair> {
    let mut pairs = Vec::new();

    for line in body.split("\r\n") {
        if line.is_empty() {
            continue;
        }

        if line.len() > config.max_line_length {
            validation.add_error(format!(
                "Policy line over {} bytes rejected",
                config.max_line_length
            ));
            continue;
        }

        match Pair::parse(line) {
            Some(pair) => pairs.push(pair),
            None => validation.add_error(format!("Malformed policy line: {line:?}")),
        }
    }

    pairs
}
