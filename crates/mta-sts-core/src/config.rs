//! Policy limit configuration.

use serde::Deserialize;

/// Limits applied while parsing and building a policy
///
/// Age defaults follow RFC 8461 guidance: a week-long hard floor for
/// enforced policies, a day-long soft floor for testing policies, and a
/// hard ceiling of roughly one year.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Hard minimum age in seconds, applied to `enforce` policies and used
    /// as the fallback when `max_age` fails to parse (default: 604800)
    #[serde(default = "default_min_age")]
    pub min_age: u64,

    /// Soft minimum age in seconds, applied to `testing` policies
    /// (default: 86400)
    #[serde(default = "default_soft_min_age")]
    pub soft_min_age: u64,

    /// Hard maximum age in seconds (default: 31557600)
    #[serde(default = "default_max_age")]
    pub max_age: u64,

    /// Maximum accepted length of a single policy line in bytes; longer
    /// lines are rejected whole, not truncated (default: 1024)
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Maximum policy document size in bytes; response bodies beyond this
    /// are truncated (default: 65536)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

const fn default_min_age() -> u64 {
    604_800 // 1 week
}

const fn default_soft_min_age() -> u64 {
    86_400 // 1 day
}

const fn default_max_age() -> u64 {
    31_557_600 // 1 year
}

const fn default_max_line_length() -> usize {
    1024
}

const fn default_max_body_size() -> usize {
    65_536
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyConfig {
    /// Create a configuration with the RFC defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_age: default_min_age(),
            soft_min_age: default_soft_min_age(),
            max_age: default_max_age(),
            max_line_length: default_max_line_length(),
            max_body_size: default_max_body_size(),
        }
    }

    /// Set the hard minimum age
    #[must_use]
    pub const fn min_age(mut self, seconds: u64) -> Self {
        self.min_age = seconds;
        self
    }

    /// Set the soft minimum age
    #[must_use]
    pub const fn soft_min_age(mut self, seconds: u64) -> Self {
        self.soft_min_age = seconds;
        self
    }

    /// Set the hard maximum age
    #[must_use]
    pub const fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Set the maximum policy line length
    #[must_use]
    pub const fn max_line_length(mut self, bytes: usize) -> Self {
        self.max_line_length = bytes;
        self
    }

    /// Set the maximum policy document size
    #[must_use]
    pub const fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_ordered() {
        let config = PolicyConfig::default();
        assert!(config.soft_min_age < config.min_age);
        assert!(config.min_age < config.max_age);
    }

    #[test]
    fn test_builder_setters() {
        let config = PolicyConfig::new().min_age(10).soft_min_age(5).max_age(100);
        assert_eq!(config.min_age, 10);
        assert_eq!(config.soft_min_age, 5);
        assert_eq!(config.max_age, 100);
    }
}
