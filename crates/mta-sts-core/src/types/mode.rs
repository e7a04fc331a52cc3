use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy enforcement mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// No enforcement; the policy carries no delivery requirements
    #[default]
    None,
    /// Report-only; MX matching always succeeds so delivery is never blocked
    Testing,
    /// TLS and MX mask matching must be enforced
    Enforce,
}

impl Mode {
    /// Parse a wire-format mode string, case-insensitively
    ///
    /// Returns `None` for unrecognized strings; callers fall back to
    /// [`Mode::None`] per RFC 8461 rather than rejecting the document.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "testing" => Some(Self::Testing),
            "enforce" => Some(Self::Enforce),
            _ => None,
        }
    }

    /// Wire-format string for this mode
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Testing => "testing",
            Self::Enforce => "enforce",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
