use serde::{Deserialize, Serialize};
use std::fmt;

/// The DNS-advertised identity of a policy generation
///
/// Pairs a mail domain with the `id` token from its `_mta-sts` TXT record.
/// Two records describe the same policy generation iff both fields are
/// equal; a changed `id` signals that the HTTPS policy must be re-fetched.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    domain: String,
    id: String,
}

impl Record {
    /// Create a record from a domain and an already-extracted id token
    #[must_use]
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            id: id.into(),
        }
    }

    /// Create a record from the raw DNS TXT value
    ///
    /// Extracts the token from an `id=<token>` field of a
    /// `v=STSv1; id=<token>;` string. Surrounding quotes are tolerated. A
    /// missing `id` field yields an empty token, which never matches a
    /// cached policy.
    #[must_use]
    pub fn from_txt(domain: impl Into<String>, txt: &str) -> Self {
        let id = txt
            .trim_matches('"')
            .split(';')
            .filter_map(|field| field.trim().strip_prefix("id="))
            .map(str::trim)
            .next()
            .unwrap_or_default();

        Self::new(domain, id)
    }

    /// The mail domain
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The opaque policy id token
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rebuild the TXT-record form of this identity
    #[must_use]
    pub fn txt(&self) -> String {
        format!("v=STSv1; id={};", self.id)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.domain, self.txt())
    }
}
