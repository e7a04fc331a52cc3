//! Domain-keyed policy cache.

use dashmap::DashMap;
use mta_sts_core::{Policy, Record};
use tracing::debug;

/// Concurrent cache of one live policy per domain
///
/// Backed by a `DashMap`, so lookups for unrelated domains never contend
/// and replacing an entry is atomic per key. Entries are superseded by the
/// next successful fetch, never proactively evicted; staleness is judged
/// lazily on lookup via [`is_stale`](Self::is_stale).
#[derive(Debug, Default)]
pub struct PolicyCache {
    entries: DashMap<String, Policy>,
}

impl PolicyCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached policy for a domain
    ///
    /// The returned policy carries the `cached` flag so observers can tell
    /// a cache hit from a fresh fetch.
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<Policy> {
        self.entries.get(domain).map(|entry| {
            let mut policy = entry.clone();
            policy.set_cached(true);
            policy
        })
    }

    /// Store or replace the policy for a domain
    pub fn put(&self, domain: impl Into<String>, policy: Policy) {
        let domain = domain.into();
        debug!(domain, "caching policy");
        self.entries.insert(domain, policy);
    }

    /// Decide whether a cached policy must be re-fetched
    ///
    /// Stale iff the policy's freshness window has passed, or the DNS
    /// identity advertised now differs from the one captured at fetch
    /// time. A policy without an embedded record can never be matched
    /// against the fresh record and counts as stale.
    #[must_use]
    pub fn is_stale(cached: &Policy, fresh: &Record) -> bool {
        if cached.is_expired() {
            return true;
        }

        cached
            .record()
            .map_or(true, |captured| captured.id() != fresh.id())
    }

    /// Number of cached domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mta_sts_core::{PolicyConfig, PolicyResponse};

    const VALID_BODY: &str =
        "version: STSv1\r\nmode: enforce\r\nmx: *.example.com\r\nmax_age: 86400\r\n";

    fn config() -> PolicyConfig {
        PolicyConfig::new().min_age(86_400)
    }

    fn fresh_policy(id: &str) -> Policy {
        let record = Record::new("example.com", id);
        let response = PolicyResponse::new(200, "OK")
            .with_handshake(true)
            .with_body(VALID_BODY);
        Policy::from_response(record, &response, &config())
    }

    fn expired_policy(id: &str) -> Policy {
        let extended = format!(
            "version: STSv1\r\nmode: enforce\r\nmx: *.example.com\r\nmax_age: 86400\r\n\
             fetch_time: 1000\r\ndomain: example.com\r\nrecord_id: {id}\r\n"
        );
        Policy::from_cache_string(&extended, &config()).expect("well-formed")
    }

    #[test]
    fn test_get_miss() {
        let cache = PolicyCache::new();
        assert!(cache.get("example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_and_get_sets_cached_flag() {
        let cache = PolicyCache::new();
        cache.put("example.com", fresh_policy("1"));

        let served = cache.get("example.com").expect("cached");
        assert!(served.is_cached());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_entry() {
        let cache = PolicyCache::new();
        cache.put("example.com", fresh_policy("1"));
        cache.put("example.com", fresh_policy("2"));

        let served = cache.get("example.com").expect("cached");
        assert_eq!(served.record().map(Record::id), Some("2"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fresh_matching_policy_is_not_stale() {
        let policy = fresh_policy("1");
        let fresh = Record::new("example.com", "1");
        assert!(!PolicyCache::is_stale(&policy, &fresh));
    }

    #[test]
    fn test_changed_record_id_is_stale() {
        let policy = fresh_policy("1");
        let fresh = Record::new("example.com", "2");
        assert!(PolicyCache::is_stale(&policy, &fresh));
    }

    #[test]
    fn test_expired_policy_is_stale() {
        let policy = expired_policy("1");
        let fresh = Record::new("example.com", "1");
        assert!(PolicyCache::is_stale(&policy, &fresh));
    }
}
