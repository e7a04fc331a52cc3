//! Cache-backed policy resolution with per-domain fetch coalescing.

use crate::cache::PolicyCache;
use dashmap::DashMap;
use mta_sts_client::PolicyClient;
use mta_sts_core::{Policy, PolicyConfig, Record};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// High-level policy lookup: cache first, coalesced fetch on miss
///
/// Many delivery attempts may ask for the same domain at once. A lookup
/// that finds a fresh cached policy whose record id still matches returns
/// it immediately; otherwise callers for that domain queue behind one
/// per-domain lock, the first performs the fetch, and the rest observe the
/// freshly cached result. Lookups for unrelated domains never contend.
///
/// The lock registry holds one entry per domain ever resolved, growing in
/// step with the cache itself.
#[derive(Clone)]
pub struct PolicyResolver {
    client: PolicyClient,
    cache: Arc<PolicyCache>,
    config: PolicyConfig,
    in_flight: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl PolicyResolver {
    /// Create a resolver over a client and limit configuration
    #[must_use]
    pub fn new(client: PolicyClient, config: PolicyConfig) -> Self {
        Self {
            client,
            cache: Arc::new(PolicyCache::new()),
            config,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// The cache backing this resolver
    #[must_use]
    pub fn cache(&self) -> &PolicyCache {
        &self.cache
    }

    /// Resolve the policy for a freshly looked-up DNS record
    ///
    /// Returns `None` only for the sentinel case of a blank domain, which
    /// the fetch client refuses without a network call. The returned
    /// policy may fail [`Policy::is_valid`]; the caller decides what an
    /// unusable policy means for delivery.
    pub async fn policy_for(&self, fresh: &Record) -> Option<Policy> {
        if let Some(cached) = self.cache.get(fresh.domain()) {
            if !PolicyCache::is_stale(&cached, fresh) {
                debug!(domain = fresh.domain(), "serving cached policy");
                return Some(cached);
            }
            debug!(domain = fresh.domain(), "cached policy is stale");
        }

        let lock = self
            .in_flight
            .entry(fresh.domain().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // A coalesced caller may have refreshed the entry while we waited.
        if let Some(cached) = self.cache.get(fresh.domain()) {
            if !PolicyCache::is_stale(&cached, fresh) {
                debug!(domain = fresh.domain(), "coalesced into a completed fetch");
                return Some(cached);
            }
        }

        let response = self
            .client
            .get_policy(Some(fresh), self.config.max_body_size)
            .await?;

        let policy = Policy::from_response(fresh.clone(), &response, &self.config);

        if policy.is_valid() {
            self.cache.put(fresh.domain(), policy.clone());
        } else {
            warn!(
                domain = fresh.domain(),
                errors = ?policy.validation().errors(),
                "fetched policy is not usable, keeping any previous cache entry"
            );
        }

        Some(policy)
    }
}
