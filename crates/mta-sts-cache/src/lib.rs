//! Freshness-aware policy cache for the MTA-STS client.
//!
//! [`PolicyCache`] pairs each domain with its current policy and judges
//! staleness against a freshly looked-up DNS record; [`PolicyResolver`]
//! layers coalesced fetching on top so concurrent lookups of one stale
//! domain produce a single HTTPS request.

#![doc(html_root_url = "https://docs.rs/mta-sts-cache/0.3.0")]

mod cache;
mod resolver;

pub use cache::PolicyCache;
pub use mta_sts_core::{Policy, PolicyConfig, Record, Result, StsError};
pub use resolver::PolicyResolver;
