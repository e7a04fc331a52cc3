//! Client-side MTA-STS (RFC 8461) for Rust mail transfer agents.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mta_sts::{PolicyClient, PolicyConfig, PolicyResolver, Record};
//!
//! #[tokio::main]
//! async fn main() {
//!     // The DNS collaborator supplies the current TXT record identity.
//!     let record = Record::from_txt("example.com", "v=STSv1; id=20240101T000000;");
//!
//!     let resolver = PolicyResolver::new(PolicyClient::new(), PolicyConfig::default());
//!
//!     if let Some(policy) = resolver.policy_for(&record).await {
//!         if policy.is_valid() {
//!             println!("mode: {}", policy.mode());
//!             println!("mx.example.com allowed: {}", policy.match_mx("mx.example.com"));
//!         }
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/mta-sts/0.3.0")]

// Re-export core types
pub use mta_sts_core::*;

// Re-export client
pub use mta_sts_client::{PolicyClient, PolicyClientBuilder, TrustPolicy};

// Re-export cache and resolver
pub use mta_sts_cache::{PolicyCache, PolicyResolver};

// Re-export runtime for convenience
pub use serde;
pub use tokio;
