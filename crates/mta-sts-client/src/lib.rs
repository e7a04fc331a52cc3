//! HTTPS policy fetcher for the MTA-STS client.
//!
//! This crate provides the [`PolicyClient`] that retrieves a domain's
//! policy document from its well-known MTA-STS host.

#![doc(html_root_url = "https://docs.rs/mta-sts-client/0.3.0")]

mod client;
mod trust;

pub use client::{PolicyClient, PolicyClientBuilder};
pub use mta_sts_core::{PolicyResponse, Record, Result, StsError};
pub use trust::TrustPolicy;
