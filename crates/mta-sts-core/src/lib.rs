//! Core types for the MTA-STS (RFC 8461) policy client.
//!
//! This crate contains the network-free heart of the pipeline:
//!
//! - **[`Record`]**: the DNS-advertised policy identity
//! - **[`Policy`]**: the parsed, validated policy with its lifecycle rules
//! - **[`parser`]**: the bounded, failure-tolerant document parser
//! - **[`Validation`]**: the error/warning accumulator
//! - **[`PolicyConfig`]**: RFC numeric and structural limits
//!
//! # Example
//!
//! ```rust
//! use mta_sts_core::{Policy, PolicyConfig, PolicyResponse, Record};
//!
//! let record = Record::from_txt("example.com", "v=STSv1; id=20240101T000000;");
//! let response = PolicyResponse::new(200, "OK")
//!     .with_handshake(true)
//!     .with_body("version: STSv1\r\nmode: enforce\r\nmx: *.example.com\r\nmax_age: 604800\r\n");
//!
//! let policy = Policy::from_response(record, &response, &PolicyConfig::default());
//! assert!(policy.is_valid());
//! assert!(policy.match_mx("mail.example.com"));
//! ```

#![doc(html_root_url = "https://docs.rs/mta-sts-core/0.3.0")]

mod config;
mod error;
pub mod parser;
pub mod types;
mod validator;

pub use config::PolicyConfig;
pub use error::{Result, StsError};
pub use parser::Pair;
pub use types::{Mode, Policy, PolicyResponse, Record};
pub use validator::Validation;
