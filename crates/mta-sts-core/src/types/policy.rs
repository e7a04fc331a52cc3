//! Policy lifecycle: construction, validity, expiry and MX matching.
//!
//! A [`Policy`] is built either from a fetched HTTPS response or from the
//! extended cache string produced by [`Policy::as_cache_string`].
//! Construction from remote input never fails; every defect lands on the
//! policy's [`Validation`] record and the result must be checked through
//! [`Policy::is_valid`]. The only hard failure is reconstruction from a
//! corrupted cache string, which indicates storage damage rather than a
//! malformed remote document.

use chrono::Utc;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::PolicyConfig;
use crate::error::{Result, StsError};
use crate::parser::{self, Pair};
use crate::types::mode::Mode;
use crate::types::record::Record;
use crate::types::response::PolicyResponse;
use crate::validator::Validation;

/// A fetched, parsed MTA-STS policy
///
/// Immutable after construction, except for the [`cached`](Self::is_cached)
/// flag which the cache layer sets when serving from storage.
#[derive(Debug, Clone)]
pub struct Policy {
    version: Option<String>,
    mode: Mode,
    mx_masks: Vec<String>,
    max_age: u64,
    fetch_time: i64,
    record: Option<Record>,
    certificates: Vec<Vec<u8>>,
    raw: Option<String>,
    cached: bool,
    validation: Validation,
}

/// Fields populated from the recognized policy keys
#[derive(Debug, Default)]
struct PolicyFields {
    version: Option<String>,
    mode: Mode,
    mx_masks: Vec<String>,
    max_age: u64,
}

impl Policy {
    /// Build a policy from a fetched HTTPS response
    ///
    /// The record is the DNS identity looked up at fetch time; it is stored
    /// alongside the policy so a later lookup can detect a changed id.
    /// Parsing never fails; check [`is_valid`](Self::is_valid) before
    /// trusting the result.
    #[must_use]
    pub fn from_response(record: Record, response: &PolicyResponse, config: &PolicyConfig) -> Self {
        let mut validation = Validation::default();
        let raw = validation.body_from_response(response, config);

        let certificates = response.peer_certificates().to_vec();
        if response.handshake() && certificates.is_empty() {
            debug!(domain = record.domain(), "no peer certificate captured from handshake");
        }

        let fields = raw.as_deref().map_or_else(PolicyFields::default, |raw| {
            let pairs = parser::parse_pairs(raw, config, &mut validation);
            build_fields(&pairs, config, &mut validation)
        });

        Self {
            version: fields.version,
            mode: fields.mode,
            mx_masks: fields.mx_masks,
            max_age: fields.max_age,
            fetch_time: Utc::now().timestamp(),
            record: Some(record),
            certificates,
            raw,
            cached: false,
            validation,
        }
    }

    /// Rebuild a policy and its record from an extended cache string
    ///
    /// # Errors
    ///
    /// Returns [`StsError::CorruptedCacheEntry`] when the string lacks a
    /// syntactically valid `domain`, a non-blank `record_id` or a positive
    /// `fetch_time`. Those fields only ever come from
    /// [`as_cache_string`](Self::as_cache_string), so their absence means
    /// the stored entry was damaged.
    pub fn from_cache_string(extended: &str, config: &PolicyConfig) -> Result<Self> {
        let mut validation = Validation::default();
        let pairs = parser::parse_pairs(extended, config, &mut validation);
        let fields = build_fields(&pairs, config, &mut validation);

        let mut fetch_time = 0_i64;
        let mut record_id = None;
        let mut domain = None;

        for pair in &pairs {
            match pair.key() {
                "fetch_time" => match pair.value().parse::<i64>() {
                    Ok(value) => fetch_time = value,
                    Err(_) => warn!(value = pair.value(), "cached policy fetch_time invalid"),
                },
                "record_id" => {
                    if !pair.value().trim().is_empty() {
                        record_id = Some(pair.value().to_string());
                    }
                }
                "domain" => {
                    if addr::parse_domain_name(pair.value()).is_ok() {
                        domain = Some(pair.value().to_string());
                    }
                }
                _ => {}
            }
        }

        let domain = domain.ok_or_else(|| StsError::CorruptedCacheEntry {
            reason: "missing or invalid domain".into(),
        })?;
        let record_id = record_id.ok_or_else(|| StsError::CorruptedCacheEntry {
            reason: "missing record_id".into(),
        })?;
        if fetch_time <= 0 {
            return Err(StsError::CorruptedCacheEntry {
                reason: "missing or non-positive fetch_time".into(),
            });
        }

        Ok(Self {
            version: fields.version,
            mode: fields.mode,
            mx_masks: fields.mx_masks,
            max_age: fields.max_age,
            fetch_time,
            record: Some(Record::new(domain, record_id)),
            certificates: Vec::new(),
            raw: Some(extended.to_string()),
            cached: false,
            validation,
        })
    }

    /// True iff the policy carries usable delivery requirements
    ///
    /// Requires an empty error list, a mode other than `none`, a positive
    /// max age and at least one MX mask. Warnings (clamped ages) do not
    /// invalidate.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation.errors().is_empty()
            && self.mode != Mode::None
            && self.max_age > 0
            && !self.mx_masks.is_empty()
    }

    /// True iff the freshness window has passed since fetch time
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let max_age = i64::try_from(self.max_age).unwrap_or(i64::MAX);
        self.fetch_time.saturating_add(max_age) <= Utc::now().timestamp()
    }

    /// Match an MX hostname against the policy masks
    ///
    /// Testing-mode policies always match; they must never block delivery.
    /// Otherwise the candidate must fully match one mask under glob
    /// semantics where `*` expands to any character sequence and every
    /// other regex metacharacter is inert.
    #[must_use]
    pub fn match_mx(&self, mx: &str) -> bool {
        if self.mode == Mode::Testing {
            return true;
        }

        self.mx_masks.iter().any(|mask| mask_matches(mask, mx))
    }

    /// Policy version string, if the document carried one
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Enforcement mode
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// MX masks in document order
    #[must_use]
    pub fn mx_masks(&self) -> &[String] {
        &self.mx_masks
    }

    /// Freshness window in seconds, after clamping
    #[must_use]
    pub const fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Epoch seconds at which the policy was fetched
    #[must_use]
    pub const fn fetch_time(&self) -> i64 {
        self.fetch_time
    }

    /// The DNS record captured at fetch time, or rebuilt from the cache
    /// string
    #[must_use]
    pub const fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Peer certificates in DER form, for audit and diagnostics only
    #[must_use]
    pub fn peer_certificates(&self) -> &[Vec<u8>] {
        &self.certificates
    }

    /// The policy text this policy was built from, capped at the configured
    /// body size
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Validation errors and warnings accumulated during construction
    #[must_use]
    pub const fn validation(&self) -> &Validation {
        &self.validation
    }

    /// True when this instance was served from the cache
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cached
    }

    /// Mark the policy as cache-served; called by the cache layer only
    pub fn set_cached(&mut self, cached: bool) {
        self.cached = cached;
    }

    /// Serialize policy and record together for storage
    ///
    /// Returns `None` when no record is attached, since the extended form
    /// exists to persist the pair. Round-trips through
    /// [`from_cache_string`](Self::from_cache_string).
    #[must_use]
    pub fn as_cache_string(&self) -> Option<String> {
        let record = self.record.as_ref()?;

        let mut out = String::new();
        out.push_str(&format!(
            "version: {}\r\n",
            self.version.as_deref().unwrap_or("STSv1")
        ));
        out.push_str(&format!("mode: {}\r\n", self.mode));
        for mask in &self.mx_masks {
            out.push_str(&format!("mx: {mask}\r\n"));
        }
        out.push_str(&format!("max_age: {}\r\n", self.max_age));
        out.push_str(&format!("fetch_time: {}\r\n", self.fetch_time));
        out.push_str(&format!("domain: {}\r\n", record.domain()));
        out.push_str(&format!("record_id: {}\r\n", record.id()));

        Some(out)
    }
}

/// Populate policy fields from parsed pairs, applying the age clamp ladder
///
/// Order matters and mirrors the RFC limits: an unparseable `max_age` falls
/// back to the hard minimum with an error; a value above the configured
/// maximum clamps down with a warning; after all pairs are read, enforce
/// mode is floored at the hard minimum and testing mode at the soft
/// minimum, each with a warning. `none` mode has no floor. Unrecognized
/// keys are ignored for forward compatibility.
fn build_fields(pairs: &[Pair], config: &PolicyConfig, validation: &mut Validation) -> PolicyFields {
    let mut fields = PolicyFields::default();

    for pair in pairs {
        match pair.key() {
            "version" => fields.version = Some(pair.value().to_string()),
            "mode" => {
                fields.mode = Mode::parse(pair.value()).unwrap_or_else(|| {
                    debug!(value = pair.value(), "unrecognized policy mode, treating as none");
                    Mode::None
                });
            }
            "mx" => fields.mx_masks.push(pair.value().to_string()),
            "max_age" => {
                fields.max_age = match pair.value().parse::<u64>() {
                    Ok(value) => value,
                    Err(_) => {
                        validation.add_error(format!(
                            "max_age {:?} is not numeric, using configured minimum",
                            pair.value()
                        ));
                        config.min_age
                    }
                };
                if fields.max_age > config.max_age {
                    validation.add_warning(format!(
                        "Max age above configured maximum: {} > {}",
                        fields.max_age, config.max_age
                    ));
                    fields.max_age = config.max_age;
                }
            }
            _ => {}
        }
    }

    if fields.mode == Mode::Enforce && fields.max_age < config.min_age {
        validation.add_warning(format!(
            "Max age below configured minimum: {} < {}",
            fields.max_age, config.min_age
        ));
        fields.max_age = config.min_age;
    } else if fields.mode == Mode::Testing && fields.max_age < config.soft_min_age {
        validation.add_warning(format!(
            "Max age below configured soft minimum: {} < {}",
            fields.max_age, config.soft_min_age
        ));
        fields.max_age = config.soft_min_age;
    }

    fields
}

/// Full-string glob match with `*` as the only live metacharacter
fn mask_matches(mask: &str, candidate: &str) -> bool {
    let pattern = mask
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{pattern}$")).is_ok_and(|re| re.is_match(candidate))
}
