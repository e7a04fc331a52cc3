use thiserror::Error;

/// Result type alias for MTA-STS operations
pub type Result<T> = std::result::Result<T, StsError>;

/// Errors that can occur in the MTA-STS policy pipeline
///
/// Remote-input defects (malformed lines, bad numeric fields) are *not*
/// errors at this level; they accumulate on the policy's
/// [`Validation`](crate::Validation) record instead. The variants here cover
/// the transport plumbing and the one hard failure path: reconstructing a
/// policy from a corrupted cache string.
#[derive(Error, Debug)]
pub enum StsError {
    /// A serialized cache entry is missing mandatory identity fields
    #[error("corrupted cache entry: {reason}")]
    CorruptedCacheEntry {
        /// Which identity field was missing or invalid
        reason: String,
    },

    /// The policy URL for a domain could not be formed
    #[error("invalid policy URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),
}

impl StsError {
    /// Returns true if the error indicates storage-layer corruption rather
    /// than a remote or transport fault
    #[must_use]
    pub const fn is_corrupted_cache(&self) -> bool {
        matches!(self, Self::CorruptedCacheEntry { .. })
    }

    /// Returns true if the error is a transient transport failure
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_transport_errors_are_retryable() {
        assert!(StsError::Timeout(30).is_retryable());
        assert!(StsError::Connection("refused".into()).is_retryable());
        assert!(!StsError::Http("500 from policy host".into()).is_retryable());
        assert!(!StsError::InvalidUrl("bad host".into()).is_retryable());
    }

    #[test]
    fn test_corruption_is_neither_transport_nor_retryable() {
        let err = StsError::CorruptedCacheEntry {
            reason: "missing record_id".into(),
        };
        assert!(err.is_corrupted_cache());
        assert!(!err.is_retryable());
        assert!(!StsError::Timeout(30).is_corrupted_cache());
    }
}
