//! Certificate trust selection.

/// Certificate trust policy applied to the policy host's TLS handshake
///
/// Passed to the client builder as a plain value; the permissive variant
/// exists for tests against self-signed local servers and must never be
/// used for production delivery decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrustPolicy {
    /// Verify the chain against the system trust roots
    #[default]
    SystemDefault,
    /// Accept any certificate, including self-signed (testing only)
    PermissiveTest,
}

impl TrustPolicy {
    /// True when certificate verification is disabled
    #[must_use]
    pub const fn is_permissive(self) -> bool {
        matches!(self, Self::PermissiveTest)
    }
}
