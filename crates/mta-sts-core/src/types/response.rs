use std::collections::HashMap;

/// Transport-agnostic view of one HTTPS policy exchange
///
/// The fetch client reduces every outcome, including DNS failures,
/// connection refusals, timeouts and TLS faults, to one of these values.
/// Transport failures are represented as a response with
/// [`is_successful`](Self::is_successful) false; they never propagate as
/// errors into the policy layer.
#[derive(Debug, Clone, Default)]
pub struct PolicyResponse {
    code: u16,
    message: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    handshake: bool,
    peer_certificates: Vec<Vec<u8>>,
}

impl PolicyResponse {
    /// Create a response with the given status code and message
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Create the response representing a transport-level failure
    ///
    /// Status code 0, no handshake, no body. The message carries the
    /// transport error description for diagnostics.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    /// Attach a header; lookup is case-insensitive
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Attach the response body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Mark whether the TLS handshake completed
    #[must_use]
    pub const fn with_handshake(mut self, handshake: bool) -> Self {
        self.handshake = handshake;
        self
    }

    /// Attach the peer certificate chain observed during the handshake
    #[must_use]
    pub fn with_peer_certificates(mut self, certificates: Vec<Vec<u8>>) -> Self {
        self.peer_certificates = certificates;
        self
    }

    /// True iff the handshake completed and the status is 2xx
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.handshake && self.code >= 200 && self.code < 300
    }

    /// HTTP status code (0 for transport failures)
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// HTTP status message, or the transport error description
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Look up a header by name, case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Response body bytes, already capped by the client
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True iff the TLS handshake completed
    #[must_use]
    pub const fn handshake(&self) -> bool {
        self.handshake
    }

    /// Peer certificates in DER form; empty when the handshake did not
    /// occur or the transport did not expose them
    #[must_use]
    pub fn peer_certificates(&self) -> &[Vec<u8>] {
        &self.peer_certificates
    }
}
