//! HTTPS policy fetcher.

use crate::trust::TrustPolicy;
use mta_sts_core::{PolicyResponse, Record, StsError};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Well-known path for MTA-STS policy documents (RFC 8461 section 3.3)
const WELL_KNOWN_PATH: &str = "/.well-known/mta-sts.txt";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTPS client fetching MTA-STS policy documents
///
/// Cheap to clone; all clones share one connection pool. Every transport
/// outcome is reduced to a [`PolicyResponse`]; nothing on the fetch path
/// returns an error to the policy layer.
#[derive(Clone)]
pub struct PolicyClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: Option<String>,
    timeout: Duration,
}

impl PolicyClient {
    /// Create a client with default settings and system trust
    #[must_use]
    pub fn new() -> Self {
        PolicyClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> PolicyClientBuilder {
        PolicyClientBuilder::new()
    }

    /// Fetch the policy document advertised by a record's domain
    ///
    /// Returns `None` without any network call when no record is supplied
    /// or the record's domain is blank; upstream orchestration is expected
    /// to have filtered those. Otherwise issues a single GET to the
    /// domain's well-known MTA-STS path and returns a response whose body
    /// is truncated to `max_body_size` bytes. Transport failures (DNS,
    /// connect, TLS, timeout) come back as a response with
    /// [`is_successful`](PolicyResponse::is_successful) false.
    pub async fn get_policy(
        &self,
        record: Option<&Record>,
        max_body_size: usize,
    ) -> Option<PolicyResponse> {
        let record = record?;
        let domain = record.domain().trim();
        if domain.is_empty() {
            return None;
        }

        let url = match self.policy_url(domain) {
            Ok(url) => url,
            Err(err) => {
                warn!(domain, "could not form policy URL: {err}");
                return Some(PolicyResponse::failure(err.to_string()));
            }
        };

        debug!(url = %url, "GET policy document");

        let response = match self.inner.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = self.transport_error(&e);
                warn!(domain, retryable = err.is_retryable(), "policy fetch failed: {err}");
                return Some(PolicyResponse::failure(err.to_string()));
            }
        };

        Some(self.into_policy_response(response, max_body_size).await)
    }

    /// Classify a wire error into the typed transport variants
    fn transport_error(&self, e: &reqwest::Error) -> StsError {
        if e.is_timeout() {
            StsError::Timeout(self.inner.timeout.as_secs())
        } else if e.is_connect() {
            StsError::Connection(e.to_string())
        } else {
            StsError::Http(e.to_string())
        }
    }

    /// Reduce a wire response to the transport-agnostic form
    async fn into_policy_response(
        &self,
        mut response: reqwest::Response,
        max_body_size: usize,
    ) -> PolicyResponse {
        let status = response.status();
        let message = status.canonical_reason().unwrap_or_default();

        let mut out = PolicyResponse::new(status.as_u16(), message).with_handshake(true);

        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                out = out.with_header(name.as_str(), value);
            }
        }

        let certificates = response
            .extensions()
            .get::<reqwest::tls::TlsInfo>()
            .and_then(reqwest::tls::TlsInfo::peer_certificate)
            .map(|der| vec![der.to_vec()])
            .unwrap_or_default();
        out = out.with_peer_certificates(certificates);

        // Stream the body and stop at the cap; an oversized or hostile
        // server must not make us buffer the whole thing first.
        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    let remaining = max_body_size - body.len();
                    if chunk.len() >= remaining {
                        body.extend_from_slice(&chunk[..remaining]);
                        debug!("policy body truncated at {max_body_size} bytes");
                        break;
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    let err = self.transport_error(&e);
                    warn!("failed reading policy body: {err}");
                    break;
                }
            }
        }

        out.with_body(body)
    }

    /// Build the policy URL for a domain
    ///
    /// The base-URL override replaces the `https://mta-sts.<domain>` origin
    /// and exists for tests against local servers.
    fn policy_url(&self, domain: &str) -> Result<Url, StsError> {
        let raw = self.inner.base_url.as_ref().map_or_else(
            || format!("https://mta-sts.{domain}{WELL_KNOWN_PATH}"),
            |base| format!("{base}{WELL_KNOWN_PATH}"),
        );

        Url::parse(&raw).map_err(|e| StsError::InvalidUrl(format!("{raw}: {e}")))
    }
}

impl Default for PolicyClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring a [`PolicyClient`]
pub struct PolicyClientBuilder {
    timeout: Duration,
    user_agent: String,
    trust: TrustPolicy,
    base_url: Option<String>,
}

impl PolicyClientBuilder {
    /// Create a builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("mta-sts-rs/{}", env!("CARGO_PKG_VERSION")),
            trust: TrustPolicy::SystemDefault,
            base_url: None,
        }
    }

    /// Set the connect/read timeout bounding a fetch
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Select the certificate trust policy
    #[must_use]
    pub const fn trust(mut self, trust: TrustPolicy) -> Self {
        self.trust = trust;
        self
    }

    /// Override the policy host origin (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> PolicyClient {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .tls_info(true)
            .danger_accept_invalid_certs(self.trust.is_permissive())
            .build()
            .expect("Failed to build HTTP client");

        PolicyClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: self.base_url,
                timeout: self.timeout,
            }),
        }
    }
}

impl Default for PolicyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_BODY: &str =
        "version: STSv1\r\nmode: enforce\r\nmx: *.example.com\r\nmax_age: 86400\r\n";

    fn record() -> Record {
        Record::from_txt("example.com", "v=STSv1; id=19840507T234501;")
    }

    async fn mock_policy_host(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/mta-sts.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/plain")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer) -> PolicyClient {
        PolicyClient::builder()
            .trust(TrustPolicy::PermissiveTest)
            .base_url(server.uri())
            .build()
    }

    #[tokio::test]
    async fn test_fetches_valid_policy() {
        let server = mock_policy_host(VALID_BODY).await;
        let client = client_for(&server);

        let response = client
            .get_policy(Some(&record()), 64_000)
            .await
            .expect("record supplied");

        assert!(response.is_successful());
        assert_eq!(response.code(), 200);
        assert_eq!(response.message(), "OK");
        assert!(response.handshake());
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.body(), VALID_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_policy_is_not_found() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let response = client
            .get_policy(Some(&record()), 64_000)
            .await
            .expect("record supplied");

        assert!(!response.is_successful());
        assert_eq!(response.code(), 404);
    }

    #[tokio::test]
    async fn test_empty_body_is_successful() {
        let server = mock_policy_host("").await;
        let client = client_for(&server);

        let response = client
            .get_policy(Some(&record()), 64_000)
            .await
            .expect("record supplied");

        assert!(response.is_successful());
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_truncated() {
        let oversize = format!("{VALID_BODY}valid: true\r\nversion: STSv1\r\n");
        let server = mock_policy_host(&oversize).await;
        let client = client_for(&server);

        let response = client
            .get_policy(Some(&record()), 90)
            .await
            .expect("record supplied");

        assert!(response.is_successful());
        assert_eq!(response.body().len(), 90);
    }

    #[tokio::test]
    async fn test_no_record_is_sentinel() {
        let client = PolicyClient::new();
        assert!(client.get_policy(None, 64_000).await.is_none());
    }

    #[tokio::test]
    async fn test_blank_domain_is_sentinel() {
        let client = PolicyClient::new();
        let record = Record::new("  ", "19840507T234501");
        assert!(client.get_policy(Some(&record), 64_000).await.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_unsuccessful_response() {
        // Nothing listens here; the connection is refused.
        let client = PolicyClient::builder()
            .base_url("http://127.0.0.1:9")
            .timeout(Duration::from_secs(2))
            .build();

        let response = client
            .get_policy(Some(&record()), 64_000)
            .await
            .expect("record supplied");

        assert!(!response.is_successful());
        assert_eq!(response.code(), 0);
        assert!(!response.handshake());
        // Refused connections are classified as connection errors.
        assert!(response.message().starts_with("connection failed"));
    }

    #[tokio::test]
    async fn test_slow_server_classified_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/mta-sts.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = PolicyClient::builder()
            .base_url(server.uri())
            .timeout(Duration::from_secs(1))
            .build();

        let response = client
            .get_policy(Some(&record()), 64_000)
            .await
            .expect("record supplied");

        assert!(!response.is_successful());
        assert_eq!(response.message(), "request timed out after 1 seconds");
    }

    #[tokio::test]
    async fn test_unparseable_domain_is_invalid_url_failure() {
        let client = PolicyClient::new();
        let record = Record::new("exa mple.com", "19840507T234501");

        let response = client
            .get_policy(Some(&record), 64_000)
            .await
            .expect("record supplied");

        assert!(!response.is_successful());
        assert!(response.message().starts_with("invalid policy URL"));
    }

    #[tokio::test]
    async fn test_large_body_truncated_at_cap_while_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/mta-sts.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 4 * 1024 * 1024]),
            )
            .mount(&server)
            .await;
        let client = client_for(&server);

        let response = client
            .get_policy(Some(&record()), 1024)
            .await
            .expect("record supplied");

        assert!(response.is_successful());
        assert_eq!(response.body().len(), 1024);
    }
}
