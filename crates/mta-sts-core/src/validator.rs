//! Policy validation state.

use crate::config::PolicyConfig;
use crate::types::response::PolicyResponse;

/// Accumulated structural errors and non-fatal warnings for one policy
///
/// Errors make a policy fail [`Policy::is_valid`](crate::Policy::is_valid);
/// warnings (for example clamped ages) do not. Nothing here ever aborts
/// parsing.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Validation {
    /// Record a structural error
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record a non-fatal warning
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Errors recorded so far, in order
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings recorded so far, in order
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Extract the policy text from an HTTPS response
    ///
    /// A non-2xx status or a missing TLS handshake is recorded as an error
    /// and yields no text. The body is truncated to the configured maximum
    /// size; oversized bodies from hostile or broken servers are capped, not
    /// rejected.
    #[must_use]
    pub fn body_from_response(
        &mut self,
        response: &PolicyResponse,
        config: &PolicyConfig,
    ) -> Option<String> {
        if !response.handshake() {
            self.add_error("TLS handshake did not complete");
            return None;
        }

        if !response.is_successful() {
            self.add_error(format!(
                "HTTP response unsuccessful: {} {}",
                response.code(),
                response.message()
            ));
            return None;
        }

        let body = response.body();
        let capped = &body[..body.len().min(config.max_body_size)];

        Some(String::from_utf8_lossy(capped).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_and_warnings_kept_in_order() {
        let mut validation = Validation::default();
        validation.add_error("first");
        validation.add_warning("soft");
        validation.add_error("second");

        assert_eq!(validation.errors(), ["first", "second"]);
        assert_eq!(validation.warnings(), ["soft"]);
    }

    #[test]
    fn test_body_extracted_from_successful_response() {
        let response = PolicyResponse::new(200, "OK")
            .with_handshake(true)
            .with_body("version: STSv1\r\n");

        let mut validation = Validation::default();
        let body = validation.body_from_response(&response, &PolicyConfig::default());

        assert_eq!(body.as_deref(), Some("version: STSv1\r\n"));
        assert!(validation.errors().is_empty());
    }

    #[test]
    fn test_not_found_recorded_as_error() {
        let response = PolicyResponse::new(404, "Not Found").with_handshake(true);

        let mut validation = Validation::default();
        let body = validation.body_from_response(&response, &PolicyConfig::default());

        assert!(body.is_none());
        assert_eq!(validation.errors().len(), 1);
        assert!(validation.errors()[0].contains("404"));
    }

    #[test]
    fn test_handshake_failure_recorded_as_error() {
        let response = PolicyResponse::failure("connection refused");

        let mut validation = Validation::default();
        let body = validation.body_from_response(&response, &PolicyConfig::default());

        assert!(body.is_none());
        assert!(validation.errors()[0].contains("handshake"));
    }

    #[test]
    fn test_oversized_body_truncated_to_cap() {
        let response = PolicyResponse::new(200, "OK")
            .with_handshake(true)
            .with_body("x".repeat(200));

        let config = PolicyConfig::new().max_body_size(90);
        let mut validation = Validation::default();
        let body = validation
            .body_from_response(&response, &config)
            .expect("body");

        assert_eq!(body.len(), 90);
    }
}
