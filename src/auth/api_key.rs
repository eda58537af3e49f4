//! Shared-secret API key check

use hyper::HeaderMap;

/// Header carrying the caller's shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Validates the `x-api-key` header against the configured secret
#[derive(Clone)]
pub struct ApiKeyValidator {
    expected: Option<String>,
}

impl ApiKeyValidator {
    /// With `None` every request is rejected
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.filter(|key| !key.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Check a presented key
    pub fn validate(&self, presented: Option<&str>) -> bool {
        match (&self.expected, presented) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }

    /// Check the key carried by request headers
    pub fn validate_headers(&self, headers: &HeaderMap) -> bool {
        let presented = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        self.validate(presented)
    }
}

impl std::fmt::Debug for ApiKeyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyValidator")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_matching_key() {
        let validator = ApiKeyValidator::new(Some("s3cret".to_string()));
        assert!(validator.validate(Some("s3cret")));
    }

    #[test]
    fn test_wrong_or_missing_key() {
        let validator = ApiKeyValidator::new(Some("s3cret".to_string()));
        assert!(!validator.validate(Some("guess")));
        assert!(!validator.validate(Some("")));
        assert!(!validator.validate(None));
    }

    #[test]
    fn test_unconfigured_rejects_everything() {
        let validator = ApiKeyValidator::new(Some(String::new()));
        assert!(!validator.is_configured());
        assert!(!validator.validate(Some("")));
        assert!(!ApiKeyValidator::new(None).validate(Some("anything")));
    }

    #[test]
    fn test_reads_header() {
        let validator = ApiKeyValidator::new(Some("s3cret".to_string()));
        let mut headers = HeaderMap::new();
        assert!(!validator.validate_headers(&headers));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(validator.validate_headers(&headers));
    }

    #[test]
    fn test_debug_hides_secret() {
        let validator = ApiKeyValidator::new(Some("s3cret".to_string()));
        assert!(!format!("{:?}", validator).contains("s3cret"));
    }
}
