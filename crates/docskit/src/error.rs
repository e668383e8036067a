//! Error types for docskit

use thiserror::Error;

/// Errors that can occur while resolving or searching documentation
#[derive(Debug, Error)]
pub enum DocsError {
    /// Base URL is empty, unparseable, or an argument is malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Remote responded with a non-2xx status or the request failed
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailure {
        url: String,
        status: Option<u16>,
        reason: String,
    },
}

impl DocsError {
    /// Create a fetch failure from a reqwest error
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "failed to connect to server".to_string()
        } else {
            err.to_string()
        };
        DocsError::FetchFailure {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            reason,
        }
    }

    /// Create a fetch failure for a non-success HTTP status
    pub fn http_status(url: &str, status: u16, reason: Option<&str>) -> Self {
        let reason = match reason {
            Some(text) => format!("HTTP {} {}", status, text),
            None => format!("HTTP {}", status),
        };
        DocsError::FetchFailure {
            url: url.to_string(),
            status: Some(status),
            reason,
        }
    }

    /// HTTP status of the last failed fetch, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            DocsError::FetchFailure { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DocsError::InvalidInput("base URL is empty".to_string()).to_string(),
            "Invalid input: base URL is empty"
        );
        assert_eq!(
            DocsError::InvalidUrlScheme.to_string(),
            "Invalid URL: must start with http:// or https://"
        );
        assert_eq!(
            DocsError::BlockedUrl.to_string(),
            "Blocked URL: prefix not allowed"
        );
    }

    #[test]
    fn test_http_status_failure() {
        let err = DocsError::http_status("https://example.com/a", 404, Some("Not Found"));
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/a: HTTP 404 Not Found"
        );

        let err = DocsError::http_status("https://example.com/b", 503, None);
        assert_eq!(err.to_string(), "Failed to fetch https://example.com/b: HTTP 503");
    }

    #[test]
    fn test_status_only_for_fetch_failures() {
        assert_eq!(DocsError::BlockedUrl.status(), None);
        assert_eq!(DocsError::InvalidInput("x".into()).status(), None);
    }
}
