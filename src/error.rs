//! Error types for the Migadu client.

use std::time::Duration;

/// Errors that can occur while building, sending or decoding a Migadu API call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request or client was missing a required piece of configuration.
    #[error("configuration incomplete: {0}")]
    Config(String),

    /// The host and path did not form a valid URL.
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    /// A header name or value could not be encoded.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Json(#[source] serde_json::Error),

    /// The underlying HTTP transport failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with anything other than `200 OK`.
    #[error("status code {status}: {}", body.as_deref().unwrap_or("empty response body"))]
    Status { status: u16, body: Option<String> },

    /// A `200 OK` body could not be decoded into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The call did not complete within the client timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the call before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// HTTP status code carried by a [`Error::Status`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the call was aborted by a deadline or by the caller.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_shows_code_and_body() {
        let err = Error::Status {
            status: 404,
            body: Some("not found".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("not found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn status_error_without_body_says_so() {
        let err = Error::Status {
            status: 500,
            body: None,
        };
        assert_eq!(err.to_string(), "status code 500: empty response body");
    }

    #[test]
    fn cancellation_kinds() {
        assert!(Error::Cancelled.is_cancellation());
        assert!(Error::Timeout(Duration::from_secs(1)).is_cancellation());
        assert!(!Error::Config("method is required".into()).is_cancellation());
    }
}
