//! Error types for the status pipeline

use std::fmt;

pub type Result<T> = std::result::Result<T, StatusError>;

#[derive(Debug)]
pub enum StatusError {
    /// HTTP request failed
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json(serde_json::Error),

    /// Atom/XML parsing failed
    Xml(quick_xml::Error),

    /// RSS channel parsing failed
    Feed(rss::Error),

    /// Upstream call exceeded its deadline
    Timeout { url: String, seconds: u64 },

    /// Upstream answered with a non-success status
    Upstream { url: String, status: u16 },

    /// Payload bytes could not be decoded to text
    Decode(String),

    /// Configuration error
    Config(String),

    /// A fetch task was cancelled or panicked
    Task(String),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusError::Http(err) => write!(f, "HTTP error: {}", err),
            StatusError::Json(err) => write!(f, "JSON error: {}", err),
            StatusError::Xml(err) => write!(f, "XML error: {}", err),
            StatusError::Feed(err) => write!(f, "Feed error: {}", err),
            StatusError::Timeout { url, seconds } => {
                write!(f, "Request to {} timed out after {}s", url, seconds)
            }
            StatusError::Upstream { url, status } => {
                write!(f, "Upstream {} returned status {}", url, status)
            }
            StatusError::Decode(msg) => write!(f, "Decode error: {}", msg),
            StatusError::Config(msg) => write!(f, "Configuration error: {}", msg),
            StatusError::Task(msg) => write!(f, "Task error: {}", msg),
            StatusError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for StatusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatusError::Http(err) => Some(err),
            StatusError::Json(err) => Some(err),
            StatusError::Xml(err) => Some(err),
            StatusError::Feed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StatusError {
    fn from(err: reqwest::Error) -> Self {
        StatusError::Http(err)
    }
}

impl From<serde_json::Error> for StatusError {
    fn from(err: serde_json::Error) -> Self {
        StatusError::Json(err)
    }
}

impl From<quick_xml::Error> for StatusError {
    fn from(err: quick_xml::Error) -> Self {
        StatusError::Xml(err)
    }
}

impl From<rss::Error> for StatusError {
    fn from(err: rss::Error) -> Self {
        StatusError::Feed(err)
    }
}

impl From<tokio::task::JoinError> for StatusError {
    fn from(err: tokio::task::JoinError) -> Self {
        StatusError::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = StatusError::Upstream {
            url: "https://example.test/feed".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "Upstream https://example.test/feed returned status 503"
        );

        let err = StatusError::Timeout {
            url: "https://example.test".to_string(),
            seconds: 10,
        };
        assert!(err.to_string().contains("timed out after 10s"));
    }

    #[test]
    fn test_json_error_has_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StatusError::from(json_err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(std::error::Error::source(&StatusError::Other("x".into())).is_none());
    }
}
