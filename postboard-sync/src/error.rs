//! Error types for synchronization operations
//!
//! Every failure the core can observe is a [`SyncError`]. Errors are `Clone`
//! because cache entries keep the last error next to the last good data.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for the synchronization layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Network failure, non-2xx status or undecodable body
    #[error("Fetch error for {resource}: {message}")]
    Fetch {
        resource: String,
        status: Option<u16>,
        message: String,
    },

    /// Response decoded but did not have the expected shape
    #[error("Mapping error for {resource}: {detail}")]
    Mapping { resource: String, detail: String },

    /// The requested entity does not exist on the server
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Local form validation failed; never reaches the network
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A submission is already in flight for this form
    #[error("A submission is already in progress")]
    Busy,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Build a fetch error without an HTTP status
    pub fn fetch(resource: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Fetch {
            resource: resource.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Build a mapping error
    pub fn mapping(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        SyncError::Mapping {
            resource: resource.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error is terminal for its cache key
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }

    /// Whether a later attempt could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Fetch { .. } | SyncError::Mapping { .. })
    }
}

/// Per-field validation messages for the new-post form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [("title", &self.title), ("body", &self.body)]
            .into_iter()
            .filter_map(|(field, msg)| msg.as_ref().map(|m| format!("{}: {}", field, m)))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Result type alias for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SyncError::Fetch {
            resource: "/users".to_string(),
            status: Some(503),
            message: "HTTP 503".to_string(),
        };
        assert_eq!(error.to_string(), "Fetch error for /users: HTTP 503");

        let not_found = SyncError::NotFound {
            resource: "/posts/999".to_string(),
        };
        assert!(not_found.to_string().contains("/posts/999"));
    }

    #[test]
    fn test_field_errors_display() {
        let errors = FieldErrors {
            title: Some("must be at least 2 characters".to_string()),
            body: None,
        };
        assert!(!errors.is_empty());
        assert_eq!(errors.to_string(), "title: must be at least 2 characters");

        let error = SyncError::Validation(errors);
        assert!(error.to_string().starts_with("Validation failed"));
    }

    #[test]
    fn test_error_classification() {
        assert!(SyncError::fetch("/users", "timeout").is_transient());
        assert!(SyncError::mapping("posts", "missing field `id`").is_transient());
        assert!(SyncError::NotFound { resource: "/posts/1".into() }.is_not_found());
        assert!(!SyncError::Busy.is_transient());
    }
}
