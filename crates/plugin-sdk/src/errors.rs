//! Error types returned by content plugins.
//!
//! The kernel treats these differently: `Unavailable` and `Cancelled` are
//! expected outcomes, everything else is a plugin fault that gets logged.

use thiserror::Error;

/// Failure while producing a plugin's content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The plugin has nothing to contribute for this site.
    #[error("no content available: {0}")]
    Unavailable(String),

    /// The invocation observed a cancellation request and stopped.
    #[error("content generation cancelled")]
    Cancelled,

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage collaborator failed.
    #[error("record source failed: {0}")]
    Source(#[from] RecordError),

    #[error("{0}")]
    Failed(String),
}

impl ContentError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Whether this outcome is expected rather than a fault.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Cancelled)
    }
}

/// A plugin rejected the configuration stored for a site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The plugin needs configuration and none was stored.
    #[error("configuration is required")]
    Required,

    /// The blob does not parse in the plugin's format.
    #[error("configuration is malformed: {0}")]
    Malformed(String),

    /// The blob parses but violates a plugin rule.
    #[error("configuration rejected: {0}")]
    Rejected(String),
}

impl ValidationError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// Failure reported by a [`RecordSource`](crate::records::RecordSource).
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_outcomes() {
        assert!(ContentError::unavailable("no pages").is_expected());
        assert!(ContentError::Cancelled.is_expected());
        assert!(!ContentError::failed("boom").is_expected());
        assert!(!ContentError::from(RecordError::Backend("down".into())).is_expected());
    }

    #[test]
    fn messages_carry_details() {
        let err = ValidationError::Malformed("expected value at line 1".into());
        assert!(err.to_string().contains("line 1"));

        let err = ContentError::from(RecordError::Corrupt("bad json".into()));
        assert!(err.to_string().contains("bad json"));
    }
}
