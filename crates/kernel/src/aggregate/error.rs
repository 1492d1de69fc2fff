//! Aggregation error types.

use std::time::Duration;

use tessera_sdk::{ContentError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

use super::OmissionReason;
use crate::enablement::EnablementError;

/// Why a single plugin entry could not be produced. Never fatal.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("plugin is enabled for this site but not registered")]
    PluginMissing,

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(ValidationError),

    #[error("no content: {0}")]
    ContentUnavailable(String),

    #[error("{0}")]
    Execution(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("cancelled before completion")]
    Cancelled,
}

impl EntryError {
    pub fn reason(&self) -> OmissionReason {
        match self {
            Self::PluginMissing => OmissionReason::PluginMissing,
            Self::ConfigurationInvalid(_) => OmissionReason::ConfigurationInvalid,
            Self::ContentUnavailable(_) => OmissionReason::ContentUnavailable,
            Self::Execution(_) => OmissionReason::ExecutionFailed,
            Self::TimedOut(_) => OmissionReason::TimedOut,
            Self::Cancelled => OmissionReason::Cancelled,
        }
    }
}

impl From<ContentError> for EntryError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Unavailable(message) => Self::ContentUnavailable(message),
            ContentError::Cancelled => Self::Cancelled,
            other => Self::Execution(other.to_string()),
        }
    }
}

/// Errors that prevent a site document from being produced at all.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("failed to resolve enabled plugins for site {site_id}")]
    EnablementResolution {
        site_id: Uuid,
        #[source]
        source: EnablementError,
    },
}
