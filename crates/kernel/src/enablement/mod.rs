//! Per-site plugin enablement.
//!
//! An [`EnablementStore`] answers which plugins a site has switched on and
//! with what configuration. The [`SiteEnablementResolver`] puts those answers
//! into canonical registry order for the aggregator.

mod memory;
mod postgres;
mod resolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryEnablementStore;
pub use postgres::PgEnablementStore;
pub use resolver::{ResolvedPlugin, SiteEnablementResolver};

/// One enablement row for a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnablementRecord {
    pub system_name: String,
    pub enabled: bool,
    /// Raw configuration blob, passed to the plugin untouched.
    #[serde(default)]
    pub configuration: Option<String>,
}

impl EnablementRecord {
    pub fn enabled(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            enabled: true,
            configuration: None,
        }
    }

    pub fn disabled(system_name: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::enabled(system_name)
        }
    }

    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }
}

/// Errors from an enablement store.
#[derive(Debug, Error)]
pub enum EnablementError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("enablement store unavailable: {0}")]
    Backend(String),
}

/// Persistence collaborator holding site enablement.
#[async_trait]
pub trait EnablementStore: Send + Sync {
    /// All enablement rows for a site, in store order.
    ///
    /// An unconfigured site yields an empty list, not an error.
    async fn get_enablement(&self, site_id: Uuid) -> Result<Vec<EnablementRecord>, EnablementError>;
}
