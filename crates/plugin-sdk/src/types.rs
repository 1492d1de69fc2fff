//! Core types shared between content plugins and the kernel.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::ContentError;

/// Immutable identity of a content plugin.
///
/// `system_name` is the registry key and the key of the plugin's entry in an
/// exported site document, so it must stay stable across releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Machine name (e.g. "pages", "products").
    pub system_name: String,

    /// Human-readable name shown in admin listings.
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Semantic version, informational only.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

impl PluginDescriptor {
    pub fn new(system_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            display_name: display_name.into(),
            description: String::new(),
            version: default_version(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Per-invocation input handed to a plugin.
///
/// Carries the site being generated, the raw configuration blob the site
/// administrator stored for this plugin, and a cancellation token the kernel
/// triggers when the caller gives up on the aggregation.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site_id: Uuid,
    pub configuration: Option<String>,
    cancel: CancellationToken,
}

impl SiteContext {
    /// Create a context that is never cancelled.
    pub fn new(site_id: Uuid) -> Self {
        Self {
            site_id,
            configuration: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_configuration(mut self, configuration: Option<String>) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Whether the kernel has asked this invocation to stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Return `ContentError::Cancelled` once cancellation was requested.
    ///
    /// Plugins call this between I/O steps to stop cooperatively.
    pub fn ensure_active(&self) -> Result<(), ContentError> {
        if self.cancel.is_cancelled() {
            Err(ContentError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves when cancellation is requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Parse the configuration blob as JSON, falling back to `T::default()`
    /// when no configuration was stored.
    ///
    /// Plugins call this after the kernel has run `validate_configuration`,
    /// so a parse failure here is reported as a plain content failure.
    pub fn parse_configuration<T>(&self) -> Result<T, ContentError>
    where
        T: DeserializeOwned + Default,
    {
        match self.configuration.as_deref() {
            None => Ok(T::default()),
            Some(raw) if raw.trim().is_empty() => Ok(T::default()),
            Some(raw) => serde_json::from_str(raw).map_err(ContentError::Serialization),
        }
    }
}

/// A record read from the generic storage collaborator.
///
/// The kernel stores plugin data as opaque JSON documents grouped into
/// collections ("page", "product", ...); plugins give `data` its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default = "Uuid::now_v7")]
    pub id: Uuid,

    /// Plugin-defined payload.
    pub data: serde_json::Value,

    #[serde(default = "default_published")]
    pub published: bool,

    /// Sort weight (lower first).
    #[serde(default)]
    pub weight: i32,

    /// Unix timestamp when last changed.
    #[serde(default)]
    pub changed: i64,
}

fn default_published() -> bool {
    true
}

impl Record {
    /// Create a published record with a fresh time-ordered ID.
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            data,
            published: true,
            weight: 0,
            changed: 0,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    pub fn weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Deserialize the payload into a plugin type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}
