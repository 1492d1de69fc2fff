//! Content plugin contracts.
//!
//! [`ContentPlugin`] is the object-safe capability set the kernel holds as
//! `Arc<dyn ContentPlugin>`. Plugin authors normally implement the typed
//! [`ContentProvider`] instead and get `ContentPlugin` through the blanket
//! implementation below: `get_content` returns the plugin's own domain type,
//! and `generate_json` serializes it unless the plugin overrides it.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::{ContentError, ValidationError};
use crate::types::{PluginDescriptor, SiteContext};
use crate::validate::{AcceptAnyConfig, ConfigValidator};

/// Object-safe capability set of a content plugin.
#[async_trait]
pub trait ContentPlugin: Send + Sync {
    fn descriptor(&self) -> &PluginDescriptor;

    fn system_name(&self) -> &str {
        &self.descriptor().system_name
    }

    /// Check the site's configuration blob before any content is generated.
    fn validate_configuration(&self, config: Option<&str>) -> Result<(), ValidationError>;

    /// The plugin's native content, erased to a JSON value.
    async fn get_content(&self, ctx: &SiteContext) -> Result<serde_json::Value, ContentError>;

    /// The serialized fragment the kernel stores verbatim in a site document.
    ///
    /// Surrounding whitespace is trimmed. Implementations must not block the
    /// executor: the per-plugin timeout only fires at an `.await` point, so
    /// blocking I/O or `std::thread::sleep` belongs in `spawn_blocking`.
    async fn generate_json(&self, ctx: &SiteContext) -> Result<String, ContentError>;
}

/// Typed plugin contract.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    type Content: Serialize + Send;

    fn descriptor(&self) -> &PluginDescriptor;

    /// The validator this plugin composes. Defaults to accepting anything.
    fn validator(&self) -> &dyn ConfigValidator {
        &AcceptAnyConfig
    }

    async fn get_content(&self, ctx: &SiteContext) -> Result<Self::Content, ContentError>;

    async fn generate_json(&self, ctx: &SiteContext) -> Result<String, ContentError> {
        let content = <Self as ContentProvider>::get_content(self, ctx).await?;
        Ok(serde_json::to_string(&content)?)
    }
}

#[async_trait]
impl<P> ContentPlugin for P
where
    P: ContentProvider,
{
    fn descriptor(&self) -> &PluginDescriptor {
        ContentProvider::descriptor(self)
    }

    fn validate_configuration(&self, config: Option<&str>) -> Result<(), ValidationError> {
        self.validator().validate(config)
    }

    async fn get_content(&self, ctx: &SiteContext) -> Result<serde_json::Value, ContentError> {
        let content = ContentProvider::get_content(self, ctx).await?;
        Ok(serde_json::to_value(content)?)
    }

    async fn generate_json(&self, ctx: &SiteContext) -> Result<String, ContentError> {
        ContentProvider::generate_json(self, ctx).await
    }
}
