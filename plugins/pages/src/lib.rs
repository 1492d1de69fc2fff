//! Pages plugin for Tessera.
//!
//! Exports a site's static pages (about, contact, imprint, ...) read from the
//! `page` record collection. Configuration is optional:
//!
//! ```json
//! { "include_unpublished": false }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessera_sdk::prelude::*;
use uuid::Uuid;

/// Registry and document key.
pub const SYSTEM_NAME: &str = "pages";

/// Record collection the plugin reads.
pub const COLLECTION: &str = "page";

/// Site configuration for the pages plugin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// Export drafts too (used by preview exports).
    pub include_unpublished: bool,
}

impl ValidateConfig for PagesConfig {}

/// Stored shape of a `page` record.
#[derive(Debug, Deserialize)]
struct StoredPage {
    title: String,
    slug: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagesContent {
    pub pages: Vec<PageSummary>,
}

/// Content plugin exporting static pages.
pub struct PagesPlugin {
    descriptor: PluginDescriptor,
    validator: OptionalJsonConfig<PagesConfig>,
    records: Arc<dyn RecordSource>,
}

impl PagesPlugin {
    pub fn new(records: Arc<dyn RecordSource>) -> Self {
        Self {
            descriptor: PluginDescriptor::new(SYSTEM_NAME, "Pages")
                .description("Static site pages")
                .version(env!("CARGO_PKG_VERSION")),
            validator: OptionalJsonConfig::new(),
            records,
        }
    }
}

#[async_trait]
impl ContentProvider for PagesPlugin {
    type Content = PagesContent;

    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn validator(&self) -> &dyn ConfigValidator {
        &self.validator
    }

    async fn get_content(&self, ctx: &SiteContext) -> Result<PagesContent, ContentError> {
        let config: PagesConfig = ctx.parse_configuration()?;
        ctx.ensure_active()?;

        let records = self.records.list(ctx.site_id, COLLECTION).await?;
        ctx.ensure_active()?;

        let mut pages = Vec::with_capacity(records.len());
        for record in records
            .iter()
            .filter(|r| r.published || config.include_unpublished)
        {
            let stored: StoredPage = record.decode().map_err(|e| {
                RecordError::Corrupt(format!("page {}: {e}", record.id))
            })?;
            pages.push((record.weight, PageSummary {
                id: record.id,
                title: stored.title,
                slug: stored.slug,
                body: stored.body,
            }));
        }

        if pages.is_empty() {
            return Err(ContentError::unavailable("site has no pages"));
        }

        pages.sort_by(|(wa, a), (wb, b)| wa.cmp(wb).then_with(|| a.title.cmp(&b.title)));

        Ok(PagesContent {
            pages: pages.into_iter().map(|(_, page)| page).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;
    use tessera_test_utils::{FailingRecordSource, site_id};

    use super::*;

    fn page(title: &str, slug: &str) -> Record {
        Record::new(json!({ "title": title, "slug": slug, "body": format!("{title} body") }))
    }

    fn plugin_with(records: MemoryRecordSource) -> Arc<dyn ContentPlugin> {
        Arc::new(PagesPlugin::new(Arc::new(records)))
    }

    #[test]
    fn descriptor_uses_system_name() {
        let plugin = plugin_with(MemoryRecordSource::new());
        assert_eq!(plugin.system_name(), SYSTEM_NAME);
        assert_eq!(plugin.descriptor().display_name, "Pages");
    }

    #[test]
    fn configuration_is_optional() {
        let plugin = plugin_with(MemoryRecordSource::new());
        assert!(plugin.validate_configuration(None).is_ok());
        assert!(
            plugin
                .validate_configuration(Some(r#"{"include_unpublished": true}"#))
                .is_ok()
        );
        assert!(matches!(
            plugin.validate_configuration(Some(r#"{"unknown": 1}"#)),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn pages_sorted_by_weight_then_title() {
        let site = site_id();
        let records = MemoryRecordSource::new()
            .with(site, COLLECTION, page("Contact", "contact").weight(1))
            .with(site, COLLECTION, page("Imprint", "imprint").weight(0))
            .with(site, COLLECTION, page("About", "about").weight(1));

        let plugin = plugin_with(records);
        let value = plugin.get_content(&SiteContext::new(site)).await.unwrap();
        let titles: Vec<_> = value["pages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["Imprint", "About", "Contact"]);
    }

    #[tokio::test]
    async fn unpublished_pages_need_opt_in() {
        let site = site_id();
        let records = MemoryRecordSource::new()
            .with(site, COLLECTION, page("Draft", "draft").unpublished())
            .with(site, COLLECTION, page("Live", "live"));
        let plugin = plugin_with(records);

        let json = plugin.generate_json(&SiteContext::new(site)).await.unwrap();
        assert!(json.contains("Live"));
        assert!(!json.contains("Draft"));

        let ctx = SiteContext::new(site)
            .with_configuration(Some(r#"{"include_unpublished": true}"#.into()));
        let json = plugin.generate_json(&ctx).await.unwrap();
        assert!(json.contains("Draft"));
    }

    #[tokio::test]
    async fn no_pages_is_unavailable() {
        let plugin = plugin_with(MemoryRecordSource::new());
        let err = plugin
            .generate_json(&SiteContext::new(site_id()))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Unavailable(_)));
    }

    #[tokio::test]
    async fn corrupt_record_is_a_fault() {
        let site = site_id();
        let records =
            MemoryRecordSource::new().with(site, COLLECTION, Record::new(json!({"title": 1})));
        let plugin = plugin_with(records);
        let err = plugin
            .generate_json(&SiteContext::new(site))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Source(RecordError::Corrupt(_))));
        assert!(!err.is_expected());
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let plugin: Arc<dyn ContentPlugin> =
            Arc::new(PagesPlugin::new(Arc::new(FailingRecordSource::new("db down"))));
        let err = plugin
            .generate_json(&SiteContext::new(site_id()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("db down"));
    }

    #[tokio::test]
    async fn cancelled_context_stops_early() {
        let token = CancellationToken::new();
        token.cancel();
        let plugin = plugin_with(MemoryRecordSource::new());
        let ctx = SiteContext::new(site_id()).with_cancellation(token);
        let err = plugin.generate_json(&ctx).await.unwrap_err();
        assert!(matches!(err, ContentError::Cancelled));
    }
}
