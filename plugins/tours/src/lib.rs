//! Tours plugin for Tessera.
//!
//! Exports scheduled tours from the `tour` record collection, ordered by start
//! date. Optional configuration caps the number of exported tours:
//!
//! ```json
//! { "limit": 10 }
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tessera_sdk::prelude::*;
use tracing::warn;
use uuid::Uuid;

/// Registry and document key.
pub const SYSTEM_NAME: &str = "tours";

/// Record collection the plugin reads.
pub const COLLECTION: &str = "tour";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToursConfig {
    /// Maximum number of tours to export (None = all).
    pub limit: Option<usize>,
}

impl ValidateConfig for ToursConfig {
    fn check(&self) -> Result<(), ValidationError> {
        if self.limit == Some(0) {
            return Err(ValidationError::rejected("limit must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StoredTour {
    title: String,
    /// ISO date, e.g. "2026-05-01".
    starts_on: String,
    #[serde(default = "default_duration")]
    duration_days: u32,
}

fn default_duration() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourEntry {
    pub id: Uuid,
    pub title: String,
    pub starts_on: NaiveDate,
    pub duration_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToursContent {
    pub tours: Vec<TourEntry>,
}

/// Content plugin exporting the tour schedule.
pub struct ToursPlugin {
    descriptor: PluginDescriptor,
    validator: OptionalJsonConfig<ToursConfig>,
    records: Arc<dyn RecordSource>,
}

impl ToursPlugin {
    pub fn new(records: Arc<dyn RecordSource>) -> Self {
        Self {
            descriptor: PluginDescriptor::new(SYSTEM_NAME, "Tours")
                .description("Scheduled tours ordered by start date")
                .version(env!("CARGO_PKG_VERSION")),
            validator: OptionalJsonConfig::new(),
            records,
        }
    }
}

#[async_trait]
impl ContentProvider for ToursPlugin {
    type Content = ToursContent;

    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn validator(&self) -> &dyn ConfigValidator {
        &self.validator
    }

    async fn get_content(&self, ctx: &SiteContext) -> Result<ToursContent, ContentError> {
        let config: ToursConfig = ctx.parse_configuration()?;
        let records = self.records.list(ctx.site_id, COLLECTION).await?;
        ctx.ensure_active()?;

        let mut tours = Vec::new();
        for record in records.iter().filter(|r| r.published) {
            let stored: StoredTour = record
                .decode()
                .map_err(|e| RecordError::Corrupt(format!("tour {}: {e}", record.id)))?;

            // A bad date on one tour should not hide the rest of the schedule.
            let Ok(starts_on) = NaiveDate::parse_from_str(&stored.starts_on, "%Y-%m-%d") else {
                warn!(
                    site = %ctx.site_id,
                    tour = %record.id,
                    starts_on = %stored.starts_on,
                    "skipping tour with unparseable start date"
                );
                continue;
            };

            tours.push(TourEntry {
                id: record.id,
                title: stored.title,
                starts_on,
                duration_days: stored.duration_days,
            });
        }

        if tours.is_empty() {
            return Err(ContentError::unavailable("site has no scheduled tours"));
        }

        tours.sort_by(|a, b| a.starts_on.cmp(&b.starts_on).then_with(|| a.title.cmp(&b.title)));
        if let Some(limit) = config.limit {
            tours.truncate(limit);
        }

        Ok(ToursContent { tours })
    }
}
