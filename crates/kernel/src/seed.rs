//! JSON seed data for sites, enablement and plugin records.
//!
//! ```json
//! {
//!   "sites": [{
//!     "id": "0190c6d2-8f1e-7cc3-9d0a-5b2e4f6a7b8c",
//!     "plugins": [{"system_name": "products", "configuration": {"currency": "EUR"}}],
//!     "records": {"product": [{"data": {"name": "Mug", "sku": "M-1", "price": 1250, "stock": 3}}]}
//!   }]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tessera_sdk::{MemoryRecordSource, Record};
use uuid::Uuid;

use crate::enablement::{EnablementRecord, MemoryEnablementStore, PgEnablementStore};
use crate::records::PgRecordStore;

/// Parsed seed file.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub sites: Vec<SeedSite>,
}

#[derive(Debug, Deserialize)]
pub struct SeedSite {
    pub id: Uuid,
    #[serde(default)]
    pub plugins: Vec<SeedPlugin>,
    /// Records by collection name.
    #[serde(default)]
    pub records: BTreeMap<String, Vec<Record>>,
}

#[derive(Debug, Deserialize)]
pub struct SeedPlugin {
    pub system_name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// A string is stored as-is; any other JSON value is stored serialized.
    #[serde(default)]
    pub configuration: Option<Value>,
}

fn default_enabled() -> bool {
    true
}

impl SeedPlugin {
    fn to_record(&self) -> EnablementRecord {
        let configuration = self.configuration.as_ref().map(|value| match value {
            Value::String(blob) => blob.clone(),
            other => other.to_string(),
        });
        EnablementRecord {
            system_name: self.system_name.clone(),
            enabled: self.enabled,
            configuration,
        }
    }
}

impl Seed {
    /// Read and parse a seed file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid seed file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Load into in-memory stores.
    pub fn apply_memory(&self, enablement: &MemoryEnablementStore, records: &MemoryRecordSource) {
        for site in &self.sites {
            for plugin in &site.plugins {
                enablement.insert(site.id, plugin.to_record());
            }
            for (collection, items) in &site.records {
                for record in items {
                    records.insert(site.id, collection, record.clone());
                }
            }
        }
    }

    /// Upsert into Postgres stores.
    pub async fn apply_pg(
        &self,
        enablement: &PgEnablementStore,
        records: &PgRecordStore,
    ) -> Result<()> {
        for site in &self.sites {
            for plugin in &site.plugins {
                enablement
                    .upsert(site.id, &plugin.to_record())
                    .await
                    .with_context(|| format!("failed to seed plugin {}", plugin.system_name))?;
            }
            for (collection, items) in &site.records {
                for record in items {
                    records
                        .upsert(site.id, collection, record)
                        .await
                        .with_context(|| format!("failed to seed {collection} record"))?;
                }
            }
        }
        Ok(())
    }

    /// Total number of records across all sites.
    pub fn record_count(&self) -> usize {
        self.sites
            .iter()
            .flat_map(|site| site.records.values())
            .map(Vec::len)
            .sum()
    }
}
