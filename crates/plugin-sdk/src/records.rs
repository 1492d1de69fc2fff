//! Generic storage contract used by plugins to read their site data.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::errors::RecordError;
use crate::types::Record;

/// Read access to per-site record collections.
///
/// Implementations must return an empty list, not an error, for a site or
/// collection with no records. Records come back ordered by weight, then by
/// last change.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn list(&self, site_id: Uuid, collection: &str) -> Result<Vec<Record>, RecordError>;
}

/// In-process record source.
///
/// Backs the kernel's database-less mode and plugin tests.
#[derive(Debug, Default)]
pub struct MemoryRecordSource {
    records: RwLock<HashMap<(Uuid, String), Vec<Record>>>,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to a site's collection.
    pub fn insert(&self, site_id: Uuid, collection: &str, record: Record) {
        self.records
            .write()
            .entry((site_id, collection.to_string()))
            .or_default()
            .push(record);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, site_id: Uuid, collection: &str, record: Record) -> Self {
        self.insert(site_id, collection, record);
        self
    }

    /// Number of records across all sites and collections.
    pub fn len(&self) -> usize {
        self.records.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn list(&self, site_id: Uuid, collection: &str) -> Result<Vec<Record>, RecordError> {
        let mut records = self
            .records
            .read()
            .get(&(site_id, collection.to_string()))
            .cloned()
            .unwrap_or_default();
        records.sort_by_key(|r| (r.weight, r.changed));
        Ok(records)
    }
}
