use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{EnablementError, EnablementRecord, EnablementStore};

/// In-memory enablement store, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryEnablementStore {
    sites: RwLock<HashMap<Uuid, Vec<EnablementRecord>>>,
}

impl MemoryEnablementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row for a site. Rows are kept in insertion order.
    pub fn insert(&self, site_id: Uuid, record: EnablementRecord) {
        self.sites.write().entry(site_id).or_default().push(record);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, site_id: Uuid, record: EnablementRecord) -> Self {
        self.insert(site_id, record);
        self
    }

    /// Replace every row of a site.
    pub fn replace(&self, site_id: Uuid, records: Vec<EnablementRecord>) {
        self.sites.write().insert(site_id, records);
    }

    /// Number of sites with at least one row.
    pub fn site_count(&self) -> usize {
        self.sites.read().len()
    }
}

#[async_trait]
impl EnablementStore for MemoryEnablementStore {
    async fn get_enablement(&self, site_id: Uuid) -> Result<Vec<EnablementRecord>, EnablementError> {
        Ok(self.sites.read().get(&site_id).cloned().unwrap_or_default())
    }
}
