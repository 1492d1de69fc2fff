use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use super::{EnablementError, EnablementStore};
use crate::plugin::PluginRegistry;

/// An enabled plugin for one site, with its site-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlugin {
    pub system_name: String,
    pub configuration: Option<String>,
}

/// Determines which plugins are switched on for a site.
#[derive(Clone)]
pub struct SiteEnablementResolver {
    registry: Arc<PluginRegistry>,
    store: Arc<dyn EnablementStore>,
}

impl SiteEnablementResolver {
    pub fn new(registry: Arc<PluginRegistry>, store: Arc<dyn EnablementStore>) -> Self {
        Self { registry, store }
    }

    /// Enabled plugins for `site_id`.
    ///
    /// Registered plugins come first in registration order. Enabled names the
    /// registry does not know follow in store order. When the store holds
    /// more than one row for a name, the first row wins.
    pub async fn resolve(&self, site_id: Uuid) -> Result<Vec<ResolvedPlugin>, EnablementError> {
        let rows = self.store.get_enablement(site_id).await?;

        let mut seen = HashSet::new();
        let mut registered = Vec::new();
        let mut unknown = Vec::new();

        for row in rows {
            if !seen.insert(row.system_name.clone()) {
                warn!(
                    site = %site_id,
                    plugin = %row.system_name,
                    "duplicate enablement row ignored"
                );
                continue;
            }
            if !row.enabled {
                continue;
            }

            let resolved = ResolvedPlugin {
                system_name: row.system_name,
                configuration: row.configuration,
            };
            match self.registry.position(&resolved.system_name) {
                Some(position) => registered.push((position, resolved)),
                None => unknown.push(resolved),
            }
        }

        registered.sort_by_key(|(position, _)| *position);

        Ok(registered
            .into_iter()
            .map(|(_, resolved)| resolved)
            .chain(unknown)
            .collect())
    }
}
