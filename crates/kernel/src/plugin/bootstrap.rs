//! Startup registration of the bundled content plugins.
//!
//! Registration order here is the key order of every exported document, so
//! new plugins are appended at the end.

use std::sync::Arc;

use tessera_sdk::{ContentPlugin, RecordSource};
use tracing::info;

use super::{PluginRegistry, RegistryError};

/// Bundled plugins in canonical order.
pub fn bundled_plugins(records: Arc<dyn RecordSource>) -> Vec<Arc<dyn ContentPlugin>> {
    vec![
        Arc::new(tessera_pages::PagesPlugin::new(Arc::clone(&records))),
        Arc::new(tessera_products::ProductsPlugin::new(Arc::clone(&records))),
        Arc::new(tessera_tours::ToursPlugin::new(records)),
    ]
}

/// Whether a bundled plugin should be registered.
///
/// A plugin is skipped when its system name is listed in the
/// `DISABLED_PLUGINS` setting.
pub fn should_register(disabled_plugins: &[String], system_name: &str) -> bool {
    !disabled_plugins.iter().any(|d| d == system_name)
}

/// Build the registry from the given plugins, skipping disabled ones.
pub fn build_registry(
    plugins: Vec<Arc<dyn ContentPlugin>>,
    disabled_plugins: &[String],
) -> Result<PluginRegistry, RegistryError> {
    let mut registry = PluginRegistry::new();

    for plugin in plugins {
        if !should_register(disabled_plugins, plugin.system_name()) {
            info!(plugin = %plugin.system_name(), "plugin disabled by configuration");
            continue;
        }
        registry.register(plugin)?;
    }

    info!(count = registry.len(), "content plugins registered");
    Ok(registry)
}
