//! Plugin registry - catalog of content plugins keyed by system name.
//!
//! The registry is filled once by bootstrap code, then frozen behind an `Arc`
//! and shared read-only. Registration order is the canonical order of
//! entries in every exported site document.

use std::collections::HashMap;
use std::sync::Arc;

use tessera_sdk::{ContentPlugin, PluginDescriptor};
use tracing::debug;

use super::RegistryError;

/// Maximum length of a plugin system name.
const MAX_SYSTEM_NAME_LEN: usize = 64;

/// Validate a system name: non-empty, lowercase alphanumeric/underscore,
/// starting with a letter, max 64 chars.
pub fn is_valid_system_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_SYSTEM_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_lowercase())
}

/// In-memory catalog of registered content plugins.
#[derive(Default)]
pub struct PluginRegistry {
    /// Plugins in registration order.
    plugins: Vec<Arc<dyn ContentPlugin>>,
    /// System name to index into `plugins`.
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin.
    ///
    /// Fails without modifying the registry if the system name is invalid
    /// or already taken.
    pub fn register(&mut self, plugin: Arc<dyn ContentPlugin>) -> Result<(), RegistryError> {
        let name = plugin.system_name().to_string();

        if !is_valid_system_name(&name) {
            return Err(RegistryError::invalid(name));
        }

        if let Some(&existing) = self.index.get(&name) {
            let existing = self.plugins[existing].descriptor().display_name.clone();
            return Err(RegistryError::duplicate(name, existing));
        }

        debug!(
            plugin = %name,
            version = %plugin.descriptor().version,
            position = self.plugins.len(),
            "registered content plugin"
        );

        self.index.insert(name, self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, plugin: Arc<dyn ContentPlugin>) -> Result<Self, RegistryError> {
        self.register(plugin)?;
        Ok(self)
    }

    /// Look up a plugin by system name.
    pub fn get(&self, system_name: &str) -> Option<Arc<dyn ContentPlugin>> {
        self.index
            .get(system_name)
            .map(|&i| Arc::clone(&self.plugins[i]))
    }

    /// Check if a plugin is registered.
    pub fn contains(&self, system_name: &str) -> bool {
        self.index.contains_key(system_name)
    }

    /// Registration index of a plugin.
    pub fn position(&self, system_name: &str) -> Option<usize> {
        self.index.get(system_name).copied()
    }

    /// All plugins, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn ContentPlugin>> {
        self.plugins.iter()
    }

    /// Descriptors of all plugins, in registration order.
    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        self.plugins.iter().map(|p| p.descriptor().clone()).collect()
    }

    /// Get the count of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.plugins.iter().map(|p| p.system_name()).collect();
        f.debug_struct("PluginRegistry")
            .field("plugins", &names)
            .finish()
    }
}
