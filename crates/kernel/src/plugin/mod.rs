//! Content plugin registration for Tessera.
//!
//! This module handles:
//! - Validating plugin system names
//! - Keeping registered plugins in canonical order
//! - Registering the bundled plugins at startup

mod bootstrap;
mod error;
mod registry;

pub use bootstrap::{build_registry, bundled_plugins, should_register};
pub use error::RegistryError;
pub use registry::{PluginRegistry, is_valid_system_name};
