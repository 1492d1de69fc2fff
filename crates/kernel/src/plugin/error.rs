//! Plugin registration error types.
//!
//! Registration errors are fatal at startup, so messages name the plugin and
//! say what to change.

use thiserror::Error;

/// Errors returned by [`PluginRegistry::register`](super::PluginRegistry::register).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Another plugin already uses this system name.
    #[error(
        "plugin '{system_name}': system name already registered by '{existing}'; system names must be unique"
    )]
    DuplicateName {
        system_name: String,
        existing: String,
    },

    /// The system name cannot be used as a registry and document key.
    #[error(
        "plugin '{system_name}': invalid system name; use 1-64 characters of a-z, 0-9 or '_', starting with a letter"
    )]
    InvalidName { system_name: String },
}

impl RegistryError {
    pub fn duplicate(system_name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::DuplicateName {
            system_name: system_name.into(),
            existing: existing.into(),
        }
    }

    pub fn invalid(system_name: impl Into<String>) -> Self {
        Self::InvalidName {
            system_name: system_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_both_plugins() {
        let msg = RegistryError::duplicate("pages", "Pages").to_string();
        assert!(msg.contains("'pages'"));
        assert!(msg.contains("'Pages'"));
        assert!(msg.contains("unique"));
    }

    #[test]
    fn invalid_name_explains_format() {
        let msg = RegistryError::invalid("Bad Name").to_string();
        assert!(msg.contains("Bad Name"));
        assert!(msg.contains("a-z"));
    }
}
