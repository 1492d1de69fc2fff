use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use uuid::Uuid;

use super::EntryError;

/// Why an enabled plugin has no entry in `content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    PluginMissing,
    ConfigurationInvalid,
    ContentUnavailable,
    ExecutionFailed,
    TimedOut,
    Cancelled,
}

impl OmissionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PluginMissing => "plugin_missing",
            Self::ConfigurationInvalid => "configuration_invalid",
            Self::ContentUnavailable => "content_unavailable",
            Self::ExecutionFailed => "execution_failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enabled plugin that produced no fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Omission {
    pub system_name: String,
    pub reason: OmissionReason,
    pub detail: String,
}

/// Plugin fragments keyed by system name, in canonical order.
///
/// Fragments are kept as raw JSON text and written out byte for byte, minus
/// any JSON whitespace the plugin put before or after the value.
#[derive(Debug, Clone, Default)]
pub struct SiteContent {
    entries: Vec<(String, Box<RawValue>)>,
}

impl SiteContent {
    /// Append a fragment. Returns `false` if the name is already present.
    pub(crate) fn push(&mut self, system_name: String, fragment: Box<RawValue>) -> bool {
        if self.contains(&system_name) {
            return false;
        }
        self.entries.push((system_name, fragment));
        true
    }

    /// Raw fragment text for a plugin, trimmed of surrounding whitespace.
    pub fn get(&self, system_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == system_name)
            .map(|(_, fragment)| fragment.get())
    }

    pub fn contains(&self, system_name: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == system_name)
    }

    /// System names in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SiteContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, fragment) in &self.entries {
            map.serialize_entry(name, fragment)?;
        }
        map.end()
    }
}

/// The exported content document for one site.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContentDocument {
    pub site_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub content: SiteContent,
    pub omitted: Vec<Omission>,
}

impl SiteContentDocument {
    pub fn new(site_id: Uuid) -> Self {
        Self {
            site_id,
            generated_at: Utc::now(),
            content: SiteContent::default(),
            omitted: Vec::new(),
        }
    }

    /// Record a failed entry.
    pub(crate) fn omit(&mut self, system_name: String, error: &EntryError) {
        self.omitted.push(Omission {
            system_name,
            reason: error.reason(),
            detail: error.to_string(),
        });
    }

    /// Omission recorded for a plugin, if any.
    pub fn omission(&self, system_name: &str) -> Option<&Omission> {
        self.omitted.iter().find(|o| o.system_name == system_name)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
