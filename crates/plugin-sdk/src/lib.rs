//! Tessera Plugin SDK
//!
//! Traits, configuration validators, and storage contracts for content
//! plugins. Plugins depend on this crate only; the kernel registers them at
//! startup and calls them through [`ContentPlugin`].

pub mod errors;
pub mod plugin;
pub mod records;
pub mod types;
pub mod validate;

pub use errors::{ContentError, RecordError, ValidationError};
pub use plugin::{ContentPlugin, ContentProvider};
pub use records::{MemoryRecordSource, RecordSource};
pub use types::{PluginDescriptor, Record, SiteContext};

// Re-exported so plugins implement the traits without a direct dependency.
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

pub mod prelude {
    pub use crate::errors::*;
    pub use crate::plugin::{ContentPlugin, ContentProvider};
    pub use crate::records::{MemoryRecordSource, RecordSource};
    pub use crate::types::*;
    pub use crate::validate::*;
    pub use async_trait::async_trait;
    pub use tokio_util::sync::CancellationToken;
}
