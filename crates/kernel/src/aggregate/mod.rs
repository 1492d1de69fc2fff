//! Site content aggregation.
//!
//! Builds one JSON document per site from every plugin enabled there. Each
//! plugin runs in its own task; a plugin that fails, hangs or panics yields an
//! omission instead of taking the document down with it.

mod aggregator;
mod document;
mod error;

pub use aggregator::{AggregatorConfig, SiteContentAggregator};
pub use document::{Omission, OmissionReason, SiteContent, SiteContentDocument};
pub use error::{AggregationError, EntryError};
