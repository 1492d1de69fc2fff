use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::value::RawValue;
use tessera_sdk::{ContentPlugin, SiteContext};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{AggregationError, EntryError, SiteContentDocument};
use crate::enablement::SiteEnablementResolver;
use crate::metrics::Metrics;
use crate::plugin::PluginRegistry;

/// Default per-plugin generation timeout.
const DEFAULT_PLUGIN_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default number of plugins generating at once.
const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Tuning for [`SiteContentAggregator`].
#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    /// Time budget for one plugin's `generate_json` call.
    pub plugin_timeout: Duration,
    /// Maximum plugins running concurrently for one document.
    pub max_concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            plugin_timeout: DEFAULT_PLUGIN_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// What a plugin task hands back.
struct Invocation {
    result: Result<Box<RawValue>, EntryError>,
    elapsed: Duration,
}

/// Assembles site content documents from the enabled plugins.
pub struct SiteContentAggregator {
    registry: Arc<PluginRegistry>,
    resolver: SiteEnablementResolver,
    config: AggregatorConfig,
    metrics: Option<Arc<Metrics>>,
}

impl SiteContentAggregator {
    pub fn new(
        registry: Arc<PluginRegistry>,
        resolver: SiteEnablementResolver,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            config,
            metrics: None,
        }
    }

    /// Record per-plugin outcomes and durations.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> AggregatorConfig {
        self.config
    }

    /// Build the content document for a site.
    pub async fn generate_site_document(
        &self,
        site_id: Uuid,
    ) -> Result<SiteContentDocument, AggregationError> {
        self.generate_site_document_with_cancel(site_id, &CancellationToken::new())
            .await
    }

    /// Build the content document for a site, stopping early when `cancel`
    /// fires.
    ///
    /// On cancellation, entries that already finished are kept and every
    /// other entry is reported as cancelled.
    pub async fn generate_site_document_with_cancel(
        &self,
        site_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<SiteContentDocument, AggregationError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_aggregation();
        }

        let resolved = match self.resolver.resolve(site_id).await {
            Ok(resolved) => resolved,
            Err(source) => {
                error!(site = %site_id, error = %source, "enablement resolution failed");
                if let Some(metrics) = &self.metrics {
                    metrics.record_aggregation_failure();
                }
                return Err(AggregationError::EnablementResolution { site_id, source });
            }
        };

        let mut names = Vec::with_capacity(resolved.len());
        let mut slots: Vec<Option<Result<Box<RawValue>, EntryError>>> =
            (0..resolved.len()).map(|_| None).collect();

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let plugin_cancel = cancel.child_token();
        let mut tasks = JoinSet::new();
        let mut task_slots = HashMap::new();

        for (index, entry) in resolved.into_iter().enumerate() {
            let Some(plugin) = self.registry.get(&entry.system_name) else {
                slots[index] = Some(Err(EntryError::PluginMissing));
                names.push(entry.system_name);
                continue;
            };

            let ctx = SiteContext::new(site_id)
                .with_configuration(entry.configuration)
                .with_cancellation(plugin_cancel.clone());
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.config.plugin_timeout;

            let handle = tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Invocation {
                        result: Err(EntryError::Cancelled),
                        elapsed: Duration::ZERO,
                    };
                };
                invoke(plugin, ctx, timeout).await
            });
            task_slots.insert(handle.id(), index);
            names.push(entry.system_name);
        }

        debug!(site = %site_id, entries = names.len(), tasks = tasks.len(), "aggregation started");

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    info!(site = %site_id, pending = tasks.len(), "aggregation cancelled");
                    tasks.abort_all();
                    break;
                }

                joined = tasks.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    self.store_outcome(joined, &task_slots, &names, &mut slots);
                }
            }
        }

        // Aborted tasks settle at their next yield point; anything that
        // finished before the abort is still kept.
        while let Some(joined) = tasks.join_next_with_id().await {
            self.store_outcome(joined, &task_slots, &names, &mut slots);
        }

        let mut document = SiteContentDocument::new(site_id);
        for (name, slot) in names.into_iter().zip(slots) {
            let result = slot.unwrap_or(Err(EntryError::Cancelled));
            match result {
                Ok(fragment) => {
                    self.record(&name, "ok");
                    document.content.push(name, fragment);
                }
                Err(e) => {
                    log_entry_error(site_id, &name, &e);
                    self.record(&name, e.reason().as_str());
                    document.omit(name, &e);
                }
            }
        }

        info!(
            site = %site_id,
            content = document.content.len(),
            omitted = document.omitted.len(),
            "site document generated"
        );

        Ok(document)
    }

    fn store_outcome(
        &self,
        joined: Result<(tokio::task::Id, Invocation), tokio::task::JoinError>,
        task_slots: &HashMap<tokio::task::Id, usize>,
        names: &[String],
        slots: &mut [Option<Result<Box<RawValue>, EntryError>>],
    ) {
        let (id, result) = match joined {
            Ok((id, invocation)) => {
                if let (Some(metrics), Some(&index)) = (&self.metrics, task_slots.get(&id)) {
                    metrics.record_duration(&names[index], invocation.elapsed.as_secs_f64());
                }
                (id, invocation.result)
            }
            Err(e) if e.is_panic() => (e.id(), Err(EntryError::Execution("plugin panicked".into()))),
            Err(e) => (e.id(), Err(EntryError::Cancelled)),
        };

        if let Some(&index) = task_slots.get(&id) {
            slots[index] = Some(result);
        }
    }

    fn record(&self, plugin: &str, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_invocation(plugin, outcome);
        }
    }
}

/// Validate, generate and check one plugin's fragment.
async fn invoke(
    plugin: Arc<dyn ContentPlugin>,
    ctx: SiteContext,
    timeout: Duration,
) -> Invocation {
    let started = Instant::now();
    let result = run_plugin(plugin.as_ref(), &ctx, timeout).await;
    Invocation {
        result,
        elapsed: started.elapsed(),
    }
}

async fn run_plugin(
    plugin: &dyn ContentPlugin,
    ctx: &SiteContext,
    timeout: Duration,
) -> Result<Box<RawValue>, EntryError> {
    plugin
        .validate_configuration(ctx.configuration.as_deref())
        .map_err(EntryError::ConfigurationInvalid)?;

    let fragment = tokio::time::timeout(timeout, plugin.generate_json(ctx))
        .await
        .map_err(|_| EntryError::TimedOut(timeout))??;

    RawValue::from_string(trim_json_whitespace(fragment))
        .map_err(|e| EntryError::Execution(format!("plugin returned invalid JSON: {e}")))
}

/// Strip JSON whitespace (space, tab, LF, CR) around a fragment.
///
/// The bytes between the first and last significant character are kept as-is.
fn trim_json_whitespace(fragment: String) -> String {
    let is_ws = |c: char| matches!(c, ' ' | '\t' | '\n' | '\r');
    let trimmed = fragment.trim_matches(is_ws);
    if trimmed.len() == fragment.len() {
        fragment
    } else {
        trimmed.to_string()
    }
}

fn log_entry_error(site_id: Uuid, plugin: &str, e: &EntryError) {
    match e {
        EntryError::ContentUnavailable(_) | EntryError::Cancelled => {
            debug!(site = %site_id, plugin = %plugin, reason = %e.reason(), "plugin entry omitted");
        }
        EntryError::PluginMissing | EntryError::ConfigurationInvalid(_) => {
            warn!(site = %site_id, plugin = %plugin, error = %e, "plugin entry omitted");
        }
        EntryError::Execution(_) | EntryError::TimedOut(_) => {
            error!(site = %site_id, plugin = %plugin, error = %e, "plugin entry failed");
        }
    }
}
