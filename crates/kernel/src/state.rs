//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tessera_sdk::{MemoryRecordSource, RecordSource};
use tracing::info;

use crate::aggregate::{AggregatorConfig, SiteContentAggregator};
use crate::config::Config;
use crate::db;
use crate::enablement::{
    EnablementStore, MemoryEnablementStore, PgEnablementStore, SiteEnablementResolver,
};
use crate::metrics::Metrics;
use crate::plugin::{self, PluginRegistry};
use crate::records::PgRecordStore;
use crate::seed::Seed;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool, absent in in-memory mode.
    db: Option<PgPool>,

    /// Registered content plugins, frozen after startup.
    registry: Arc<PluginRegistry>,

    /// Site document builder.
    aggregator: SiteContentAggregator,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Connects to PostgreSQL and applies migrations when `DATABASE_URL` is
    /// set, otherwise uses in-memory storage. A seed file is applied to
    /// whichever storage is in use.
    pub async fn new(config: &Config) -> Result<Self> {
        let seed = config
            .seed_file
            .as_deref()
            .map(Seed::load)
            .transpose()?;

        let (db, records, enablement): (
            Option<PgPool>,
            Arc<dyn RecordSource>,
            Arc<dyn EnablementStore>,
        ) = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url, config.database_max_connections)
                    .await
                    .context("failed to create database pool")?;
                db::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;

                let records = PgRecordStore::new(pool.clone());
                let enablement = PgEnablementStore::new(pool.clone());
                if let Some(seed) = &seed {
                    seed.apply_pg(&enablement, &records)
                        .await
                        .context("failed to apply seed data")?;
                }
                info!("using PostgreSQL storage");
                (Some(pool), Arc::new(records), Arc::new(enablement))
            }
            None => {
                let records = MemoryRecordSource::new();
                let enablement = MemoryEnablementStore::new();
                if let Some(seed) = &seed {
                    seed.apply_memory(&enablement, &records);
                }
                info!(
                    sites = enablement.site_count(),
                    records = records.len(),
                    "using in-memory storage"
                );
                (None, Arc::new(records), Arc::new(enablement))
            }
        };

        let registry = plugin::build_registry(
            plugin::bundled_plugins(records),
            &config.disabled_plugins,
        )
        .context("failed to register content plugins")?;

        Ok(Self::assemble(
            db,
            Arc::new(registry),
            enablement,
            config.aggregator(),
        ))
    }

    /// Assemble state from already-built parts, without a database.
    pub fn from_parts(
        registry: Arc<PluginRegistry>,
        enablement: Arc<dyn EnablementStore>,
        aggregator_config: AggregatorConfig,
    ) -> Self {
        Self::assemble(None, registry, enablement, aggregator_config)
    }

    fn assemble(
        db: Option<PgPool>,
        registry: Arc<PluginRegistry>,
        enablement: Arc<dyn EnablementStore>,
        aggregator_config: AggregatorConfig,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let resolver = SiteEnablementResolver::new(Arc::clone(&registry), enablement);
        let aggregator =
            SiteContentAggregator::new(Arc::clone(&registry), resolver, aggregator_config)
                .with_metrics(Arc::clone(&metrics));

        Self {
            inner: Arc::new(AppStateInner {
                db,
                registry,
                aggregator,
                metrics,
            }),
        }
    }

    /// Get the plugin registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.inner.registry
    }

    /// Get the site content aggregator.
    pub fn aggregator(&self) -> &SiteContentAggregator {
        &self.inner.aggregator
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Whether storage is backed by PostgreSQL.
    pub fn has_database(&self) -> bool {
        self.inner.db.is_some()
    }

    /// Check if PostgreSQL is healthy. `None` in in-memory mode.
    pub async fn postgres_healthy(&self) -> Option<bool> {
        match &self.inner.db {
            Some(pool) => Some(db::check_health(pool).await),
            None => None,
        }
    }
}
