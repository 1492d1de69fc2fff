//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::aggregate::AggregatorConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. When None, storage is in-memory.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// JSON file of sites, enablement and records loaded at startup.
    pub seed_file: Option<PathBuf>,

    /// Per-plugin generation timeout (default: 5000 ms).
    pub plugin_timeout: Duration,

    /// Plugins generating concurrently for one site (default: 8).
    pub max_concurrent_plugins: usize,

    /// Bundled plugins to leave unregistered (from DISABLED_PLUGINS env var).
    pub disabled_plugins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let seed_file = lookup("SEED_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let plugin_timeout_ms: u64 = lookup("PLUGIN_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .context("PLUGIN_TIMEOUT_MS must be a valid u64")?;
        if plugin_timeout_ms == 0 {
            bail!("PLUGIN_TIMEOUT_MS must be greater than zero");
        }

        let max_concurrent_plugins: usize = lookup("MAX_CONCURRENT_PLUGINS")
            .unwrap_or_else(|| "8".to_string())
            .parse()
            .context("MAX_CONCURRENT_PLUGINS must be a valid usize")?;
        if max_concurrent_plugins == 0 {
            bail!("MAX_CONCURRENT_PLUGINS must be greater than zero");
        }

        let disabled_plugins = lookup("DISABLED_PLUGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            seed_file,
            plugin_timeout: Duration::from_millis(plugin_timeout_ms),
            max_concurrent_plugins,
            disabled_plugins,
        })
    }

    /// Aggregator settings derived from this configuration.
    pub fn aggregator(&self) -> AggregatorConfig {
        AggregatorConfig {
            plugin_timeout: self.plugin_timeout,
            max_concurrency: self.max_concurrent_plugins,
        }
    }
}
