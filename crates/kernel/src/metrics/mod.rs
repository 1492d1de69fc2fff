//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub path: String,
    pub status: u16,
}

/// Plugin invocation labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct InvocationLabels {
    pub plugin: String,
    pub outcome: String,
}

/// Per-plugin labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PluginLabels {
    pub plugin: String,
}

/// Application metrics.
///
/// Counters are registered without the `_total` suffix; the encoder adds it.
pub struct Metrics {
    registry: Registry,

    /// HTTP request counter by method/path/status.
    pub http_requests: Family<HttpLabels, Counter>,

    /// HTTP request duration histogram.
    pub http_duration_seconds: Family<HttpLabels, Histogram>,

    /// Plugin invocations by outcome ("ok" or an omission reason).
    pub plugin_invocations: Family<InvocationLabels, Counter>,

    /// Plugin content generation duration.
    pub plugin_duration_seconds: Family<PluginLabels, Histogram>,

    /// Site documents requested.
    pub aggregations: Counter,

    /// Site documents that could not be produced at all.
    pub aggregation_failures: Counter,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<HttpLabels, Counter>::default();
        registry.register(
            "http_requests",
            "Total HTTP requests",
            http_requests.clone(),
        );

        let http_duration_seconds = Family::<HttpLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 12))
        });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_duration_seconds.clone(),
        );

        let plugin_invocations = Family::<InvocationLabels, Counter>::default();
        registry.register(
            "plugin_invocations",
            "Content plugin invocations by outcome",
            plugin_invocations.clone(),
        );

        let plugin_duration_seconds =
            Family::<PluginLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.0001, 2.0, 16))
            });
        registry.register(
            "plugin_duration_seconds",
            "Content plugin generation duration in seconds",
            plugin_duration_seconds.clone(),
        );

        let aggregations = Counter::default();
        registry.register(
            "aggregations",
            "Site content documents requested",
            aggregations.clone(),
        );

        let aggregation_failures = Counter::default();
        registry.register(
            "aggregation_failures",
            "Site content documents that failed entirely",
            aggregation_failures.clone(),
        );

        Self {
            registry,
            http_requests,
            http_duration_seconds,
            plugin_invocations,
            plugin_duration_seconds,
            aggregations,
            aggregation_failures,
        }
    }

    /// Record an HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: normalize_path(path),
            status,
        };

        self.http_requests.get_or_create(&labels).inc();
        self.http_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record the outcome of one plugin entry.
    pub fn record_invocation(&self, plugin: &str, outcome: &str) {
        self.plugin_invocations
            .get_or_create(&InvocationLabels {
                plugin: plugin.to_string(),
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Record how long a plugin spent generating its fragment.
    pub fn record_duration(&self, plugin: &str, duration_secs: f64) {
        self.plugin_duration_seconds
            .get_or_create(&PluginLabels {
                plugin: plugin.to_string(),
            })
            .observe(duration_secs);
    }

    /// Record the start of a site aggregation.
    pub fn record_aggregation(&self) {
        self.aggregations.inc();
    }

    /// Record a site aggregation that failed outright.
    pub fn record_aggregation_failure(&self) {
        self.aggregation_failures.inc();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible, and all metric
    /// labels use derived `EncodeLabelSet` impls that do not produce
    /// `fmt::Error`.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}

/// Normalize a path for metrics labels.
///
/// Site IDs and numeric segments become `{id}` to limit cardinality.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|s| {
            if uuid::Uuid::parse_str(s).is_ok()
                || (!s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            {
                "{id}"
            } else {
                s
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_site_ids() {
        assert_eq!(
            normalize_path("/api/sites/550e8400-e29b-41d4-a716-446655440000/content"),
            "/api/sites/{id}/content"
        );
        assert_eq!(normalize_path("/api/plugins"), "/api/plugins");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn registers_all_families() {
        let metrics = Metrics::new();
        metrics.record_aggregation();
        let output = metrics.encode();
        assert!(output.contains("aggregations_total"));
        assert!(output.contains("aggregation_failures_total"));
    }

    #[test]
    fn records_invocation_outcome() {
        let metrics = Metrics::new();
        metrics.record_invocation("pages", "timed_out");
        metrics.record_duration("pages", 0.5);

        let output = metrics.encode();
        assert!(output.contains("plugin_invocations_total"));
        assert!(output.contains(r#"outcome="timed_out""#));
        assert!(output.contains("plugin_duration_seconds"));
    }
}
