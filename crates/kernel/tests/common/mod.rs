#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for kernel integration tests.
//!
//! Everything here runs against in-memory storage, so no database is
//! needed.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tessera_kernel::aggregate::{AggregatorConfig, SiteContentAggregator};
use tessera_kernel::enablement::{
    EnablementError, EnablementRecord, EnablementStore, MemoryEnablementStore,
    SiteEnablementResolver,
};
use tessera_kernel::plugin::PluginRegistry;
use tessera_kernel::routes;
use tessera_kernel::state::AppState;
use tessera_sdk::ContentPlugin;

/// Enablement store whose every lookup fails.
pub struct FailingEnablementStore;

#[async_trait]
impl EnablementStore for FailingEnablementStore {
    async fn get_enablement(&self, _site_id: Uuid) -> Result<Vec<EnablementRecord>, EnablementError> {
        Err(EnablementError::Backend("connection refused".into()))
    }
}

/// Aggregator settings with a short timeout for tests.
pub fn fast_config() -> AggregatorConfig {
    AggregatorConfig {
        plugin_timeout: Duration::from_millis(200),
        max_concurrency: 8,
    }
}

/// Registry holding `plugins` in the given order.
pub fn registry(plugins: Vec<Arc<dyn ContentPlugin>>) -> Arc<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    for plugin in plugins {
        registry.register(plugin).unwrap();
    }
    Arc::new(registry)
}

/// A site with every name in `enabled` switched on, in that store order.
pub fn site_with(enabled: &[&str]) -> (Uuid, Arc<MemoryEnablementStore>) {
    let site = Uuid::now_v7();
    let store = MemoryEnablementStore::new();
    for name in enabled {
        store.insert(site, EnablementRecord::enabled(*name));
    }
    (site, Arc::new(store))
}

pub fn aggregator(
    registry: Arc<PluginRegistry>,
    store: Arc<dyn EnablementStore>,
    config: AggregatorConfig,
) -> SiteContentAggregator {
    let resolver = SiteEnablementResolver::new(Arc::clone(&registry), store);
    SiteContentAggregator::new(registry, resolver, config)
}

/// Router over the given parts.
pub fn app(registry: Arc<PluginRegistry>, store: Arc<dyn EnablementStore>) -> Router {
    routes::router(AppState::from_parts(registry, store, fast_config()))
}

pub async fn get(router: &Router, uri: &str) -> Response {
    router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .expect("Failed to send request")
}

pub async fn response_text(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).to_string()
}

pub async fn response_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(&body);
        panic!("Failed to parse JSON: {text}");
    })
}

/// Parse an exported document.
pub fn document_json(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}
