//! Tessera test utilities.
//!
//! Helpers for integration testing: a scriptable [`StubPlugin`], failing
//! storage doubles, and assertion helpers for exported site documents.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value as JsonValue;
use tessera_sdk::prelude::*;
use uuid::Uuid;

/// Create a fresh site identifier.
pub fn site_id() -> Uuid {
    Uuid::now_v7()
}

/// What a [`StubPlugin`] does when asked to generate JSON.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Return this fragment verbatim.
    Json(String),
    /// Report that the site has no content.
    Unavailable,
    /// Fail with a plugin fault.
    Fail(String),
    /// Panic inside the plugin.
    Panic,
    /// Sleep, then return the fragment.
    Delay(Duration, String),
    /// Never finish, ignoring cancellation.
    Hang,
    /// Wait until the invocation is cancelled.
    UntilCancelled,
}

/// A content plugin whose behaviour is scripted by the test.
pub struct StubPlugin {
    descriptor: PluginDescriptor,
    behavior: Behavior,
    requires_config: bool,
    calls: Arc<AtomicUsize>,
}

impl StubPlugin {
    /// A plugin returning `{"plugin":"<name>"}`.
    pub fn new(system_name: &str) -> Self {
        Self::json(system_name, &format!(r#"{{"plugin":"{system_name}"}}"#))
    }

    /// A plugin returning `fragment` verbatim.
    pub fn json(system_name: &str, fragment: &str) -> Self {
        Self::with_behavior(system_name, Behavior::Json(fragment.to_string()))
    }

    pub fn with_behavior(system_name: &str, behavior: Behavior) -> Self {
        Self {
            descriptor: PluginDescriptor::new(system_name, format!("Stub {system_name}"))
                .description("Scripted plugin for tests")
                .version("0.1.0"),
            behavior,
            requires_config: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reject a missing configuration blob.
    pub fn requiring_config(mut self) -> Self {
        self.requires_config = true;
        self
    }

    pub fn display_name(mut self, display_name: &str) -> Self {
        self.descriptor.display_name = display_name.to_string();
        self
    }

    /// Counter of `generate_json` calls, usable after the plugin moved into a registry.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn into_arc(self) -> Arc<dyn ContentPlugin> {
        Arc::new(self)
    }

    async fn run(&self, ctx: &SiteContext) -> Result<String, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Json(fragment) => Ok(fragment.clone()),
            Behavior::Unavailable => Err(ContentError::unavailable("stub has no content")),
            Behavior::Fail(message) => Err(ContentError::failed(message.clone())),
            Behavior::Panic => panic!("stub plugin '{}' panicked", self.descriptor.system_name),
            Behavior::Delay(delay, fragment) => {
                tokio::time::sleep(*delay).await;
                Ok(fragment.clone())
            }
            Behavior::Hang => std::future::pending().await,
            Behavior::UntilCancelled => {
                ctx.cancelled().await;
                Err(ContentError::Cancelled)
            }
        }
    }
}

#[async_trait]
impl ContentPlugin for StubPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn validate_configuration(&self, config: Option<&str>) -> Result<(), ValidationError> {
        match config {
            None if self.requires_config => Err(ValidationError::Required),
            _ => Ok(()),
        }
    }

    async fn get_content(&self, ctx: &SiteContext) -> Result<JsonValue, ContentError> {
        let fragment = self.run(ctx).await?;
        Ok(serde_json::from_str(&fragment)?)
    }

    async fn generate_json(&self, ctx: &SiteContext) -> Result<String, ContentError> {
        self.run(ctx).await
    }
}

/// A record source whose every call fails.
#[derive(Debug, Clone)]
pub struct FailingRecordSource {
    message: String,
}

impl FailingRecordSource {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl RecordSource for FailingRecordSource {
    async fn list(&self, _site_id: Uuid, _collection: &str) -> Result<Vec<Record>, RecordError> {
        Err(RecordError::Backend(self.message.clone()))
    }
}

/// Assertion helpers for exported documents.
pub mod assert {
    use serde_json::Value;

    /// Assert the `content` object's keys, in order.
    pub fn content_keys(document: &Value, expected: &[&str]) {
        let keys: Vec<&str> = document["content"]
            .as_object()
            .map(|content| content.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, expected, "unexpected content keys in {document}");
    }

    /// Assert an entry in `omitted` has the given reason.
    pub fn omitted_with(document: &Value, system_name: &str, reason: &str) {
        let found = document["omitted"].as_array().is_some_and(|omitted| {
            omitted
                .iter()
                .any(|o| o["systemName"] == system_name && o["reason"] == reason)
        });
        assert!(
            found,
            "expected '{system_name}' omitted with reason '{reason}', got: {document}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
