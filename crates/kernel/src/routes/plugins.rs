//! Registered plugin listing.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tessera_sdk::PluginDescriptor;

use crate::state::AppState;

/// Create the plugin listing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/plugins", get(list_plugins))
}

/// Descriptors of all registered plugins, in canonical order.
async fn list_plugins(State(state): State<AppState>) -> Json<Vec<PluginDescriptor>> {
    Json(state.registry().descriptors())
}
