//! HTTP route handlers.

pub mod content;
pub mod health;
pub mod metrics;
pub mod plugins;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(metrics::router())
        .merge(plugins::router())
        .merge(content::router())
        // TraceLayer → track_metrics → routes
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::track_metrics,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
