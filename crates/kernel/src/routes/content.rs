//! Site content export endpoint.

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Create the content export router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/sites/{site_id}/content", get(site_content))
}

#[derive(Debug, Default, Deserialize)]
struct ExportQuery {
    #[serde(default)]
    pretty: bool,
}

/// Export the aggregated content document of a site.
///
/// Dropping the request (client disconnect) drops the aggregation, which
/// aborts every plugin task still running.
async fn site_content(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let site_id = Uuid::parse_str(&site_id)
        .map_err(|_| AppError::BadRequest(format!("invalid site id '{site_id}'")))?;

    let document = state.aggregator().generate_site_document(site_id).await?;

    let body = if query.pretty {
        document.to_json_pretty()
    } else {
        document.to_json()
    }
    .context("failed to serialize site document")?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response())
}
