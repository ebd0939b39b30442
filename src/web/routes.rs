//! HTTP routes for the web visualization
//!
//! Provides the rendered map page and JSON API endpoints. Each request
//! reloads the workbook; nothing is cached between requests.

use std::sync::{Arc, PoisonError};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::graph::GraphData;
use super::page::escape_html;
use super::server::AppState;
use crate::config::MapConfig;
use crate::filter::TierFilter;
use crate::pipeline::{self, RenderContext};
use crate::theme::ThemeMode;
use crate::workbook::load_network;

/// Query parameters shared by the page and the graph API
#[derive(Debug, Default, Deserialize)]
pub struct MapQuery {
    pub theme: Option<String>,
    pub tier: Option<String>,
}

impl MapQuery {
    /// Resolve the query into a render context; a bad theme is rejected and a
    /// missing one falls back to the configured default
    pub fn context(&self, config: &MapConfig) -> Result<RenderContext, String> {
        let theme = match self.theme.as_deref() {
            Some(value) if !value.is_empty() => value.parse::<ThemeMode>()?,
            _ => config.view.theme,
        };
        let tier = self
            .tier
            .as_deref()
            .map(TierFilter::from_option)
            .unwrap_or_default();

        Ok(RenderContext::from_config(config, theme, tier))
    }
}

/// Graph API response
#[derive(Serialize)]
struct GraphResponse {
    theme: ThemeMode,
    tier: String,
    tier_options: Option<Vec<String>>,
    graph: GraphData,
}

/// Tier API response
#[derive(Serialize)]
struct TiersResponse {
    tiers: Option<Vec<String>>,
}

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/graph", get(get_graph))
        .route("/api/tiers", get(get_tiers))
        .route("/api/health", get(health_check))
}

/// Create page routes
pub fn page_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index_html))
}

fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn task_failed(e: tokio::task::JoinError) -> Response {
    error!("Render task failed: {}", e);
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Render task failed".to_string(),
    )
}

/// GET / - Render the full page for the requested theme and tier
async fn index_html(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Response {
    let mut ctx = match query.context(&state.config) {
        Ok(ctx) => ctx,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };
    ctx.interactive = true;

    let result = tokio::task::spawn_blocking(move || {
        let _guard = state
            .render_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pipeline::render(&ctx)
    })
    .await;

    match result {
        Ok(Ok(page)) => Html(page.html).into_response(),
        Ok(Err(e)) => {
            error!("Render failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    "<!DOCTYPE html><html><body><h1>Render failed</h1><pre>{}</pre></body></html>",
                    escape_html(&e.to_string())
                )),
            )
                .into_response()
        }
        Err(e) => task_failed(e),
    }
}

/// GET /api/graph - Returns the filtered graph as JSON
async fn get_graph(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Response {
    let ctx = match query.context(&state.config) {
        Ok(ctx) => ctx,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, e),
    };

    let result = tokio::task::spawn_blocking(move || {
        pipeline::build_view(&ctx).map(|view| GraphResponse {
            theme: ctx.theme,
            tier: ctx.tier.to_string(),
            tier_options: view.tier_options,
            graph: view.graph,
        })
    })
    .await;

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) => json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => task_failed(e),
    }
}

/// GET /api/tiers - Returns the tier select options
async fn get_tiers(State(state): State<Arc<AppState>>) -> Response {
    let workbook = state.config.data.workbook.clone();

    let result = tokio::task::spawn_blocking(move || {
        load_network(&workbook).map(|network| TiersResponse {
            tiers: crate::filter::tier_options(&network.nodes),
        })
    })
    .await;

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) => json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => task_failed(e),
    }
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
