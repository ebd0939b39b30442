//! Web server for the stakeholder map
//!
//! Provides an HTTP server using Axum. Every page request reruns the whole
//! render pipeline with the theme and tier taken from the query string.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::MapConfig;

use super::routes;

/// Shared application state
pub struct AppState {
    pub config: MapConfig,
    /// Held for the duration of a render so the fragment file is never shared
    pub render_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            render_lock: Mutex::new(()),
        }
    }
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            open_browser: true,
        }
    }
}

/// Build the router with all routes attached to `state`
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .merge(routes::page_routes())
        .with_state(state)
}

/// Start the web server and serve the map
pub async fn start_server(
    config: MapConfig,
    server: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(AppState::new(config));
    let app = app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], server.port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", server.port);
    info!("Starting web server at {}", url);

    if server.open_browser {
        info!("Opening browser...");
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
            warn!("Please open {} manually", url);
        }
    }

    info!("Press Ctrl+C to stop the server");

    axum::serve(listener, app).await?;

    Ok(())
}
