//! # Server Module
//!
//! HTTP server setup and route configuration for the DCA tool gateway.

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderName, Method, StatusCode, header},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::account::AccountContext;
use crate::config::{Config, ToolConfig};
use crate::error::ApiError;
use crate::manifest::{PluginManifest, build_document};
use crate::routes::{account, dca, health::ping, pairs, plugin};
use crate::sdk::{ClientFactory, DeltaTradeClient, SdkManager, http::HttpClientFactory};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub sdk: Arc<SdkManager>,
    pub manifest: Arc<PluginManifest>,
    pub tools: Arc<ToolConfig>,
}

impl AppState {
    pub fn new(factory: Arc<dyn ClientFactory>, manifest: PluginManifest, tools: ToolConfig) -> Self {
        Self {
            sdk: Arc::new(SdkManager::new(factory)),
            manifest: Arc::new(manifest),
            tools: Arc::new(tools),
        }
    }

    /// Client for market data, which does not depend on who is asking
    pub fn public_client(&self, account: &AccountContext) -> Result<Arc<dyn DeltaTradeClient>, ApiError> {
        self.sdk
            .client_for(account)
            .map_err(ApiError::upstream("Failed to initialise Delta Trade client"))
    }

    /// Client acting for the caller; enforces strict account mode
    pub fn account_client(&self, account: &AccountContext) -> Result<Arc<dyn DeltaTradeClient>, ApiError> {
        self.require_account(account)?;
        self.public_client(account)
    }

    pub fn require_account(&self, account: &AccountContext) -> Result<(), ApiError> {
        if self.tools.require_account && !account.is_explicit() {
            return Err(ApiError::MissingAccount);
        }
        Ok(())
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::CONTENT_LENGTH,
            header::DATE,
            header::IF_NONE_MATCH,
            HeaderName::from_static("mb-metadata"),
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept-version"),
            HeaderName::from_static("content-md5"),
            HeaderName::from_static("x-api-version"),
        ])
        .expose_headers([header::ETAG])
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Exact-path dispatcher with CORS on every response, including preflight
/// and 404s.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .merge(plugin::create_routes())
        .merge(pairs::create_routes())
        .merge(dca::create_routes())
        .merge(account::create_routes())
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(cors_layer()))
        .with_state(state)
}

/// Starts the gateway and serves until the process is terminated.
pub async fn start(config: Config) -> Result<()> {
    let factory = HttpClientFactory::new(&config.upstream)
        .context("Failed to build Delta Trade API client")?;
    let manifest = PluginManifest::new(&build_document(&config.plugin));
    let state = AppState::new(Arc::new(factory), manifest, config.tools.clone());

    let app = build_router(state);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind to {}:{} - port may already be in use",
                config.server.host, config.server.port
            )
        })?;
    let addr = listener.local_addr()?;

    tracing::info!("🚀 DCA gateway listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("📜 Plugin manifest at http://{}/.well-known/ai-plugin.json", addr);
    tracing::info!("🌐 Network: {:?}, Delta Trade API: {}", config.network, config.upstream.api_url);
    if config.tools.require_account {
        tracing::info!("🔒 Tool calls without mb-metadata account are rejected");
    }

    axum::serve(listener, app).await.context("HTTP server terminated")?;
    Ok(())
}
