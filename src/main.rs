//! # Delta DCA Gateway
//!
//! HTTP gateway exposing Delta Trade DCA tools to an AI assistant runtime,
//! built with Rust, Axum, and Tokio.
//!
//! ## Features
//! - Tool endpoints for trading pairs, prices, DCA vaults and account assets
//! - Plugin manifest with ETag / `If-None-Match` support
//! - Per-account Delta Trade client cache driven by the `mb-metadata` header
//! - Permissive CORS on every response, including preflight and 404s
//!
//! ## Architecture
//! - `server`: router assembly, shared state and startup
//! - `config`: environment variable configuration management
//! - `account`: caller account resolution
//! - `sdk`: Delta Trade client trait, HTTP implementation and cache
//! - `routes`: HTTP route handlers organized by tool family
//! - `format`: human-readable summaries for the assistant
//! - `manifest`: plugin manifest document
//! - `error`: JSON error envelope
//!
//! ## Environment Setup
//! Configuration is read from the environment (a `.env` file is loaded when
//! present). See `config.rs` for the full list; the important ones are
//! `BITTE_KEY`, `BITTE_CONFIG`, `NEAR_ENV` and `PORT`.
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! curl http://localhost:3000/ping
//! ```

mod account;
mod config;
mod error;
mod format;
mod manifest;
mod routes;
mod sdk;
mod server;

#[cfg(test)]
mod test_support;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set variables directly
    dotenv::dotenv().ok();

    tracing_subscriber
        ::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt
                ::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact()
        )
        .init();

    tracing::info!("🏁 Starting DCA gateway...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("🏗️  Build profile: {}", if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    });

    let config = config::Config::from_env()?;
    server::start(config).await
}
