//! # Plugin Manifest Route
//!
//! Serves the tool manifest with conditional GET support.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

use crate::error::method_not_allowed;
use crate::server::AppState;

const CACHE_CONTROL: &str = "public, max-age=3600";

/// Returns the plugin manifest, or `304 Not Modified` when the caller's
/// `If-None-Match` already names the current ETag.
pub async fn ai_plugin(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let manifest = &state.manifest;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    if let Ok(etag) = HeaderValue::from_str(manifest.etag()) {
        response_headers.insert(header::ETAG, etag);
    }

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| manifest.matches(value));

    if not_modified {
        debug!("Manifest unchanged for caller, answering 304");
        return (StatusCode::NOT_MODIFIED, response_headers).into_response();
    }

    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    (StatusCode::OK, response_headers, manifest.body().to_string()).into_response()
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ai-plugin", get(ai_plugin).fallback(method_not_allowed))
        .route("/.well-known/ai-plugin.json", get(ai_plugin).fallback(method_not_allowed))
}
