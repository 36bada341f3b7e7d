use axum::response::Json;
use serde_json::json;

/// Liveness probe.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
///
/// ```bash
/// curl http://localhost:3000/ping
/// # {"status":"pong","service":"delta-dca-gateway","version":"0.1.0"}
/// ```
///
/// Does not touch the Delta Trade API, so it stays green while the upstream
/// is unavailable.
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({
        "status": "pong",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
