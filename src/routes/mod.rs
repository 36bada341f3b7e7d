// # Routes Module
//
// - HTTP route handlers for the DCA tool gateway, grouped by tool family.
// - Each module exposes `create_routes()`, merged in `server.rs`.
//
//  ## Available Route Modules
// - `health`: liveness probe
// - `plugin`: plugin manifest with ETag support
// - `pairs`: trading pair and price tools
// - `dca`: DCA vault tools
// - `account`: caller identity and assets

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Health check endpoint
pub mod health;

/// Plugin manifest endpoint
pub mod plugin;

/// Trading pair endpoints
pub mod pairs;

/// DCA vault endpoints
pub mod dca;

/// Account endpoints
pub mod account;

/// `Query` whose failures use the JSON error envelope instead of axum's
/// plain-text rejection.
pub struct ToolQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ToolQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Interprets a `detail`-style query flag
pub(crate) fn is_true(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}
