//! # Account Routes
//!
//! Caller identity and token balances.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde_json::{Value, json};
use tracing::info;

use crate::account::AccountContext;
use crate::error::{ApiError, method_not_allowed};
use crate::format::{Verbosity, format_asset};
use crate::routes::dca::DetailQuery;
use crate::routes::{ToolQuery, is_true};
use crate::server::AppState;

/// Echo the account the assistant is acting for
pub async fn get_user(
    State(state): State<AppState>,
    account: AccountContext,
) -> Result<Json<Value>, ApiError> {
    state.require_account(&account)?;
    Ok(Json(json!({ "accountId": account.account_id() })))
}

/// Token balances of the caller.
///
/// Response: `{ assets, display: { summary, formatted_assets } }`
pub async fn my_assets(
    State(state): State<AppState>,
    account: AccountContext,
    ToolQuery(query): ToolQuery<DetailQuery>,
) -> Result<Json<Value>, ApiError> {
    let verbosity = Verbosity::from_detail_flag(is_true(query.detail.as_deref()));
    let client = state.account_client(&account)?;

    let assets = client
        .get_account_assets()
        .await
        .map_err(ApiError::upstream("Failed to fetch account assets"))?;
    info!("Fetched {} assets for {}", assets.len(), account.account_id());

    let formatted: Vec<String> = assets.iter().map(|a| format_asset(a, verbosity)).collect();

    Ok(Json(json!({
        "assets": assets,
        "display": {
            "summary": format!("Found {} tokens", assets.len()),
            "formatted_assets": formatted,
        }
    })))
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tools/get-user", get(get_user).fallback(method_not_allowed))
        .route("/api/tools/my-assets", get(my_assets).fallback(method_not_allowed))
}
