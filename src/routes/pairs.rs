//! # Trading Pair Routes
//!
//! Market data tools: pair listing and pair prices.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::account::AccountContext;
use crate::error::{ApiError, method_not_allowed};
use crate::format::{Verbosity, format_pair};
use crate::routes::{ToolQuery, is_true};
use crate::sdk::types::PairType;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct GetPairsQuery {
    #[serde(rename = "type")]
    pub pair_type: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PairPricesQuery {
    #[serde(rename = "pairIds")]
    pub pair_ids: Option<String>,
}

/// List trading pairs of one bot type.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/api/tools/get-pairs`
/// - **Query**: `type` (`dca` | `grid` | `swing`, default `dca`),
///   `detail` (`true` for multi-line summaries)
///
/// # Response Format
/// ```json
/// {
///   "pairs": [ { "pair_id": "...", "name": "NEAR/USDC", ... } ],
///   "display": {
///     "summary": "Found 2 dca trading pairs",
///     "formatted_pairs": ["NEAR/USDC: 5.1 USDC (24h: 2.4%)"]
///   }
/// }
/// ```
///
/// # HTTP Status Codes
/// - **200 OK**: pairs listed
/// - **400 Bad Request**: unknown `type` or malformed query
/// - **500 Internal Server Error**: the SDK call failed
pub async fn get_pairs(
    State(state): State<AppState>,
    account: AccountContext,
    ToolQuery(query): ToolQuery<GetPairsQuery>,
) -> Result<Json<Value>, ApiError> {
    let pair_type = match query.pair_type.as_deref().map(str::trim) {
        None | Some("") => PairType::Dca,
        Some(raw) => raw
            .parse::<PairType>()
            .map_err(|reason| ApiError::InvalidParameter { name: "type", reason })?,
    };
    let verbosity = Verbosity::from_detail_flag(is_true(query.detail.as_deref()));
    info!("Fetching {} trading pairs ({:?})", pair_type, verbosity);

    let client = state.public_client(&account)?;
    let pairs = client
        .get_pairs(Some(pair_type))
        .await
        .map_err(ApiError::upstream("Failed to fetch trading pairs"))?;

    let formatted: Vec<String> = pairs.iter().map(|pair| format_pair(pair, verbosity)).collect();

    Ok(Json(json!({
        "pairs": pairs,
        "display": {
            "summary": format!("Found {} {} trading pairs", pairs.len(), pair_type),
            "formatted_pairs": formatted,
        }
    })))
}

/// Current prices for a comma-separated list of pairs; every DCA pair when
/// `pairIds` is absent.
///
/// Response: `{ pairPrices: { <pair_id>: { basePrice, quotePrice, pairPrice } } }`
pub async fn get_pair_prices(
    State(state): State<AppState>,
    account: AccountContext,
    ToolQuery(query): ToolQuery<PairPricesQuery>,
) -> Result<Json<Value>, ApiError> {
    let client = state.public_client(&account)?;

    let pair_ids: Vec<String> = match query.pair_ids.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect(),
        _ => client
            .get_pairs(Some(PairType::Dca))
            .await
            .map_err(ApiError::upstream("Failed to fetch trading pairs"))?
            .into_iter()
            .map(|pair| pair.pair_id)
            .collect(),
    };
    info!("Fetching prices for {} pairs", pair_ids.len());

    let pair_prices = client
        .get_pair_prices(&pair_ids)
        .await
        .map_err(ApiError::upstream("Failed to fetch pair prices"))?;

    Ok(Json(json!({ "pairPrices": pair_prices })))
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tools/get-pairs", get(get_pairs).fallback(method_not_allowed))
        .route("/api/tools/get-pair-prices", get(get_pair_prices).fallback(method_not_allowed))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{
        MockData, MockFactory, app, get, post, sample_data, send_json, tool_config,
    };
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn get_pairs_adds_display_block() {
        let router = app(Arc::new(MockFactory::with_data(sample_data())), tool_config());
        let (status, body) = send_json(router, get("/api/tools/get-pairs?type=dca&detail=false")).await;

        assert_eq!(status, StatusCode::OK);
        let pairs = body["pairs"].as_array().unwrap();
        let formatted = body["display"]["formatted_pairs"].as_array().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(formatted.len(), pairs.len());
        assert_eq!(formatted[0], "NEAR/USDC: 5.1 USDC (24h: 2.4%)");
        assert_eq!(body["display"]["summary"], "Found 2 dca trading pairs");
    }

    #[tokio::test]
    async fn detail_flag_switches_format() {
        let router = app(Arc::new(MockFactory::with_data(sample_data())), tool_config());
        let (_, body) = send_json(router, get("/api/tools/get-pairs?detail=true")).await;
        let first = body["display"]["formatted_pairs"][0].as_str().unwrap();
        assert!(first.starts_with("Trading Pair: NEAR/USDC"));
    }

    #[tokio::test]
    async fn type_defaults_to_dca_and_is_forwarded() {
        let factory = Arc::new(MockFactory::with_data(sample_data()));
        let router = app(factory.clone(), tool_config());
        send_json(router.clone(), get("/api/tools/get-pairs")).await;
        send_json(router, get("/api/tools/get-pairs?type=grid")).await;
        assert_eq!(factory.calls(), vec!["near:get_pairs:dca", "near:get_pairs:grid"]);
    }

    #[tokio::test]
    async fn unknown_type_is_rejected() {
        let factory = Arc::new(MockFactory::with_data(sample_data()));
        let router = app(factory.clone(), tool_config());
        let (status, body) = send_json(router, get("/api/tools/get-pairs?type=spot")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid type parameter"));
        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn duplicate_query_field_is_json_400() {
        let factory = Arc::new(MockFactory::with_data(sample_data()));
        let router = app(factory.clone(), tool_config());
        let (status, body) = send_json(router, get("/api/tools/get-pairs?type=dca&type=grid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("duplicate field"));
        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn numeric_prices_render_in_summaries() {
        let mut data = sample_data();
        data.pairs[0].price = serde_json::json!(5.25);
        let router = app(Arc::new(MockFactory::with_data(data)), tool_config());
        let (status, body) = send_json(router, get("/api/tools/get-pairs")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pairs"][0]["price"], 5.25);
        assert_eq!(body["display"]["formatted_pairs"][0], "NEAR/USDC: 5.25 USDC (24h: 2.4%)");
    }

    #[tokio::test]
    async fn sdk_failure_is_500() {
        let data = MockData { failure: Some("network down".into()), ..sample_data() };
        let router = app(Arc::new(MockFactory::with_data(data)), tool_config());
        let (status, body) = send_json(router, get("/api/tools/get-pairs")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch trading pairs");
        assert!(body["details"].as_str().unwrap().contains("network down"));
    }

    #[tokio::test]
    async fn prices_default_to_all_dca_pairs() {
        let factory = Arc::new(MockFactory::with_data(sample_data()));
        let router = app(factory.clone(), tool_config());
        let (status, body) = send_json(router, get("/api/tools/get-pair-prices")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pairPrices"]["wrap.near:usdc"]["pairPrice"], "5");
        assert_eq!(
            factory.calls(),
            vec![
                "near:get_pairs:dca",
                "near:get_pair_prices:wrap.near:usdc,token.v2.ref-finance.near:usdc",
            ]
        );
    }

    #[tokio::test]
    async fn prices_for_explicit_ids() {
        let factory = Arc::new(MockFactory::with_data(sample_data()));
        let router = app(factory.clone(), tool_config());
        let (_, body) = send_json(router, get("/api/tools/get-pair-prices?pairIds=a,%20b,")).await;

        assert_eq!(body["pairPrices"].as_object().unwrap().len(), 2);
        assert_eq!(factory.calls(), vec!["near:get_pair_prices:a,b"]);
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let router = app(Arc::new(MockFactory::with_data(sample_data())), tool_config());
        let (status, body) = send_json(router, post("/api/tools/get-pairs")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }
}
