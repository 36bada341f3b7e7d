//! # DCA Vault Routes
//!
//! Tools that create, close and claim DCA vaults, and list the caller's
//! vaults. Write tools return unsigned transactions for the caller to sign.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::info;

use crate::account::AccountContext;
use crate::error::{ApiError, method_not_allowed};
use crate::format::{Verbosity, format_vault};
use crate::routes::{ToolQuery, is_true};
use crate::sdk::DeltaTradeClient;
use crate::sdk::types::{CreateDcaVaultParams, PairType, TradeType, VaultQuery};
use crate::server::AppState;

pub const DEFAULT_INTERVAL_MS: u64 = 604_800_000;
pub const DEFAULT_VAULT_NAME: &str = "AI Created DCA Vault";
/// Delay applied when the caller gives no start time
const START_DELAY_MINUTES: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct VaultIdQuery {
    #[serde(rename = "vaultId")]
    pub vault_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub detail: Option<String>,
}

/// create-dca inputs merged from the query string and an optional JSON body.
/// Body fields win over query fields of the same name.
struct DcaInputs(Map<String, Value>);

impl DcaInputs {
    fn collect(query: HashMap<String, String>, body: &[u8]) -> Result<Self, ApiError> {
        let mut fields: Map<String, Value> = query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        if !body.iter().all(u8::is_ascii_whitespace) {
            let parsed: Value = serde_json::from_slice(body).map_err(|e| ApiError::InvalidParameter {
                name: "body",
                reason: e.to_string(),
            })?;
            match parsed {
                Value::Object(map) => fields.extend(map),
                _ => {
                    return Err(ApiError::InvalidParameter {
                        name: "body",
                        reason: "expected a JSON object".to_string(),
                    });
                }
            }
        }

        Ok(Self(fields))
    }

    /// Non-empty value as text; null and blank strings count as absent
    fn text(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            other => Some(other.to_string()),
        }
    }

    fn parsed<T>(&self, name: &'static str) -> Result<Option<T>, ApiError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| ApiError::InvalidParameter {
                    name,
                    reason: format!("'{}': {}", raw, e),
                })
            })
            .transpose()
    }

    fn required<T>(&self, name: &'static str) -> Result<T, ApiError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parsed(name)?.ok_or(ApiError::MissingParameter(name))
    }
}

/// Turns request inputs into vault parameters. `pair_id` is resolved by the
/// caller because it may need an SDK round trip.
fn build_params(inputs: &DcaInputs, pair_id: String) -> Result<CreateDcaVaultParams, ApiError> {
    let trade_type = match inputs.text("tradeType") {
        Some(raw) => raw
            .parse::<TradeType>()
            .map_err(|reason| ApiError::InvalidParameter { name: "tradeType", reason })?,
        None => TradeType::Buy,
    };

    let start_time = match inputs.parsed::<i64>("startTime")? {
        Some(ms) => ms,
        None => (Utc::now() + Duration::minutes(START_DELAY_MINUTES)).timestamp_millis(),
    };

    Ok(CreateDcaVaultParams {
        pair_id,
        trade_type,
        interval_time: inputs.parsed::<u64>("intervalTime")?.unwrap_or(DEFAULT_INTERVAL_MS),
        start_time,
        single_amount_in: inputs.required("singleAmountIn")?,
        count: inputs.required("count")?,
        lowest_price: inputs.parsed("lowestPrice")?,
        highest_price: inputs.parsed("highestPrice")?,
        name: inputs.text("name").unwrap_or_else(|| DEFAULT_VAULT_NAME.to_string()),
        recommender: inputs.text("recommender"),
    })
}

/// Explicit pair, then the configured default, then the first DCA pair the
/// SDK knows about.
async fn resolve_pair_id(
    inputs: &DcaInputs,
    state: &AppState,
    client: &dyn DeltaTradeClient,
) -> Result<String, ApiError> {
    if let Some(pair_id) = inputs.text("pairId").or_else(|| state.tools.default_pair_id.clone()) {
        return Ok(pair_id);
    }

    client
        .get_pairs(Some(PairType::Dca))
        .await
        .map_err(ApiError::upstream("Failed to fetch trading pairs"))?
        .into_iter()
        .next()
        .map(|pair| pair.pair_id)
        .ok_or(ApiError::NoTradingPairs)
}

/// Validate DCA parameters through the SDK and return the creation
/// transactions.
///
/// # Route
/// - **Method**: POST
/// - **Path**: `/api/tools/create-dca`
/// - **Inputs**: query string and/or JSON body; body fields win
///
/// | Field | Default |
/// |---|---|
/// | `pairId` | `DEFAULT_PAIR_ID`, else the first DCA pair |
/// | `tradeType` | `buy` |
/// | `intervalTime` (ms) | one week |
/// | `startTime` (ms) | now + 5 minutes |
/// | `singleAmountIn`, `count` | required |
/// | `name` | `AI Created DCA Vault` |
///
/// # Response Format
/// ```json
/// { "status": "success", "transaction": [...], "vaultParams": { ... } }
/// ```
///
/// # HTTP Status Codes
/// - **200 OK**: transactions ready to sign
/// - **400 Bad Request**: missing or malformed input, SDK validation
///   failure (`details` maps field to message), or no trading pairs
/// - **500 Internal Server Error**: the SDK call failed
pub async fn create_dca(
    State(state): State<AppState>,
    account: AccountContext,
    ToolQuery(query): ToolQuery<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let inputs = DcaInputs::collect(query, &body)?;

    // Parse everything that cannot need the SDK before touching it
    let mut params = build_params(&inputs, String::new())?;

    let client = state.account_client(&account)?;
    params.pair_id = resolve_pair_id(&inputs, &state, client.as_ref()).await?;

    info!(
        "Creating DCA vault for {}: {:?} {} x{} on {}",
        account.account_id(),
        params.trade_type,
        params.single_amount_in,
        params.count,
        params.pair_id
    );

    if let Some(details) = client
        .validate_dca_vault_params(&params)
        .await
        .map_err(ApiError::upstream("Failed to create DCA vault"))?
    {
        return Err(ApiError::Validation { details });
    }

    let transaction = client
        .create_dca_vault(&params)
        .await
        .map_err(ApiError::upstream("Failed to create DCA vault"))?;

    Ok(Json(json!({
        "status": "success",
        "transaction": transaction,
        "vaultParams": params,
    })))
}

fn require_vault_id(query: VaultIdQuery) -> Result<String, ApiError> {
    query
        .vault_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingParameter("vaultId"))
}

/// Transactions that close a vault, passed through unmodified.
///
/// # Route
/// - **Method**: POST
/// - **Path**: `/api/tools/close-dca?vaultId=<id>`
///
/// # Response Format
/// Whatever the SDK's close operation yields, typically
/// `[{ "signerId", "receiverId", "actions": [...] }]`.
///
/// # HTTP Status Codes
/// - **200 OK**: transactions ready to sign
/// - **400 Bad Request**: `vaultId` missing
/// - **500 Internal Server Error**: the SDK call failed
pub async fn close_dca(
    State(state): State<AppState>,
    account: AccountContext,
    ToolQuery(query): ToolQuery<VaultIdQuery>,
) -> Result<Json<Value>, ApiError> {
    let vault_id = require_vault_id(query)?;
    let client = state.account_client(&account)?;
    info!("Closing DCA vault {} for {}", vault_id, account.account_id());

    let transactions = client
        .close_dca_vault(&vault_id)
        .await
        .map_err(ApiError::upstream("Failed to close DCA vault"))?;
    Ok(Json(transactions))
}

/// Transactions that claim a vault's proceeds, passed through unmodified.
pub async fn claim_dca(
    State(state): State<AppState>,
    account: AccountContext,
    ToolQuery(query): ToolQuery<VaultIdQuery>,
) -> Result<Json<Value>, ApiError> {
    let vault_id = require_vault_id(query)?;
    let client = state.account_client(&account)?;
    info!("Claiming DCA vault {} for {}", vault_id, account.account_id());

    let transactions = client
        .claim_dca_vault(&vault_id)
        .await
        .map_err(ApiError::upstream("Failed to claim DCA vault rewards"))?;
    Ok(Json(transactions))
}

/// The caller's DCA vaults, best 24h profit first.
///
/// Response: `{ vaults: { list, total }, display: { summary, formatted_vaults } }`
pub async fn my_dca_vaults(
    State(state): State<AppState>,
    account: AccountContext,
    ToolQuery(query): ToolQuery<DetailQuery>,
) -> Result<Json<Value>, ApiError> {
    let verbosity = Verbosity::from_detail_flag(is_true(query.detail.as_deref()));
    let client = state.account_client(&account)?;

    let vaults = client
        .get_my_dca_vaults(&VaultQuery::default())
        .await
        .map_err(ApiError::upstream("Failed to fetch DCA vaults"))?;
    info!("Found {} DCA vaults for {}", vaults.list.len(), account.account_id());

    let formatted: Vec<String> = vaults.list.iter().map(|v| format_vault(v, verbosity)).collect();

    Ok(Json(json!({
        "display": {
            "summary": format!("Found {} DCA vaults", vaults.list.len()),
            "formatted_vaults": formatted,
        },
        "vaults": vaults,
    })))
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tools/create-dca", post(create_dca).fallback(method_not_allowed))
        .route("/api/tools/close-dca", post(close_dca).fallback(method_not_allowed))
        .route("/api/tools/claim-dca", post(claim_dca).fallback(method_not_allowed))
        .route("/api/tools/my-dca-vaults", get(my_dca_vaults).fallback(method_not_allowed))
}
