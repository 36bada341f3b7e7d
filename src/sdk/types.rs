//! Delta Trade SDK data types
//!
//! Records returned by the SDK are snapshots; the gateway only reshapes them.
//! Unknown upstream fields are kept in `extra` so they survive re-serialisation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of trading bot a pair supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairType {
    Dca,
    Grid,
    Swing,
}

impl PairType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairType::Dca => "dca",
            PairType::Grid => "grid",
            PairType::Swing => "swing",
        }
    }
}

impl fmt::Display for PairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PairType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dca" => Ok(PairType::Dca),
            "grid" => Ok(PairType::Grid),
            "swing" => Ok(PairType::Swing),
            other => Err(format!("unsupported pair type '{}', expected dca, grid or swing", other)),
        }
    }
}

/// Trade direction of a DCA vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeType::Buy),
            "sell" => Ok(TradeType::Sell),
            other => Err(format!("unsupported trade type '{}', expected buy or sell", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub symbol: String,
    /// Token contract address
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Market snapshot of one pair. Numeric fields stay as the JSON the API sent
/// (string or number) and are only rendered, never computed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    pub pair_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base_token: TokenInfo,
    #[serde(default)]
    pub quote_token: TokenInfo,
    #[serde(default)]
    pub price: Value,
    /// 24h price change percentage
    #[serde(default)]
    pub change: Value,
    #[serde(default)]
    pub apy_daily: Value,
    #[serde(default)]
    pub apy_weekly: Value,
    #[serde(default)]
    pub apy_monthly: Value,
    #[serde(default)]
    pub volume_24h: Value,
    #[serde(default)]
    pub volume_total: Value,
    /// Number of active vaults on the pair
    #[serde(default)]
    pub vaults: Value,
    #[serde(default)]
    pub support_dca: bool,
    #[serde(default)]
    pub support_grid: bool,
    #[serde(default)]
    pub is_mining: bool,
    #[serde(default)]
    pub is_meme: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairPrice {
    #[serde(default)]
    pub pair_id: String,
    #[serde(rename = "basePrice", default)]
    pub base_price: Value,
    #[serde(rename = "quotePrice", default)]
    pub quote_price: Value,
    #[serde(rename = "pairPrice", default)]
    pub pair_price: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountAsset {
    #[serde(default)]
    pub token: TokenInfo,
    #[serde(default)]
    pub balance: Value,
    #[serde(default)]
    pub price: Value,
    #[serde(rename = "internalBalance", default)]
    pub internal_balance: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MyDcaVault {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    /// `buy` or `sell`
    #[serde(default)]
    pub side: String,
    #[serde(rename = "investmentAmount", default)]
    pub investment_amount: Value,
    #[serde(default)]
    pub profit: Value,
    #[serde(default)]
    pub profit_percent: Value,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub bot_create_time: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultPage {
    #[serde(default)]
    pub list: Vec<MyDcaVault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Listing query for the caller's vaults
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultQuery {
    pub order_by: String,
    pub dir: String,
    pub page: u32,
    pub page_size: u32,
}

impl Default for VaultQuery {
    fn default() -> Self {
        Self {
            order_by: "profit_24_usd".to_string(),
            dir: "desc".to_string(),
            page: 1,
            page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDcaVaultParams {
    pub pair_id: String,
    pub trade_type: TradeType,
    /// Milliseconds between executions
    pub interval_time: u64,
    /// Milliseconds since the Unix epoch
    pub start_time: i64,
    pub single_amount_in: f64,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_price: Option<f64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommender: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pair_keeps_unknown_fields() {
        let raw = json!({
            "pair_id": "wrap.near:usdc",
            "name": "NEAR/USDC",
            "quote_token": { "symbol": "USDC", "code": "usdc.near", "icon": "x.svg" },
            "ranking": 3
        });
        let pair: TradingPair = serde_json::from_value(raw).unwrap();
        assert_eq!(pair.quote_token.symbol, "USDC");

        let back = serde_json::to_value(&pair).unwrap();
        assert_eq!(back["ranking"], 3);
        assert_eq!(back["quote_token"]["icon"], "x.svg");
    }

    #[test]
    fn pair_accepts_numeric_market_fields() {
        let raw = json!({
            "pair_id": "p",
            "price": 5.12,
            "change": "1.0",
            "vaults": "12",
            "volume_24h": 1000
        });
        let pair: TradingPair = serde_json::from_value(raw).unwrap();
        assert_eq!(pair.price, json!(5.12));
        assert_eq!(pair.change, json!("1.0"));

        let back = serde_json::to_value(&pair).unwrap();
        assert_eq!(back["volume_24h"], 1000);
        assert_eq!(back["vaults"], "12");
    }

    #[test]
    fn price_record_keeps_unknown_fields() {
        let raw = json!({ "pair_id": "p", "basePrice": 5.1, "pairPrice": "5.1", "updated_at": 17 });
        let price: PairPrice = serde_json::from_value(raw).unwrap();
        assert_eq!(price.quote_price, Value::Null);

        let back = serde_json::to_value(&price).unwrap();
        assert_eq!(back["basePrice"], 5.1);
        assert_eq!(back["updated_at"], 17);
    }

    #[test]
    fn create_params_serialize_camel_case() {
        let params = CreateDcaVaultParams {
            pair_id: "p".into(),
            trade_type: TradeType::Sell,
            interval_time: 86_400_000,
            start_time: 1_700_000_000_000,
            single_amount_in: 25.0,
            count: 10,
            lowest_price: None,
            highest_price: Some(9.5),
            name: "weekly".into(),
            recommender: None,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["tradeType"], "sell");
        assert_eq!(value["singleAmountIn"], 25.0);
        assert_eq!(value["highestPrice"], 9.5);
        assert!(value.get("lowestPrice").is_none());
    }

    #[test]
    fn pair_type_parses_case_insensitively() {
        assert_eq!("GRID".parse::<PairType>(), Ok(PairType::Grid));
        assert!("spot".parse::<PairType>().is_err());
    }
}
