//! Human-readable summaries of SDK records for the assistant.
//!
//! All functions are pure: the same record always yields the same string.

use serde_json::Value;

use crate::sdk::types::{AccountAsset, MyDcaVault, TradingPair};

/// How much a `display` block should say about each record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Simple,
    Detailed,
}

impl Verbosity {
    pub fn from_detail_flag(detail: bool) -> Self {
        if detail { Verbosity::Detailed } else { Verbosity::Simple }
    }
}

pub fn format_pair(pair: &TradingPair, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Simple => format_pair_simple(pair),
        Verbosity::Detailed => format_pair_detailed(pair),
    }
}

pub fn format_pair_simple(pair: &TradingPair) -> String {
    format!(
        "{}: {} {} (24h: {}%)",
        pair.name,
        plain(&pair.price),
        pair.quote_token.symbol,
        plain(&pair.change)
    )
}

pub fn format_pair_detailed(pair: &TradingPair) -> String {
    let quote = &pair.quote_token.symbol;
    let features: Vec<&str> = [
        (pair.support_dca, "DCA"),
        (pair.support_grid, "Grid"),
        (pair.is_mining, "Mining"),
    ]
    .into_iter()
    .filter_map(|(enabled, label)| enabled.then_some(label))
    .collect();

    [
        format!("Trading Pair: {}", pair.name),
        format!("Current Price: {} {}", plain(&pair.price), quote),
        format!("24h Change: {}%", plain(&pair.change)),
        "Performance:".to_string(),
        format!("  - Daily APY: {}%", plain(&pair.apy_daily)),
        format!("  - Weekly APY: {}%", plain(&pair.apy_weekly)),
        format!("  - Monthly APY: {}%", plain(&pair.apy_monthly)),
        "Volume:".to_string(),
        format!("  - 24h Volume: {} {}", plain(&pair.volume_24h), quote),
        format!("  - Total Volume: {} {}", plain(&pair.volume_total), quote),
        format!("Trading Features: {}", features.join(" ")),
        format!("Active Vaults: {}", plain(&pair.vaults)),
    ]
    .join("\n")
}

pub fn format_vault(vault: &MyDcaVault, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Simple => format_vault_simple(vault),
        Verbosity::Detailed => format_vault_detailed(vault),
    }
}

pub fn format_vault_simple(vault: &MyDcaVault) -> String {
    format!(
        "{}: {} (ROI: {}%)",
        vault.name,
        vault.side.to_uppercase(),
        plain(&vault.profit_percent)
    )
}

pub fn format_vault_detailed(vault: &MyDcaVault) -> String {
    [
        format!("Vault: {}", vault.name),
        format!("Side: {}", vault.side.to_uppercase()),
        format!("Investment: {}", plain(&vault.investment_amount)),
        format!("Profit: {}", plain(&vault.profit)),
        format!("ROI: {}%", plain(&vault.profit_percent)),
        format!("Status: {}", plain(&vault.status)),
        format!("Created: {}", plain(&vault.bot_create_time)),
    ]
    .join("\n")
}

pub fn format_asset(asset: &AccountAsset, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Simple => format!(
            "{}: {} (Internal: {})",
            asset.token.symbol,
            plain(&asset.balance),
            plain(&asset.internal_balance)
        ),
        Verbosity::Detailed => [
            format!("Token: {}", asset.token.symbol),
            format!("Balance: {}", plain(&asset.balance)),
            format!("Price: {}", plain(&asset.price)),
            format!("Internal Balance: {}", plain(&asset.internal_balance)),
            format!("Token Address: {}", asset.token.code),
        ]
        .join("\n"),
    }
}

/// Renders a JSON scalar without quotes
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
