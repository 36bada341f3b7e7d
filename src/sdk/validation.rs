//! DCA vault parameter checks performed on the SDK side of the seam.

use serde_json::{Map, Value};

use super::types::CreateDcaVaultParams;

pub const MIN_EXECUTION_COUNT: u32 = 5;
pub const MAX_EXECUTION_COUNT: u32 = 52;
pub const MIN_SINGLE_AMOUNT_IN: f64 = 10.0;
/// One minute, in milliseconds
pub const MIN_INTERVAL_MS: u64 = 60_000;

/// Checks `params` against the vault rules and returns one message per
/// offending field, or `None` when everything is acceptable.
pub fn validate_vault_params(params: &CreateDcaVaultParams, now_ms: i64) -> Option<Value> {
    let mut errors = Map::new();

    if params.pair_id.trim().is_empty() {
        errors.insert("pairId".into(), "Trading pair is required".into());
    }

    if params.count < MIN_EXECUTION_COUNT || params.count > MAX_EXECUTION_COUNT {
        errors.insert(
            "count".into(),
            format!(
                "Execution count must be between {} and {}",
                MIN_EXECUTION_COUNT, MAX_EXECUTION_COUNT
            )
            .into(),
        );
    }

    if !params.single_amount_in.is_finite() || params.single_amount_in < MIN_SINGLE_AMOUNT_IN {
        errors.insert(
            "singleAmountIn".into(),
            format!("Amount per execution must be at least {}", MIN_SINGLE_AMOUNT_IN).into(),
        );
    }

    if params.interval_time < MIN_INTERVAL_MS {
        errors.insert(
            "intervalTime".into(),
            format!("Interval must be at least {} milliseconds", MIN_INTERVAL_MS).into(),
        );
    }

    if params.start_time < now_ms {
        errors.insert("startTime".into(), "Start time cannot be in the past".into());
    }

    for (field, price) in [("lowestPrice", params.lowest_price), ("highestPrice", params.highest_price)] {
        if let Some(p) = price {
            if !p.is_finite() || p < 0.0 {
                errors.insert(field.into(), "Price bound must be a non-negative number".into());
            }
        }
    }

    if let (Some(low), Some(high)) = (params.lowest_price, params.highest_price) {
        if low > 0.0 && high > 0.0 && low > high {
            errors.insert(
                "lowestPrice".into(),
                "Lowest price cannot exceed highest price".into(),
            );
        }
    }

    if errors.is_empty() { None } else { Some(Value::Object(errors)) }
}
