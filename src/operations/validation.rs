//! Request field validation shared by the operations.
//!
//! Everything here is pure: no operation touches the network before its
//! input has passed these checks.

use serde_json::Value;

use crate::config::schema::GamesConfig;
use crate::error::{RelayError, RelayResult};
use crate::ledger::amount::Amount;
use crate::ledger::types::FlowAddress;

/// Strict `0x` + 16 hex digit address.
pub fn parse_address(field: &str, value: &str) -> RelayResult<FlowAddress> {
    if value.trim().is_empty() {
        return Err(RelayError::Validation(format!("{} is required", field)));
    }
    value
        .trim()
        .parse()
        .map_err(|_| RelayError::Validation(format!("{} must be 0x followed by 16 hex digits", field)))
}

/// A strictly positive amount given as a JSON number or decimal string.
pub fn parse_positive_amount(field: &str, value: &Value) -> RelayResult<Amount> {
    if value.is_null() {
        return Err(RelayError::Validation(format!("{} is required", field)));
    }
    let amount = Amount::from_json(value).map_err(|e| RelayError::Validation(format!("{}: {}", field, e)))?;
    if amount.is_zero() {
        return Err(RelayError::Validation(format!("{} must be greater than zero", field)));
    }
    Ok(amount)
}

/// A positive bet inside the configured limits.
pub fn parse_bet(field: &str, value: &Value, limits: &GamesConfig) -> RelayResult<Amount> {
    let bet = parse_positive_amount(field, value)?;
    let as_flow = bet.to_f64();
    if as_flow < limits.min_bet || as_flow > limits.max_bet {
        return Err(RelayError::Validation(format!(
            "{} must be between {} and {} FLOW",
            field, limits.min_bet, limits.max_bet
        )));
    }
    Ok(bet)
}

/// Optional 64-hex-digit transaction hash, `0x` allowed.
pub fn parse_transaction_hash(field: &str, value: Option<&str>) -> RelayResult<Option<String>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.len() != 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RelayError::Validation(format!("{} must be 64 hex digits", field)));
    }
    Ok(Some(digits.to_ascii_lowercase()))
}
