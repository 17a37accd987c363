//! Mapping of client `gameParams` onto template arguments.
//!
//! Clients send loosely typed JSON (numbers as strings, arrays as `"[]"`).
//! Every field has a default so an empty object plays a standard round.

use serde_json::Value;

use crate::error::{RelayError, RelayResult};
use crate::games::types::GameType;
use crate::ledger::amount::Amount;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::types::FlowAddress;
use crate::transactions::templates::NamedArg;

pub const DEFAULT_BET_TYPE: &str = "red";
pub const DEFAULT_MINE_COUNT: u8 = 3;
pub const DEFAULT_RISK: &str = "medium";
pub const DEFAULT_PLINKO_ROWS: u8 = 16;
pub const DEFAULT_WHEEL_SEGMENTS: u8 = 54;

/// Build the play transaction's arguments for `game`.
pub fn game_arguments(
    game: GameType,
    player: FlowAddress,
    bet_amount: Amount,
    params: &Value,
) -> RelayResult<Vec<NamedArg>> {
    let empty = Value::Object(Default::default());
    let params = match params {
        Value::Null => &empty,
        Value::Object(_) => params,
        _ => return Err(RelayError::Validation("gameParams must be an object".to_string())),
    };

    let mut args = vec![
        NamedArg::new("playerAddress", CadenceValue::address(&player)),
        NamedArg::new("betAmount", CadenceValue::ufix64(bet_amount)),
    ];

    match game {
        GameType::Roulette => {
            let bet_type = string_field(params, &["betType"], DEFAULT_BET_TYPE)?;
            let numbers = u8_list_field(params, "betNumbers")?;
            args.push(NamedArg::new("betType", CadenceValue::string(bet_type)));
            args.push(NamedArg::new("betNumbers", CadenceValue::uint8_array(&numbers)));
        }
        GameType::Mines => {
            let mine_count = u8_field(params, "mineCount", DEFAULT_MINE_COUNT)?;
            let tiles = u8_list_field(params, "revealedTiles")?;
            let cash_out = bool_field(params, "cashOut", false)?;
            args.push(NamedArg::new("mineCount", CadenceValue::uint8(mine_count)));
            args.push(NamedArg::new("revealedTiles", CadenceValue::uint8_array(&tiles)));
            args.push(NamedArg::new("cashOut", CadenceValue::Bool(cash_out)));
        }
        GameType::Plinko => {
            let risk = string_field(params, &["riskLevel", "risk"], DEFAULT_RISK)?;
            let rows = u8_field(params, "rows", DEFAULT_PLINKO_ROWS)?;
            args.push(NamedArg::new("risk", CadenceValue::string(risk.to_ascii_lowercase())));
            args.push(NamedArg::new("rows", CadenceValue::uint8(rows)));
        }
        GameType::Wheel => {
            let segments = u8_field(params, "segments", DEFAULT_WHEEL_SEGMENTS)?;
            args.push(NamedArg::new("segments", CadenceValue::uint8(segments)));
        }
    }
    Ok(args)
}

fn invalid(field: &str, expected: &str) -> RelayError {
    RelayError::Validation(format!("gameParams.{} must be {}", field, expected))
}

/// First present key among `keys`, else `default`.
fn string_field(params: &Value, keys: &[&str], default: &str) -> RelayResult<String> {
    for key in keys {
        match params.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if !s.trim().is_empty() => return Ok(s.trim().to_string()),
            Some(_) => return Err(invalid(key, "a non-empty string")),
        }
    }
    Ok(default.to_string())
}

fn to_u8(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u8::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn u8_field(params: &Value, key: &str, default: u8) -> RelayResult<u8> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => to_u8(v).ok_or_else(|| invalid(key, "an integer between 0 and 255")),
    }
}

fn bool_field(params: &Value, key: &str, default: bool) -> RelayResult<bool> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        Some(_) => Err(invalid(key, "a boolean")),
    }
}

/// Accepts `[1, 2]`, `["1", "2"]` or the string `"[1,2]"`.
fn u8_list_field(params: &Value, key: &str) -> RelayResult<Vec<u8>> {
    let parsed;
    let items = match params.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) => {
            parsed = serde_json::from_str::<Vec<Value>>(s.trim()).map_err(|_| invalid(key, "a list of integers"))?;
            &parsed
        }
        Some(_) => return Err(invalid(key, "a list of integers")),
    };
    items
        .iter()
        .map(|v| to_u8(v).ok_or_else(|| invalid(key, "a list of integers between 0 and 255")))
        .collect()
}
