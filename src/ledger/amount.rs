//! Fixed-point token amounts (Cadence `UFix64`).
//!
//! The ledger represents balances as unsigned 64-bit integers scaled by 10^8.
//! Keeping amounts as integer units avoids float drift when formatting
//! transaction arguments.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by `UFix64`.
pub const DECIMALS: u32 = 8;

const SCALE: u64 = 100_000_000;

/// A non-negative token amount in `UFix64` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

/// Reasons an amount could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be a finite number")]
    NotFinite,
    #[error("amount must not be negative")]
    Negative,
    #[error("amount exceeds UFix64 range")]
    Overflow,
    #[error("amount has more than 8 fractional digits")]
    TooPrecise,
    #[error("invalid amount literal '{0}'")]
    Invalid(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Construct from raw integer units (10^-8 tokens).
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Raw integer units.
    pub const fn units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert from a JSON-style float.
    ///
    /// The float's shortest decimal form goes through the same parser as
    /// string literals, so `0.123456789` is `TooPrecise` either way.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        if value < 0.0 {
            return Err(AmountError::Negative);
        }
        if value == 0.0 {
            return Ok(Self::ZERO);
        }
        value.to_string().parse()
    }

    /// Parse a JSON value that carries either a number or a decimal string.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AmountError> {
        match value {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Self::from_f64(f),
                None => Err(AmountError::Invalid(n.to_string())),
            },
            serde_json::Value::String(s) => s.trim().parse(),
            other => Err(AmountError::Invalid(other.to_string())),
        }
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('-') {
            return Err(AmountError::Negative);
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !digits_only(whole) || !digits_only(frac) {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if frac.len() > DECIMALS as usize {
            return Err(AmountError::TooPrecise);
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|_| AmountError::Overflow)?
        };
        let mut frac_units = 0u64;
        for (i, b) in frac.bytes().enumerate() {
            frac_units += u64::from(b - b'0') * 10u64.pow(DECIMALS - 1 - i as u32);
        }

        whole_units
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac_units))
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }
}

/// Renders the canonical `UFix64` literal, e.g. `1.50000000`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08}", self.0 / SCALE, self.0 % SCALE)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Amount::from_json(&value).map_err(serde::de::Error::custom)
    }
}
