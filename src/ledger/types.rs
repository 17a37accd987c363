//! Ledger identifiers, wire records, and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ledger::amount::Amount;
use crate::ledger::cadence::CadenceValue;

/// Account address on the ledger: exactly 8 bytes, written `0x` + 16 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowAddress([u8; 8]);

impl FlowAddress {
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Hex form without the `0x` prefix, as the REST API expects.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lenient parse used for values coming back from the ledger, which may omit `0x`.
    pub fn parse_lenient(s: &str) -> Result<Self, LedgerError> {
        let s = s.trim();
        if s.starts_with("0x") {
            s.parse()
        } else {
            format!("0x{}", s).parse()
        }
    }
}

impl FromStr for FlowAddress {
    type Err = LedgerError;

    /// Strict parse: requires the `0x` prefix and exactly 16 hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| LedgerError::InvalidAddress(s.to_string()))?;
        if digits.len() != 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LedgerError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| LedgerError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for FlowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for FlowAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlowAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded 32-byte transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim_start_matches("0x").to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Low-order 32 bits of the identifier (its last 8 hex digits).
    pub fn low_bits(&self) -> Option<u32> {
        let start = self.0.len().checked_sub(8)?;
        u32::from_str_radix(self.0.get(start..)?, 16).ok()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex-encoded 32-byte block identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim_start_matches("0x").to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode to the raw 32 bytes used inside a transaction payload.
    pub fn to_bytes(&self) -> Result<[u8; 32], LedgerError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(&self.0, &mut out)
            .map_err(|e| LedgerError::Decode(format!("invalid block id '{}': {}", self.0, e)))?;
        Ok(out)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block header fields the relay cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub id: BlockId,
    pub height: u64,
}

/// One signing key registered on an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKey {
    pub index: u32,
    pub sequence_number: u64,
    pub revoked: bool,
}

/// Account snapshot returned by the access node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: FlowAddress,
    pub balance: Amount,
    pub keys: Vec<AccountKey>,
}

impl AccountInfo {
    pub fn key(&self, index: u32) -> Option<&AccountKey> {
        self.keys.iter().find(|k| k.index == index)
    }
}

/// Transaction status as reported by the ledger.
///
/// Only `Sealed` and `Expired` are final; `Executed` means included and run but
/// not yet irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerTxStatus {
    Unknown,
    Pending,
    Finalized,
    Executed,
    Sealed,
    Expired,
}

impl LedgerTxStatus {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "finalized" => Self::Finalized,
            "executed" => Self::Executed,
            "sealed" => Self::Sealed,
            "expired" => Self::Expired,
            _ => Self::Unknown,
        }
    }
}

/// An event emitted by a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEvent {
    /// Fully qualified type, e.g. `A.<address>.CasinoGames.GamePlayed`.
    pub event_type: String,
    pub event_index: u32,
    /// Decoded JSON-Cadence payload; `None` when the payload could not be decoded.
    pub payload: Option<CadenceValue>,
}

/// Transaction status record returned by `getTransaction`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub status: LedgerTxStatus,
    /// 0 on successful execution.
    pub status_code: u32,
    pub block_id: Option<BlockId>,
    pub error_message: Option<String>,
    pub events: Vec<LedgerEvent>,
    /// Textual execution report, when the endpoint returns one instead of
    /// (or alongside) structured events.
    pub raw_report: Option<String>,
}

impl TransactionRecord {
    /// A record in a bare status with no execution data.
    pub fn with_status(status: LedgerTxStatus) -> Self {
        Self {
            status,
            status_code: 0,
            block_id: None,
            error_message: None,
            events: Vec::new(),
            raw_report: None,
        }
    }
}

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The request never reached the endpoint (connect/DNS failure).
    #[error("access node unreachable: {0}")]
    Unreachable(String),

    /// Transport failed after the request may have been delivered.
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success HTTP status.
    #[error("access node returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Address is not `0x` + 16 hex digits.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
}

impl LedgerError {
    /// Whether an idempotent call may be retried after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Transport(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Whether the failed call is known never to have reached the endpoint,
    /// so a state-changing request may be re-attempted.
    pub fn is_undelivered(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Whether the access node rejected the transaction because the proposal
    /// key's sequence number was stale (`[Error Code: 1007]`).
    pub fn is_sequence_mismatch(&self) -> bool {
        match self {
            Self::Http { status: 400, body } => {
                let body = body.to_ascii_lowercase();
                body.contains("sequence number") || body.contains("error code: 1007")
            }
            _ => false,
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
