//! Relay error taxonomy.
//!
//! Every operation returns [`RelayResult`]. Validation and configuration
//! errors are raised before any ledger interaction; everything after
//! submission carries the transaction id so the caller can reconcile.

use thiserror::Error;

use crate::ledger::signer::SignerError;
use crate::ledger::types::{LedgerError, TransactionId};

#[derive(Debug, Error)]
pub enum RelayError {
    /// Bad or missing input. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing signing key or contract address.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Ledger transport failure after retries and failover.
    #[error("network error: {0}")]
    Network(#[from] LedgerError),

    /// Sealed but reverted; `error_message` is the chain's text verbatim.
    #[error("transaction {transaction_id} failed: {error_message}")]
    TransactionFailed {
        transaction_id: TransactionId,
        error_message: String,
    },

    /// No terminal state observed within the budget. The transaction may still land.
    #[error("transaction {transaction_id} unresolved: seal not observed in time")]
    TransactionTimeout { transaction_id: TransactionId },

    #[error("could not parse result of transaction {transaction_id}: {reason}")]
    Parse {
        transaction_id: TransactionId,
        reason: String,
    },

    #[error("commit transaction {transaction_id} failed: {error_message}")]
    CommitFailed {
        transaction_id: TransactionId,
        error_message: String,
    },

    #[error("reveal transaction {transaction_id} failed: {error_message}")]
    RevealFailed {
        transaction_id: TransactionId,
        error_message: String,
    },

    #[error("random value unavailable for request {request_id}")]
    RandomUnavailable { request_id: String },

    #[error("reveal delay not reached: commit at height {commit_height}, latest sealed {latest_height}, need {required_blocks} blocks")]
    ConfirmationDelay {
        commit_height: u64,
        latest_height: u64,
        required_blocks: u64,
    },

    #[error("signing error: {0}")]
    Signing(String),
}

impl From<SignerError> for RelayError {
    fn from(e: SignerError) -> Self {
        match e {
            SignerError::MissingKey(_) | SignerError::InvalidKey(_) => Self::Configuration(e.to_string()),
            SignerError::Signing(msg) => Self::Signing(msg),
        }
    }
}

impl RelayError {
    /// Transaction id the error refers to, when one exists.
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            Self::TransactionFailed { transaction_id, .. }
            | Self::TransactionTimeout { transaction_id }
            | Self::Parse { transaction_id, .. }
            | Self::CommitFailed { transaction_id, .. }
            | Self::RevealFailed { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }

    /// Whether the failed call provably never reached the ledger.
    pub fn is_undelivered(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_undelivered())
    }

    /// Whether the ledger refused the envelope's proposal-key sequence number.
    pub fn is_sequence_mismatch(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_sequence_mismatch())
    }

    /// Chain-reported error message, when one exists.
    pub fn chain_message(&self) -> Option<&str> {
        match self {
            Self::TransactionFailed { error_message, .. }
            | Self::CommitFailed { error_message, .. }
            | Self::RevealFailed { error_message, .. } => Some(error_message),
            _ => None,
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
