//! Transaction lifecycle entities.

use serde::Serialize;
use std::time::Instant;

use crate::error::RelayResult;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::types::{BlockId, FlowAddress, LedgerEvent, TransactionId};
use crate::transactions::templates::{NamedArg, Operation};

/// A validated, immutable request to run one operation as the treasury.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    operation: Operation,
    arguments: Vec<CadenceValue>,
    signer: FlowAddress,
}

impl TransactionRequest {
    /// Validate `args` against the operation's template.
    pub fn build(operation: Operation, args: &[NamedArg], signer: FlowAddress) -> RelayResult<Self> {
        let arguments = operation.template().validate(args)?;
        Ok(Self {
            operation,
            arguments,
            signer,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Arguments in template declaration order.
    pub fn arguments(&self) -> &[CadenceValue] {
        &self.arguments
    }

    pub fn signer(&self) -> FlowAddress {
        self.signer
    }
}

/// A submitted transaction awaiting its terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub transaction_id: TransactionId,
    pub operation: Operation,
    pub submitted_at: Instant,
}

impl PendingTransaction {
    pub fn new(transaction_id: TransactionId, operation: Operation) -> Self {
        Self {
            transaction_id,
            operation,
            submitted_at: Instant::now(),
        }
    }
}

/// Terminal classification of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SealStatus {
    /// Sealed and executed without error.
    SealedOk,
    /// Sealed but reverted, or expired on-chain before inclusion.
    SealedFailed,
    /// No terminal state observed within the time budget; fate unknown.
    Expired,
}

impl SealStatus {
    /// Lowercase label used in HTTP responses.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::SealedOk => "sealed",
            Self::SealedFailed => "failed",
            Self::Expired => "expired",
        }
    }
}

/// Outcome of waiting on a transaction. Only the seal waiter creates these.
#[derive(Debug, Clone, PartialEq)]
pub struct SealedTransactionResult {
    transaction_id: TransactionId,
    status: SealStatus,
    block_id: Option<BlockId>,
    block_height: Option<u64>,
    events: Vec<LedgerEvent>,
    error_message: Option<String>,
    raw_report: Option<String>,
}

impl SealedTransactionResult {
    pub(crate) fn new(
        transaction_id: TransactionId,
        status: SealStatus,
        block_id: Option<BlockId>,
        events: Vec<LedgerEvent>,
        error_message: Option<String>,
        raw_report: Option<String>,
    ) -> Self {
        Self {
            transaction_id,
            status,
            block_id,
            block_height: None,
            events,
            error_message,
            raw_report,
        }
    }

    pub(crate) fn expired(transaction_id: TransactionId) -> Self {
        Self::new(transaction_id, SealStatus::Expired, None, Vec::new(), None, None)
    }

    pub(crate) fn with_block_height(mut self, height: Option<u64>) -> Self {
        self.block_height = height;
        self
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn status(&self) -> SealStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == SealStatus::SealedOk
    }

    pub fn block_id(&self) -> Option<&BlockId> {
        self.block_id.as_ref()
    }

    pub fn block_height(&self) -> Option<u64> {
        self.block_height
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn raw_report(&self) -> Option<&str> {
        self.raw_report.as_deref()
    }
}
