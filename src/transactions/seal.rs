//! Seal waiting.
//!
//! # States
//! ```text
//! SUBMITTED → SEALED_OK      ledger Sealed, status code 0, no error message
//! SUBMITTED → SEALED_FAILED  ledger Sealed with an error, or ledger Expired
//! SUBMITTED → EXPIRED        no terminal state within the time budget
//! ```
//!
//! # Design Decisions
//! - `Executed` is not terminal: executed blocks can still be reorganized away
//! - A timeout is an outcome, not an error; the caller decides how to reconcile
//! - Transient poll failures are logged and polling continues
//! - Any outcome other than SEALED_OK resyncs the treasury's sequence counter

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::ledger::client::LedgerClient;
use crate::ledger::types::{LedgerTxStatus, TransactionId, TransactionRecord};
use crate::observability::metrics;
use crate::transactions::sequence::SequenceAllocator;
use crate::transactions::types::{PendingTransaction, SealStatus, SealedTransactionResult};

/// Message attached when the ledger reports the transaction expired before inclusion.
pub const EXPIRED_BEFORE_INCLUSION: &str = "transaction expired before inclusion";

pub struct SealWaiter {
    ledger: Arc<dyn LedgerClient>,
    poll_interval: Duration,
    default_timeout: Duration,
    sequences: SequenceAllocator,
}

impl SealWaiter {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        poll_interval: Duration,
        default_timeout: Duration,
        sequences: SequenceAllocator,
    ) -> Self {
        Self {
            ledger,
            poll_interval,
            default_timeout,
            sequences,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Wait for `pending` to reach a terminal state, or report `EXPIRED` once
    /// `timeout` (or the configured default) elapses.
    pub async fn await_seal(&self, pending: &PendingTransaction, timeout: Option<Duration>) -> SealedTransactionResult {
        let budget = timeout.unwrap_or(self.default_timeout);
        let transaction_id = &pending.transaction_id;

        let result = match tokio::time::timeout(budget, self.poll_until_terminal(transaction_id)).await {
            Ok(result) => {
                let height = self.resolve_height(&result).await;
                result.with_block_height(height)
            }
            Err(_) => {
                tracing::warn!(
                    transaction_id = %transaction_id,
                    operation = %pending.operation,
                    timeout_ms = budget.as_millis() as u64,
                    "Seal not observed within budget, reporting expired"
                );
                SealedTransactionResult::expired(transaction_id.clone())
            }
        };

        if result.status() != SealStatus::SealedOk {
            self.sequences.resync();
        }

        metrics::record_seal(
            pending.operation.name(),
            result.status(),
            pending.submitted_at.elapsed(),
        );
        tracing::info!(
            transaction_id = %transaction_id,
            operation = %pending.operation,
            status = ?result.status(),
            block_height = ?result.block_height(),
            "Transaction resolved"
        );
        result
    }

    async fn poll_until_terminal(&self, transaction_id: &TransactionId) -> SealedTransactionResult {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.ledger.get_transaction_result(transaction_id).await {
                Ok(Some(record)) => {
                    let status = record.status;
                    if let Some(result) = classify(transaction_id, record) {
                        return result;
                    }
                    tracing::debug!(transaction_id = %transaction_id, status = ?status, "Not yet sealed");
                }
                Ok(None) => {
                    tracing::debug!(transaction_id = %transaction_id, "Transaction not yet known to access node");
                }
                Err(e) => {
                    tracing::warn!(transaction_id = %transaction_id, error = %e, "Status poll failed, will retry");
                }
            }
        }
    }

    async fn resolve_height(&self, result: &SealedTransactionResult) -> Option<u64> {
        let block_id = result.block_id()?;
        match self.ledger.get_block(block_id).await {
            Ok(header) => Some(header.height),
            Err(e) => {
                tracing::debug!(block_id = %block_id, error = %e, "Could not resolve block height");
                None
            }
        }
    }
}

/// Map a status record to a terminal result, or `None` if still in flight.
pub fn classify(transaction_id: &TransactionId, record: TransactionRecord) -> Option<SealedTransactionResult> {
    match record.status {
        LedgerTxStatus::Sealed => {
            let failed = record.status_code != 0 || record.error_message.is_some();
            let (status, error_message) = if failed {
                let message = record
                    .error_message
                    .unwrap_or_else(|| format!("transaction reverted with status code {}", record.status_code));
                (SealStatus::SealedFailed, Some(message))
            } else {
                (SealStatus::SealedOk, None)
            };
            Some(SealedTransactionResult::new(
                transaction_id.clone(),
                status,
                record.block_id,
                record.events,
                error_message,
                record.raw_report,
            ))
        }
        LedgerTxStatus::Expired => Some(SealedTransactionResult::new(
            transaction_id.clone(),
            SealStatus::SealedFailed,
            record.block_id,
            record.events,
            Some(record.error_message.unwrap_or_else(|| EXPIRED_BEFORE_INCLUSION.to_string())),
            record.raw_report,
        )),
        LedgerTxStatus::Unknown | LedgerTxStatus::Pending | LedgerTxStatus::Finalized | LedgerTxStatus::Executed => {
            None
        }
    }
}
