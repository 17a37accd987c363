//! Treasury transaction submission.
//!
//! # Responsibilities
//! - Validate arguments against the operation's template before any network call
//! - Fetch reference block and proposal key sequence number
//! - Sign with the treasury identity and send
//!
//! # Design Decisions
//! - One async critical section covers sequence allocation, signing and send
//! - Sequence numbers come from `SequenceAllocator`, which stays ahead of the
//!   chain while earlier transactions are still in flight
//! - A send is re-attempted only when the error proves it was never delivered
//!   or the ledger rejected the proposal key's sequence number; every attempt
//!   re-reads the reference block and account

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::schema::ContractsConfig;
use crate::error::{RelayError, RelayResult};
use crate::ledger::client::LedgerClient;
use crate::ledger::envelope::{ProposalKey, TransactionEnvelope};
use crate::ledger::signer::TreasurySigner;
use crate::ledger::types::{FlowAddress, LedgerResult, TransactionId};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::transactions::sequence::SequenceAllocator;
use crate::transactions::templates::{NamedArg, Operation};
use crate::transactions::types::{PendingTransaction, TransactionRequest};

pub struct TransactionSubmitter {
    ledger: Arc<dyn LedgerClient>,
    signer: Option<TreasurySigner>,
    contracts: ContractsConfig,
    gas_limit: u64,
    retry: RetryPolicy,
    sequences: SequenceAllocator,
    treasury_lock: Mutex<()>,
}

impl TransactionSubmitter {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signer: Option<TreasurySigner>,
        contracts: ContractsConfig,
        gas_limit: u64,
        retry: RetryPolicy,
        sequences: SequenceAllocator,
    ) -> Self {
        Self {
            ledger,
            signer,
            contracts,
            gas_limit,
            retry,
            sequences,
            treasury_lock: Mutex::new(()),
        }
    }

    fn signer(&self) -> RelayResult<&TreasurySigner> {
        self.signer
            .as_ref()
            .ok_or_else(|| RelayError::Configuration("treasury signing key is not configured".to_string()))
    }

    /// Treasury address, or a configuration error if no signer is loaded.
    pub fn treasury_address(&self) -> RelayResult<FlowAddress> {
        Ok(self.signer()?.address())
    }

    pub fn contracts(&self) -> &ContractsConfig {
        &self.contracts
    }

    /// Validate and build a request without submitting it.
    pub fn prepare(&self, operation: Operation, args: &[NamedArg]) -> RelayResult<TransactionRequest> {
        let signer = self.signer()?;
        TransactionRequest::build(operation, args, signer.address())
    }

    /// Validate, sign and send `operation` as the treasury.
    pub async fn submit(&self, operation: Operation, args: &[NamedArg]) -> RelayResult<PendingTransaction> {
        let request = self.prepare(operation, args)?;
        self.submit_request(&request).await
    }

    pub async fn submit_request(&self, request: &TransactionRequest) -> RelayResult<PendingTransaction> {
        let signer = self.signer()?;
        let operation = request.operation();
        let script = operation.template().render(&self.contracts)?;
        let arguments = request
            .arguments()
            .iter()
            .map(|a| a.to_json_bytes())
            .collect::<LedgerResult<Vec<_>>>()?;

        let _guard = self.treasury_lock.lock().await;

        let script = &script;
        let arguments = &arguments;
        let result = self
            .retry
            .run(operation.name(), resubmittable, |attempt| async move {
                self.send_once(signer, script, arguments, attempt).await
            })
            .await;

        match result {
            Ok(transaction_id) => {
                metrics::record_submission(operation.name(), "submitted");
                Ok(PendingTransaction::new(transaction_id, operation))
            }
            Err(e) => {
                metrics::record_submission(operation.name(), "error");
                tracing::error!(operation = %operation, error = %e, "Transaction submission failed");
                Err(e)
            }
        }
    }

    async fn send_once(
        &self,
        signer: &TreasurySigner,
        script: &str,
        arguments: &[Vec<u8>],
        attempt: u32,
    ) -> RelayResult<TransactionId> {
        let treasury = signer.address();
        let reference = self.ledger.latest_sealed_block().await?;
        let account = self.ledger.get_account(&treasury).await?;
        let key = account
            .key(signer.key_index())
            .filter(|k| !k.revoked)
            .ok_or_else(|| {
                RelayError::Configuration(format!(
                    "treasury key {} is missing or revoked on {}",
                    signer.key_index(),
                    treasury
                ))
            })?;

        let sequence_number = self.sequences.allocate(key.sequence_number);
        let envelope = TransactionEnvelope {
            script: script.to_string(),
            arguments: arguments.to_vec(),
            reference_block_id: reference.id,
            gas_limit: self.gas_limit,
            proposal_key: ProposalKey {
                address: treasury,
                key_index: signer.key_index(),
                sequence_number,
            },
            payer: treasury,
            authorizers: vec![treasury],
        };
        let signed = match signer.sign(envelope).await {
            Ok(signed) => signed,
            Err(e) => {
                self.sequences.release(sequence_number);
                return Err(e.into());
            }
        };
        let transaction_id = match self.ledger.send_transaction(&signed).await {
            Ok(id) => id,
            Err(e) => {
                if e.is_sequence_mismatch() {
                    tracing::warn!(
                        sequence_number,
                        on_chain = key.sequence_number,
                        error = %e,
                        "Proposal key sequence rejected, resyncing from chain"
                    );
                    self.sequences.resync();
                } else if e.is_undelivered() {
                    self.sequences.release(sequence_number);
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            transaction_id = %transaction_id,
            sequence_number,
            on_chain_sequence = key.sequence_number,
            reference_height = reference.height,
            attempt,
            "Transaction submitted"
        );
        Ok(transaction_id)
    }
}

fn resubmittable(e: &RelayError) -> bool {
    e.is_undelivered() || e.is_sequence_mismatch()
}
