//! Commit-reveal randomness.
//!
//! # Protocol
//! ```text
//! commit(requestId, seed | hash)   → await SEALED_OK
//! wait until sealed height ≥ commit height + reveal_delay_blocks
//! reveal(requestId, seed)          → await SEALED_OK
//! query random value               → EntropyRequest
//! ```
//!
//! # Design Decisions
//! - Each phase starts only after the previous one sealed OK
//! - The seed is never logged; only the request id and transaction ids are
//! - `EXPIRED` in either phase surfaces as a timeout carrying that phase's id

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::schema::EntropyConfig;
use crate::entropy::seed;
use crate::entropy::types::{CommitMode, EntropyRequest};
use crate::error::{RelayError, RelayResult};
use crate::games::types::GameType;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::client::LedgerClient;
use crate::observability::metrics;
use crate::transactions::templates::{NamedArg, Operation, Query};
use crate::transactions::types::{SealStatus, SealedTransactionResult};
use crate::transactions::{ScriptRunner, SealWaiter, TransactionSubmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Commit,
    Reveal,
}

pub struct CommitRevealEngine {
    ledger: Arc<dyn LedgerClient>,
    submitter: Arc<TransactionSubmitter>,
    seal_waiter: Arc<SealWaiter>,
    scripts: Arc<ScriptRunner>,
    config: EntropyConfig,
    poll_interval: Duration,
}

impl CommitRevealEngine {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        submitter: Arc<TransactionSubmitter>,
        seal_waiter: Arc<SealWaiter>,
        scripts: Arc<ScriptRunner>,
        config: EntropyConfig,
        poll_interval: Duration,
    ) -> Self {
        Self {
            ledger,
            submitter,
            seal_waiter,
            scripts,
            config,
            poll_interval,
        }
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.config.commit_mode
    }

    /// Run commit-reveal under a fresh request id and seed.
    pub async fn generate(&self, game: GameType) -> RelayResult<EntropyRequest> {
        let request_id = seed::request_id(game);
        let seed = seed::generate_seed(self.config.seed_length_bytes);
        self.generate_random(&request_id, &seed).await
    }

    /// Run commit-reveal for `request_id` with the hex `seed`.
    pub async fn generate_random(&self, request_id: &str, seed: &str) -> RelayResult<EntropyRequest> {
        if request_id.trim().is_empty() {
            return Err(RelayError::Validation("requestId must not be empty".to_string()));
        }
        if seed.is_empty() || hex::decode(seed).is_err() {
            return Err(RelayError::Validation("seed must be non-empty hex".to_string()));
        }

        let mode = self.config.commit_mode;
        let result = self.run(request_id, seed, mode).await;
        match &result {
            Ok(_) => metrics::record_entropy(mode.as_str(), "ok"),
            Err(e) => {
                metrics::record_entropy(mode.as_str(), "error");
                tracing::warn!(request_id = %request_id, error = %e, "Commit-reveal failed");
            }
        }
        result
    }

    async fn run(&self, request_id: &str, seed: &str, mode: CommitMode) -> RelayResult<EntropyRequest> {
        let request_arg = || NamedArg::new("requestId", CadenceValue::string(request_id));
        let (commit_op, commitment, commit_args, reveal_op, reveal_args) = match mode {
            CommitMode::Raw => (
                Operation::CommitRandom,
                seed.to_string(),
                vec![request_arg(), NamedArg::new("randomSeed", CadenceValue::string(seed))],
                Operation::RevealRandom,
                vec![request_arg(), NamedArg::new("randomSeed", CadenceValue::string(seed))],
            ),
            CommitMode::Hashed => {
                let commitment = seed::hashed_commitment(seed, request_id);
                let commit_args = vec![request_arg(), NamedArg::new("commitment", CadenceValue::string(&commitment))];
                (
                    Operation::CommitHash,
                    commitment,
                    commit_args,
                    Operation::RevealSeed,
                    vec![request_arg(), NamedArg::new("seed", CadenceValue::string(seed))],
                )
            }
        };

        // Both phases are validated before anything is sent.
        self.submitter.prepare(commit_op, &commit_args)?;
        self.submitter.prepare(reveal_op, &reveal_args)?;

        let mut request = EntropyRequest::new(request_id, mode, commitment);

        let commit = self.run_phase(Phase::Commit, commit_op, &commit_args).await?;
        request.record_commit(&commit);
        tracing::info!(
            request_id = %request_id,
            transaction_id = %commit.transaction_id(),
            block_height = ?commit.block_height(),
            commit_mode = %mode,
            "Commit sealed"
        );

        self.await_reveal_delay(commit.block_height()).await?;

        let reveal = self.run_phase(Phase::Reveal, reveal_op, &reveal_args).await?;
        request.record_reveal(&reveal);
        tracing::info!(
            request_id = %request_id,
            transaction_id = %reveal.transaction_id(),
            block_height = ?reveal.block_height(),
            "Reveal sealed"
        );

        let value = self.query_random_value(&request).await?;
        if !request.complete(&commit, &reveal, value) {
            return Err(RelayError::RandomUnavailable {
                request_id: request_id.to_string(),
            });
        }
        Ok(request)
    }

    async fn run_phase(
        &self,
        phase: Phase,
        operation: Operation,
        args: &[NamedArg],
    ) -> RelayResult<SealedTransactionResult> {
        let pending = self.submitter.submit(operation, args).await?;
        let sealed = self.seal_waiter.await_seal(&pending, None).await;
        let transaction_id = sealed.transaction_id().clone();
        match sealed.status() {
            SealStatus::SealedOk => Ok(sealed),
            SealStatus::SealedFailed => {
                let error_message = sealed.error_message().unwrap_or("unknown chain error").to_string();
                Err(match phase {
                    Phase::Commit => RelayError::CommitFailed {
                        transaction_id,
                        error_message,
                    },
                    Phase::Reveal => RelayError::RevealFailed {
                        transaction_id,
                        error_message,
                    },
                })
            }
            SealStatus::Expired => Err(RelayError::TransactionTimeout { transaction_id }),
        }
    }

    /// Block until the latest sealed height is `reveal_delay_blocks` past the commit.
    async fn await_reveal_delay(&self, commit_height: Option<u64>) -> RelayResult<()> {
        let required_blocks = self.config.reveal_delay_blocks;
        if required_blocks == 0 {
            return Ok(());
        }
        // Unknown commit height: count from the current sealed head instead.
        let commit_height = match commit_height {
            Some(height) => height,
            None => self.ledger.latest_sealed_block().await?.height,
        };
        let target = commit_height.saturating_add(required_blocks);
        let deadline = Instant::now() + Duration::from_secs(self.config.reveal_delay_timeout_secs);
        let mut latest_height = commit_height;

        loop {
            match self.ledger.latest_sealed_block().await {
                Ok(header) => {
                    latest_height = header.height;
                    if latest_height >= target {
                        return Ok(());
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Sealed height poll failed, will retry"),
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(RelayError::ConfirmationDelay {
                    commit_height,
                    latest_height,
                    required_blocks,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn query_random_value(&self, request: &EntropyRequest) -> RelayResult<String> {
        let request_arg = NamedArg::new("requestId", CadenceValue::string(request.request_id()));
        let value = match request.commit_mode() {
            CommitMode::Raw => self.scripts.run(Query::RandomValue, &[request_arg]).await?,
            CommitMode::Hashed => {
                let commitment = NamedArg::new("commitment", CadenceValue::string(request.commitment()));
                self.scripts
                    .run(Query::VerifiedRandomValue, &[request_arg, commitment])
                    .await?
            }
        };
        value
            .as_text()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RelayError::RandomUnavailable {
                request_id: request.request_id().to_string(),
            })
    }
}
