//! Process-wide relay context.
//!
//! Built once at startup and shared via `Arc`; holds no mutable game state.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RelayConfig;
use crate::entropy::CommitRevealEngine;
use crate::error::{RelayError, RelayResult};
use crate::games::ResultExtractor;
use crate::ledger::client::LedgerClient;
use crate::ledger::failover::FailoverClient;
use crate::ledger::signer::TreasurySigner;
use crate::ledger::types::{FlowAddress, TransactionId};
use crate::resilience::RetryPolicy;
use crate::transactions::{ScriptRunner, SealWaiter, SequenceAllocator, TransactionSubmitter};
use crate::treasury::TreasuryBalanceGuard;

pub struct RelayContext {
    pub config: RelayConfig,
    pub ledger: Arc<dyn LedgerClient>,
    pub submitter: Arc<TransactionSubmitter>,
    pub seal_waiter: Arc<SealWaiter>,
    pub scripts: Arc<ScriptRunner>,
    pub extractor: ResultExtractor,
    pub entropy: CommitRevealEngine,
    treasury_guard: Option<TreasuryBalanceGuard>,
}

impl RelayContext {
    /// Connect to the configured access endpoints and load the treasury key
    /// from the environment. A missing key is not fatal: transaction
    /// endpoints then answer with a configuration error.
    pub fn from_config(config: RelayConfig) -> RelayResult<Self> {
        let retry = RetryPolicy::from_config(&config.retries);
        let ledger: Arc<dyn LedgerClient> = Arc::new(FailoverClient::from_urls(
            &config.ledger.access_endpoints,
            Duration::from_secs(config.ledger.request_timeout_secs),
            retry,
        )?);

        let signer = match treasury_address(&config)? {
            Some(address) => match TreasurySigner::from_env(address, config.treasury.key_index) {
                Ok(signer) => Some(signer),
                Err(e) => {
                    tracing::warn!(error = %e, "Treasury signer unavailable, transactions are disabled");
                    None
                }
            },
            None => {
                tracing::warn!(
                    network = %config.ledger.network,
                    "treasury.address is not configured, transactions are disabled"
                );
                None
            }
        };

        Ok(Self::with_ledger(config, ledger, signer))
    }

    /// Assemble the context over an existing ledger client.
    pub fn with_ledger(config: RelayConfig, ledger: Arc<dyn LedgerClient>, signer: Option<TreasurySigner>) -> Self {
        let guard_address = signer
            .as_ref()
            .map(TreasurySigner::address)
            .or_else(|| {
                config
                    .treasury
                    .effective_address(&config.ledger.network)
                    .and_then(|address| address.parse().ok())
            });

        let sequences = SequenceAllocator::new();
        let submitter = Arc::new(TransactionSubmitter::new(
            ledger.clone(),
            signer,
            config.contracts.clone(),
            config.ledger.gas_limit,
            RetryPolicy::from_config(&config.retries),
            sequences.clone(),
        ));
        let poll_interval = Duration::from_millis(config.sealing.poll_interval_ms);
        let seal_waiter = Arc::new(SealWaiter::new(
            ledger.clone(),
            poll_interval,
            Duration::from_secs(config.sealing.timeout_secs),
            sequences,
        ));
        let scripts = Arc::new(ScriptRunner::new(ledger.clone(), config.contracts.clone()));
        let extractor = ResultExtractor::new(config.contracts.game_played_event_type());
        let entropy = CommitRevealEngine::new(
            ledger.clone(),
            submitter.clone(),
            seal_waiter.clone(),
            scripts.clone(),
            config.entropy.clone(),
            poll_interval,
        );
        let treasury_guard = guard_address
            .map(|address| TreasuryBalanceGuard::new(ledger.clone(), scripts.clone(), address, &config.treasury));

        Self {
            config,
            ledger,
            submitter,
            seal_waiter,
            scripts,
            extractor,
            entropy,
            treasury_guard,
        }
    }

    pub fn treasury_guard(&self) -> RelayResult<&TreasuryBalanceGuard> {
        self.treasury_guard
            .as_ref()
            .ok_or_else(|| RelayError::Configuration("treasury.address is not configured".to_string()))
    }

    /// Block explorer link for a transaction.
    pub fn explorer_url(&self, transaction_id: &TransactionId) -> String {
        format!(
            "{}/tx/{}",
            self.config.ledger.explorer_base_url.trim_end_matches('/'),
            transaction_id
        )
    }
}

fn treasury_address(config: &RelayConfig) -> RelayResult<Option<FlowAddress>> {
    let Some(raw) = config.treasury.effective_address(&config.ledger.network) else {
        return Ok(None);
    };
    if config.treasury.address.trim().is_empty() {
        tracing::info!(address = raw, "treasury.address not set, using the deployed testnet treasury");
    }
    raw.parse()
        .map(Some)
        .map_err(|_| RelayError::Configuration(format!("treasury.address '{}' is invalid", raw)))
}
