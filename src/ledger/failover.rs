//! Failover across equivalent access endpoints.
//!
//! # Responsibilities
//! - Hold one client per configured access endpoint (primary first)
//! - Retry idempotent reads with backoff, moving to the next endpoint on each retry
//! - Send transactions with at most one delivery
//!
//! # Design Decisions
//! - A sticky cursor remembers the last endpoint that answered
//! - `send_transaction` moves to the next endpoint only when the error proves
//!   the request was never delivered; ambiguous failures surface immediately

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::ledger::cadence::CadenceValue;
use crate::ledger::client::{FlowRestClient, LedgerClient};
use crate::ledger::envelope::SignedTransaction;
use crate::ledger::types::{
    AccountInfo, BlockHeader, BlockId, FlowAddress, LedgerError, LedgerResult, TransactionId, TransactionRecord,
};
use crate::resilience::RetryPolicy;

/// `LedgerClient` that spreads calls over several endpoints.
pub struct FailoverClient {
    endpoints: Vec<Arc<dyn LedgerClient>>,
    cursor: AtomicUsize,
    retry: RetryPolicy,
}

impl FailoverClient {
    pub fn new(endpoints: Vec<Arc<dyn LedgerClient>>, retry: RetryPolicy) -> LedgerResult<Self> {
        if endpoints.is_empty() {
            return Err(LedgerError::Transport("no access endpoints configured".to_string()));
        }
        Ok(Self {
            endpoints,
            cursor: AtomicUsize::new(0),
            retry,
        })
    }

    /// Build REST clients for each URL. Invalid URLs are skipped with a warning.
    pub fn from_urls(urls: &[String], request_timeout: Duration, retry: RetryPolicy) -> LedgerResult<Self> {
        let mut endpoints: Vec<Arc<dyn LedgerClient>> = Vec::new();
        for url in urls {
            match FlowRestClient::new(url, request_timeout) {
                Ok(client) => endpoints.push(Arc::new(client)),
                Err(e) => tracing::warn!(url = %url, error = %e, "Ignoring invalid access endpoint"),
            }
        }
        let client = Self::new(endpoints, retry)?;
        tracing::info!(endpoints = client.endpoints.len(), "Ledger client initialized");
        Ok(client)
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    fn pick(&self, attempt: u32) -> (usize, &Arc<dyn LedgerClient>) {
        let start = self.cursor.load(Ordering::Relaxed);
        let idx = (start + attempt as usize) % self.endpoints.len();
        (idx, &self.endpoints[idx])
    }

    fn mark_good(&self, idx: usize) {
        self.cursor.store(idx, Ordering::Relaxed);
    }

    async fn read<T, F, Fut>(&self, operation: &'static str, f: F) -> LedgerResult<T>
    where
        F: Fn(Arc<dyn LedgerClient>) -> Fut,
        Fut: std::future::Future<Output = LedgerResult<T>>,
    {
        // At least one pass over every endpoint, even with a small retry budget.
        let policy = if (self.retry.max_attempts() as usize) < self.endpoints.len() {
            RetryPolicy::new(self.endpoints.len() as u32, 0, 0)
        } else {
            self.retry.clone()
        };
        policy
            .run(operation, LedgerError::is_retryable, |attempt| {
                let (idx, client) = self.pick(attempt);
                let fut = f(client.clone());
                async move {
                    match fut.await {
                        Ok(v) => {
                            self.mark_good(idx);
                            Ok(v)
                        }
                        Err(e) => {
                            tracing::warn!(endpoint_idx = idx, operation, error = %e, "Access endpoint call failed");
                            Err(e)
                        }
                    }
                }
            })
            .await
    }
}

#[async_trait]
impl LedgerClient for FailoverClient {
    async fn send_transaction(&self, tx: &SignedTransaction) -> LedgerResult<TransactionId> {
        let mut last_error = None;
        for attempt in 0..self.endpoints.len() as u32 {
            let (idx, client) = self.pick(attempt);
            match client.send_transaction(tx).await {
                Ok(id) => {
                    self.mark_good(idx);
                    return Ok(id);
                }
                Err(e) if e.is_undelivered() => {
                    tracing::warn!(endpoint_idx = idx, error = %e, "Endpoint unreachable, trying next for submission");
                    last_error = Some(e);
                }
                // May have been accepted: never re-send.
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| LedgerError::Unreachable("no access endpoints".to_string())))
    }

    async fn get_transaction_result(&self, id: &TransactionId) -> LedgerResult<Option<TransactionRecord>> {
        self.read("get_transaction_result", |c| {
            let id = id.clone();
            async move { c.get_transaction_result(&id).await }
        })
        .await
    }

    async fn execute_script(&self, script: &str, arguments: &[CadenceValue]) -> LedgerResult<CadenceValue> {
        self.read("execute_script", |c| {
            let script = script.to_string();
            let arguments = arguments.to_vec();
            async move { c.execute_script(&script, &arguments).await }
        })
        .await
    }

    async fn latest_sealed_block(&self) -> LedgerResult<BlockHeader> {
        self.read("latest_sealed_block", |c| async move { c.latest_sealed_block().await })
            .await
    }

    async fn get_block(&self, id: &BlockId) -> LedgerResult<BlockHeader> {
        self.read("get_block", |c| {
            let id = id.clone();
            async move { c.get_block(&id).await }
        })
        .await
    }

    async fn get_account(&self, address: &FlowAddress) -> LedgerResult<AccountInfo> {
        let address = *address;
        self.read("get_account", |c| async move { c.get_account(&address).await })
            .await
    }
}
