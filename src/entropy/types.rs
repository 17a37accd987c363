//! Commit-reveal entities.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::types::TransactionId;
use crate::transactions::types::SealedTransactionResult;

/// What the commit transaction puts on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
    /// The seed itself.
    #[default]
    Raw,
    /// `hex(sha256(seed || requestId))`; the seed is disclosed only at reveal.
    Hashed,
}

impl CommitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Hashed => "hashed",
        }
    }
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One commit-reveal run.
///
/// `random_value` can only be set through [`EntropyRequest::complete`], which
/// requires both phase results to be sealed OK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntropyRequest {
    request_id: String,
    commit_mode: CommitMode,
    commitment: String,
    commit_tx: Option<TransactionId>,
    reveal_tx: Option<TransactionId>,
    commit_height: Option<u64>,
    reveal_height: Option<u64>,
    random_value: Option<String>,
}

impl EntropyRequest {
    pub fn new(request_id: impl Into<String>, commit_mode: CommitMode, commitment: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            commit_mode,
            commitment: commitment.into(),
            commit_tx: None,
            reveal_tx: None,
            commit_height: None,
            reveal_height: None,
            random_value: None,
        }
    }

    pub(crate) fn record_commit(&mut self, commit: &SealedTransactionResult) {
        self.commit_tx = Some(commit.transaction_id().clone());
        self.commit_height = commit.block_height();
    }

    pub(crate) fn record_reveal(&mut self, reveal: &SealedTransactionResult) {
        self.reveal_tx = Some(reveal.transaction_id().clone());
        self.reveal_height = reveal.block_height();
    }

    /// Attach the revealed value. Returns `false`, leaving the request
    /// untouched, unless both phases sealed OK and belong to this request.
    pub(crate) fn complete(
        &mut self,
        commit: &SealedTransactionResult,
        reveal: &SealedTransactionResult,
        random_value: String,
    ) -> bool {
        let phases_match = self.commit_tx.as_ref() == Some(commit.transaction_id())
            && self.reveal_tx.as_ref() == Some(reveal.transaction_id());
        if !(commit.is_ok() && reveal.is_ok() && phases_match) {
            return false;
        }
        self.random_value = Some(random_value);
        true
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode
    }

    /// The value committed on-chain: the seed (raw) or its hash (hashed).
    pub fn commitment(&self) -> &str {
        &self.commitment
    }

    pub fn commit_tx(&self) -> Option<&TransactionId> {
        self.commit_tx.as_ref()
    }

    pub fn reveal_tx(&self) -> Option<&TransactionId> {
        self.reveal_tx.as_ref()
    }

    pub fn commit_height(&self) -> Option<u64> {
        self.commit_height
    }

    pub fn reveal_height(&self) -> Option<u64> {
        self.reveal_height
    }

    pub fn random_value(&self) -> Option<&str> {
        self.random_value.as_deref()
    }
}
