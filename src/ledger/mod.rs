//! Ledger integration.
//!
//! # Data Flow
//! ```text
//! TransactionSubmitter
//!     → envelope.rs (RLP payload + domain tag)
//!     → signer.rs (treasury ECDSA signature)
//!     → failover.rs (endpoint rotation, read retries)
//!     → client.rs (access node REST API)
//!
//! SealWaiter / guard / entropy queries
//!     → failover.rs → client.rs
//! ```
//!
//! # Security
//! - The treasury key is read from the environment only and never logged

pub mod amount;
pub mod cadence;
pub mod client;
pub mod envelope;
pub mod failover;
pub mod signer;
pub mod types;

pub use amount::Amount;
pub use cadence::CadenceValue;
pub use client::{FlowRestClient, LedgerClient};
pub use envelope::{ProposalKey, SignedTransaction, TransactionEnvelope};
pub use failover::FailoverClient;
pub use signer::TreasurySigner;
pub use types::{
    AccountInfo, AccountKey, BlockHeader, BlockId, FlowAddress, LedgerError, LedgerEvent, LedgerResult,
    LedgerTxStatus, TransactionId, TransactionRecord,
};
