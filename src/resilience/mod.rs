//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Ledger call:
//!     → retries.rs (classify error, retry with backoff)
//!     → backoff.rs (decorrelated jitter, clamped to the ceiling)
//!     → ledger::failover (rotate to the next access endpoint)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline (enforced by the HTTP client)
//! - Retries only for idempotent calls (reads, status polls)
//! - Submissions retry only when provably undelivered or rejected for a stale sequence number

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
