//! Proposal-key sequence allocation.
//!
//! The ledger advances a key's sequence number only once a transaction
//! executes, so the on-chain value lags behind transactions still in flight.
//! Each allocation hands out `max(on_chain, next_local)` and bumps the local
//! counter. Callers hold the treasury lock from allocation through send.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Local sequence counter for the treasury's proposal key.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct SequenceAllocator {
    next: Arc<AtomicU64>,
}

impl SequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the sequence number for the next envelope.
    pub fn allocate(&self, on_chain: u64) -> u64 {
        let bump = |next: u64| Some(next.max(on_chain).saturating_add(1));
        match self.next.fetch_update(Ordering::SeqCst, Ordering::SeqCst, bump) {
            Ok(previous) | Err(previous) => previous.max(on_chain),
        }
    }

    /// Hand `allocated` back if nothing was allocated after it.
    pub fn release(&self, allocated: u64) {
        let _ = self.next.compare_exchange(
            allocated.saturating_add(1),
            allocated,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Forget local allocations; the next one follows the chain.
    pub fn resync(&self) {
        self.next.store(0, Ordering::SeqCst);
    }

    /// Sequence number the next allocation uses when the chain is behind.
    pub fn next_local(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}
