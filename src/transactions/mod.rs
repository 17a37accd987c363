//! Transaction submission and sealing.
//!
//! # Data Flow
//! ```text
//! (Operation, [NamedArg])
//!     → templates.rs (validate + render)
//!     → submitter.rs (sign + send under the treasury lock, sequence.rs allocates)
//!     → PendingTransaction
//!     → seal.rs (poll until terminal or timeout)
//!     → SealedTransactionResult
//!
//! Query (read-only) → scripts.rs → CadenceValue
//! ```

pub mod scripts;
pub mod seal;
pub mod sequence;
pub mod submitter;
pub mod templates;
pub mod types;

pub use scripts::ScriptRunner;
pub use seal::SealWaiter;
pub use sequence::SequenceAllocator;
pub use submitter::TransactionSubmitter;
pub use templates::{NamedArg, Operation, Query, TEMPLATE_VERSION};
pub use types::{PendingTransaction, SealStatus, SealedTransactionResult, TransactionRequest};
