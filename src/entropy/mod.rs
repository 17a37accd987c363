//! Commit-reveal entropy.
//!
//! # Data Flow
//! ```text
//! generate(game) → seed.rs (request id, OsRng seed, optional hash commitment)
//!     → engine.rs (commit → delay → reveal → query)
//!     → EntropyRequest
//! ```

pub mod engine;
pub mod seed;
pub mod types;

pub use engine::CommitRevealEngine;
pub use types::{CommitMode, EntropyRequest};
