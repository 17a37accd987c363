//! Treasury-sponsored casino relay on the Flow ledger.
//!
//! The treasury signs and pays for every game transaction; game randomness
//! comes from on-chain events or a commit-reveal protocol.

pub mod config;
pub mod context;
pub mod entropy;
pub mod error;
pub mod games;
pub mod http;
pub mod ledger;
pub mod observability;
pub mod operations;
pub mod resilience;
pub mod transactions;
pub mod treasury;

pub use config::RelayConfig;
pub use context::RelayContext;
pub use error::{RelayError, RelayResult};
pub use http::HttpServer;
