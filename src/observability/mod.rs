//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! submitter / seal waiter / retry policy / balance guard / entropy engine
//!     → logging.rs (tracing subscriber: EnvFilter + fmt layer)
//!     → metrics.rs (counters and histograms, Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - Structured log fields: `transaction_id`, `request_id`, `operation`
//! - The treasury private key never reaches a log line
//! - Metric recording is a no-op until an exporter is installed

pub mod logging;
pub mod metrics;
