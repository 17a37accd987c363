//! HTTP API.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, trace/timeout/body-limit layers)
//!     → handlers.rs (JSON extraction, one handler per route)
//!     → crate::operations
//!     → error.rs (RelayError → status code + JSON body)
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use server::{build_router, AppState, HttpServer};
