//! Relay operations behind the HTTP API.
//!
//! # Data Flow
//! ```text
//! HTTP body (camelCase JSON)
//!     → validation.rs (addresses, amounts, bet limits)
//!     → deposit.rs / withdraw.rs / game.rs / entropy.rs
//!     → RelayContext components (submitter, seal waiter, extractor, engine, guard)
//!     → response struct (camelCase JSON)
//! ```

pub mod deposit;
pub mod entropy;
pub mod game;
pub mod validation;
pub mod withdraw;

use serde::Serialize;

use crate::ledger::types::LedgerEvent;

/// Event as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    #[serde(rename = "type")]
    pub event_type: String,
    pub index: u32,
    pub data: serde_json::Value,
}

impl From<&LedgerEvent> for EventView {
    fn from(event: &LedgerEvent) -> Self {
        Self {
            event_type: event.event_type.clone(),
            index: event.event_index,
            data: event
                .payload
                .as_ref()
                .map(|p| p.to_plain_json())
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

pub(crate) fn event_views(events: &[LedgerEvent]) -> Vec<EventView> {
    events.iter().map(EventView::from).collect()
}
