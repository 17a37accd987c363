//! Game outcome extraction from sealed transactions.
//!
//! # Sources
//! 1. The structured `GamePlayed` event (JSON-Cadence payload)
//! 2. The textual execution report, when no usable event is present
//!
//! A source is usable when it carries every result field the game requires.
//! A source that names a different game or player is an error, not a miss.

use std::collections::BTreeMap;

use crate::error::{RelayError, RelayResult};
use crate::games::report::{parse_report, ReportValue};
use crate::games::types::{ExtractionPath, GameContext, GameOutcome, SeedSource};
use crate::ledger::amount::Amount;
use crate::ledger::types::{BlockId, FlowAddress, LedgerEvent};
use crate::transactions::types::{SealStatus, SealedTransactionResult};

/// Fields read from one source before they are checked against the request.
#[derive(Debug, Default)]
struct RawOutcome {
    game_type: Option<String>,
    player: Option<String>,
    bet_amount: Option<Amount>,
    payout: Option<Amount>,
    random_seed: Option<u64>,
    result: BTreeMap<String, String>,
    block_id: Option<BlockId>,
    block_height: Option<u64>,
}

impl RawOutcome {
    fn from_event(event: &LedgerEvent) -> Option<Self> {
        let composite = event.payload.as_ref()?.as_composite()?;
        let text = |name: &str| composite.field(name).and_then(|v| v.as_text());
        Some(Self {
            game_type: text("gameType"),
            player: text("player"),
            bet_amount: composite.field("betAmount").and_then(|v| v.as_amount()),
            payout: composite.field("payout").and_then(|v| v.as_amount()),
            random_seed: composite.field("randomSeed").and_then(|v| v.as_u64()),
            result: composite
                .field("gameResult")
                .and_then(|v| v.as_string_map())
                .unwrap_or_default(),
            block_id: None,
            block_height: None,
        })
    }

    fn from_report(report: &str, event_type: &str) -> Option<Self> {
        let report = parse_report(report);
        let event = report.event(event_type)?;
        let text = |name: &str| event.value(name).and_then(ReportValue::text);
        Some(Self {
            game_type: text("gameType"),
            player: text("player"),
            bet_amount: text("betAmount").and_then(|s| s.parse().ok()),
            payout: text("payout").and_then(|s| s.parse().ok()),
            random_seed: text("randomSeed").and_then(|s| s.parse().ok()),
            result: event
                .value("gameResult")
                .and_then(ReportValue::map)
                .unwrap_or_default(),
            block_id: report.block_id.map(BlockId::new),
            block_height: report.block_height,
        })
    }

    fn has_fields(&self, required: &[&str]) -> bool {
        required.iter().all(|f| self.result.contains_key(*f))
    }
}

pub struct ResultExtractor {
    event_type: String,
}

impl ResultExtractor {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Turn a sealed play transaction into a verified outcome.
    pub fn extract(&self, sealed: &SealedTransactionResult, context: &GameContext) -> RelayResult<GameOutcome> {
        let transaction_id = sealed.transaction_id();
        match sealed.status() {
            SealStatus::SealedOk => {}
            SealStatus::SealedFailed => {
                return Err(RelayError::TransactionFailed {
                    transaction_id: transaction_id.clone(),
                    error_message: sealed
                        .error_message()
                        .unwrap_or("transaction failed without an error message")
                        .to_string(),
                })
            }
            SealStatus::Expired => {
                return Err(RelayError::TransactionTimeout {
                    transaction_id: transaction_id.clone(),
                })
            }
        }

        let parse_error = |reason: String| RelayError::Parse {
            transaction_id: transaction_id.clone(),
            reason,
        };
        let required = context.game_type.required_fields();

        let structured = sealed
            .events()
            .iter()
            .filter(|e| e.event_type == self.event_type)
            .find_map(RawOutcome::from_event);
        let textual = || {
            sealed
                .raw_report()
                .and_then(|report| RawOutcome::from_report(report, &self.event_type))
        };

        let (raw, path) = match structured {
            Some(raw) if raw.has_fields(required) => (raw, ExtractionPath::StructuredEvent),
            structured => match textual() {
                Some(raw) if raw.has_fields(required) => {
                    tracing::warn!(
                        transaction_id = %transaction_id,
                        event_type = %self.event_type,
                        "Structured event unusable, outcome read from textual report"
                    );
                    (raw, ExtractionPath::TextualReport)
                }
                _ => {
                    let reason = if structured.is_some() {
                        format!("game result is missing required fields {:?}", required)
                    } else {
                        format!("no {} event in transaction output", self.event_type)
                    };
                    return Err(parse_error(reason));
                }
            },
        };

        if let Some(game_type) = raw.game_type.as_deref() {
            if !game_type.eq_ignore_ascii_case(context.game_type.as_str()) {
                return Err(parse_error(format!(
                    "event reports game type {} but {} was played",
                    game_type, context.game_type
                )));
            }
        }
        if let Some(player) = raw.player.as_deref() {
            match FlowAddress::parse_lenient(player) {
                Ok(address) if address == context.player => {}
                _ => {
                    return Err(parse_error(format!(
                        "event reports player {} but {} was requested",
                        player, context.player
                    )))
                }
            }
        }

        let payout = raw.payout.unwrap_or_else(|| {
            tracing::warn!(transaction_id = %transaction_id, "Outcome carries no payout, treating as zero");
            Amount::ZERO
        });

        let (random_seed, seed_source) = match raw.random_seed {
            Some(seed) => (seed, SeedSource::Event),
            None => {
                let seed = transaction_id
                    .low_bits()
                    .ok_or_else(|| parse_error("no random seed and transaction id too short to derive one".into()))?;
                tracing::warn!(
                    transaction_id = %transaction_id,
                    seed,
                    "Outcome carries no random seed, using transaction id fallback"
                );
                (u64::from(seed), SeedSource::TransactionIdFallback)
            }
        };

        Ok(GameOutcome {
            game_type: context.game_type,
            player: context.player,
            bet_amount: raw.bet_amount.unwrap_or(context.bet_amount),
            result_payload: raw.result,
            payout,
            random_seed,
            seed_source,
            extraction_path: path,
            transaction_id: transaction_id.clone(),
            block_id: sealed.block_id().cloned().or(raw.block_id),
            block_height: sealed.block_height().or(raw.block_height),
        })
    }
}
