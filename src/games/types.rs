//! Game domain types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;
use crate::ledger::amount::Amount;
use crate::ledger::types::{BlockId, FlowAddress, TransactionId};
use crate::transactions::templates::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameType {
    Roulette,
    Mines,
    Plinko,
    Wheel,
}

impl GameType {
    pub const ALL: [GameType; 4] = [Self::Roulette, Self::Mines, Self::Plinko, Self::Wheel];

    /// On-chain name, e.g. `ROULETTE`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Roulette => "ROULETTE",
            Self::Mines => "MINES",
            Self::Plinko => "PLINKO",
            Self::Wheel => "WHEEL",
        }
    }

    /// Lowercase name used by the HTTP API and request ids.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Roulette => "roulette",
            Self::Mines => "mines",
            Self::Plinko => "plinko",
            Self::Wheel => "wheel",
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            Self::Roulette => Operation::PlayRoulette,
            Self::Mines => Operation::PlayMines,
            Self::Plinko => Operation::PlayPlinko,
            Self::Wheel => Operation::PlayWheel,
        }
    }

    /// Result payload fields every outcome of this game must carry.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Roulette => &["winningNumber"],
            Self::Mines => &["hitMine"],
            Self::Plinko => &["finalPosition"],
            Self::Wheel => &["winningSegment"],
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = RelayError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                RelayError::Validation(format!(
                    "invalid game type '{}': expected one of roulette, mines, plinko, wheel",
                    s
                ))
            })
    }
}

/// Where the outcome's random seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeedSource {
    /// The seed the contract emitted in its game event.
    Event,
    /// Derived from the transaction id; caller-visible, so low assurance.
    TransactionIdFallback,
}

impl SeedSource {
    pub fn is_low_assurance(self) -> bool {
        self == Self::TransactionIdFallback
    }
}

/// Which part of the transaction output the outcome was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionPath {
    StructuredEvent,
    TextualReport,
}

/// What the caller asked for; outcomes are checked against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameContext {
    pub game_type: GameType,
    pub player: FlowAddress,
    pub bet_amount: Amount,
}

/// A verified game result with its chain provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub game_type: GameType,
    pub player: FlowAddress,
    pub bet_amount: Amount,
    pub result_payload: BTreeMap<String, String>,
    pub payout: Amount,
    pub random_seed: u64,
    pub seed_source: SeedSource,
    pub extraction_path: ExtractionPath,
    pub transaction_id: TransactionId,
    pub block_id: Option<BlockId>,
    pub block_height: Option<u64>,
}
