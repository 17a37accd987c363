//! Casino games: argument mapping and outcome extraction.

pub mod extractor;
pub mod params;
pub mod report;
pub mod types;

pub use extractor::ResultExtractor;
pub use params::game_arguments;
pub use types::{ExtractionPath, GameContext, GameOutcome, GameType, SeedSource};
