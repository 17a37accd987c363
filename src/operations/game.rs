//! Treasury-sponsored game plays.
//!
//! Two entry points share one pipeline:
//! validate → play transaction → await seal → extract outcome.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::RelayContext;
use crate::error::{RelayError, RelayResult};
use crate::games::{game_arguments, GameContext, GameOutcome, GameType};
use crate::ledger::amount::Amount;
use crate::ledger::types::{BlockId, FlowAddress, TransactionId};
use crate::operations::validation::{parse_address, parse_bet};
use crate::operations::{event_views, EventView};
use crate::transactions::types::SealedTransactionResult;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowVrfRequest {
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub user_address: String,
    #[serde(default)]
    pub bet_amount: Value,
    #[serde(default)]
    pub game_params: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowVrfResponse {
    pub success: bool,
    pub random_number: u64,
    pub game_result: Map<String, Value>,
    pub transaction_id: TransactionId,
    pub block_height: Option<u64>,
    pub block_id: Option<BlockId>,
    pub game_type: &'static str,
    pub user_address: FlowAddress,
    pub bet_amount: Amount,
    pub explorer_url: String,
    pub network: String,
    pub contract_address: String,
    pub seed_source: crate::games::SeedSource,
    pub extraction_path: crate::games::ExtractionPath,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryTransactionRequest {
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub player_address: String,
    /// Carries `betAmount` alongside the game-specific fields.
    #[serde(default)]
    pub game_params: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredTransaction {
    pub id: TransactionId,
    pub status: &'static str,
    pub events: Vec<EventView>,
    pub block_id: Option<BlockId>,
    pub treasury_sponsored: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryTransactionResponse {
    pub success: bool,
    pub transaction_id: TransactionId,
    pub transaction: SponsoredTransaction,
    pub outcome: GameOutcome,
}

/// Validated play request.
struct Play {
    context: GameContext,
    params: Value,
}

fn validate_play(
    ctx: &RelayContext,
    game_type: &str,
    player_field: &str,
    player: &str,
    bet: &Value,
    params: Value,
) -> RelayResult<Play> {
    if game_type.trim().is_empty() {
        return Err(RelayError::Validation("gameType is required".to_string()));
    }
    let game_type: GameType = game_type.parse()?;
    let player = parse_address(player_field, player)?;
    let bet_amount = parse_bet("betAmount", bet, &ctx.config.games)?;
    Ok(Play {
        context: GameContext {
            game_type,
            player,
            bet_amount,
        },
        params,
    })
}

async fn play(ctx: &RelayContext, play: &Play) -> RelayResult<(SealedTransactionResult, GameOutcome)> {
    let game = play.context.game_type;
    let args = game_arguments(game, play.context.player, play.context.bet_amount, &play.params)?;
    let pending = ctx.submitter.submit(game.operation(), &args).await?;
    tracing::info!(
        transaction_id = %pending.transaction_id,
        game = %game,
        player = %play.context.player,
        bet = %play.context.bet_amount,
        "Game transaction submitted"
    );
    let sealed = ctx.seal_waiter.await_seal(&pending, None).await;
    let outcome = ctx.extractor.extract(&sealed, &play.context)?;
    if outcome.seed_source.is_low_assurance() {
        tracing::warn!(
            transaction_id = %outcome.transaction_id,
            "Outcome seed derived from transaction id"
        );
    }
    Ok((sealed, outcome))
}

/// Result payload plus the outcome's summary fields.
fn game_result_view(outcome: &GameOutcome) -> Map<String, Value> {
    let mut view: Map<String, Value> = outcome
        .result_payload
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    view.insert("gameType".into(), Value::String(outcome.game_type.as_str().into()));
    view.insert("player".into(), Value::String(outcome.player.to_string()));
    view.insert("betAmount".into(), serde_json::json!(outcome.bet_amount));
    view.insert("payout".into(), serde_json::json!(outcome.payout));
    view.insert("randomSeed".into(), Value::from(outcome.random_seed));
    view
}

pub async fn flow_vrf(ctx: &RelayContext, request: FlowVrfRequest) -> RelayResult<FlowVrfResponse> {
    let play_request = validate_play(
        ctx,
        &request.game_type,
        "userAddress",
        &request.user_address,
        &request.bet_amount,
        request.game_params,
    )?;
    let (_, outcome) = play(ctx, &play_request).await?;

    Ok(FlowVrfResponse {
        success: true,
        random_number: outcome.random_seed,
        game_result: game_result_view(&outcome),
        explorer_url: ctx.explorer_url(&outcome.transaction_id),
        transaction_id: outcome.transaction_id.clone(),
        block_height: outcome.block_height,
        block_id: outcome.block_id.clone(),
        game_type: outcome.game_type.slug(),
        user_address: outcome.player,
        bet_amount: outcome.bet_amount,
        network: ctx.config.ledger.network.clone(),
        contract_address: ctx.config.contracts.casino_games.clone(),
        seed_source: outcome.seed_source,
        extraction_path: outcome.extraction_path,
    })
}

pub async fn treasury_transaction(
    ctx: &RelayContext,
    request: TreasuryTransactionRequest,
) -> RelayResult<TreasuryTransactionResponse> {
    let mut params = match request.game_params {
        Value::Object(map) => map,
        Value::Null => return Err(RelayError::Validation("gameParams is required".to_string())),
        _ => return Err(RelayError::Validation("gameParams must be an object".to_string())),
    };
    let bet = params.remove("betAmount").unwrap_or(Value::Null);
    let play_request = validate_play(
        ctx,
        &request.game_type,
        "playerAddress",
        &request.player_address,
        &bet,
        Value::Object(params),
    )?;
    let (sealed, outcome) = play(ctx, &play_request).await?;

    Ok(TreasuryTransactionResponse {
        success: true,
        transaction_id: sealed.transaction_id().clone(),
        transaction: SponsoredTransaction {
            id: sealed.transaction_id().clone(),
            status: sealed.status().as_label(),
            events: event_views(sealed.events()),
            block_id: sealed.block_id().cloned(),
            treasury_sponsored: true,
        },
        outcome,
    })
}
