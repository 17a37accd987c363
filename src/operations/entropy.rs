//! Standalone commit-reveal entropy for off-chain game logic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RelayContext;
use crate::entropy::CommitMode;
use crate::error::{RelayError, RelayResult};
use crate::games::GameType;
use crate::ledger::types::TransactionId;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEntropyRequest {
    #[serde(default)]
    pub game_type: String,
    /// Echoed back; not interpreted.
    #[serde(default)]
    pub game_config: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntropyProof {
    pub request_id: String,
    pub commit_tx: TransactionId,
    pub reveal_tx: TransactionId,
    /// The reveal transaction, which fixes the value.
    pub transaction_hash: TransactionId,
    pub block_height: Option<u64>,
    pub explorer_url: String,
    pub commit_mode: CommitMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntropyMetadata {
    pub source: &'static str,
    pub network: String,
    pub algorithm: &'static str,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEntropyResponse {
    pub success: bool,
    pub random_value: String,
    pub entropy_proof: EntropyProof,
    pub metadata: EntropyMetadata,
    pub game_type: &'static str,
    pub game_config: Value,
}

pub async fn generate_entropy(
    ctx: &RelayContext,
    request: GenerateEntropyRequest,
) -> RelayResult<GenerateEntropyResponse> {
    if request.game_type.trim().is_empty() {
        return Err(RelayError::Validation("gameType is required".to_string()));
    }
    let game: GameType = request.game_type.parse()?;

    let entropy = ctx.entropy.generate(game).await?;
    let unavailable = || RelayError::RandomUnavailable {
        request_id: entropy.request_id().to_string(),
    };
    let random_value = entropy.random_value().ok_or_else(unavailable)?.to_string();
    let commit_tx = entropy.commit_tx().cloned().ok_or_else(unavailable)?;
    let reveal_tx = entropy.reveal_tx().cloned().ok_or_else(unavailable)?;

    tracing::info!(
        request_id = %entropy.request_id(),
        commit_tx = %commit_tx,
        reveal_tx = %reveal_tx,
        "Entropy generated"
    );

    Ok(GenerateEntropyResponse {
        success: true,
        random_value,
        entropy_proof: EntropyProof {
            request_id: entropy.request_id().to_string(),
            explorer_url: ctx.explorer_url(&reveal_tx),
            transaction_hash: reveal_tx.clone(),
            commit_tx,
            reveal_tx,
            block_height: entropy.reveal_height(),
            commit_mode: entropy.commit_mode(),
        },
        metadata: EntropyMetadata {
            source: "Flow VRF",
            network: ctx.config.ledger.network.clone(),
            algorithm: "commit-reveal",
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        game_type: game.slug(),
        game_config: request.game_config,
    })
}
