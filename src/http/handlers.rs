//! Route handlers.
//!
//! Bodies are taken as `Result<Json<T>, JsonRejection>` so malformed JSON
//! gets the relay's 400 body instead of axum's plain-text rejection.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::operations::deposit::{self, DepositReceipt, DepositRequest};
use crate::operations::entropy::{self, GenerateEntropyRequest, GenerateEntropyResponse};
use crate::operations::game::{
    self, FlowVrfRequest, FlowVrfResponse, TreasuryTransactionRequest, TreasuryTransactionResponse,
};
use crate::operations::withdraw::{self, WithdrawReceipt, WithdrawRequest};

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn deposit(
    State(state): State<AppState>,
    body: Result<Json<DepositRequest>, JsonRejection>,
) -> ApiResult<DepositReceipt> {
    let Json(request) = body?;
    Ok(Json(deposit::deposit(&state.ctx, request).await?))
}

pub async fn withdraw(
    State(state): State<AppState>,
    body: Result<Json<WithdrawRequest>, JsonRejection>,
) -> ApiResult<WithdrawReceipt> {
    let Json(request) = body?;
    Ok(Json(withdraw::withdraw(&state.ctx, request).await?))
}

pub async fn flow_vrf(
    State(state): State<AppState>,
    body: Result<Json<FlowVrfRequest>, JsonRejection>,
) -> ApiResult<FlowVrfResponse> {
    let Json(request) = body?;
    Ok(Json(game::flow_vrf(&state.ctx, request).await?))
}

pub async fn treasury_transaction(
    State(state): State<AppState>,
    body: Result<Json<TreasuryTransactionRequest>, JsonRejection>,
) -> ApiResult<TreasuryTransactionResponse> {
    let Json(request) = body?;
    Ok(Json(game::treasury_transaction(&state.ctx, request).await?))
}

pub async fn generate_entropy(
    State(state): State<AppState>,
    body: Result<Json<GenerateEntropyRequest>, JsonRejection>,
) -> ApiResult<GenerateEntropyResponse> {
    let Json(request) = body?;
    Ok(Json(entropy::generate_entropy(&state.ctx, request).await?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
}

/// Always 200; `status` is `degraded` when the ledger cannot be reached.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let block_height = match state.ctx.ledger.latest_sealed_block().await {
        Ok(header) => Some(header.height),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the ledger");
            None
        }
    };
    Json(HealthStatus {
        status: if block_height.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        network: state.ctx.config.ledger.network.clone(),
        block_height,
    })
}
