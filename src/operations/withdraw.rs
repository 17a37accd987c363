//! Treasury → player withdrawal.

use serde::{Deserialize, Serialize};

use crate::context::RelayContext;
use crate::error::{RelayError, RelayResult};
use crate::ledger::amount::Amount;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::types::{BlockId, FlowAddress, TransactionId};
use crate::operations::validation::{parse_address, parse_positive_amount};
use crate::operations::{event_views, EventView};
use crate::transactions::templates::{NamedArg, Operation};
use crate::transactions::types::SealStatus;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    #[serde(default)]
    pub user_address: String,
    #[serde(default)]
    pub amount: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawReceipt {
    pub success: bool,
    pub transaction_id: TransactionId,
    pub status: &'static str,
    pub block_id: Option<BlockId>,
    pub block_height: Option<u64>,
    pub events: Vec<EventView>,
    pub amount: Amount,
    pub user_address: FlowAddress,
    pub treasury_address: FlowAddress,
    /// Balance observed before the transfer; `None` when it could not be read.
    pub treasury_balance: Option<Amount>,
    pub balance_warning: Option<String>,
    pub explorer_url: String,
}

pub async fn withdraw(ctx: &RelayContext, request: WithdrawRequest) -> RelayResult<WithdrawReceipt> {
    let user_address = parse_address("userAddress", &request.user_address)?;
    let amount = parse_positive_amount("amount", &request.amount)?;
    let args = [
        NamedArg::new("amount", CadenceValue::ufix64(amount)),
        NamedArg::new("recipient", CadenceValue::address(&user_address)),
    ];
    ctx.submitter.prepare(Operation::TreasuryTransfer, &args)?;

    let guard = ctx.treasury_guard()?;
    let decision = guard.check_sufficient(amount).await;
    if !decision.proceed {
        let message = decision
            .warning
            .map(|w| w.to_string())
            .unwrap_or_else(|| "insufficient treasury funds".to_string());
        return Err(RelayError::Validation(message));
    }

    let pending = ctx.submitter.submit(Operation::TreasuryTransfer, &args).await?;
    tracing::info!(
        transaction_id = %pending.transaction_id,
        user = %user_address,
        amount = %amount,
        "Withdrawal submitted"
    );
    let sealed = ctx.seal_waiter.await_seal(&pending, None).await;

    match sealed.status() {
        SealStatus::SealedOk => Ok(WithdrawReceipt {
            success: true,
            transaction_id: sealed.transaction_id().clone(),
            status: sealed.status().as_label(),
            block_id: sealed.block_id().cloned(),
            block_height: sealed.block_height(),
            events: event_views(sealed.events()),
            amount,
            user_address,
            treasury_address: guard.address(),
            treasury_balance: decision.available.known(),
            balance_warning: decision.warning.map(|w| w.to_string()),
            explorer_url: ctx.explorer_url(sealed.transaction_id()),
        }),
        SealStatus::SealedFailed => Err(RelayError::TransactionFailed {
            transaction_id: sealed.transaction_id().clone(),
            error_message: sealed.error_message().unwrap_or("transfer failed").to_string(),
        }),
        SealStatus::Expired => Err(RelayError::TransactionTimeout {
            transaction_id: sealed.transaction_id().clone(),
        }),
    }
}
