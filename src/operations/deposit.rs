//! Deposit acknowledgement.
//!
//! The player funds the treasury from their own wallet; the relay only
//! records the claim. With `deposits.verify_on_chain`, a supplied
//! transaction hash must already be sealed OK. The reported treasury is the
//! signer's address, falling back to the configured or deployed one.

use serde::{Deserialize, Serialize};

use crate::context::RelayContext;
use crate::error::{RelayError, RelayResult};
use crate::ledger::amount::Amount;
use crate::ledger::types::{FlowAddress, TransactionId};
use crate::operations::validation::{parse_address, parse_positive_amount, parse_transaction_hash};
use crate::transactions::seal::classify;
use crate::transactions::types::SealStatus;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    #[serde(default)]
    pub user_address: String,
    #[serde(default)]
    pub amount: serde_json::Value,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
    pub success: bool,
    pub deposit_id: String,
    pub amount: Amount,
    pub user_address: FlowAddress,
    pub treasury_address: FlowAddress,
    pub currency: String,
    pub status: &'static str,
    pub timestamp: String,
    pub explorer_url: Option<String>,
    pub verified_on_chain: bool,
}

pub async fn deposit(ctx: &RelayContext, request: DepositRequest) -> RelayResult<DepositReceipt> {
    let user_address = parse_address("userAddress", &request.user_address)?;
    let amount = parse_positive_amount("amount", &request.amount)?;
    let transaction_hash = parse_transaction_hash("transactionHash", request.transaction_hash.as_deref())?;
    let treasury_address = ctx.treasury_guard()?.address();

    let transaction_id = transaction_hash.map(TransactionId::new);
    let verified_on_chain = match (&transaction_id, ctx.config.deposits.verify_on_chain) {
        (Some(id), true) => {
            verify_sealed(ctx, id).await?;
            true
        }
        _ => false,
    };

    let now = chrono::Utc::now();
    let fragment = uuid::Uuid::new_v4().simple().to_string();
    let receipt = DepositReceipt {
        success: true,
        deposit_id: format!("deposit_{}_{}", now.timestamp_millis(), &fragment[..9]),
        amount,
        user_address,
        treasury_address,
        currency: ctx.config.deposits.currency.clone(),
        status: "confirmed",
        timestamp: now.to_rfc3339(),
        explorer_url: transaction_id.as_ref().map(|id| ctx.explorer_url(id)),
        verified_on_chain,
    };

    tracing::info!(
        deposit_id = %receipt.deposit_id,
        user = %user_address,
        amount = %amount,
        verified_on_chain,
        "Deposit recorded"
    );
    Ok(receipt)
}

async fn verify_sealed(ctx: &RelayContext, transaction_id: &TransactionId) -> RelayResult<()> {
    let record = ctx.ledger.get_transaction_result(transaction_id).await?.ok_or_else(|| {
        RelayError::Validation(format!("deposit transaction {} is unknown to the ledger", transaction_id))
    })?;
    let sealed = classify(transaction_id, record).ok_or_else(|| {
        RelayError::Validation(format!("deposit transaction {} is not sealed yet", transaction_id))
    })?;
    match sealed.status() {
        SealStatus::SealedOk => Ok(()),
        _ => Err(RelayError::TransactionFailed {
            transaction_id: transaction_id.clone(),
            error_message: sealed
                .error_message()
                .unwrap_or("deposit transaction failed")
                .to_string(),
        }),
    }
}
