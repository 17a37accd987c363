//! Treasury balance guard.
//!
//! # Policy
//! - Primary balance: account balance script, then the account endpoint
//! - Secondary: the public vault capability, probed when the primary reads
//!   zero or fails
//! - Both unavailable → proceed with availability `Unknown`
//! - Known but insufficient → proceed with a logged warning, unless
//!   `hard_block_insufficient` is set
//!
//! The on-chain transfer remains the authoritative funds check.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::config::schema::TreasuryConfig;
use crate::ledger::amount::Amount;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::client::LedgerClient;
use crate::ledger::types::FlowAddress;
use crate::observability::metrics;
use crate::transactions::templates::{NamedArg, Query};
use crate::transactions::ScriptRunner;

const VAULT_PATH_PLACEHOLDER: &str = "VAULT_BALANCE_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Known(Amount),
    Unknown,
}

impl Availability {
    pub fn known(self) -> Option<Amount> {
        match self {
            Self::Known(amount) => Some(amount),
            Self::Unknown => None,
        }
    }
}

/// Soft signal: the known balance does not cover the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientFundsWarning {
    pub required: Amount,
    pub available: Amount,
}

impl fmt::Display for InsufficientFundsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "insufficient treasury funds: available {} FLOW, requested {} FLOW",
            self.available, self.required
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub proceed: bool,
    pub available: Availability,
    pub warning: Option<InsufficientFundsWarning>,
}

/// Point-in-time treasury balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryAccountView {
    pub address: FlowAddress,
    pub primary_balance: Option<Amount>,
    pub vault_balance: Option<Amount>,
    pub observed_at: DateTime<Utc>,
}

impl TreasuryAccountView {
    /// Best known balance: a non-zero primary reading, else the vault reading.
    pub fn best_balance(&self) -> Option<Amount> {
        match (self.primary_balance, self.vault_balance) {
            (Some(primary), _) if !primary.is_zero() => Some(primary),
            (primary, vault) => vault.or(primary),
        }
    }
}

pub struct TreasuryBalanceGuard {
    ledger: Arc<dyn LedgerClient>,
    scripts: Arc<ScriptRunner>,
    address: FlowAddress,
    vault_balance_path: String,
    hard_block_insufficient: bool,
}

impl TreasuryBalanceGuard {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        scripts: Arc<ScriptRunner>,
        address: FlowAddress,
        config: &TreasuryConfig,
    ) -> Self {
        Self {
            ledger,
            scripts,
            address,
            vault_balance_path: config.vault_balance_path.clone(),
            hard_block_insufficient: config.hard_block_insufficient,
        }
    }

    pub fn address(&self) -> FlowAddress {
        self.address
    }

    /// Decide whether a transfer of `required` should be attempted.
    pub async fn check_sufficient(&self, required: Amount) -> Decision {
        let view = self.snapshot().await;
        let available = match view.best_balance() {
            Some(balance) => Availability::Known(balance),
            None => {
                metrics::record_balance_degraded("unknown");
                tracing::warn!(
                    treasury = %self.address,
                    required = %required,
                    "Treasury balance unavailable, proceeding without a funds check"
                );
                Availability::Unknown
            }
        };

        let warning = available
            .known()
            .filter(|balance| *balance < required)
            .map(|balance| InsufficientFundsWarning {
                required,
                available: balance,
            });

        let proceed = match &warning {
            Some(warning) if self.hard_block_insufficient => {
                tracing::warn!(treasury = %self.address, "{}; blocking", warning);
                false
            }
            Some(warning) => {
                metrics::record_balance_degraded("insufficient");
                tracing::warn!(treasury = %self.address, "{}; proceeding, chain will decide", warning);
                true
            }
            None => true,
        };

        Decision {
            proceed,
            available,
            warning,
        }
    }

    pub async fn snapshot(&self) -> TreasuryAccountView {
        let primary_balance = self.primary_balance().await;
        let vault_balance = match primary_balance {
            Some(balance) if !balance.is_zero() => None,
            _ => self.vault_balance().await,
        };
        TreasuryAccountView {
            address: self.address,
            primary_balance,
            vault_balance,
            observed_at: Utc::now(),
        }
    }

    fn address_arg(&self) -> [NamedArg; 1] {
        [NamedArg::new("address", CadenceValue::address(&self.address))]
    }

    async fn primary_balance(&self) -> Option<Amount> {
        match self.scripts.run(Query::AccountBalance, &self.address_arg()).await {
            Ok(value) => {
                if let Some(balance) = value.as_amount() {
                    return Some(balance);
                }
                tracing::debug!(treasury = %self.address, "Balance script returned a non-amount value");
            }
            Err(e) => tracing::debug!(treasury = %self.address, error = %e, "Balance script failed"),
        }
        match self.ledger.get_account(&self.address).await {
            Ok(account) => Some(account.balance),
            Err(e) => {
                tracing::warn!(treasury = %self.address, error = %e, "Account balance lookup failed");
                None
            }
        }
    }

    async fn vault_balance(&self) -> Option<Amount> {
        let substitutions = [(VAULT_PATH_PLACEHOLDER, self.vault_balance_path.as_str())];
        match self
            .scripts
            .run_with(Query::VaultBalance, &self.address_arg(), &substitutions)
            .await
        {
            Ok(value) => value.as_amount(),
            Err(e) => {
                tracing::warn!(
                    treasury = %self.address,
                    path = %self.vault_balance_path,
                    error = %e,
                    "Vault balance probe failed"
                );
                None
            }
        }
    }
}
