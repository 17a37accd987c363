//! Read-only script execution.

use std::sync::Arc;

use crate::config::schema::ContractsConfig;
use crate::error::RelayResult;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::client::LedgerClient;
use crate::transactions::templates::{NamedArg, Query};

/// Runs [`Query`] templates against the latest sealed state.
pub struct ScriptRunner {
    ledger: Arc<dyn LedgerClient>,
    contracts: ContractsConfig,
}

impl ScriptRunner {
    pub fn new(ledger: Arc<dyn LedgerClient>, contracts: ContractsConfig) -> Self {
        Self { ledger, contracts }
    }

    pub async fn run(&self, query: Query, args: &[NamedArg]) -> RelayResult<CadenceValue> {
        self.run_with(query, args, &[]).await
    }

    /// Like [`run`](Self::run), replacing each `(placeholder, value)` in the
    /// rendered source first.
    pub async fn run_with(
        &self,
        query: Query,
        args: &[NamedArg],
        substitutions: &[(&str, &str)],
    ) -> RelayResult<CadenceValue> {
        let template = query.template();
        let arguments = template.validate(args)?;
        let mut source = template.render(&self.contracts)?;
        for (placeholder, value) in substitutions {
            source = source.replace(placeholder, value);
        }
        tracing::debug!(script = template.name, "Executing script");
        Ok(self.ledger.execute_script(&source, &arguments).await?)
    }
}
