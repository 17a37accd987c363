//! Treasury balance checks against the in-memory ledger.

mod common;

use casino_relay::ledger::{CadenceValue, LedgerError};
use casino_relay::treasury::Availability;
use common::*;

fn ufix(value: &str) -> CadenceValue {
    CadenceValue::UFix64(value.to_string())
}

/// Primary balance from the account script, vault balance from the capability probe.
fn answer_balances(ledger: &FakeLedger, primary: Option<&'static str>, vault: Option<&'static str>) {
    ledger.on_script(move |script, _| {
        let answer = if script.contains("capabilities") { vault } else { primary };
        match answer {
            Some(balance) => Ok(ufix(balance)),
            None => Err(LedgerError::Http {
                status: 500,
                body: "script execution failed".to_string(),
            }),
        }
    });
}

#[tokio::test]
async fn test_zero_primary_balance_falls_back_to_vault() {
    let ledger = FakeLedger::new();
    answer_balances(&ledger, Some("0.00000000"), Some("250.00000000"));
    let ctx = context(ledger.clone());
    let guard = ctx.treasury_guard().unwrap();

    let view = guard.snapshot().await;
    assert_eq!(view.primary_balance, Some(flow(0.0)));
    assert_eq!(view.vault_balance, Some(flow(250.0)));
    assert_eq!(view.best_balance(), Some(flow(250.0)));

    let decision = guard.check_sufficient(flow(10.0)).await;
    assert!(decision.proceed);
    assert_eq!(decision.available, Availability::Known(flow(250.0)));
    assert!(decision.warning.is_none());
}

#[tokio::test]
async fn test_nonzero_primary_skips_vault_probe() {
    let ledger = FakeLedger::new();
    answer_balances(&ledger, Some("42.50000000"), Some("999.00000000"));
    let ctx = context(ledger.clone());

    let view = ctx.treasury_guard().unwrap().snapshot().await;

    assert_eq!(view.primary_balance, Some(flow(42.5)));
    assert_eq!(view.vault_balance, None);
}

#[tokio::test]
async fn test_failed_script_uses_account_balance() {
    let ledger = FakeLedger::new();
    answer_balances(&ledger, None, None);
    ledger.set_balance(flow(12.0));
    let ctx = context(ledger.clone());

    let view = ctx.treasury_guard().unwrap().snapshot().await;

    assert_eq!(view.best_balance(), Some(flow(12.0)));
}

#[tokio::test]
async fn test_unreadable_balance_still_proceeds() {
    let ledger = FakeLedger::new();
    answer_balances(&ledger, None, None);
    ledger.fail_account_lookups();
    let ctx = context(ledger.clone());

    let decision = ctx.treasury_guard().unwrap().check_sufficient(flow(5.0)).await;

    assert!(decision.proceed);
    assert_eq!(decision.available, Availability::Unknown);
    assert!(decision.warning.is_none());
}

#[tokio::test]
async fn test_insufficient_balance_warns_and_proceeds() {
    let ledger = FakeLedger::new();
    answer_balances(&ledger, Some("10.00000000"), None);
    let ctx = context(ledger.clone());

    let decision = ctx.treasury_guard().unwrap().check_sufficient(flow(50.0)).await;

    assert!(decision.proceed);
    let warning = decision.warning.unwrap();
    assert_eq!(warning.available, flow(10.0));
    assert_eq!(warning.required, flow(50.0));
    assert!(warning.to_string().contains("insufficient treasury funds"));
}

#[tokio::test]
async fn test_hard_block_stops_insufficient_transfer() {
    let ledger = FakeLedger::new();
    answer_balances(&ledger, Some("10.00000000"), None);
    let mut config = test_config();
    config.treasury.hard_block_insufficient = true;
    let ctx = context_with(config, ledger.clone());

    let blocked = ctx.treasury_guard().unwrap().check_sufficient(flow(50.0)).await;
    assert!(!blocked.proceed);
    assert!(blocked.warning.is_some());

    let allowed = ctx.treasury_guard().unwrap().check_sufficient(flow(5.0)).await;
    assert!(allowed.proceed);
}
