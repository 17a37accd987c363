//! End-to-end API tests: router → operations → in-memory ledger.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use casino_relay::config::schema::TESTNET_TREASURY_ADDRESS;
use casino_relay::http::build_router;
use casino_relay::ledger::CadenceValue;
use casino_relay::RelayContext;
use common::*;

async fn post(ctx: &Arc<RelayContext>, path: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = build_router(ctx.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(ctx: &Arc<RelayContext>, path: &str, body: Value) -> (StatusCode, Value) {
    post(ctx, path, body.to_string()).await
}

fn roulette_event(seed: u64) -> casino_relay::ledger::LedgerEvent {
    game_event("ROULETTE", PLAYER, "1.00000000", "2.00000000", seed, &[("winningNumber", "17"), ("won", "true")])
}

#[tokio::test]
async fn test_deposit_is_confirmed() {
    let ledger = FakeLedger::new();
    let ctx = context(ledger.clone());

    let (status, body) = post_json(&ctx, "/api/deposit", json!({"userAddress": PLAYER, "amount": 0.5})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["amount"], 0.5);
    assert_eq!(body["treasuryAddress"], TREASURY);
    assert_eq!(body["currency"], "FLOW");
    assert!(body["depositId"].as_str().unwrap().starts_with("deposit_"));
    assert_eq!(ledger.network_calls(), 0);
}

#[tokio::test]
async fn test_deposit_without_configured_treasury_address() {
    let ledger = FakeLedger::new();
    let mut config = test_config();
    config.treasury.address = String::new();

    let with_signer = context_with(config.clone(), ledger.clone());
    let (status, body) = post_json(&with_signer, "/api/deposit", json!({"userAddress": PLAYER, "amount": 1})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["treasuryAddress"], TREASURY);

    let without_signer = Arc::new(RelayContext::with_ledger(config, ledger.clone(), None));
    let (status, body) = post_json(&without_signer, "/api/deposit", json!({"userAddress": PLAYER, "amount": 1})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["treasuryAddress"], TESTNET_TREASURY_ADDRESS);
}

#[tokio::test]
async fn test_deposit_verification_requires_sealed_transaction() {
    let ledger = FakeLedger::new();
    let mut config = test_config();
    config.deposits.verify_on_chain = true;
    let ctx = context_with(config, ledger.clone());

    let (status, body) = post_json(
        &ctx,
        "/api/deposit",
        json!({"userAddress": PLAYER, "amount": "2.5", "transactionHash": "ab".repeat(32)}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown"));
}

#[tokio::test]
async fn test_flow_vrf_roulette_returns_outcome() {
    let ledger = FakeLedger::new();
    ledger.push_outcome(sealed_with_events(vec![roulette_event(4_242)]));
    let ctx = context(ledger.clone());

    let (status, body) = post_json(
        &ctx,
        "/api/flow-vrf",
        json!({
            "gameType": "roulette",
            "userAddress": PLAYER,
            "betAmount": 1.0,
            "gameParams": {"betType": "red"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["randomNumber"], 4_242);
    assert_eq!(body["gameResult"]["gameType"], "ROULETTE");
    assert_eq!(body["gameResult"]["winningNumber"], "17");
    assert_eq!(body["gameResult"]["payout"], 2.0);
    assert_eq!(body["seedSource"], "event");
    assert_eq!(body["extractionPath"], "structuredEvent");

    let sent = ledger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(body["transactionId"], sent[0].id.to_string());
    assert!(body["explorerUrl"].as_str().unwrap().ends_with(&format!("/tx/{}", sent[0].id)));
    assert_eq!(sent[0].arguments[0], CadenceValue::Address(PLAYER.to_string()));
}

#[tokio::test]
async fn test_flow_vrf_reads_textual_report_without_event() {
    let ledger = FakeLedger::new();
    let report = format!(
        "Block ID\tab12\nBlock Height\t1001\nStatus\tSEALED\n\nEvents:\n    Index\t0\n    Type\t{}\n    Values\n\
         \t\t- player (Address): {}\n\
         \t\t- gameType (String): \"ROULETTE\"\n\
         \t\t- betAmount (UFix64): 1.00000000\n\
         \t\t- payout (UFix64): 0.00000000\n\
         \t\t- randomSeed (UInt64): 5150\n\
         \t\t- gameResult ({{String:String}}): {{\"winningNumber\": \"3\", \"won\": \"false\"}}\n",
        game_event_type(),
        PLAYER
    );
    let mut record = sealed_with_events(Vec::new());
    record.raw_report = Some(report);
    ledger.push_outcome(record);
    let ctx = context(ledger.clone());

    let (status, body) = post_json(
        &ctx,
        "/api/flow-vrf",
        json!({"gameType": "roulette", "userAddress": PLAYER, "betAmount": 1.0}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["extractionPath"], "textualReport");
    assert_eq!(body["seedSource"], "event");
    assert_eq!(body["randomNumber"], 5_150);
    assert_eq!(body["gameResult"]["winningNumber"], "3");
    assert_eq!(body["gameResult"]["payout"], 0.0);
}

#[tokio::test]
async fn test_flow_vrf_failed_seal_returns_chain_message() {
    let ledger = FakeLedger::new();
    ledger.push_outcome(sealed_failed("[Error Code: 1101] pre-condition failed: bet exceeds table limit"));
    let ctx = context(ledger.clone());

    let (status, body) = post_json(
        &ctx,
        "/api/flow-vrf",
        json!({"gameType": "wheel", "userAddress": PLAYER, "betAmount": 1.0}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["errorMessage"],
        "[Error Code: 1101] pre-condition failed: bet exceeds table limit"
    );
    assert_eq!(body["transactionId"], ledger.sent()[0].id.to_string());
}

#[tokio::test]
async fn test_flow_vrf_without_event_is_a_server_error() {
    let ledger = FakeLedger::new();
    let ctx = context(ledger.clone());

    let (status, body) = post_json(
        &ctx,
        "/api/flow-vrf",
        json!({"gameType": "plinko", "userAddress": PLAYER, "betAmount": 1.0}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["transactionId"].is_string());
}

#[tokio::test]
async fn test_treasury_transaction_reports_sponsored_play() {
    let ledger = FakeLedger::new();
    let event = game_event("MINES", PLAYER, "2.00000000", "0.00000000", 77, &[("hitMine", "true")]);
    ledger.push_outcome(sealed_with_events(vec![event]));
    let ctx = context(ledger.clone());

    let (status, body) = post_json(
        &ctx,
        "/api/treasury-transaction",
        json!({
            "gameType": "MINES",
            "playerAddress": PLAYER,
            "gameParams": {"betAmount": 2, "mineCount": 3, "revealedTiles": [1, 4]}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["transaction"]["treasurySponsored"], true);
    assert_eq!(body["transaction"]["status"], "sealed");
    assert_eq!(body["transaction"]["events"][0]["type"], game_event_type());
    assert_eq!(body["outcome"]["gameType"], "MINES");
    assert_eq!(body["outcome"]["resultPayload"]["hitMine"], "true");
    assert_eq!(body["outcome"]["payout"], 0.0);
}

#[tokio::test]
async fn test_withdraw_above_known_balance_still_submits() {
    let ledger = FakeLedger::new();
    ledger.on_script(|_, _| Ok(CadenceValue::UFix64("10.00000000".into())));
    let ctx = context(ledger.clone());

    let (status, body) = post_json(&ctx, "/api/withdraw", json!({"userAddress": PLAYER, "amount": 50})).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "sealed");
    assert_eq!(body["treasuryBalance"], 10.0);
    assert!(body["balanceWarning"].as_str().unwrap().contains("insufficient"));
    assert_eq!(ledger.sent().len(), 1);
}

#[tokio::test]
async fn test_withdraw_hard_block_is_a_bad_request() {
    let ledger = FakeLedger::new();
    ledger.on_script(|_, _| Ok(CadenceValue::UFix64("10.00000000".into())));
    let mut config = test_config();
    config.treasury.hard_block_insufficient = true;
    let ctx = context_with(config, ledger.clone());

    let (status, _) = post_json(&ctx, "/api/withdraw", json!({"userAddress": PLAYER, "amount": 50})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(ledger.sent().is_empty());
}

#[tokio::test]
async fn test_withdraw_timeout_is_accepted_as_expired() {
    let ledger = FakeLedger::new();
    ledger.push_outcome(never_sealed());
    let ctx = context(ledger.clone());

    let (status, body) = post_json(&ctx, "/api/withdraw", json!({"userAddress": PLAYER, "amount": 1})).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "expired");
    assert_eq!(body["transactionId"], ledger.sent()[0].id.to_string());
}

#[tokio::test]
async fn test_malformed_input_makes_no_ledger_calls() {
    let ledger = FakeLedger::new();
    let ctx = context(ledger.clone());

    let bad_requests = [
        ("/api/withdraw", "{not json".to_string()),
        ("/api/withdraw", json!({"amount": 1}).to_string()),
        ("/api/withdraw", json!({"userAddress": "01cf0e2f2f715450", "amount": 1}).to_string()),
        ("/api/withdraw", json!({"userAddress": PLAYER, "amount": -3}).to_string()),
        ("/api/deposit", json!({"userAddress": PLAYER, "amount": "abc"}).to_string()),
        ("/api/flow-vrf", json!({"gameType": "poker", "userAddress": PLAYER, "betAmount": 1}).to_string()),
        ("/api/flow-vrf", json!({"gameType": "roulette", "userAddress": PLAYER, "betAmount": 150}).to_string()),
        ("/api/flow-vrf", json!({"gameType": "roulette", "betAmount": 1}).to_string()),
        ("/api/treasury-transaction", json!({"gameType": "wheel", "playerAddress": PLAYER}).to_string()),
        ("/api/generate-entropy", json!({"gameConfig": {}}).to_string()),
    ];
    for (path, body) in bad_requests {
        let (status, response) = post(&ctx, path, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", path, body);
        assert_eq!(response["success"], false);
    }
    assert_eq!(ledger.network_calls(), 0);
}

#[tokio::test]
async fn test_generate_entropy_returns_proof() {
    let ledger = FakeLedger::new();
    ledger.on_script(|_, _| Ok(CadenceValue::Optional(Some(Box::new(CadenceValue::string("991827364"))))));
    let ctx = context(ledger.clone());

    let (status, body) = post_json(
        &ctx,
        "/api/generate-entropy",
        json!({"gameType": "wheel", "gameConfig": {"segments": 12}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["randomValue"], "991827364");
    assert_eq!(body["metadata"]["algorithm"], "commit-reveal");
    assert_eq!(body["gameConfig"]["segments"], 12);

    let sent = ledger.sent();
    let proof = &body["entropyProof"];
    assert_eq!(proof["commitTx"], sent[0].id.to_string());
    assert_eq!(proof["revealTx"], sent[1].id.to_string());
    assert_eq!(proof["transactionHash"], proof["revealTx"]);
    assert_eq!(proof["commitMode"], "raw");
}

#[tokio::test]
async fn test_health_reports_block_height() {
    let ledger = FakeLedger::new();
    let ctx = context(ledger.clone());

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = build_router(ctx).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["network"], "testnet");
    assert_eq!(body["blockHeight"], 1_000);
}
