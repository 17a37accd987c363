//! Shared fixtures for integration tests: an in-memory ledger and a relay
//! context wired to it.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use casino_relay::config::RelayConfig;
use casino_relay::ledger::cadence::{Composite, CompositeField, DictionaryEntry};
use casino_relay::ledger::{
    AccountInfo, AccountKey, Amount, BlockHeader, BlockId, CadenceValue, FlowAddress, LedgerClient, LedgerError,
    LedgerEvent, LedgerResult, LedgerTxStatus, SignedTransaction, TransactionId, TransactionRecord, TreasurySigner,
};
use casino_relay::RelayContext;

pub const TREASURY: &str = "0x0123456789abcdef";
pub const PLAYER: &str = "0x01cf0e2f2f715450";
pub const CASINO_GAMES: &str = "0x2083a55fb16f8f60";
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

type ScriptHandler = Box<dyn Fn(&str, &[CadenceValue]) -> LedgerResult<CadenceValue> + Send + Sync>;

/// A transaction as the fake ledger received it.
#[derive(Debug, Clone)]
pub struct SentTransaction {
    pub id: TransactionId,
    pub script: String,
    pub arguments: Vec<CadenceValue>,
    pub sequence_number: u64,
}

struct State {
    next_id: u64,
    sealed_height: u64,
    advance_per_poll: u64,
    outcomes: VecDeque<TransactionRecord>,
    send_failures: VecDeque<LedgerError>,
    records: HashMap<TransactionId, TransactionRecord>,
    executed: HashSet<TransactionId>,
    sent: Vec<SentTransaction>,
    balance: Amount,
    account_fails: bool,
    sequence_number: u64,
}

/// In-memory ledger with scripted outcomes.
///
/// Each sent transaction takes the next queued record (sealed OK with no
/// events when the queue is empty). Sealed records without a block id are
/// placed in the block after the current sealed head. Every call to
/// `latest_sealed_block` advances the head by `advance_per_poll`.
///
/// Like the real ledger, the treasury key's sequence number advances only
/// once a sent transaction is observed executed or sealed, not on send.
pub struct FakeLedger {
    state: Mutex<State>,
    scripts: Mutex<ScriptHandler>,
    calls: AtomicUsize,
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                next_id: 1,
                sealed_height: 1_000,
                advance_per_poll: 1,
                outcomes: VecDeque::new(),
                send_failures: VecDeque::new(),
                records: HashMap::new(),
                executed: HashSet::new(),
                sent: Vec::new(),
                balance: flow(1000.0),
                account_fails: false,
                sequence_number: 0,
            }),
            scripts: Mutex::new(Box::new(|_, _| Ok(CadenceValue::Optional(None)))),
            calls: AtomicUsize::new(0),
        })
    }

    /// Queue the record the next sent transaction resolves to.
    pub fn push_outcome(&self, record: TransactionRecord) {
        self.state.lock().unwrap().outcomes.push_back(record);
    }

    /// Fail the next send with `error`.
    pub fn push_send_failure(&self, error: LedgerError) {
        self.state.lock().unwrap().send_failures.push_back(error);
    }

    pub fn set_balance(&self, balance: Amount) {
        self.state.lock().unwrap().balance = balance;
    }

    pub fn fail_account_lookups(&self) {
        self.state.lock().unwrap().account_fails = true;
    }

    /// Sequence number the treasury key reports on chain.
    pub fn set_sequence_number(&self, sequence_number: u64) {
        self.state.lock().unwrap().sequence_number = sequence_number;
    }

    pub fn freeze_height(&self) {
        self.state.lock().unwrap().advance_per_poll = 0;
    }

    /// Answer scripts with `handler(script_source, arguments)`.
    pub fn on_script<F>(&self, handler: F)
    where
        F: Fn(&str, &[CadenceValue]) -> LedgerResult<CadenceValue> + Send + Sync + 'static,
    {
        *self.scripts.lock().unwrap() = Box::new(handler);
    }

    pub fn sent(&self) -> Vec<SentTransaction> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn network_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn block_id(height: u64) -> BlockId {
    BlockId::new(format!("{:064x}", height))
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn send_transaction(&self, tx: &SignedTransaction) -> LedgerResult<TransactionId> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.send_failures.pop_front() {
            return Err(error);
        }

        let id = TransactionId::new(format!("{:064x}", 0xfeed_0000_u64 + state.next_id));
        state.next_id += 1;

        let mut record = state
            .outcomes
            .pop_front()
            .unwrap_or_else(|| TransactionRecord::with_status(LedgerTxStatus::Sealed));
        if record.status == LedgerTxStatus::Sealed && record.block_id.is_none() {
            record.block_id = Some(block_id(state.sealed_height + 1));
        }
        state.records.insert(id.clone(), record);

        let arguments = tx
            .envelope
            .arguments
            .iter()
            .map(|bytes| CadenceValue::from_json_bytes(bytes).unwrap())
            .collect();
        state.sent.push(SentTransaction {
            id: id.clone(),
            script: tx.envelope.script.clone(),
            arguments,
            sequence_number: tx.envelope.proposal_key.sequence_number,
        });
        Ok(id)
    }

    async fn get_transaction_result(&self, id: &TransactionId) -> LedgerResult<Option<TransactionRecord>> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let record = state.records.get(id).cloned();
        if let Some(record) = &record {
            let ran = matches!(record.status, LedgerTxStatus::Executed | LedgerTxStatus::Sealed);
            if ran && state.executed.insert(id.clone()) {
                state.sequence_number += 1;
            }
        }
        Ok(record)
    }

    async fn execute_script(&self, script: &str, arguments: &[CadenceValue]) -> LedgerResult<CadenceValue> {
        self.touch();
        let handler = self.scripts.lock().unwrap();
        (*handler)(script, arguments)
    }

    async fn latest_sealed_block(&self) -> LedgerResult<BlockHeader> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let height = state.sealed_height;
        state.sealed_height += state.advance_per_poll;
        Ok(BlockHeader {
            id: block_id(height),
            height,
        })
    }

    async fn get_block(&self, id: &BlockId) -> LedgerResult<BlockHeader> {
        self.touch();
        let height =
            u64::from_str_radix(id.as_str(), 16).map_err(|_| LedgerError::NotFound(id.to_string()))?;
        Ok(BlockHeader { id: id.clone(), height })
    }

    async fn get_account(&self, address: &FlowAddress) -> LedgerResult<AccountInfo> {
        self.touch();
        let state = self.state.lock().unwrap();
        if state.account_fails {
            return Err(LedgerError::Http {
                status: 503,
                body: "account service unavailable".to_string(),
            });
        }
        Ok(AccountInfo {
            address: *address,
            balance: state.balance,
            keys: vec![AccountKey {
                index: 0,
                sequence_number: state.sequence_number,
                revoked: false,
            }],
        })
    }
}

pub fn flow(value: f64) -> Amount {
    Amount::from_f64(value).unwrap()
}

pub fn address(s: &str) -> FlowAddress {
    s.parse().unwrap()
}

/// Config with a treasury, a deployed VRF contract and fast polling.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.treasury.address = TREASURY.to_string();
    config.contracts.casino_games = CASINO_GAMES.to_string();
    config.contracts.flow_vrf = "0x0ae53cb6e3f42a79".to_string();
    config.sealing.poll_interval_ms = 5;
    config.sealing.timeout_secs = 1;
    config.retries.max_attempts = 2;
    config.retries.base_delay_ms = 1;
    config.retries.max_delay_ms = 5;
    config.entropy.reveal_delay_blocks = 1;
    config.entropy.reveal_delay_timeout_secs = 1;
    config.observability.metrics_enabled = false;
    config
}

pub fn signer() -> TreasurySigner {
    TreasurySigner::from_private_key(TEST_PRIVATE_KEY, address(TREASURY), 0).unwrap()
}

pub fn context_with(config: RelayConfig, ledger: Arc<FakeLedger>) -> Arc<RelayContext> {
    Arc::new(RelayContext::with_ledger(config, ledger, Some(signer())))
}

pub fn context(ledger: Arc<FakeLedger>) -> Arc<RelayContext> {
    context_with(test_config(), ledger)
}

pub fn game_event_type() -> String {
    format!("A.{}.CasinoGames.GamePlayed", CASINO_GAMES.trim_start_matches("0x"))
}

/// A `GamePlayed` event as the casino contract emits it.
pub fn game_event(game_type: &str, player: &str, bet: &str, payout: &str, seed: u64, result: &[(&str, &str)]) -> LedgerEvent {
    let field = |name: &str, value: CadenceValue| CompositeField {
        name: name.to_string(),
        value,
    };
    let entries = result
        .iter()
        .map(|(k, v)| DictionaryEntry {
            key: CadenceValue::string(*k),
            value: CadenceValue::string(*v),
        })
        .collect();
    LedgerEvent {
        event_type: game_event_type(),
        event_index: 0,
        payload: Some(CadenceValue::Event(Composite {
            id: game_event_type(),
            fields: vec![
                field("gameType", CadenceValue::string(game_type)),
                field("player", CadenceValue::Address(player.to_string())),
                field("betAmount", CadenceValue::UFix64(bet.to_string())),
                field("payout", CadenceValue::UFix64(payout.to_string())),
                field("randomSeed", CadenceValue::UInt64(seed.to_string())),
                field("gameResult", CadenceValue::Dictionary(entries)),
            ],
        })),
    }
}

pub fn sealed_with_events(events: Vec<LedgerEvent>) -> TransactionRecord {
    let mut record = TransactionRecord::with_status(LedgerTxStatus::Sealed);
    record.events = events;
    record
}

pub fn sealed_failed(message: &str) -> TransactionRecord {
    let mut record = TransactionRecord::with_status(LedgerTxStatus::Sealed);
    record.status_code = 1;
    record.error_message = Some(message.to_string());
    record
}

pub fn never_sealed() -> TransactionRecord {
    TransactionRecord::with_status(LedgerTxStatus::Pending)
}
