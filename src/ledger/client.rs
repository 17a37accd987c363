//! Ledger access client.
//!
//! # Responsibilities
//! - Define the `LedgerClient` capability surface the relay depends on
//! - Implement it over the access node REST API (`/v1`)
//! - Classify transport failures as undelivered vs. ambiguous
//!
//! # Design Decisions
//! - Each `FlowRestClient` talks to exactly one endpoint; failover and
//!   retries live in [`crate::ledger::failover::FailoverClient`]
//! - Numbers on the wire are decimal strings; addresses omit `0x`

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use std::time::Duration;

use crate::ledger::amount::Amount;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::envelope::SignedTransaction;
use crate::ledger::types::{
    AccountInfo, AccountKey, BlockHeader, BlockId, FlowAddress, LedgerError, LedgerEvent, LedgerResult,
    LedgerTxStatus, TransactionId, TransactionRecord,
};

/// Capability surface over the ledger network.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a signed transaction; returns its identifier.
    async fn send_transaction(&self, tx: &SignedTransaction) -> LedgerResult<TransactionId>;

    /// Fetch a transaction's status record. `None` if the ledger does not know it yet.
    async fn get_transaction_result(&self, id: &TransactionId) -> LedgerResult<Option<TransactionRecord>>;

    /// Run a read-only script against the latest sealed state.
    async fn execute_script(&self, script: &str, arguments: &[CadenceValue]) -> LedgerResult<CadenceValue>;

    /// Latest sealed block header.
    async fn latest_sealed_block(&self) -> LedgerResult<BlockHeader>;

    /// Block header by id.
    async fn get_block(&self, id: &BlockId) -> LedgerResult<BlockHeader>;

    /// Account balance and keys.
    async fn get_account(&self, address: &FlowAddress) -> LedgerResult<AccountInfo>;
}

/// REST client bound to a single access node.
#[derive(Debug, Clone)]
pub struct FlowRestClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl FlowRestClient {
    pub fn new(endpoint: &str, request_timeout: Duration) -> LedgerResult<Self> {
        let mut base_url: url::Url = endpoint
            .parse()
            .map_err(|e| LedgerError::Transport(format!("invalid access endpoint '{}': {}", endpoint, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, base_url })
    }

    pub fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, path: &str) -> LedgerResult<url::Url> {
        self.base_url
            .join(path)
            .map_err(|e| LedgerError::Transport(format!("invalid request path '{}': {}", path, e)))
    }

    async fn read_body(response: reqwest::Response) -> LedgerResult<String> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound(body));
        }
        if !status.is_success() {
            return Err(LedgerError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> LedgerResult<T> {
        let response = self.http.get(self.url(path)?).send().await.map_err(transport_error)?;
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| LedgerError::Decode(format!("{}: {}", path, e)))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> LedgerResult<T> {
        let response = self
            .http
            .post(self.url(path)?)
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| LedgerError::Decode(format!("{}: {}", path, e)))
    }
}

/// Connect/DNS failures mean the request was never delivered.
fn transport_error(e: reqwest::Error) -> LedgerError {
    if e.is_connect() {
        LedgerError::Unreachable(e.to_string())
    } else {
        LedgerError::Transport(e.to_string())
    }
}

fn parse_u64(field: &str, value: &str) -> LedgerResult<u64> {
    value
        .parse()
        .map_err(|_| LedgerError::Decode(format!("{} is not an integer: '{}'", field, value)))
}

/// Accepts `5` or `"5"`.
fn lenient_u64<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_u64().ok_or_else(|| serde::de::Error::custom("expected u64")),
        serde_json::Value::String(s) => s.parse().map_err(serde::de::Error::custom),
        serde_json::Value::Null => Ok(0),
        other => Err(serde::de::Error::custom(format!("expected integer, got {}", other))),
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct RestEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    event_index: u64,
    #[serde(default)]
    payload: String,
}

#[derive(Deserialize)]
struct RestTransactionResult {
    #[serde(default)]
    block_id: String,
    status: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    status_code: u64,
    #[serde(default)]
    error_message: String,
    #[serde(default)]
    events: Vec<RestEvent>,
}

#[derive(Deserialize)]
struct RestBlock {
    header: RestBlockHeader,
}

#[derive(Deserialize)]
struct RestBlockHeader {
    id: String,
    height: String,
}

#[derive(Deserialize)]
struct RestAccountKey {
    index: String,
    sequence_number: String,
    #[serde(default)]
    revoked: bool,
}

#[derive(Deserialize)]
struct RestAccount {
    address: String,
    balance: String,
    #[serde(default)]
    keys: Vec<RestAccountKey>,
}

impl RestEvent {
    fn into_event(self) -> LedgerEvent {
        // Undecodable payloads are kept as `None` so the textual path can still run.
        let payload = general_purpose::STANDARD
            .decode(self.payload.as_bytes())
            .ok()
            .and_then(|bytes| CadenceValue::from_json_bytes(&bytes).ok());
        LedgerEvent {
            event_type: self.event_type,
            event_index: u32::try_from(self.event_index).unwrap_or(u32::MAX),
            payload,
        }
    }
}

impl RestTransactionResult {
    fn into_record(self) -> TransactionRecord {
        TransactionRecord {
            status: LedgerTxStatus::parse(&self.status),
            status_code: u32::try_from(self.status_code).unwrap_or(u32::MAX),
            block_id: (!self.block_id.is_empty()).then(|| BlockId::new(self.block_id)),
            error_message: (!self.error_message.is_empty()).then_some(self.error_message),
            events: self.events.into_iter().map(RestEvent::into_event).collect(),
            raw_report: None,
        }
    }
}

impl RestBlock {
    fn into_header(self) -> LedgerResult<BlockHeader> {
        Ok(BlockHeader {
            id: BlockId::new(self.header.id),
            height: parse_u64("height", &self.header.height)?,
        })
    }
}

fn first_block(blocks: Vec<RestBlock>) -> LedgerResult<BlockHeader> {
    blocks
        .into_iter()
        .next()
        .ok_or_else(|| LedgerError::Decode("empty block list".to_string()))?
        .into_header()
}

#[async_trait]
impl LedgerClient for FlowRestClient {
    async fn send_transaction(&self, tx: &SignedTransaction) -> LedgerResult<TransactionId> {
        let response: SubmitResponse = self.post_json("transactions", &tx.to_rest_body()).await?;
        Ok(TransactionId::new(response.id))
    }

    async fn get_transaction_result(&self, id: &TransactionId) -> LedgerResult<Option<TransactionRecord>> {
        match self
            .get_json::<RestTransactionResult>(&format!("transaction_results/{}", id.as_str()))
            .await
        {
            Ok(result) => Ok(Some(result.into_record())),
            Err(LedgerError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn execute_script(&self, script: &str, arguments: &[CadenceValue]) -> LedgerResult<CadenceValue> {
        let encoded_args = arguments
            .iter()
            .map(|a| a.to_json_bytes().map(|b| general_purpose::STANDARD.encode(b)))
            .collect::<LedgerResult<Vec<_>>>()?;
        let body = serde_json::json!({
            "script": general_purpose::STANDARD.encode(script.as_bytes()),
            "arguments": encoded_args,
        });
        let encoded: String = self.post_json("scripts?block_height=sealed", &body).await?;
        let bytes = general_purpose::STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| LedgerError::Decode(format!("script result is not base64: {}", e)))?;
        CadenceValue::from_json_bytes(&bytes)
    }

    async fn latest_sealed_block(&self) -> LedgerResult<BlockHeader> {
        first_block(self.get_json("blocks?height=sealed").await?)
    }

    async fn get_block(&self, id: &BlockId) -> LedgerResult<BlockHeader> {
        first_block(self.get_json(&format!("blocks/{}", id.as_str())).await?)
    }

    async fn get_account(&self, address: &FlowAddress) -> LedgerResult<AccountInfo> {
        let account: RestAccount = self
            .get_json(&format!("accounts/{}?expand=keys", address.to_hex()))
            .await?;
        let keys = account
            .keys
            .iter()
            .map(|k| {
                Ok(AccountKey {
                    index: u32::try_from(parse_u64("key index", &k.index)?)
                        .map_err(|_| LedgerError::Decode(format!("key index out of range: {}", k.index)))?,
                    sequence_number: parse_u64("sequence_number", &k.sequence_number)?,
                    revoked: k.revoked,
                })
            })
            .collect::<LedgerResult<Vec<_>>>()?;
        Ok(AccountInfo {
            address: FlowAddress::parse_lenient(&account.address)?,
            balance: Amount::from_units(parse_u64("balance", &account.balance)?),
            keys,
        })
    }
}
