//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.
//! The treasury private key is deliberately absent: it is read only from the
//! environment (see [`crate::ledger::signer::PRIVATE_KEY_ENV_VAR`]).

use serde::{Deserialize, Serialize};

use crate::entropy::types::CommitMode;

/// Root configuration for the casino relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Access node endpoints and transaction defaults.
    pub ledger: LedgerConfig,

    /// On-chain contract addresses.
    pub contracts: ContractsConfig,

    /// Sponsoring account.
    pub treasury: TreasuryConfig,

    /// Retry configuration for ledger reads.
    pub retries: RetryConfig,

    /// Seal polling.
    pub sealing: SealingConfig,

    /// Commit-reveal settings.
    pub entropy: EntropyConfig,

    /// Bet limits.
    pub games: GamesConfig,

    /// Deposit confirmation.
    pub deposits: DepositsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request deadline. Entropy generation waits for two seals plus
    /// the reveal delay, so this must exceed roughly 2x the seal timeout.
    pub request_timeout_secs: u64,

    /// Maximum JSON body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 120,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Ledger network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Network name reported in responses (e.g., "testnet").
    pub network: String,

    /// Access node REST base URLs, primary first.
    pub access_endpoints: Vec<String>,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Computation limit attached to every transaction.
    pub gas_limit: u64,

    /// Block explorer base URL used for `explorerUrl` links.
    pub explorer_base_url: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: "testnet".to_string(),
            access_endpoints: vec!["https://rest-testnet.onflow.org/v1".to_string()],
            request_timeout_secs: 10,
            gas_limit: 9999,
            explorer_base_url: "https://testnet.flowscan.io".to_string(),
        }
    }
}

/// Contract addresses substituted into transaction templates.
///
/// An empty address means "not deployed"; operations that need it fail with
/// a configuration error at request time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractsConfig {
    pub casino_games: String,
    pub flow_vrf: String,
    pub fungible_token: String,
    pub flow_token: String,

    /// Override for the game event type. Defaults to
    /// `A.<casino_games>.CasinoGames.GamePlayed`.
    pub game_played_event: Option<String>,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            casino_games: "0x2083a55fb16f8f60".to_string(),
            flow_vrf: String::new(),
            fungible_token: "0x9a0766d93b6608b7".to_string(),
            flow_token: "0x7e60df042a9c0868".to_string(),
            game_played_event: None,
        }
    }
}

impl ContractsConfig {
    /// Fully qualified `GamePlayed` event type.
    pub fn game_played_event_type(&self) -> String {
        match &self.game_played_event {
            Some(event) => event.clone(),
            None => format!(
                "A.{}.CasinoGames.GamePlayed",
                self.casino_games.trim_start_matches("0x")
            ),
        }
    }
}

/// Treasury account the casino contracts were deployed with on testnet.
pub const TESTNET_TREASURY_ADDRESS: &str = "0x038360087beccc9a";

/// Treasury account configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TreasuryConfig {
    /// Treasury account address (`0x` + 16 hex digits). When empty on
    /// testnet, the deployed testnet treasury is used.
    pub address: String,

    /// Index of the signing key on the treasury account.
    pub key_index: u32,

    /// Reject withdrawals when the known balance is insufficient.
    /// Off by default: the on-chain transfer is the authoritative check.
    pub hard_block_insufficient: bool,

    /// Public capability path probed when the primary balance reads zero.
    pub vault_balance_path: String,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            key_index: 0,
            hard_block_insufficient: false,
            vault_balance_path: "/public/flowTokenBalance".to_string(),
        }
    }
}

impl TreasuryConfig {
    /// The configured address, or the deployed treasury for `network`.
    pub fn effective_address(&self, network: &str) -> Option<&str> {
        let explicit = self.address.trim();
        if !explicit.is_empty() {
            Some(explicit)
        } else if network.eq_ignore_ascii_case("testnet") {
            Some(TESTNET_TREASURY_ADDRESS)
        } else {
            None
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Lower bound of every retry delay in milliseconds.
    pub base_delay_ms: u64,

    /// Ceiling of every retry delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Seal polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SealingConfig {
    /// Interval between status polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Default time budget before a transaction is reported expired.
    pub timeout_secs: u64,
}

impl Default for SealingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            timeout_secs: 30,
        }
    }
}

/// Commit-reveal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// What goes on-chain in the commit phase.
    pub commit_mode: CommitMode,

    /// Sealed blocks required between commit and reveal.
    pub reveal_delay_blocks: u64,

    /// Upper bound on waiting for the reveal delay.
    pub reveal_delay_timeout_secs: u64,

    /// Seed size in bytes.
    pub seed_length_bytes: usize,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            commit_mode: CommitMode::Raw,
            reveal_delay_blocks: 1,
            reveal_delay_timeout_secs: 30,
            seed_length_bytes: 32,
        }
    }
}

/// Bet limits in FLOW.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GamesConfig {
    pub min_bet: f64,
    pub max_bet: f64,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            min_bet: 0.001,
            max_bet: 100.0,
        }
    }
}

/// Deposit confirmation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DepositsConfig {
    /// Require the supplied deposit transaction to seal successfully.
    pub verify_on_chain: bool,

    /// Currency label reported in responses.
    pub currency: String,
}

impl Default for DepositsConfig {
    fn default() -> Self {
        Self {
            verify_on_chain: false,
            currency: "FLOW".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
