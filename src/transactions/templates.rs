//! Versioned transaction and script templates.
//!
//! Each template declares its parameters (name + Cadence type, in order) and
//! the contracts it imports. Contract addresses are written as placeholders
//! (`0xCasinoGames`, `0xFlowVRF`, `0xFungibleToken`, `0xFlowToken`) and
//! substituted from configuration at render time.

use std::fmt;

use crate::config::schema::ContractsConfig;
use crate::error::{RelayError, RelayResult};
use crate::ledger::amount::Amount;
use crate::ledger::cadence::CadenceValue;
use crate::ledger::types::FlowAddress;

/// Version tag of the template set; bump when any source below changes.
pub const TEMPLATE_VERSION: &str = "casino-relay/templates/v1";

/// State-changing operations the treasury can sponsor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PlayRoulette,
    PlayMines,
    PlayPlinko,
    PlayWheel,
    CommitRandom,
    RevealRandom,
    CommitHash,
    RevealSeed,
    TreasuryTransfer,
}

/// Read-only scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    RandomValue,
    VerifiedRandomValue,
    AccountBalance,
    VaultBalance,
}

/// Contracts a template may import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    CasinoGames,
    FlowVrf,
    FungibleToken,
    FlowToken,
}

impl Contract {
    fn placeholder(self) -> &'static str {
        match self {
            Self::CasinoGames => "0xCasinoGames",
            Self::FlowVrf => "0xFlowVRF",
            Self::FungibleToken => "0xFungibleToken",
            Self::FlowToken => "0xFlowToken",
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Self::CasinoGames => "contracts.casino_games",
            Self::FlowVrf => "contracts.flow_vrf",
            Self::FungibleToken => "contracts.fungible_token",
            Self::FlowToken => "contracts.flow_token",
        }
    }
}

/// Declared Cadence parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Address,
    UFix64,
    String,
    UInt8,
    UInt8Array,
    Bool,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Address => "Address",
            Self::UFix64 => "UFix64",
            Self::String => "String",
            Self::UInt8 => "UInt8",
            Self::UInt8Array => "[UInt8]",
            Self::Bool => "Bool",
        })
    }
}

impl ArgKind {
    fn accepts(self, value: &CadenceValue) -> bool {
        match (self, value) {
            (Self::Address, CadenceValue::Address(s)) => s.parse::<FlowAddress>().is_ok(),
            (Self::UFix64, CadenceValue::UFix64(s)) => s.parse::<Amount>().is_ok(),
            (Self::String, CadenceValue::String(_)) => true,
            (Self::UInt8, CadenceValue::UInt8(s)) => s.parse::<u8>().is_ok(),
            (Self::UInt8Array, CadenceValue::Array(items)) => items
                .iter()
                .all(|item| matches!(item, CadenceValue::UInt8(s) if s.parse::<u8>().is_ok())),
            (Self::Bool, CadenceValue::Bool(_)) => true,
            _ => false,
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ArgKind,
}

const fn param(name: &'static str, kind: ArgKind) -> Param {
    Param { name, kind }
}

/// A caller-supplied argument.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub name: String,
    pub value: CadenceValue,
}

impl NamedArg {
    pub fn new(name: impl Into<String>, value: CadenceValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Static description of one template.
#[derive(Debug)]
pub struct Template {
    pub name: &'static str,
    pub params: &'static [Param],
    pub imports: &'static [Contract],
    pub source: &'static str,
}

impl Template {
    /// Check `args` against the declared parameters and return their values in
    /// declaration order. Rejects missing, duplicate, unknown and mistyped arguments.
    pub fn validate(&self, args: &[NamedArg]) -> RelayResult<Vec<CadenceValue>> {
        for (i, arg) in args.iter().enumerate() {
            if !self.params.iter().any(|p| p.name == arg.name) {
                return Err(RelayError::Validation(format!(
                    "{}: unexpected argument '{}'",
                    self.name, arg.name
                )));
            }
            if args[..i].iter().any(|prev| prev.name == arg.name) {
                return Err(RelayError::Validation(format!(
                    "{}: duplicate argument '{}'",
                    self.name, arg.name
                )));
            }
        }

        self.params
            .iter()
            .map(|p| {
                let arg = args.iter().find(|a| a.name == p.name).ok_or_else(|| {
                    RelayError::Validation(format!("{}: missing required argument '{}'", self.name, p.name))
                })?;
                if !p.kind.accepts(&arg.value) {
                    return Err(RelayError::Validation(format!(
                        "{}: argument '{}' must be {}",
                        self.name, p.name, p.kind
                    )));
                }
                Ok(arg.value.clone())
            })
            .collect()
    }

    /// Substitute contract addresses; fails if an imported contract is unset.
    pub fn render(&self, contracts: &ContractsConfig) -> RelayResult<String> {
        let mut source = self.source.to_string();
        for contract in self.imports {
            let configured = match contract {
                Contract::CasinoGames => &contracts.casino_games,
                Contract::FlowVrf => &contracts.flow_vrf,
                Contract::FungibleToken => &contracts.fungible_token,
                Contract::FlowToken => &contracts.flow_token,
            };
            let address: FlowAddress = configured.parse().map_err(|_| {
                RelayError::Configuration(format!("{} is not configured", contract.config_key()))
            })?;
            source = source.replace(contract.placeholder(), &address.to_string());
        }
        Ok(source)
    }
}

impl Operation {
    pub fn template(self) -> &'static Template {
        match self {
            Self::PlayRoulette => &PLAY_ROULETTE,
            Self::PlayMines => &PLAY_MINES,
            Self::PlayPlinko => &PLAY_PLINKO,
            Self::PlayWheel => &PLAY_WHEEL,
            Self::CommitRandom => &COMMIT_RANDOM,
            Self::RevealRandom => &REVEAL_RANDOM,
            Self::CommitHash => &COMMIT_HASH,
            Self::RevealSeed => &REVEAL_SEED,
            Self::TreasuryTransfer => &TREASURY_TRANSFER,
        }
    }

    pub fn name(self) -> &'static str {
        self.template().name
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Query {
    pub fn template(self) -> &'static Template {
        match self {
            Self::RandomValue => &RANDOM_VALUE,
            Self::VerifiedRandomValue => &VERIFIED_RANDOM_VALUE,
            Self::AccountBalance => &ACCOUNT_BALANCE,
            Self::VaultBalance => &VAULT_BALANCE,
        }
    }
}

use ArgKind::{Address, Bool, String as Str, UFix64, UInt8, UInt8Array};

static PLAY_ROULETTE: Template = Template {
    name: "play_roulette",
    params: &[
        param("playerAddress", Address),
        param("betAmount", UFix64),
        param("betType", Str),
        param("betNumbers", UInt8Array),
    ],
    imports: &[Contract::CasinoGames],
    source: r#"import CasinoGames from 0xCasinoGames

transaction(playerAddress: Address, betAmount: UFix64, betType: String, betNumbers: [UInt8]) {
    var gameResult: CasinoGames.GameResult?

    prepare(treasury: auth(BorrowValue) &Account) {
        self.gameResult = nil
    }

    execute {
        self.gameResult = CasinoGames.playRoulette(
            player: playerAddress,
            betAmount: betAmount,
            betType: betType,
            betNumbers: betNumbers
        )
    }

    post {
        self.gameResult != nil: "Game result must be set"
        self.gameResult!.gameType == "ROULETTE": "Game type must be ROULETTE"
        self.gameResult!.player == playerAddress: "Player address must match"
    }
}
"#,
};

static PLAY_MINES: Template = Template {
    name: "play_mines",
    params: &[
        param("playerAddress", Address),
        param("betAmount", UFix64),
        param("mineCount", UInt8),
        param("revealedTiles", UInt8Array),
        param("cashOut", Bool),
    ],
    imports: &[Contract::CasinoGames],
    source: r#"import CasinoGames from 0xCasinoGames

transaction(playerAddress: Address, betAmount: UFix64, mineCount: UInt8, revealedTiles: [UInt8], cashOut: Bool) {
    var gameResult: CasinoGames.GameResult?

    prepare(treasury: auth(BorrowValue) &Account) {
        self.gameResult = nil
    }

    execute {
        self.gameResult = CasinoGames.playMines(
            player: playerAddress,
            betAmount: betAmount,
            mineCount: mineCount,
            revealedTiles: revealedTiles,
            cashOut: cashOut
        )
    }

    post {
        self.gameResult != nil: "Game result must be set"
        self.gameResult!.gameType == "MINES": "Game type must be MINES"
        self.gameResult!.player == playerAddress: "Player address must match"
    }
}
"#,
};

static PLAY_PLINKO: Template = Template {
    name: "play_plinko",
    params: &[
        param("playerAddress", Address),
        param("betAmount", UFix64),
        param("risk", Str),
        param("rows", UInt8),
    ],
    imports: &[Contract::CasinoGames],
    source: r#"import CasinoGames from 0xCasinoGames

transaction(playerAddress: Address, betAmount: UFix64, risk: String, rows: UInt8) {
    var gameResult: CasinoGames.GameResult?

    prepare(treasury: auth(BorrowValue) &Account) {
        self.gameResult = nil
    }

    execute {
        self.gameResult = CasinoGames.playPlinko(
            player: playerAddress,
            betAmount: betAmount,
            risk: risk,
            rows: rows
        )
    }

    post {
        self.gameResult != nil: "Game result must be set"
        self.gameResult!.gameType == "PLINKO": "Game type must be PLINKO"
        self.gameResult!.player == playerAddress: "Player address must match"
        self.gameResult!.betAmount == betAmount: "Bet amount must match"
    }
}
"#,
};

static PLAY_WHEEL: Template = Template {
    name: "play_wheel",
    params: &[
        param("playerAddress", Address),
        param("betAmount", UFix64),
        param("segments", UInt8),
    ],
    imports: &[Contract::CasinoGames],
    source: r#"import CasinoGames from 0xCasinoGames

transaction(playerAddress: Address, betAmount: UFix64, segments: UInt8) {
    var gameResult: CasinoGames.GameResult?

    prepare(treasury: auth(BorrowValue) &Account) {
        self.gameResult = nil
    }

    execute {
        self.gameResult = CasinoGames.playWheel(
            player: playerAddress,
            betAmount: betAmount,
            segments: segments
        )
    }

    post {
        self.gameResult != nil: "Game result must be set"
        self.gameResult!.gameType == "WHEEL": "Game type must be WHEEL"
        self.gameResult!.player == playerAddress: "Player address must match"
    }
}
"#,
};

static COMMIT_RANDOM: Template = Template {
    name: "commit_random",
    params: &[param("requestId", Str), param("randomSeed", Str)],
    imports: &[Contract::FlowVrf],
    source: r#"import FlowVRF from 0xFlowVRF

transaction(requestId: String, randomSeed: String) {
    prepare(signer: &Account) {}

    execute {
        FlowVRF.commitRandom(requestId: requestId, randomSeed: randomSeed)
    }
}
"#,
};

static REVEAL_RANDOM: Template = Template {
    name: "reveal_random",
    params: &[param("requestId", Str), param("randomSeed", Str)],
    imports: &[Contract::FlowVrf],
    source: r#"import FlowVRF from 0xFlowVRF

transaction(requestId: String, randomSeed: String) {
    prepare(signer: &Account) {}

    execute {
        FlowVRF.revealRandom(requestId: requestId, randomSeed: randomSeed)
    }
}
"#,
};

static COMMIT_HASH: Template = Template {
    name: "commit_hash",
    params: &[param("requestId", Str), param("commitment", Str)],
    imports: &[Contract::FlowVrf],
    source: r#"import FlowVRF from 0xFlowVRF

transaction(requestId: String, commitment: String) {
    prepare(signer: &Account) {}

    execute {
        FlowVRF.commitHash(requestId: requestId, commitment: commitment)
    }
}
"#,
};

static REVEAL_SEED: Template = Template {
    name: "reveal_seed",
    params: &[param("requestId", Str), param("seed", Str)],
    imports: &[Contract::FlowVrf],
    source: r#"import FlowVRF from 0xFlowVRF

transaction(requestId: String, seed: String) {
    prepare(signer: &Account) {}

    execute {
        FlowVRF.revealSeed(requestId: requestId, seed: seed)
    }
}
"#,
};

static TREASURY_TRANSFER: Template = Template {
    name: "treasury_transfer",
    params: &[param("amount", UFix64), param("recipient", Address)],
    imports: &[Contract::FungibleToken, Contract::FlowToken],
    source: r#"import FungibleToken from 0xFungibleToken
import FlowToken from 0xFlowToken

transaction(amount: UFix64, recipient: Address) {
    let sentVault: @{FungibleToken.Vault}

    prepare(signer: auth(BorrowValue) &Account) {
        let vaultRef = signer.storage.borrow<auth(FungibleToken.Withdraw) &FlowToken.Vault>(from: /storage/flowTokenVault)
            ?? panic("Could not borrow reference to the treasury vault")
        self.sentVault <- vaultRef.withdraw(amount: amount)
    }

    execute {
        let receiverRef = getAccount(recipient)
            .capabilities.borrow<&{FungibleToken.Receiver}>(/public/flowTokenReceiver)
            ?? panic("Could not borrow receiver reference to the recipient vault")
        receiverRef.deposit(from: <-self.sentVault)
    }
}
"#,
};

static RANDOM_VALUE: Template = Template {
    name: "get_random_value",
    params: &[param("requestId", Str)],
    imports: &[Contract::FlowVrf],
    source: r#"import FlowVRF from 0xFlowVRF

access(all) fun main(requestId: String): String? {
    return FlowVRF.getRandomValue(requestId: requestId)
}
"#,
};

static VERIFIED_RANDOM_VALUE: Template = Template {
    name: "get_verified_random_value",
    params: &[param("requestId", Str), param("commitment", Str)],
    imports: &[Contract::FlowVrf],
    source: r#"import FlowVRF from 0xFlowVRF

access(all) fun main(requestId: String, commitment: String): String? {
    let seed = FlowVRF.getRevealedSeed(requestId: requestId)
    if seed == nil {
        return nil
    }
    let digest = String.encodeHex(HashAlgorithm.SHA2_256.hash(seed!.concat(requestId).utf8))
    if digest != commitment {
        return nil
    }
    return FlowVRF.getRandomValue(requestId: requestId)
}
"#,
};

static ACCOUNT_BALANCE: Template = Template {
    name: "get_account_balance",
    params: &[param("address", Address)],
    imports: &[],
    source: r#"access(all) fun main(address: Address): UFix64 {
    return getAccount(address).balance
}
"#,
};

/// `VAULT_BALANCE_PATH` is replaced with the configured capability path.
static VAULT_BALANCE: Template = Template {
    name: "get_vault_balance",
    params: &[param("address", Address)],
    imports: &[Contract::FungibleToken],
    source: r#"import FungibleToken from 0xFungibleToken

access(all) fun main(address: Address): UFix64? {
    return getAccount(address)
        .capabilities.borrow<&{FungibleToken.Balance}>(VAULT_BALANCE_PATH)?.balance
}
"#,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn roulette_args() -> Vec<NamedArg> {
        let player: FlowAddress = "0x0123456789abcdef".parse().unwrap();
        vec![
            NamedArg::new("betType", CadenceValue::string("red")),
            NamedArg::new("playerAddress", CadenceValue::address(&player)),
            NamedArg::new("betAmount", CadenceValue::ufix64("1.0".parse().unwrap())),
            NamedArg::new("betNumbers", CadenceValue::uint8_array(&[])),
        ]
    }

    #[test]
    fn test_validate_orders_arguments() {
        let values = Operation::PlayRoulette.template().validate(&roulette_args()).unwrap();
        assert_eq!(values.len(), 4);
        assert!(matches!(&values[0], CadenceValue::Address(a) if a == "0x0123456789abcdef"));
        assert_eq!(values[2], CadenceValue::string("red"));
    }

    #[test]
    fn test_validate_rejects_missing_extra_and_mistyped() {
        let template = Operation::PlayRoulette.template();

        let mut missing = roulette_args();
        missing.pop();
        let err = template.validate(&missing).unwrap_err();
        assert!(err.to_string().contains("missing required argument 'betNumbers'"));

        let mut extra = roulette_args();
        extra.push(NamedArg::new("jackpot", CadenceValue::Bool(true)));
        let err = template.validate(&extra).unwrap_err();
        assert!(err.to_string().contains("unexpected argument 'jackpot'"));

        let mut mistyped = roulette_args();
        mistyped[2] = NamedArg::new("betAmount", CadenceValue::string("1.0"));
        let err = template.validate(&mistyped).unwrap_err();
        assert!(err.to_string().contains("'betAmount' must be UFix64"));

        let mut bad_address = roulette_args();
        bad_address[1] = NamedArg::new("playerAddress", CadenceValue::Address("0x12".into()));
        assert!(template.validate(&bad_address).is_err());

        let mut duplicate = roulette_args();
        duplicate.push(NamedArg::new("betType", CadenceValue::string("black")));
        assert!(template.validate(&duplicate).unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_render_substitutes_addresses() {
        let contracts = ContractsConfig::default();
        let source = Operation::TreasuryTransfer.template().render(&contracts).unwrap();
        assert!(source.contains("import FungibleToken from 0x9a0766d93b6608b7"));
        assert!(source.contains("import FlowToken from 0x7e60df042a9c0868"));
        assert!(!source.contains("0xFungibleToken"));
    }

    #[test]
    fn test_render_requires_configured_contract() {
        // No VRF contract address by default.
        let err = Operation::CommitRandom.template().render(&ContractsConfig::default()).unwrap_err();
        assert!(matches!(err, RelayError::Configuration(ref m) if m.contains("contracts.flow_vrf")));
    }

    #[test]
    fn test_every_template_declares_its_placeholders() {
        let all = [
            Operation::PlayRoulette,
            Operation::PlayMines,
            Operation::PlayPlinko,
            Operation::PlayWheel,
            Operation::CommitRandom,
            Operation::RevealRandom,
            Operation::CommitHash,
            Operation::RevealSeed,
            Operation::TreasuryTransfer,
        ];
        for op in all {
            let t = op.template();
            for c in [Contract::CasinoGames, Contract::FlowVrf, Contract::FungibleToken, Contract::FlowToken] {
                assert_eq!(t.source.contains(c.placeholder()), t.imports.contains(&c), "{}", t.name);
            }
            for p in t.params {
                assert!(t.source.contains(&format!("{}: ", p.name)), "{} lacks {}", t.name, p.name);
            }
        }
    }
}
