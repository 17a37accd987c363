//! Treasury signing identity.
//!
//! # Security
//! - The private key is loaded ONLY from an environment variable
//! - Keys are never logged or serialized
//!
//! Ledger accounts are not derived from keys, so the treasury address and key
//! index come from configuration and only the secret comes from the
//! environment. Envelopes are signed as ECDSA secp256k1 over SHA2-256 of the
//! domain-tagged message.

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::ledger::envelope::{SignedTransaction, TransactionEnvelope};
use crate::ledger::types::FlowAddress;

/// Environment variable holding the treasury's hex private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "CASINO_RELAY_TREASURY_PRIVATE_KEY";

/// Errors raised while loading a key or signing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignerError {
    #[error("environment variable {0} not set")]
    MissingKey(&'static str),
    #[error("invalid private key format: {0}")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
}

/// The treasury account's signing key.
#[derive(Clone)]
pub struct TreasurySigner {
    signer: PrivateKeySigner,
    address: FlowAddress,
    key_index: u32,
}

impl TreasurySigner {
    /// Build from a hex private key (with or without `0x`).
    pub fn from_private_key(
        private_key_hex: &str,
        address: FlowAddress,
        key_index: u32,
    ) -> Result<Self, SignerError> {
        let key_hex = private_key_hex.trim().strip_prefix("0x").unwrap_or(private_key_hex.trim());
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| SignerError::InvalidKey(format!("{}", e)))?;

        tracing::info!(address = %address, key_index, "Treasury signer initialized");

        Ok(Self {
            signer,
            address,
            key_index,
        })
    }

    /// Load the key from `CASINO_RELAY_TREASURY_PRIVATE_KEY`.
    pub fn from_env(address: FlowAddress, key_index: u32) -> Result<Self, SignerError> {
        let private_key =
            std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| SignerError::MissingKey(PRIVATE_KEY_ENV_VAR))?;
        Self::from_private_key(&private_key, address, key_index)
    }

    pub fn address(&self) -> FlowAddress {
        self.address
    }

    pub fn key_index(&self) -> u32 {
        self.key_index
    }

    /// Sign an envelope, producing the transaction ready for submission.
    pub async fn sign(&self, envelope: TransactionEnvelope) -> Result<SignedTransaction, SignerError> {
        let message = envelope
            .envelope_message()
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        let signature = self.sign_message(&message).await?;
        Ok(SignedTransaction {
            envelope,
            signer: self.address,
            key_index: self.key_index,
            signature,
        })
    }

    /// Raw 64-byte `r || s` signature over SHA2-256 of `message`.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let digest = B256::from_slice(&Sha256::digest(message));
        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(&signature.r().to_be_bytes::<32>());
        out.extend_from_slice(&signature.s().to_be_bytes::<32>());
        Ok(out)
    }
}

impl fmt::Debug for TreasurySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreasurySigner")
            .field("address", &self.address)
            .field("key_index", &self.key_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::envelope::ProposalKey;
    use crate::ledger::types::BlockId;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn treasury() -> FlowAddress {
        "0x2083a55fb16f8f60".parse().unwrap()
    }

    #[test]
    fn test_signer_from_private_key() {
        let signer = TreasurySigner::from_private_key(TEST_PRIVATE_KEY, treasury(), 0).unwrap();
        assert_eq!(signer.address(), treasury());
        assert_eq!(signer.key_index(), 0);

        let prefixed = format!("0x{}", TEST_PRIVATE_KEY);
        assert!(TreasurySigner::from_private_key(&prefixed, treasury(), 0).is_ok());
    }

    #[test]
    fn test_invalid_private_key() {
        let err = TreasurySigner::from_private_key("invalid_key", treasury(), 0).unwrap_err();
        assert!(err.to_string().contains("invalid private key"));
    }

    #[test]
    fn test_debug_hides_key() {
        let signer = TreasurySigner::from_private_key(TEST_PRIVATE_KEY, treasury(), 0).unwrap();
        let debug = format!("{:?}", signer);
        assert!(!debug.contains(TEST_PRIVATE_KEY));
        assert!(debug.contains("2083a55fb16f8f60"));
    }

    #[tokio::test]
    async fn test_signature_is_deterministic_r_s() {
        let signer = TreasurySigner::from_private_key(TEST_PRIVATE_KEY, treasury(), 0).unwrap();
        let a = signer.sign_message(b"hello").await.unwrap();
        let b = signer.sign_message(b"hello").await.unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert_ne!(a, signer.sign_message(b"other").await.unwrap());
    }

    #[tokio::test]
    async fn test_sign_envelope() {
        let signer = TreasurySigner::from_private_key(TEST_PRIVATE_KEY, treasury(), 2).unwrap();
        let envelope = TransactionEnvelope {
            script: "transaction {}".into(),
            arguments: Vec::new(),
            reference_block_id: BlockId::new("00".repeat(32)),
            gas_limit: 100,
            proposal_key: ProposalKey {
                address: treasury(),
                key_index: 2,
                sequence_number: 5,
            },
            payer: treasury(),
            authorizers: vec![treasury()],
        };
        let signed = signer.sign(envelope).await.unwrap();
        assert_eq!(signed.key_index, 2);
        assert_eq!(signed.signer, treasury());
        assert_eq!(signed.signature.len(), 64);
    }
}
