//! Transaction payload/envelope encoding.
//!
//! # Encoding
//! ```text
//! payload  = rlp([script, [arg...], reference_block_id, gas_limit,
//!                 proposer_address, proposer_key_index, proposer_sequence,
//!                 payer, [authorizer...]])
//! envelope = rlp([payload, [payload_signature...]])
//! message  = DOMAIN_TAG (32 bytes, zero padded) || envelope
//! ```
//!
//! The treasury is proposer, payer and sole authorizer, so only one envelope
//! signature is ever attached and the payload signature list is empty.

use alloy::rlp::{length_of_length, BufMut, Encodable, Header};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;

use crate::ledger::types::{BlockId, FlowAddress, LedgerResult};

/// Domain separation tag prepended to every signed transaction message.
pub const TRANSACTION_DOMAIN_TAG: &str = "FLOW-V0.0-transaction";

/// The domain tag right-padded with zero bytes to 32 bytes.
pub fn domain_tag() -> [u8; 32] {
    let mut tag = [0u8; 32];
    let bytes = TRANSACTION_DOMAIN_TAG.as_bytes();
    tag[..bytes.len()].copy_from_slice(bytes);
    tag
}

/// Minimal RLP tree used to encode payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    Uint(u64),
    List(Vec<RlpItem>),
}

impl RlpItem {
    fn payload_length(items: &[RlpItem]) -> usize {
        items.iter().map(Encodable::length).sum()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out
    }
}

impl Encodable for RlpItem {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            RlpItem::Bytes(bytes) => bytes.as_slice().encode(out),
            RlpItem::Uint(value) => value.encode(out),
            RlpItem::List(items) => {
                Header {
                    list: true,
                    payload_length: Self::payload_length(items),
                }
                .encode(out);
                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    fn length(&self) -> usize {
        match self {
            RlpItem::Bytes(bytes) => bytes.as_slice().length(),
            RlpItem::Uint(value) => value.length(),
            RlpItem::List(items) => {
                let payload = Self::payload_length(items);
                payload + length_of_length(payload)
            }
        }
    }
}

/// Proposal key: the account key whose sequence number orders this transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalKey {
    pub address: FlowAddress,
    pub key_index: u32,
    pub sequence_number: u64,
}

/// Unsigned transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub script: String,
    /// JSON-Cadence encoded arguments, in template order.
    pub arguments: Vec<Vec<u8>>,
    pub reference_block_id: BlockId,
    pub gas_limit: u64,
    pub proposal_key: ProposalKey,
    pub payer: FlowAddress,
    pub authorizers: Vec<FlowAddress>,
}

impl TransactionEnvelope {
    fn payload_item(&self) -> LedgerResult<RlpItem> {
        Ok(RlpItem::List(vec![
            RlpItem::Bytes(self.script.as_bytes().to_vec()),
            RlpItem::List(self.arguments.iter().cloned().map(RlpItem::Bytes).collect()),
            RlpItem::Bytes(self.reference_block_id.to_bytes()?.to_vec()),
            RlpItem::Uint(self.gas_limit),
            RlpItem::Bytes(self.proposal_key.address.as_bytes().to_vec()),
            RlpItem::Uint(u64::from(self.proposal_key.key_index)),
            RlpItem::Uint(self.proposal_key.sequence_number),
            RlpItem::Bytes(self.payer.as_bytes().to_vec()),
            RlpItem::List(
                self.authorizers
                    .iter()
                    .map(|a| RlpItem::Bytes(a.as_bytes().to_vec()))
                    .collect(),
            ),
        ]))
    }

    /// Bytes the payer signs: domain tag followed by the RLP envelope.
    pub fn envelope_message(&self) -> LedgerResult<Vec<u8>> {
        let envelope = RlpItem::List(vec![self.payload_item()?, RlpItem::List(Vec::new())]);
        let mut message = domain_tag().to_vec();
        message.extend_from_slice(&envelope.to_vec());
        Ok(message)
    }
}

/// Envelope plus the payer's signature, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub envelope: TransactionEnvelope,
    pub signer: FlowAddress,
    pub key_index: u32,
    /// 64-byte `r || s` signature over the envelope message.
    pub signature: Vec<u8>,
}

impl SignedTransaction {
    /// JSON body for `POST /v1/transactions`.
    pub fn to_rest_body(&self) -> serde_json::Value {
        let b64 = |bytes: &[u8]| general_purpose::STANDARD.encode(bytes);
        let env = &self.envelope;
        json!({
            "script": b64(env.script.as_bytes()),
            "arguments": env.arguments.iter().map(|a| b64(a)).collect::<Vec<_>>(),
            "reference_block_id": env.reference_block_id.as_str(),
            "gas_limit": env.gas_limit.to_string(),
            "payer": env.payer.to_hex(),
            "proposal_key": {
                "address": env.proposal_key.address.to_hex(),
                "key_index": env.proposal_key.key_index.to_string(),
                "sequence_number": env.proposal_key.sequence_number.to_string(),
            },
            "authorizers": env.authorizers.iter().map(FlowAddress::to_hex).collect::<Vec<_>>(),
            "payload_signatures": [],
            "envelope_signatures": [{
                "address": self.signer.to_hex(),
                "key_index": self.key_index.to_string(),
                "signature": b64(&self.signature),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_envelope(sequence_number: u64) -> TransactionEnvelope {
        let treasury: FlowAddress = "0x2083a55fb16f8f60".parse().unwrap();
        TransactionEnvelope {
            script: "transaction {}".to_string(),
            arguments: vec![br#"{"type":"String","value":"x"}"#.to_vec()],
            reference_block_id: BlockId::new("ab".repeat(32)),
            gas_limit: 9999,
            proposal_key: ProposalKey {
                address: treasury,
                key_index: 0,
                sequence_number,
            },
            payer: treasury,
            authorizers: vec![treasury],
        }
    }

    #[test]
    fn test_rlp_known_vectors() {
        assert_eq!(RlpItem::Bytes(b"dog".to_vec()).to_vec(), vec![0x83, b'd', b'o', b'g']);
        assert_eq!(RlpItem::Uint(0).to_vec(), vec![0x80]);
        assert_eq!(RlpItem::Uint(1024).to_vec(), vec![0x82, 0x04, 0x00]);
        assert_eq!(
            RlpItem::List(vec![RlpItem::Bytes(b"cat".to_vec()), RlpItem::Bytes(b"dog".to_vec())]).to_vec(),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
        assert_eq!(RlpItem::List(Vec::new()).to_vec(), vec![0xc0]);
    }

    #[test]
    fn test_length_matches_encoding() {
        let item = RlpItem::List(vec![
            RlpItem::Bytes(vec![0xaa; 100]),
            RlpItem::Uint(u64::MAX),
            RlpItem::List(vec![RlpItem::Bytes(Vec::new())]),
        ]);
        assert_eq!(item.length(), item.to_vec().len());
    }

    #[test]
    fn test_envelope_message_prefix() {
        let message = sample_envelope(7).envelope_message().unwrap();
        assert_eq!(&message[..32], &domain_tag());
        assert_eq!(&message[..21], TRANSACTION_DOMAIN_TAG.as_bytes());
        assert!(message[21..32].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_sequence_number_changes_message() {
        let a = sample_envelope(1).envelope_message().unwrap();
        let b = sample_envelope(2).envelope_message().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rest_body_shape() {
        let signed = SignedTransaction {
            envelope: sample_envelope(3),
            signer: "0x2083a55fb16f8f60".parse().unwrap(),
            key_index: 0,
            signature: vec![1u8; 64],
        };
        let body = signed.to_rest_body();
        assert_eq!(body["payer"], "2083a55fb16f8f60");
        assert_eq!(body["proposal_key"]["sequence_number"], "3");
        assert_eq!(body["gas_limit"], "9999");
        assert_eq!(body["envelope_signatures"][0]["key_index"], "0");
        assert_eq!(body["arguments"].as_array().map(Vec::len), Some(1));
    }
}
