//! JSON-Cadence value encoding.
//!
//! Transaction arguments, script results and event payloads all travel as
//! JSON objects of the form `{"type": "<Type>", "value": <value>}`. Integer and
//! fixed-point values are carried as decimal strings.

use serde::{Deserialize, Serialize};

use crate::ledger::amount::Amount;
use crate::ledger::types::{FlowAddress, LedgerError, LedgerResult};

/// A decoded JSON-Cadence value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CadenceValue {
    Void,
    Optional(Option<Box<CadenceValue>>),
    Bool(bool),
    String(String),
    Character(String),
    Address(String),
    Int(String),
    Int8(String),
    Int16(String),
    Int32(String),
    Int64(String),
    Int128(String),
    Int256(String),
    UInt(String),
    UInt8(String),
    UInt16(String),
    UInt32(String),
    UInt64(String),
    UInt128(String),
    UInt256(String),
    Word8(String),
    Word16(String),
    Word32(String),
    Word64(String),
    Fix64(String),
    UFix64(String),
    Array(Vec<CadenceValue>),
    Dictionary(Vec<DictionaryEntry>),
    Struct(Composite),
    Resource(Composite),
    Event(Composite),
    Contract(Composite),
    Enum(Composite),
    Path(PathValue),
}

/// Key/value pair of a Cadence dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub key: CadenceValue,
    pub value: CadenceValue,
}

/// Struct, resource, or event body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub id: String,
    pub fields: Vec<CompositeField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: String,
    pub value: CadenceValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    pub domain: String,
    pub identifier: String,
}

impl Composite {
    pub fn field(&self, name: &str) -> Option<&CadenceValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

impl CadenceValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn address(address: &FlowAddress) -> Self {
        Self::Address(address.to_string())
    }

    pub fn ufix64(amount: Amount) -> Self {
        Self::UFix64(amount.to_string())
    }

    pub fn uint8(v: u8) -> Self {
        Self::UInt8(v.to_string())
    }

    pub fn uint8_array(values: &[u8]) -> Self {
        Self::Array(values.iter().copied().map(Self::uint8).collect())
    }

    /// Strip any number of `Optional` wrappers; `None` for a nil optional.
    pub fn unwrap_optional(&self) -> Option<&CadenceValue> {
        match self {
            Self::Optional(Some(inner)) => inner.unwrap_optional(),
            Self::Optional(None) => None,
            other => Some(other),
        }
    }

    /// Textual form of a scalar value (strings, addresses, numbers, booleans).
    pub fn as_text(&self) -> Option<String> {
        match self.unwrap_optional()? {
            Self::String(s) | Self::Character(s) | Self::Address(s) => Some(s.clone()),
            Self::Int(s)
            | Self::Int8(s)
            | Self::Int16(s)
            | Self::Int32(s)
            | Self::Int64(s)
            | Self::Int128(s)
            | Self::Int256(s)
            | Self::UInt(s)
            | Self::UInt8(s)
            | Self::UInt16(s)
            | Self::UInt32(s)
            | Self::UInt64(s)
            | Self::UInt128(s)
            | Self::UInt256(s)
            | Self::Word8(s)
            | Self::Word16(s)
            | Self::Word32(s)
            | Self::Word64(s)
            | Self::Fix64(s)
            | Self::UFix64(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_text()?.parse().ok()
    }

    pub fn as_amount(&self) -> Option<Amount> {
        self.as_text()?.parse().ok()
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self.unwrap_optional()? {
            Self::Struct(c) | Self::Resource(c) | Self::Event(c) | Self::Contract(c) | Self::Enum(c) => Some(c),
            _ => None,
        }
    }

    /// Flatten a dictionary of scalars into string pairs. Non-scalar entries are skipped.
    pub fn as_string_map(&self) -> Option<std::collections::BTreeMap<String, String>> {
        match self.unwrap_optional()? {
            Self::Dictionary(entries) => Some(
                entries
                    .iter()
                    .filter_map(|e| Some((e.key.as_text()?, e.value.as_text()?)))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Encode to the JSON bytes placed in transaction payloads.
    pub fn to_json_bytes(&self) -> LedgerResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Decode(format!("encode cadence value: {}", e)))
    }

    pub fn from_json_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::Decode(format!("decode cadence value: {}", e)))
    }

    /// Untyped JSON view for API responses: composites and dictionaries become
    /// objects, numbers stay decimal strings, nil becomes `null`.
    pub fn to_plain_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Void | Self::Optional(None) => Value::Null,
            Self::Optional(Some(inner)) => inner.to_plain_json(),
            Self::Bool(b) => Value::Bool(*b),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_plain_json).collect()),
            Self::Dictionary(entries) => Value::Object(
                entries
                    .iter()
                    .map(|e| {
                        let key = e.key.as_text().unwrap_or_else(|| e.key.to_plain_json().to_string());
                        (key, e.value.to_plain_json())
                    })
                    .collect(),
            ),
            Self::Struct(c) | Self::Resource(c) | Self::Event(c) | Self::Contract(c) | Self::Enum(c) => Value::Object(
                c.fields
                    .iter()
                    .map(|f| (f.name.clone(), f.value.to_plain_json()))
                    .collect(),
            ),
            Self::Path(p) => Value::String(format!("/{}/{}", p.domain, p.identifier)),
            other => other.as_text().map(Value::String).unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_encoding() {
        let amount: Amount = "1.5".parse().unwrap();
        let json = serde_json::to_value(CadenceValue::ufix64(amount)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "UFix64", "value": "1.50000000"}));

        let json = serde_json::to_value(CadenceValue::uint8_array(&[1, 2])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Array", "value": [
                {"type": "UInt8", "value": "1"},
                {"type": "UInt8", "value": "2"}
            ]})
        );

        let json = serde_json::to_value(CadenceValue::Optional(None)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Optional", "value": null}));
    }

    #[test]
    fn test_decode_event_payload() {
        let payload = serde_json::json!({
            "type": "Event",
            "value": {
                "id": "A.2083a55fb16f8f60.CasinoGames.GamePlayed",
                "fields": [
                    {"name": "randomSeed", "value": {"type": "UInt64", "value": "987654321"}},
                    {"name": "gameResult", "value": {"type": "Dictionary", "value": [
                        {"key": {"type": "String", "value": "winningNumber"},
                         "value": {"type": "String", "value": "17"}}
                    ]}}
                ]
            }
        });
        let value: CadenceValue = serde_json::from_value(payload).unwrap();
        let event = value.as_composite().unwrap();
        assert_eq!(event.id, "A.2083a55fb16f8f60.CasinoGames.GamePlayed");
        assert_eq!(event.field("randomSeed").and_then(CadenceValue::as_u64), Some(987654321));
        let result = event.field("gameResult").and_then(CadenceValue::as_string_map).unwrap();
        assert_eq!(result.get("winningNumber").map(String::as_str), Some("17"));
    }

    #[test]
    fn test_optional_unwrap() {
        let value: CadenceValue = serde_json::from_value(serde_json::json!({
            "type": "Optional",
            "value": {"type": "String", "value": "abc"}
        }))
        .unwrap();
        assert_eq!(value.as_text().as_deref(), Some("abc"));

        let nil: CadenceValue = serde_json::from_value(serde_json::json!({"type": "Optional", "value": null})).unwrap();
        assert_eq!(nil.as_text(), None);
    }

    #[test]
    fn test_plain_json_view() {
        let value = CadenceValue::Event(Composite {
            id: "A.1.C.E".into(),
            fields: vec![
                CompositeField {
                    name: "amount".into(),
                    value: CadenceValue::UFix64("1.00000000".into()),
                },
                CompositeField {
                    name: "to".into(),
                    value: CadenceValue::Optional(None),
                },
                CompositeField {
                    name: "ok".into(),
                    value: CadenceValue::Bool(true),
                },
            ],
        });
        assert_eq!(
            value.to_plain_json(),
            serde_json::json!({"amount": "1.00000000", "to": null, "ok": true})
        );
    }
}
