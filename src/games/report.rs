//! Textual transaction report parser.
//!
//! Some execution environments return a human-readable report instead of
//! structured events:
//!
//! ```text
//! Block ID    2f3a...
//! Block Height    1234
//! Status      SEALED
//!
//! Events:
//!     Index   0
//!     Type    A.2083a55fb16f8f60.CasinoGames.GamePlayed
//!     Tx ID   9c1e...
//!     Values
//!         - player (Address): 0x0123456789abcdef
//!         - gameType (String): "ROULETTE"
//!         - gameResult ({String:String}): {"winningNumber": "17"}
//! ```
//!
//! This is a degraded path: a line scanner tolerant of spacing, nothing more.

use std::collections::BTreeMap;

/// One `- name (Type): value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportValue {
    pub name: String,
    pub cadence_type: String,
    pub raw: String,
}

impl ReportValue {
    /// The value with string quoting removed and `nil` mapped to `None`.
    pub fn text(&self) -> Option<String> {
        let raw = self.raw.trim();
        if raw == "nil" {
            return None;
        }
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Some(serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw[1..raw.len() - 1].to_string()));
        }
        Some(raw.to_string())
    }

    /// Decode a `{String:String}`-style dictionary written as JSON.
    pub fn map(&self) -> Option<BTreeMap<String, String>> {
        let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(self.raw.trim()).ok()?;
        Some(
            parsed
                .into_iter()
                .map(|(k, v)| {
                    let text = match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (k, text)
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportEvent {
    pub event_type: String,
    pub values: Vec<ReportValue>,
}

impl ReportEvent {
    pub fn value(&self, name: &str) -> Option<&ReportValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionReport {
    pub block_id: Option<String>,
    pub block_height: Option<u64>,
    pub events: Vec<ReportEvent>,
}

impl TransactionReport {
    pub fn event(&self, event_type: &str) -> Option<&ReportEvent> {
        self.events.iter().find(|e| e.event_type == event_type)
    }
}

/// `"Key   value"` → `Some("value")` when the line starts with `key`.
fn labelled<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with(':') {
        Some(rest.trim_start_matches(':').trim())
    } else {
        None
    }
}

fn parse_value_line(line: &str) -> Option<ReportValue> {
    let body = line.strip_prefix('-')?.trim_start();
    let open = body.find(" (")?;
    let after_open = &body[open + 2..];
    let close = after_open.find("):")?;
    Some(ReportValue {
        name: body[..open].trim().to_string(),
        cadence_type: after_open[..close].trim().to_string(),
        raw: after_open[close + 2..].trim().to_string(),
    })
}

/// Parse a textual report. Unrecognized lines are ignored.
pub fn parse_report(report: &str) -> TransactionReport {
    let mut parsed = TransactionReport::default();
    let mut in_events = false;
    let mut current: Option<ReportEvent> = None;

    for line in report.lines().map(str::trim) {
        if !in_events {
            if let Some(id) = labelled(line, "Block ID") {
                if !id.is_empty() {
                    parsed.block_id = Some(id.to_string());
                }
            } else if let Some(height) = labelled(line, "Block Height") {
                parsed.block_height = height.parse().ok();
            } else if line.starts_with("Events:") {
                in_events = true;
            }
            continue;
        }

        if line.starts_with("Code") || line.starts_with("Payload:") {
            break;
        }
        if labelled(line, "Index").is_some() {
            if let Some(done) = current.take() {
                parsed.events.push(done);
            }
            current = Some(ReportEvent::default());
        } else if let Some(event_type) = labelled(line, "Type") {
            current.get_or_insert_with(ReportEvent::default).event_type = event_type.to_string();
        } else if line.starts_with('-') {
            if let (Some(event), Some(value)) = (current.as_mut(), parse_value_line(line)) {
                event.values.push(value);
            }
        }
    }
    if let Some(done) = current {
        parsed.events.push(done);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "Block ID\t2f3a9b\n\
Block Height\t812\n\
Status\t\tSEALED\n\
\n\
Events:\n\
    Index\t0\n\
    Type\tA.1654653399040a61.FlowToken.TokensWithdrawn\n\
    Values\n\
\t\t- amount (UFix64): 0.00001000\n\
\n\
    Index\t1\n\
    Type\tA.2083a55fb16f8f60.CasinoGames.GamePlayed\n\
    Tx ID\t9c1e\n\
    Values\n\
\t\t- player (Address): 0x0123456789abcdef\n\
\t\t- gameType (String): \"ROULETTE\"\n\
\t\t- betAmount (UFix64): 1.00000000\n\
\t\t- payout (UFix64): 2.00000000\n\
\t\t- randomSeed (UInt64): 987654321\n\
\t\t- gameResult ({String:String}): {\"winningNumber\": \"17\", \"color\": \"red\"}\n\
\n\
Code (hidden, use --include code)\n";

    #[test]
    fn test_parse_header_and_events() {
        let report = parse_report(REPORT);
        assert_eq!(report.block_id.as_deref(), Some("2f3a9b"));
        assert_eq!(report.block_height, Some(812));
        assert_eq!(report.events.len(), 2);

        let event = report.event("A.2083a55fb16f8f60.CasinoGames.GamePlayed").unwrap();
        assert_eq!(event.value("gameType").and_then(ReportValue::text).as_deref(), Some("ROULETTE"));
        assert_eq!(event.value("randomSeed").unwrap().cadence_type, "UInt64");
        let result = event.value("gameResult").and_then(ReportValue::map).unwrap();
        assert_eq!(result.get("winningNumber").map(String::as_str), Some("17"));
        assert_eq!(result.get("color").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_value_line_edge_cases() {
        let v = parse_value_line("- note (String?): nil").unwrap();
        assert_eq!(v.cadence_type, "String?");
        assert_eq!(v.text(), None);

        let v = parse_value_line("- msg (String): \"say \\\"hi\\\"\"").unwrap();
        assert_eq!(v.text().as_deref(), Some("say \"hi\""));

        assert!(parse_value_line("- no type here").is_none());
    }

    #[test]
    fn test_labels_need_word_boundary() {
        assert_eq!(labelled("Type\tA.B", "Type"), Some("A.B"));
        assert_eq!(labelled("TypeX", "Type"), None);
        assert_eq!(labelled("Block ID: ab", "Block ID"), Some("ab"));
    }

    #[test]
    fn test_non_numeric_map_values_are_stringified() {
        let v = ReportValue {
            name: "gameResult".into(),
            cadence_type: "{String:AnyStruct}".into(),
            raw: r#"{"hitMine": false, "tiles": 3}"#.into(),
        };
        let map = v.map().unwrap();
        assert_eq!(map["hitMine"], "false");
        assert_eq!(map["tiles"], "3");
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(parse_report(""), TransactionReport::default());
    }
}
