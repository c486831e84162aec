use ferry_types::{Message, OpKind};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One line of NDJSON input as it appears on the wire
///
/// `op` is read leniently so that producers emitting unknown operation
/// names (e.g. `command`) are still accepted as inserts.
#[derive(Debug, Deserialize)]
struct InputLine {
    #[serde(default)]
    op: Option<String>,
    ns: String,
    #[serde(default)]
    data: Map<String, Value>,
}

/// Parse a single NDJSON line into a [`Message`]
///
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> serde_json::Result<Option<Message>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let raw: InputLine = serde_json::from_str(line)?;
    let op = raw
        .op
        .as_deref()
        .map(OpKind::parse_lenient)
        .unwrap_or_default();

    Ok(Some(Message::new(op, raw.ns, raw.data)))
}
