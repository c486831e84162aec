use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of change carried by an upstream message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    #[default]
    Insert,
    Update,
    Delete,
}

impl OpKind {
    /// Parse an op name, falling back to `Insert` for anything unrecognised
    ///
    /// Upstream sources occasionally emit ops this sink has no special handling
    /// for (e.g. "command", "noop"); those are written as plain index requests.
    pub fn parse_lenient(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "update" => OpKind::Update,
            "delete" => OpKind::Delete,
            _ => OpKind::Insert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Insert => "insert",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record travelling through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub op: OpKind,
    /// Source namespace, matched against the sink's type filter
    #[serde(default, rename = "ns")]
    pub namespace: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Unix timestamp (seconds) of when the message was created
    #[serde(default = "now_timestamp")]
    pub timestamp: i64,
}

fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

impl Message {
    pub fn new(op: OpKind, namespace: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            op,
            namespace: namespace.into(),
            data,
            timestamp: now_timestamp(),
        }
    }

    pub fn insert(namespace: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::new(OpKind::Insert, namespace, data)
    }

    pub fn update(namespace: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::new(OpKind::Update, namespace, data)
    }

    pub fn delete(namespace: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::new(OpKind::Delete, namespace, data)
    }

    /// Document id stored under `key`, rendered as a string
    ///
    /// Strings are returned as-is, numbers in decimal form and extended-JSON
    /// object ids (`{"$oid": "..."}`) as their hex string.
    pub fn id_string(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(obj) => obj.get("$oid").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    /// Document body as a JSON value
    pub fn document(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_id_string_variants() {
        let msg = Message::insert("db.users", data(json!({"_id": "x42"})));
        assert_eq!(msg.id_string("_id"), Some("x42".to_string()));

        let msg = Message::insert("db.users", data(json!({"_id": 17})));
        assert_eq!(msg.id_string("_id"), Some("17".to_string()));

        let msg = Message::insert("db.users", data(json!({"_id": {"$oid": "5f1d7a"}})));
        assert_eq!(msg.id_string("_id"), Some("5f1d7a".to_string()));

        let msg = Message::insert("db.users", data(json!({"_id": [1, 2]})));
        assert_eq!(msg.id_string("_id"), None);

        let msg = Message::insert("db.users", data(json!({"name": "alice"})));
        assert_eq!(msg.id_string("_id"), None);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(OpKind::parse_lenient("UPDATE"), OpKind::Update);
        assert_eq!(OpKind::parse_lenient("delete"), OpKind::Delete);
        assert_eq!(OpKind::parse_lenient("command"), OpKind::Insert);
    }

    #[test]
    fn test_message_deserialize_defaults() {
        let msg: Message = serde_json::from_str(r#"{"ns":"db.users","data":{"_id":"a"}}"#).unwrap();
        assert_eq!(msg.op, OpKind::Insert);
        assert_eq!(msg.namespace, "db.users");
        assert!(msg.timestamp > 0);

        let msg: Message = serde_json::from_str(r#"{"op":"delete","data":{"_id":"a"}}"#).unwrap();
        assert_eq!(msg.op, OpKind::Delete);
    }
}
