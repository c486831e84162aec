use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Message, Namespace, OpKind};

/// One pending change destined for the bulk endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OpKind,
    /// Document id, empty when the source supplied none
    pub id: String,
    /// Document body; always `None` for deletes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub collection: Namespace,
}

impl Operation {
    pub fn insert(collection: Namespace, id: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: OpKind::Insert,
            id: id.into(),
            payload: Some(payload),
            collection,
        }
    }

    pub fn update(collection: Namespace, id: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: OpKind::Update,
            id: id.into(),
            payload: Some(payload),
            collection,
        }
    }

    pub fn delete(collection: Namespace, id: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Delete,
            id: id.into(),
            payload: None,
            collection,
        }
    }

    /// Translate an upstream message into an operation against `collection`
    pub fn from_message(msg: &Message, collection: &Namespace) -> Self {
        let id = msg.id_string("_id").unwrap_or_default();
        match msg.op {
            OpKind::Delete => Self::delete(collection.clone(), id),
            OpKind::Update => Self::update(collection.clone(), id, msg.document()),
            OpKind::Insert => Self::insert(collection.clone(), id, msg.document()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_message_delete_drops_payload() {
        let ns = Namespace::new("shop", "products");
        let data = json!({"_id": "x42", "name": "lamp"}).as_object().cloned().unwrap();
        let op = Operation::from_message(&Message::delete("db.products", data), &ns);

        assert_eq!(op.kind, OpKind::Delete);
        assert_eq!(op.id, "x42");
        assert_eq!(op.payload, None);
        assert_eq!(op.collection, ns);
    }

    #[test]
    fn test_from_message_without_id() {
        let ns = Namespace::new("shop", "products");
        let data = json!({"name": "lamp"}).as_object().cloned().unwrap();
        let op = Operation::from_message(&Message::update("db.products", data), &ns);

        assert_eq!(op.kind, OpKind::Update);
        assert_eq!(op.id, "");
        assert_eq!(op.payload, Some(json!({"name": "lamp"})));
    }
}
