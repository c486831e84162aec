use ferry_types::{Namespace, OpKind, Operation};
use serde_json::{Map, Value};

/// Anything that can be written as lines of a bulk body
pub trait BulkableRequest {
    /// The NDJSON lines of this request, without trailing newlines
    fn source(&self) -> serde_json::Result<Vec<String>>;
}

/// A single write intent against one document
#[derive(Debug, Clone, PartialEq)]
pub enum BulkRequest {
    /// Index (create or overwrite) the whole document
    Index {
        namespace: Namespace,
        id: String,
        doc: Value,
    },
    /// Partial update merged into the stored document
    Update {
        namespace: Namespace,
        id: String,
        doc: Value,
    },
    /// Delete the document by id
    Delete { namespace: Namespace, id: String },
}

impl BulkRequest {
    pub fn index(namespace: Namespace, id: impl Into<String>, doc: Value) -> Self {
        BulkRequest::Index {
            namespace,
            id: id.into(),
            doc,
        }
    }

    pub fn update(namespace: Namespace, id: impl Into<String>, doc: Value) -> Self {
        BulkRequest::Update {
            namespace,
            id: id.into(),
            doc,
        }
    }

    pub fn delete(namespace: Namespace, id: impl Into<String>) -> Self {
        BulkRequest::Delete {
            namespace,
            id: id.into(),
        }
    }

    /// Name of the bulk action ("index", "update" or "delete")
    pub fn action(&self) -> &'static str {
        match self {
            BulkRequest::Index { .. } => "index",
            BulkRequest::Update { .. } => "update",
            BulkRequest::Delete { .. } => "delete",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            BulkRequest::Index { id, .. }
            | BulkRequest::Update { id, .. }
            | BulkRequest::Delete { id, .. } => id,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            BulkRequest::Index { namespace, .. }
            | BulkRequest::Update { namespace, .. }
            | BulkRequest::Delete { namespace, .. } => namespace,
        }
    }

    /// Action/metadata line, e.g. `{"index":{"_index":"app","_type":"type","_id":"1"}}`
    fn action_line(&self) -> serde_json::Result<String> {
        let namespace = self.namespace();
        let mut meta = Map::new();
        meta.insert("_index".to_string(), Value::String(namespace.app.clone()));
        meta.insert("_type".to_string(), Value::String(namespace.type_name.clone()));
        // An empty id lets the store generate one
        if !self.id().is_empty() {
            meta.insert("_id".to_string(), Value::String(self.id().to_string()));
        }

        let mut action = Map::new();
        action.insert(self.action().to_string(), Value::Object(meta));
        serde_json::to_string(&action)
    }
}

impl From<Operation> for BulkRequest {
    fn from(op: Operation) -> Self {
        let payload = op.payload.unwrap_or(Value::Null);
        match op.kind {
            OpKind::Delete => BulkRequest::delete(op.collection, op.id),
            OpKind::Update => BulkRequest::update(op.collection, op.id, payload),
            OpKind::Insert => BulkRequest::index(op.collection, op.id, payload),
        }
    }
}

impl BulkableRequest for BulkRequest {
    fn source(&self) -> serde_json::Result<Vec<String>> {
        let action = self.action_line()?;
        match self {
            BulkRequest::Index { doc, .. } => Ok(vec![action, serde_json::to_string(doc)?]),
            BulkRequest::Update { doc, .. } => {
                let body = serde_json::json!({ "doc": doc });
                Ok(vec![action, serde_json::to_string(&body)?])
            }
            BulkRequest::Delete { .. } => Ok(vec![action]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parsed(lines: Vec<String>) -> Vec<Value> {
        lines
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn ns() -> Namespace {
        Namespace::new("shop", "products")
    }

    #[test]
    fn test_delete_maps_to_delete_by_id() {
        let request = BulkRequest::from(Operation::delete(ns(), "x42"));
        assert_eq!(request, BulkRequest::delete(ns(), "x42"));

        let lines = parsed(request.source().unwrap());
        assert_eq!(
            lines,
            vec![json!({"delete": {"_index": "shop", "_type": "products", "_id": "x42"}})]
        );
    }

    #[test]
    fn test_update_wraps_payload_in_doc() {
        let request = BulkRequest::from(Operation::update(ns(), "x42", json!({"a": 1})));
        assert_eq!(request, BulkRequest::update(ns(), "x42", json!({"a": 1})));

        let lines = parsed(request.source().unwrap());
        assert_eq!(
            lines,
            vec![
                json!({"update": {"_index": "shop", "_type": "products", "_id": "x42"}}),
                json!({"doc": {"a": 1}}),
            ]
        );
    }

    #[test]
    fn test_insert_maps_to_index() {
        let request = BulkRequest::from(Operation::insert(ns(), "x42", json!({"a": 1})));
        assert_eq!(request.action(), "index");

        let lines = parsed(request.source().unwrap());
        assert_eq!(
            lines,
            vec![
                json!({"index": {"_index": "shop", "_type": "products", "_id": "x42"}}),
                json!({"a": 1}),
            ]
        );
    }

    #[test]
    fn test_empty_id_is_omitted() {
        let request = BulkRequest::index(ns(), "", json!({"a": 1}));
        let lines = parsed(request.source().unwrap());
        assert_eq!(lines[0], json!({"index": {"_index": "shop", "_type": "products"}}));
    }
}
