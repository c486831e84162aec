use async_trait::async_trait;
use ferry_types::Namespace;
use std::sync::Arc;
use url::Url;

use crate::error::Result;
use crate::request::BulkRequest;
use crate::response::BulkResponse;

/// Destination for accumulated bulk requests
///
/// A call to `send` hands over the whole batch in one request: either every
/// request reaches the store or the call fails.
#[async_trait]
pub trait BulkSink: Send + Sync {
    /// Execute a batch of requests against `namespace`
    async fn send(&self, namespace: &Namespace, requests: &[BulkRequest]) -> Result<BulkResponse>;
}

/// Creates a connected sink for an endpoint
#[async_trait]
pub trait SinkConnector: Send + Sync {
    /// Connect to `endpoint`; credentials, if any, travel in its userinfo
    async fn connect(&self, endpoint: &Url) -> Result<Arc<dyn BulkSink>>;
}
