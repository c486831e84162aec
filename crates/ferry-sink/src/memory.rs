use async_trait::async_trait;
use ferry_types::Namespace;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

use crate::error::{Result, SinkError};
use crate::request::BulkRequest;
use crate::response::BulkResponse;
use crate::traits::{BulkSink, SinkConnector};

/// A batch as it was handed to [`MemorySink::send`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentBatch {
    pub namespace: Namespace,
    pub requests: Vec<BulkRequest>,
}

/// Sink that keeps every batch in memory
///
/// Useful for dry runs and tests. Failures can be injected to exercise the
/// error path of callers.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<SentBatch>>,
    calls: AtomicUsize,
    fail_next: AtomicBool,
    fail_always: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `send` only
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Reject every `send` from now on
    pub fn fail_always(&self, enabled: bool) {
        self.fail_always.store(enabled, Ordering::SeqCst);
    }

    /// Number of `send` calls, successful or not
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Batches accepted so far, oldest first
    pub async fn batches(&self) -> Vec<SentBatch> {
        self.batches.lock().await.clone()
    }

    /// All accepted requests flattened in arrival order
    pub async fn requests(&self) -> Vec<BulkRequest> {
        self.batches
            .lock()
            .await
            .iter()
            .flat_map(|batch| batch.requests.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl BulkSink for MemorySink {
    async fn send(&self, namespace: &Namespace, requests: &[BulkRequest]) -> Result<BulkResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) || self.fail_always.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected(format!(
                "memory sink rejected {} requests",
                requests.len()
            )));
        }

        if requests.is_empty() {
            return Err(SinkError::EmptyBatch);
        }

        self.batches.lock().await.push(SentBatch {
            namespace: namespace.clone(),
            requests: requests.to_vec(),
        });

        Ok(BulkResponse::succeeded(requests.len()))
    }
}

/// Connector handing out a shared [`MemorySink`]
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    sink: Arc<MemorySink>,
    refuse: Arc<AtomicBool>,
    connects: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new(sink: Arc<MemorySink>) -> Self {
        Self {
            sink,
            ..Self::default()
        }
    }

    /// Connector whose every `connect` fails
    pub fn refusing() -> Self {
        let connector = Self::default();
        connector.refuse.store(true, Ordering::SeqCst);
        connector
    }

    pub fn sink(&self) -> Arc<MemorySink> {
        Arc::clone(&self.sink)
    }

    /// Number of `connect` calls
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SinkConnector for MemoryConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Arc<dyn BulkSink>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable {
                endpoint: endpoint.host_str().unwrap_or_default().to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(Arc::clone(&self.sink) as Arc<dyn BulkSink>)
    }
}
