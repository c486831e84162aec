use ferry_sink::{BulkResponse, BulkSink};
use std::sync::Arc;

use crate::accumulator::BatchAccumulator;
use crate::error::{AdaptorError, Result};
use crate::pipe::PipeHandle;

/// Lifetime counters of an executor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub documents_sent: u64,
}

/// Sends accumulated batches to the sink and escalates failures
pub struct FlushExecutor {
    sink: Arc<dyn BulkSink>,
    pipe: PipeHandle,
    debug: bool,
    totals: RunningTotals,
}

impl FlushExecutor {
    pub fn new(sink: Arc<dyn BulkSink>, pipe: PipeHandle, debug: bool) -> Self {
        Self {
            sink,
            pipe,
            debug,
            totals: RunningTotals::default(),
        }
    }

    pub fn totals(&self) -> RunningTotals {
        self.totals
    }

    /// Send `batch` if a threshold is reached (or `force` is set)
    ///
    /// Returns the number of operations sent, 0 when nothing was due. The
    /// whole batch goes out in a single sink call. Whatever the outcome, the
    /// batch is empty afterwards: a rejected batch is reported at `Critical`
    /// level, the pipe is stopped and the operations are dropped.
    pub async fn flush(&mut self, batch: &mut BatchAccumulator, force: bool) -> Result<usize> {
        if !batch.should_flush(force) {
            return Ok(0);
        }
        if batch.is_empty() {
            batch.reset();
            return Ok(0);
        }

        let metrics = batch.metrics();
        let count = metrics.operation_count;
        if self.debug {
            tracing::info!(
                namespace = %batch.namespace(),
                documents = count,
                bytes = metrics.byte_size,
                force,
                "Appbase: sending bulk request"
            );
        } else {
            tracing::debug!(
                namespace = %batch.namespace(),
                documents = count,
                bytes = metrics.byte_size,
                force,
                "Appbase: sending bulk request"
            );
        }

        let requests = batch.take();
        let result = self.sink.send(batch.namespace(), &requests).await;
        batch.reset();

        match result {
            Ok(response) => {
                self.totals.documents_sent += count as u64;
                self.report_item_failures(&response);
                Ok(count)
            }
            Err(e) => {
                let err = AdaptorError::critical(self.pipe.path(), format!("appbase error ({})", e));
                self.pipe.report(err.clone());
                self.pipe.stop();
                Err(err)
            }
        }
    }

    /// Documents rejected individually do not fail the batch
    fn report_item_failures(&self, response: &BulkResponse) {
        for item in response.failed() {
            let reason = item
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("status {}", item.status));
            let mut err = AdaptorError::error(
                self.pipe.path(),
                format!("appbase bulk error id:{} ({})", item.id, reason),
            );
            if let Some(error) = &item.error {
                err = err.with_record(error.clone());
            }
            self.pipe.report(err);
        }
    }
}
