use ferry_sink::{BulkRequest, BulkableRequest};
use ferry_types::{Namespace, Operation, Thresholds};

/// Counters describing the batch currently being accumulated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchMetrics {
    pub operation_count: usize,
    /// Sum of the wire length of every pending request, newlines included
    pub byte_size: usize,
}

/// Owns the in-flight batch and decides when it must be sent
///
/// Requests are kept in arrival order. The accumulator itself is not
/// synchronised: the owning session keeps it behind the same lock that
/// guards flushing, so an append never interleaves with a flush.
#[derive(Debug)]
pub struct BatchAccumulator {
    namespace: Namespace,
    thresholds: Thresholds,
    pending: Vec<BulkRequest>,
    metrics: BatchMetrics,
}

impl BatchAccumulator {
    pub fn new(namespace: Namespace, thresholds: Thresholds) -> Self {
        Self {
            namespace,
            thresholds,
            pending: Vec::new(),
            metrics: BatchMetrics::default(),
        }
    }

    /// Translate `op` into its bulk request and append it
    pub fn enqueue(&mut self, op: Operation) {
        self.push(BulkRequest::from(op));
    }

    /// Append an already built request
    pub fn push(&mut self, request: BulkRequest) {
        self.metrics.byte_size += request_wire_size(&request);
        self.metrics.operation_count += 1;
        self.pending.push(request);
    }

    /// True once either threshold is reached, or unconditionally when forced
    pub fn should_flush(&self, force: bool) -> bool {
        force
            || self.metrics.byte_size >= self.thresholds.max_byte_size
            || self.metrics.operation_count >= self.thresholds.max_operation_count
    }

    /// Hand the pending requests over for sending
    ///
    /// Metrics are left untouched until [`reset`](Self::reset) is called
    /// after the send attempt.
    pub fn take(&mut self) -> Vec<BulkRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Drop everything pending and zero the metrics
    pub fn reset(&mut self) {
        self.pending.clear();
        self.metrics = BatchMetrics::default();
    }

    pub fn pending(&self) -> &[BulkRequest] {
        &self.pending
    }

    pub fn metrics(&self) -> BatchMetrics {
        self.metrics
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Best-effort wire size of a request: `len(line) + 1` for each of its lines
///
/// A request that cannot be serialised counts as zero bytes. It stays in the
/// batch and is still sent, so the byte total may undercount; the operation
/// count threshold keeps the batch bounded regardless.
pub fn request_wire_size<R: BulkableRequest + ?Sized>(request: &R) -> usize {
    match request.source() {
        Ok(lines) => lines.iter().map(|line| line.len() + 1).sum(),
        Err(e) => {
            tracing::trace!("Size accounting skipped for unserialisable request: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;

    fn ns() -> Namespace {
        Namespace::new("shop", "products")
    }

    /// Delete request whose single line (plus newline) is exactly `bytes` long
    fn delete_of_size(bytes: usize) -> Operation {
        // {"delete":{"_index":"shop","_type":"products","_id":""}} + '\n' == 57
        Operation::delete(ns(), "x".repeat(bytes - 57))
    }

    struct Unserialisable;

    impl BulkableRequest for Unserialisable {
        fn source(&self) -> serde_json::Result<Vec<String>> {
            Err(serde_json::Error::custom("boom"))
        }
    }

    struct Lines(Vec<&'static str>);

    impl BulkableRequest for Lines {
        fn source(&self) -> serde_json::Result<Vec<String>> {
            Ok(self.0.iter().map(|line| line.to_string()).collect())
        }
    }

    #[test]
    fn test_wire_size_counts_newline_per_line() {
        assert_eq!(request_wire_size(&Lines(vec!["abc", "de"])), 7);
        assert_eq!(request_wire_size(&Lines(vec![])), 0);
    }

    #[test]
    fn test_wire_size_of_unserialisable_request_is_zero() {
        assert_eq!(request_wire_size(&Unserialisable), 0);
    }

    #[test]
    fn test_byte_threshold_triggers_on_third_enqueue() {
        let thresholds = Thresholds::new().with_max_byte_size(500);
        let mut acc = BatchAccumulator::new(ns(), thresholds);

        acc.enqueue(delete_of_size(100));
        assert!(!acc.should_flush(false));

        acc.enqueue(delete_of_size(150));
        assert_eq!(acc.metrics().byte_size, 250);
        assert!(!acc.should_flush(false));

        acc.enqueue(delete_of_size(260));
        assert_eq!(acc.metrics().byte_size, 510);
        assert_eq!(acc.metrics().operation_count, 3);
        assert!(acc.should_flush(false));
    }

    #[test]
    fn test_count_threshold() {
        let thresholds = Thresholds::new().with_max_operation_count(3);
        let mut acc = BatchAccumulator::new(ns(), thresholds);

        for i in 0..2 {
            acc.enqueue(Operation::insert(ns(), i.to_string(), json!({"n": i})));
            assert!(!acc.should_flush(false));
        }
        acc.enqueue(Operation::insert(ns(), "2", json!({"n": 2})));
        assert!(acc.should_flush(false));
    }

    #[test]
    fn test_force_always_flushes() {
        let acc = BatchAccumulator::new(ns(), Thresholds::default());
        assert!(!acc.should_flush(false));
        assert!(acc.should_flush(true));
    }

    #[test]
    fn test_take_preserves_order_and_reset_clears() {
        let mut acc = BatchAccumulator::new(ns(), Thresholds::default());
        acc.enqueue(Operation::insert(ns(), "a", json!({"v": 1})));
        acc.enqueue(Operation::update(ns(), "b", json!({"v": 2})));
        acc.enqueue(Operation::delete(ns(), "c"));

        let taken = acc.take();
        let ids: Vec<&str> = taken.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(acc.is_empty());
        assert_eq!(acc.metrics().operation_count, 3);

        acc.reset();
        assert_eq!(acc.metrics(), BatchMetrics::default());
    }
}
