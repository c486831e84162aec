//! # Ferry - bulk writes from a pipeline into Appbase / Elasticsearch
//!
//! Ferry is the sink end of a data pipeline. It receives individual insert,
//! update and delete operations and ships them to a document store in
//! size- and count-bounded `_bulk` requests:
//! - **Byte threshold**: a batch is sent once its wire size reaches `bulksize`
//!   (512,000 bytes by default)
//! - **Count threshold**: at most 2000 operations per request
//! - **Forced flush**: stopping the adaptor drains whatever is pending
//!
//! A rejected batch is fatal: the error is reported on the pipeline's error
//! channel, delivery stops, and the batch is dropped rather than retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferry::prelude::*;
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (input, rx) = mpsc::channel(1024);
//!     let (err_tx, mut errors) = mpsc::unbounded_channel();
//!     let pipe = Arc::new(Pipe::new("root/appbase", rx, err_tx));
//!
//!     let adaptor = Arc::new(
//!         AppbaseAdaptor::builder()
//!             .pipe(pipe)
//!             .config(AppbaseConfig::new("user", "secret", "shop.products"))
//!             .build()?,
//!     );
//!
//!     let listener = {
//!         let adaptor = Arc::clone(&adaptor);
//!         tokio::spawn(async move { adaptor.listen().await })
//!     };
//!
//!     input.send(Message::insert("db.products", Default::default())).await?;
//!     drop(input);
//!
//!     listener.await??;
//!     while let Ok(err) = errors.try_recv() {
//!         eprintln!("{}", err);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **ferry-types**: operations, messages, namespaces and configuration
//! - **ferry-sink**: bulk requests and the sink capability (HTTP and in-memory)
//! - **ferry-adaptor**: the batch accumulator, flush executor, pipe and session

// Re-export all public APIs
pub use ferry_adaptor as adaptor;
pub use ferry_sink as sink;
pub use ferry_types as types;

// Re-export commonly used types
pub use ferry_adaptor::{
    AdaptorBuilder, AdaptorError, AppbaseAdaptor, BatchAccumulator, ErrorLevel, FlushExecutor,
    Pipe, SessionPhase, StopStartListener,
};
pub use ferry_sink::{BulkRequest, BulkSink, HttpConnector, MemoryConnector, MemorySink, SinkConnector};
pub use ferry_types::{AppbaseConfig, Message, Namespace, OpKind, Operation, Thresholds};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::adaptor::{AdaptorError, AppbaseAdaptor, ErrorLevel, Pipe, StopStartListener};
    pub use crate::sink::{ClientOptions, HttpConnector, MemoryConnector, MemorySink};
    pub use crate::types::{AppbaseConfig, Message, OpKind};
}
