pub mod appbase;
pub mod error;
pub mod memory;
pub mod request;
pub mod response;
pub mod traits;

pub use appbase::{AppbaseClient, ClientOptions, HttpConnector};
pub use error::{Result, SinkError};
pub use memory::{MemoryConnector, MemorySink, SentBatch};
pub use request::{BulkRequest, BulkableRequest};
pub use response::{BulkResponse, BulkResponseItem};
pub use traits::{BulkSink, SinkConnector};
