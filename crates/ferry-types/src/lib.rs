pub mod config;
pub mod error;
pub mod message;
pub mod namespace;
pub mod operation;

pub use config::{AppbaseConfig, BulkSettings, Thresholds, DEFAULT_BULK_SIZE, DEFAULT_URI, MAX_BULK_OPERATIONS};
pub use error::{ConfigError, Result};
pub use message::{Message, OpKind};
pub use namespace::Namespace;
pub use operation::Operation;
