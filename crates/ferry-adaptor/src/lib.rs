pub mod accumulator;
pub mod adaptor;
pub mod builder;
pub mod error;
pub mod executor;
pub mod pipe;
pub mod traits;

pub use accumulator::{request_wire_size, BatchAccumulator, BatchMetrics};
pub use adaptor::{AppbaseAdaptor, SessionPhase};
pub use builder::AdaptorBuilder;
pub use error::{AdaptorError, ErrorLevel, Result};
pub use executor::{FlushExecutor, RunningTotals};
pub use pipe::{MessageHandler, Pipe, PipeHandle};
pub use traits::StopStartListener;
