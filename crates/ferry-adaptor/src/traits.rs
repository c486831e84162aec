use async_trait::async_trait;

use crate::error::Result;

/// Lifecycle of a pipeline node
///
/// A node is either started as a source (producing messages) or listened on
/// as a sink (consuming them); `stop` ends either role.
#[async_trait]
pub trait StopStartListener: Send + Sync {
    /// Run as a data source
    async fn start(&self) -> Result<()>;

    /// Consume messages until the upstream pipe stops
    async fn listen(&self) -> Result<()>;

    /// Stop the node; calling it more than once is a no-op
    async fn stop(&self) -> Result<()>;
}
