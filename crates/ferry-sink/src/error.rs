use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("no node available at {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bulk request rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode bulk response: {0}")]
    Decode(String),

    #[error("failed to serialize bulk request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no bulk actions to commit")]
    EmptyBatch,

    #[error("{0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, SinkError>;
