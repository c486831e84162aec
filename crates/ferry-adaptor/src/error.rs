use serde_json::Value;
use thiserror::Error;

/// Severity attached to every error surfaced by an adaptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorLevel {
    Note,
    Warning,
    Error,
    /// Stops the pipeline
    Critical,
}

impl std::fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorLevel::Note => "NOTE",
            ErrorLevel::Warning => "WARNING",
            ErrorLevel::Error => "ERROR",
            ErrorLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{level}: {path}: {message}")]
pub struct AdaptorError {
    pub level: ErrorLevel,
    /// Pipeline path of the node that raised the error
    pub path: String,
    pub message: String,
    /// Record being processed when the error happened, if any
    pub record: Option<Value>,
}

impl AdaptorError {
    pub fn new(level: ErrorLevel, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            path: path.into(),
            message: message.into(),
            record: None,
        }
    }

    pub fn critical(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorLevel::Critical, path, message)
    }

    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorLevel::Error, path, message)
    }

    pub fn with_record(mut self, record: Value) -> Self {
        self.record = Some(record);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.level == ErrorLevel::Critical
    }
}

pub type Result<T> = std::result::Result<T, AdaptorError>;
