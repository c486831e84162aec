use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("namespace required, but missing")]
    MissingNamespace,

    #[error("both username and password required, but missing")]
    MissingCredentials,

    #[error("invalid uri {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("can't split namespace into app name and type: {0:?}")]
    MalformedNamespace(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
