use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Target of every write: an app (index) and a type within it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub app: String,
    pub type_name: String,
}

impl Namespace {
    pub fn new(app: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            type_name: type_name.into(),
        }
    }

    /// Split `"app.type"` on the first dot
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once('.') {
            Some((app, type_name)) if !app.is_empty() && !type_name.is_empty() => {
                Ok(Self::new(app, type_name))
            }
            _ => Err(ConfigError::MalformedNamespace(raw.to_string())),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.app, self.type_name)
    }
}
