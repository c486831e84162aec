use ferry_sink::{HttpConnector, SinkConnector};
use ferry_types::AppbaseConfig;
use regex::Regex;
use std::sync::Arc;

use crate::adaptor::AppbaseAdaptor;
use crate::error::{AdaptorError, Result};
use crate::pipe::Pipe;

const DEFAULT_PATH: &str = "appbase";
const MATCH_ALL: &str = ".*";

pub struct AdaptorBuilder {
    path: String,
    pipe: Option<Arc<Pipe>>,
    config: Option<AppbaseConfig>,
    connector: Option<Arc<dyn SinkConnector>>,
    type_match: String,
}

impl AdaptorBuilder {
    pub fn new() -> Self {
        Self {
            path: DEFAULT_PATH.to_string(),
            pipe: None,
            config: None,
            connector: None,
            type_match: MATCH_ALL.to_string(),
        }
    }

    /// Pipeline path used to label errors and logs
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn pipe(mut self, pipe: Arc<Pipe>) -> Self {
        self.pipe = Some(pipe);
        self
    }

    pub fn config(mut self, config: AppbaseConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sink connector; defaults to the HTTP bulk client
    pub fn connector(mut self, connector: Arc<dyn SinkConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Only messages whose namespace matches `pattern` are written
    pub fn type_match(mut self, pattern: impl Into<String>) -> Self {
        self.type_match = pattern.into();
        self
    }

    pub fn build(self) -> Result<AppbaseAdaptor> {
        let pipe = self
            .pipe
            .ok_or_else(|| AdaptorError::critical(&self.path, "pipe is required"))?;
        let config = self
            .config
            .ok_or_else(|| AdaptorError::critical(&self.path, "config is required"))?;
        let type_match = Regex::new(&self.type_match).map_err(|e| {
            AdaptorError::critical(&self.path, format!("bad type filter ({})", e))
        })?;
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(HttpConnector::default()));

        AppbaseAdaptor::new(pipe, self.path, &config, connector, type_match)
    }
}

impl Default for AdaptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
