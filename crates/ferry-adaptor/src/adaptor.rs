use async_trait::async_trait;
use ferry_sink::SinkConnector;
use ferry_types::{AppbaseConfig, BulkSettings, Message, Operation};
use regex::Regex;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::accumulator::{BatchAccumulator, BatchMetrics};
use crate::builder::AdaptorBuilder;
use crate::error::{AdaptorError, Result};
use crate::executor::FlushExecutor;
use crate::pipe::{MessageHandler, Pipe};
use crate::traits::StopStartListener;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, not listening yet
    Idle,
    /// Accepting operations
    Running,
    /// Terminal
    Stopped,
}

struct Session {
    phase: SessionPhase,
    // Set when a send failed; a clean stop leaves the executor usable
    failed: bool,
    accumulator: BatchAccumulator,
    executor: Option<FlushExecutor>,
}

/// Sink adaptor writing a pipeline into an Appbase app
///
/// Appbase adaptors cannot be used as a source. Every message delivered by
/// the pipe is appended to the current batch, which is sent as soon as it
/// reaches the byte or operation threshold; stopping sends whatever is left.
pub struct AppbaseAdaptor {
    path: String,
    settings: BulkSettings,
    type_match: Regex,
    pipe: Arc<Pipe>,
    connector: Arc<dyn SinkConnector>,
    // Held across the bulk send: appending, flushing and resetting form one
    // critical section shared by the delivery task and `stop`.
    session: Mutex<Session>,
}

impl AppbaseAdaptor {
    /// Validate `config` and create an idle adaptor
    pub fn new(
        pipe: Arc<Pipe>,
        path: impl Into<String>,
        config: &AppbaseConfig,
        connector: Arc<dyn SinkConnector>,
        type_match: Regex,
    ) -> Result<Self> {
        let path = path.into();
        let settings = config
            .validate()
            .map_err(|e| AdaptorError::critical(&path, format!("bad config ({})", e)))?;

        if settings.debug {
            tracing::info!(path = %path, "Appbase conf: {:?}", config);
        }

        let accumulator = BatchAccumulator::new(settings.namespace.clone(), settings.thresholds);

        Ok(Self {
            path,
            settings,
            type_match,
            pipe,
            connector,
            session: Mutex::new(Session {
                phase: SessionPhase::Idle,
                failed: false,
                accumulator,
                executor: None,
            }),
        })
    }

    pub fn builder() -> AdaptorBuilder {
        AdaptorBuilder::new()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn settings(&self) -> &BulkSettings {
        &self.settings
    }

    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase
    }

    /// Documents successfully handed to the store so far
    pub async fn documents_sent(&self) -> u64 {
        let session = self.session.lock().await;
        session
            .executor
            .as_ref()
            .map(|executor| executor.totals().documents_sent)
            .unwrap_or(0)
    }

    /// Metrics of the batch not sent yet
    pub async fn pending(&self) -> BatchMetrics {
        self.session.lock().await.accumulator.metrics()
    }

    async fn add_bulk_command(&self, msg: Message) -> Result<Message> {
        let mut session = self.session.lock().await;
        let Session {
            phase,
            failed,
            accumulator,
            executor,
        } = &mut *session;

        let executor = match (*phase, executor.as_mut()) {
            (SessionPhase::Running, Some(executor)) => executor,
            // Taken from upstream while a stop was draining: still owed to the store
            (SessionPhase::Stopped, Some(executor)) if !*failed => {
                let op = Operation::from_message(&msg, &self.settings.namespace);
                accumulator.enqueue(op);
                if let Err(err) = executor.flush(accumulator, true).await {
                    *failed = true;
                    self.log_documents_sent(executor);
                    return Err(err);
                }
                return Ok(msg);
            }
            (phase, _) => {
                let err = AdaptorError::error(
                    &self.path,
                    format!("appbase adaptor is {:?}, message dropped", phase),
                )
                .with_record(msg.document());
                self.pipe.report(err.clone());
                return Err(err);
            }
        };

        let op = Operation::from_message(&msg, &self.settings.namespace);
        accumulator.enqueue(op);

        if let Err(err) = executor.flush(accumulator, false).await {
            *phase = SessionPhase::Stopped;
            *failed = true;
            self.log_documents_sent(executor);
            return Err(err);
        }

        Ok(msg)
    }

    fn log_documents_sent(&self, executor: &FlushExecutor) {
        let sent = executor.totals().documents_sent;
        if self.settings.debug {
            tracing::info!(path = %self.path, "Documents sent: {}", sent);
        } else {
            tracing::debug!(path = %self.path, "Documents sent: {}", sent);
        }
    }
}

#[async_trait]
impl MessageHandler for AppbaseAdaptor {
    async fn handle(&self, msg: Message) -> Result<Message> {
        self.add_bulk_command(msg).await
    }
}

#[async_trait]
impl StopStartListener for AppbaseAdaptor {
    async fn start(&self) -> Result<()> {
        Err(AdaptorError::error(&self.path, "appbase can't function as a source"))
    }

    async fn listen(&self) -> Result<()> {
        {
            let mut session = self.session.lock().await;
            if session.phase != SessionPhase::Idle {
                return Err(AdaptorError::error(
                    &self.path,
                    format!("appbase adaptor is {:?}, can't listen", session.phase),
                ));
            }

            match self.connector.connect(&self.settings.endpoint).await {
                Ok(sink) => {
                    session.executor = Some(FlushExecutor::new(
                        sink,
                        self.pipe.handle(),
                        self.settings.debug,
                    ));
                    session.phase = SessionPhase::Running;
                }
                Err(e) => {
                    let err = AdaptorError::critical(&self.path, format!("appbase error ({})", e));
                    self.pipe.report(err.clone());
                    self.pipe.stop();
                    session.phase = SessionPhase::Stopped;
                    session.failed = true;
                    return Err(err);
                }
            }
        }

        tracing::info!(
            path = %self.path,
            namespace = %self.settings.namespace,
            "Appbase adaptor listening"
        );

        let result = self.pipe.listen(self, &self.type_match).await;
        self.stop().await?;
        result
    }

    async fn stop(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.phase != SessionPhase::Running {
            return Ok(());
        }

        session.phase = SessionPhase::Stopped;
        self.pipe.stop();

        let Session {
            accumulator,
            executor,
            failed,
            ..
        } = &mut *session;
        if let Some(executor) = executor.as_mut() {
            // A failed drain has already been reported on the error channel
            if executor.flush(accumulator, true).await.is_err() {
                *failed = true;
            }
            self.log_documents_sent(executor);
        }

        Ok(())
    }
}
