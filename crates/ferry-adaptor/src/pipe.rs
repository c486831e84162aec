use async_trait::async_trait;
use ferry_types::Message;
use regex::Regex;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

use crate::error::{AdaptorError, ErrorLevel, Result};

/// Callback invoked by [`Pipe::listen`] for every matching message
///
/// Returning `Ok` hands the (possibly unchanged) message on to chained
/// consumers. A fatal `Err` aborts delivery: the pipe stops and `listen`
/// returns that error. A non-fatal `Err` only drops the message. Handlers
/// report their errors on the error channel themselves before returning.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, msg: Message) -> Result<Message>;
}

/// Cloneable control side of a pipe: error reporting and stopping
#[derive(Clone, Debug)]
pub struct PipeHandle {
    path: String,
    errors: mpsc::UnboundedSender<AdaptorError>,
    stopped: Arc<watch::Sender<bool>>,
}

impl PipeHandle {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Send an error to whoever supervises the pipeline
    pub fn report(&self, err: AdaptorError) {
        match err.level {
            ErrorLevel::Critical => tracing::error!(path = %self.path, "{}", err.message),
            _ => tracing::warn!(path = %self.path, "{}", err.message),
        }
        if self.errors.send(err).is_err() {
            tracing::warn!(path = %self.path, "Error channel closed, error dropped");
        }
    }

    /// Halt delivery; safe to call any number of times
    pub fn stop(&self) {
        let was_stopped = self.stopped.send_replace(true);
        if !was_stopped {
            tracing::debug!(path = %self.path, "Pipe stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }
}

/// Upstream delivery of messages to a single consumer
pub struct Pipe {
    handle: PipeHandle,
    input: Mutex<Option<mpsc::Receiver<Message>>>,
    outputs: Vec<mpsc::Sender<Message>>,
}

impl Pipe {
    pub fn new(
        path: impl Into<String>,
        input: mpsc::Receiver<Message>,
        errors: mpsc::UnboundedSender<AdaptorError>,
    ) -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            handle: PipeHandle {
                path: path.into(),
                errors,
                stopped: Arc::new(stopped),
            },
            input: Mutex::new(Some(input)),
            outputs: Vec::new(),
        }
    }

    /// Forward every processed message to `output` as well
    pub fn with_output(mut self, output: mpsc::Sender<Message>) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn handle(&self) -> PipeHandle {
        self.handle.clone()
    }

    pub fn path(&self) -> &str {
        self.handle.path()
    }

    pub fn report(&self, err: AdaptorError) {
        self.handle.report(err);
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_stopped()
    }

    /// Deliver messages to `handler` until stopped or the input closes
    ///
    /// Messages whose namespace does not match `type_match` skip the handler
    /// and are forwarded untouched. A pipe can only be listened on once.
    pub async fn listen(&self, handler: &dyn MessageHandler, type_match: &Regex) -> Result<()> {
        let Some(mut input) = self.input.lock().await.take() else {
            return Err(AdaptorError::error(
                self.path(),
                "pipe is already being listened on",
            ));
        };

        let mut stopped = self.handle.stopped.subscribe();
        if *stopped.borrow_and_update() {
            return Ok(());
        }

        loop {
            tokio::select! {
                biased;
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow_and_update() {
                        break;
                    }
                }
                msg = input.recv() => {
                    let Some(msg) = msg else {
                        tracing::debug!(path = %self.path(), "Input closed");
                        break;
                    };

                    let msg = if type_match.is_match(&msg.namespace) {
                        match handler.handle(msg).await {
                            Ok(msg) => msg,
                            Err(err) if err.is_fatal() => {
                                self.stop();
                                return Err(err);
                            }
                            Err(err) => {
                                tracing::debug!(path = %self.path(), "Message not forwarded: {}", err.message);
                                continue;
                            }
                        }
                    } else {
                        msg
                    };

                    self.forward(msg).await;
                }
            }
        }

        Ok(())
    }

    async fn forward(&self, msg: Message) {
        for output in &self.outputs {
            if output.send(msg.clone()).await.is_err() {
                tracing::warn!(path = %self.path(), "Downstream consumer closed");
            }
        }
    }
}
