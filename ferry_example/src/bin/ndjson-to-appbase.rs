//! Stream NDJSON messages from stdin into an Appbase app
//!
//! Each input line is `{"op": "insert|update|delete", "ns": "db.coll", "data": {...}}`.
//!
//! ```bash
//! FERRY_APPBASE__USERNAME=user FERRY_APPBASE__PASSWORD=secret \
//! FERRY_APPBASE__NAMESPACE=shop.products \
//!     cargo run --bin ndjson-to-appbase < products.ndjson
//! ```
//!
//! Set `FERRY_PIPELINE__DRY_RUN=true` to keep everything in memory.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ferry_adaptor::{AppbaseAdaptor, Pipe, StopStartListener};
use ferry_example::{config::Config, input::parse_line};
use ferry_sink::{ClientOptions, HttpConnector, MemoryConnector, MemorySink, SinkConnector};
use ferry_types::Message;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting ndjson-to-appbase");

    let (input_tx, input_rx) = mpsc::channel(config.pipeline.buffer.max(1));
    let (err_tx, mut err_rx) = mpsc::unbounded_channel();
    let pipe = Arc::new(Pipe::new(config.pipeline.path.clone(), input_rx, err_tx));

    let memory = Arc::new(MemorySink::new());
    let connector: Arc<dyn SinkConnector> = if config.pipeline.dry_run {
        tracing::info!("Dry run: batches are kept in memory");
        Arc::new(MemoryConnector::new(Arc::clone(&memory)))
    } else {
        Arc::new(HttpConnector::new(ClientOptions::from(&config.client)))
    };

    let adaptor = Arc::new(
        AppbaseAdaptor::builder()
            .path(config.pipeline.path.clone())
            .pipe(pipe)
            .config(config.appbase.clone())
            .connector(connector)
            .type_match(config.pipeline.type_match.clone())
            .build()
            .context("Failed to build adaptor")?,
    );

    let mut listener = {
        let adaptor = Arc::clone(&adaptor);
        tokio::spawn(async move { adaptor.listen().await })
    };

    tokio::spawn(read_stdin(input_tx));

    let mut fatal = false;
    let outcome = loop {
        tokio::select! {
            result = &mut listener => break result,
            Some(err) = err_rx.recv() => {
                if err.is_fatal() {
                    fatal = true;
                    tracing::error!("Stopping after fatal error: {}", err);
                    adaptor.stop().await?;
                } else {
                    tracing::warn!("{}", err);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, draining pending operations");
                adaptor.stop().await?;
            }
        }
    };

    while let Ok(err) = err_rx.try_recv() {
        fatal |= err.is_fatal();
        tracing::warn!("{}", err);
    }

    outcome.context("Listener task panicked")??;

    if config.pipeline.dry_run {
        for (n, batch) in memory.batches().await.iter().enumerate() {
            tracing::info!(
                "Batch {} for {}: {} operations",
                n + 1,
                batch.namespace,
                batch.requests.len()
            );
        }
    }
    tracing::info!("Done, {} documents sent", adaptor.documents_sent().await);

    if fatal {
        anyhow::bail!("pipeline stopped on a fatal error");
    }
    Ok(())
}

/// Forward stdin lines to the pipe until EOF or until the pipe goes away
async fn read_stdin(input: mpsc::Sender<Message>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        };
        line_no += 1;

        match parse_line(&line) {
            Ok(Some(msg)) => {
                if input.send(msg).await.is_err() {
                    tracing::debug!("Pipe closed, no longer reading stdin");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping line {}: {}", line_no, e),
        }
    }

    tracing::debug!("Read {} lines from stdin", line_no);
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
