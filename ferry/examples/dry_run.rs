//! Dry run of the Appbase adaptor against an in-memory sink
//!
//! Shows how batches are cut by the byte threshold and how stopping drains
//! the remainder, without talking to a real cluster.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example dry_run
//! ```

use ferry::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("Ferry dry run\n");

    let (input, rx) = mpsc::channel(64);
    let (err_tx, mut errors) = mpsc::unbounded_channel();
    let (out_tx, mut processed) = mpsc::channel(64);
    let pipe = Arc::new(Pipe::new("dry-run/appbase", rx, err_tx).with_output(out_tx));

    let connector = MemoryConnector::new(Arc::new(MemorySink::new()));
    let sink = connector.sink();

    let config = AppbaseConfig::new("user", "secret", "shop.products")
        .with_bulk_size(1_024)
        .with_debug(true);

    let adaptor = Arc::new(
        AppbaseAdaptor::builder()
            .path("dry-run/appbase")
            .pipe(pipe)
            .config(config)
            .connector(Arc::new(connector))
            .build()?,
    );

    let listener = {
        let adaptor = Arc::clone(&adaptor);
        tokio::spawn(async move { adaptor.listen().await })
    };

    for i in 0..25 {
        let data = json!({
            "_id": format!("sku-{:04}", i),
            "name": format!("Product {}", i),
            "price": 10 + i,
        });
        let msg = match i % 5 {
            4 => Message::delete("db.products", data.as_object().cloned().unwrap_or_default()),
            3 => Message::update("db.products", data.as_object().cloned().unwrap_or_default()),
            _ => Message::insert("db.products", data.as_object().cloned().unwrap_or_default()),
        };
        input.send(msg).await?;
        processed.recv().await;
    }

    println!("Stopping adaptor...");
    adaptor.stop().await?;
    listener.await??;

    for (n, batch) in sink.batches().await.iter().enumerate() {
        println!("batch {}: {} requests", n + 1, batch.requests.len());
    }
    println!("documents sent: {}", adaptor.documents_sent().await);

    while let Ok(err) = errors.try_recv() {
        println!("error: {}", err);
    }

    Ok(())
}
