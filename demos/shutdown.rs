//! # Shutdown Example
//!
//! Shows graceful shutdown with the built-in `LogWriter`:
//! - the running item observes its cancelled token and finishes on its own
//! - queued items still run (with cancelled tokens)
//! - every shutdown callback fires once the queue is stopped
//!
//! ## Run
//! ```bash
//! cargo run --example shutdown --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskserial::{LogWriter, QueueConfig, QueueState, SerialQueue, Subscribe};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let queue = SerialQueue::builder(QueueConfig::default().with_label("ingest"))
        .with_subscribers(subs)
        .build();

    queue.submit(|ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => println!("long import: cancelled, flushing partial batch"),
            _ = tokio::time::sleep(Duration::from_secs(30)) => println!("long import: done"),
        }
    });
    for batch in 0..2 {
        queue.submit(move |ctx: CancellationToken| async move {
            println!("batch {batch}: cancelled={}", ctx.is_cancelled());
        });
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    queue.request_shutdown_with(|| println!("callback: first"));
    queue.request_shutdown_with(|| println!("callback: second"));

    let state = queue.await_idle(Some(Duration::from_secs(5))).await;
    anyhow::ensure!(state == QueueState::Stopped, "queue still {state}");

    // give the subscriber worker time to print the tail of the event stream
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
