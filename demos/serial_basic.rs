//! # Serial Queue Example
//!
//! Shows ordered, non-overlapping execution from several producers and how
//! work errors reach only the caller that awaited them.
//!
//! ## Run
//! ```bash
//! cargo run --example serial_basic
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use taskserial::{QueueConfig, QueueError, SerialQueue};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
enum StoreError {
    Queue(QueueError),
    Conflict(String),
}

impl From<QueueError> for StoreError {
    fn from(e: QueueError) -> Self {
        StoreError::Queue(e)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Queue(e) => write!(f, "queue: {e}"),
            StoreError::Conflict(key) => write!(f, "conflict on {key}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let queue = Arc::new(SerialQueue::with_config(
        QueueConfig::default().with_label("store"),
    ));
    let journal = Arc::new(Mutex::new(Vec::new()));

    let mut producers = Vec::new();
    for producer in 0..3 {
        let queue = queue.clone();
        let journal = journal.clone();
        producers.push(tokio::spawn(async move {
            for n in 0..3 {
                let journal = journal.clone();
                queue.submit(move |_ctx: CancellationToken| async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    journal.lock().unwrap().push(format!("p{producer}-{n}"));
                });
            }
        }));
    }
    for p in producers {
        p.await?;
    }

    let entries = queue
        .submit_and_await({
            let journal = journal.clone();
            move |_ctx| async move { journal.lock().unwrap().len() }
        })
        .await
        .context("count journal entries")?;
    println!("journal has {entries} entries: {:?}", journal.lock().unwrap());

    let res: Result<(), StoreError> = queue
        .try_submit_and_await(|_ctx| async { Err(StoreError::Conflict("user:42".into())) })
        .await;
    println!("conflicting write -> {:?}", res);

    queue.shutdown_and_await().await;
    println!("state after shutdown: {}", queue.state());
    Ok(())
}
