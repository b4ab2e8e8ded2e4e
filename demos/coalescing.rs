//! # Coalescing Example
//!
//! Simulates a search box: every keystroke schedules a refresh, but only the
//! refresh in flight and the latest keystroke actually run.
//!
//! ## Run
//! ```bash
//! cargo run --example coalescing
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use taskserial::{CoalescingQueue, QueueConfig, WaitOutcome};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let queue = CoalescingQueue::with_config(QueueConfig::default().with_label("search"));
    let refreshes = Arc::new(AtomicU32::new(0));

    for query in ["r", "ru", "rus", "rust"] {
        let refreshes = refreshes.clone();
        queue.run(move |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            refreshes.fetch_add(1, Ordering::SeqCst);
            println!("refreshed results for {query:?}");
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    match queue.wait_timeout(Duration::from_secs(2)).await {
        WaitOutcome::Completed => println!(
            "{} refreshes for 4 keystrokes",
            refreshes.load(Ordering::SeqCst)
        ),
        WaitOutcome::TimedOut => anyhow::bail!("refreshes did not settle"),
    }

    queue.queue().shutdown_and_await().await;
    Ok(())
}
