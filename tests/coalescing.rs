use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskserial::{CoalescingQueue, QueueConfig, WaitOutcome};

#[tokio::test]
async fn middle_submission_is_dropped() {
    let queue = CoalescingQueue::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for name in ["w1", "w2", "w3"] {
        let seen = seen.clone();
        queue.run(move |_ctx| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            seen.lock().unwrap().push(name);
        });
    }
    queue.wait().await;

    assert_eq!(*seen.lock().unwrap(), vec!["w1", "w3"]);
}

#[tokio::test]
async fn burst_runs_first_and_last_only() {
    const K: usize = 20;
    let queue = CoalescingQueue::with_config(QueueConfig::default().with_label("burst"));
    let effects = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(AtomicUsize::new(usize::MAX));

    for i in 0..K {
        let effects = effects.clone();
        let last = last.clone();
        queue.run(move |_ctx| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            effects.fetch_add(1, Ordering::SeqCst);
            last.store(i, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    assert_eq!(
        queue.wait_timeout(Duration::from_secs(5)).await,
        WaitOutcome::Completed
    );
    assert_eq!(effects.load(Ordering::SeqCst), 2);
    assert_eq!(last.load(Ordering::SeqCst), K - 1);
    assert!(queue.is_idle());
}

#[tokio::test]
async fn idle_queue_runs_every_spaced_submission() {
    let queue = CoalescingQueue::new();
    let effects = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let effects = effects.clone();
        queue.run(move |_ctx| async move {
            effects.fetch_add(1, Ordering::SeqCst);
        });
        queue.wait().await;
    }

    assert_eq!(effects.load(Ordering::SeqCst), 3);
}
