//! Worker pool concurrency bound and scheduler at-most-once probing

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use kodegen_tools_linkrot::{
    Checkpoint, CheckpointWriter, LinkIndex, LinkStatus, LivenessProbe, LivenessScheduler,
    Occurrence, ProbeOutcome, WorkerPool,
};

#[tokio::test(start_paused = true)]
async fn test_pool_never_exceeds_its_concurrency() {
    let items: Vec<u64> = (0..50).collect();
    let in_flight = &AtomicUsize::new(0);
    let peak = &AtomicUsize::new(0);

    let results = WorkerPool::new(7)
        .run(&items, |_, item| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10 + item % 5)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            *item
        })
        .await;

    assert_eq!(results, items);
    assert_eq!(peak.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn test_pool_handles_fewer_items_than_workers() {
    let items = vec!["a", "b"];
    let results = WorkerPool::new(30)
        .run(&items, |i, item| async move { format!("{i}:{item}") })
        .await;
    assert_eq!(results, vec!["0:a".to_string(), "1:b".to_string()]);

    let empty: Vec<u8> = Vec::new();
    assert!(WorkerPool::new(4).run(&empty, |_, b| async move { *b }).await.is_empty());
}

/// Counts how often each URL is probed
#[derive(Default)]
struct CountingProbe {
    calls: Mutex<HashMap<String, usize>>,
}

impl LivenessProbe for CountingProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;
        tokio::task::yield_now().await;
        if url.ends_with('0') {
            ProbeOutcome::status(404, url)
        } else {
            ProbeOutcome::status(200, url)
        }
    }
}

#[tokio::test]
async fn test_every_url_is_probed_exactly_once() {
    let mut index = LinkIndex::new("/tree");
    for i in 0..120 {
        let url = format!("https://site{i}.example/{i}");
        // Each URL appears twice but is one record
        for line in [1, 2] {
            index.record_occurrence(
                &url,
                Occurrence {
                    file: PathBuf::from(format!("f{i}.md")),
                    line,
                    preview: None,
                },
            );
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let progress = dir.path().join("progress.json");
    let probe = Arc::new(CountingProbe::default());
    let scheduler = LivenessScheduler::new(Arc::clone(&probe), 16)
        .with_checkpoint(CheckpointWriter::new(&progress, 50));

    let summary = scheduler.run(&mut index).await;

    assert_eq!(summary.checked, 120);
    assert_eq!(summary.dead, 12);
    let calls = probe.calls.lock().unwrap();
    assert_eq!(calls.len(), 120);
    assert!(calls.values().all(|&n| n == 1));
    assert!(index.iter().all(|r| r.status != LinkStatus::Unknown));

    let checkpoint = Checkpoint::read(&progress).await.unwrap().unwrap();
    assert_eq!(checkpoint, Checkpoint { checked: 120, total: 120 });
    assert!(checkpoint.is_complete());
}
