use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::aggregate::{Collection, UsageAggregator};
use crate::metrics::MetricsFetcher;
use crate::types::{FetchOutcome, PodRef};

/// Fetch usage for every pod with at most `concurrency` calls in flight.
///
/// Workers claim pods through a shared cursor and hand each outcome to one
/// channel; this task is its only reader. Returns after the channel has
/// closed and every worker has been joined, so each pod is attempted exactly
/// once and appears exactly once in the result. Failed fetches are logged
/// and kept, they never abort the run.
pub async fn collect(items: Vec<PodRef>, fetcher: Arc<MetricsFetcher>, concurrency: usize) -> Collection {
    let total = items.len();
    let workers = concurrency.max(1).min(total);
    info!(pods = total, workers, "Collecting pod usage");

    let collection = match workers {
        0 => Collection::default(),
        1 => collect_inline(items, &fetcher).await,
        _ => collect_pooled(items, fetcher, workers).await,
    };

    if !collection.failures.is_empty() {
        warn!(
            failed = collection.failures.len(),
            succeeded = collection.records.len(),
            "Some pods could not be measured"
        );
    }
    collection
}

async fn collect_inline(items: Vec<PodRef>, fetcher: &MetricsFetcher) -> Collection {
    let mut aggregator = UsageAggregator::with_capacity(items.len());
    for pod in items {
        let outcome = fetcher.fetch(pod).await;
        log_outcome(&outcome);
        aggregator.record(outcome);
    }
    aggregator.finish()
}

async fn collect_pooled(items: Vec<PodRef>, fetcher: Arc<MetricsFetcher>, workers: usize) -> Collection {
    let items: Arc<[PodRef]> = items.into();
    let cursor = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::channel::<FetchOutcome>(workers);

    let mut pool = JoinSet::new();
    for worker in 0..workers {
        let items = Arc::clone(&items);
        let cursor = Arc::clone(&cursor);
        let fetcher = Arc::clone(&fetcher);
        let tx = tx.clone();
        pool.spawn(async move {
            loop {
                let idx = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(pod) = items.get(idx) else { break };
                let outcome = fetcher.fetch(pod.clone()).await;
                if tx.send(outcome).await.is_err() {
                    break;
                }
            }
            debug!(worker, "worker finished");
        });
    }
    // Only worker clones remain, so the channel closes when the last one exits.
    drop(tx);

    let mut aggregator = UsageAggregator::with_capacity(items.len());
    while let Some(outcome) = rx.recv().await {
        log_outcome(&outcome);
        aggregator.record(outcome);
    }

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }
    aggregator.finish()
}

fn log_outcome(outcome: &FetchOutcome) {
    if let FetchOutcome::Failure(f) = outcome {
        warn!(pod = %f.pod, error = %f.cause, "Failed to fetch pod usage");
    }
}
