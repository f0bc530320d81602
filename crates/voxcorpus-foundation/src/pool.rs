//! Bounded worker pool for the parallel pipeline stages.
//!
//! Fetch and transcode fan out across independent rows. This pool keeps the
//! task queue and the fixed worker count explicit, so backpressure and
//! per-item failure isolation stay visible: one item's error is returned in
//! its own slot and never aborts the batch.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// A fixed-size pool of async workers draining a shared queue.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `f` over every item with at most `workers` in flight.
    ///
    /// Results come back in input order regardless of completion order.
    /// Items do not share any mutable state; a failing item only fails its
    /// own slot.
    pub async fn run<I, T, E, F, Fut>(&self, items: Vec<I>, f: F) -> Vec<Result<T, E>>
    where
        I: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }
        tracing::debug!(workers = self.workers, items = total, "Dispatching worker pool");

        let queue: Arc<Mutex<VecDeque<(usize, I)>>> =
            Arc::new(Mutex::new(items.into_iter().enumerate().collect()));
        let f = Arc::new(f);
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(usize, Result<T, E>)>();

        let mut handles = Vec::with_capacity(self.workers.min(total));
        for _ in 0..self.workers.min(total) {
            let queue = Arc::clone(&queue);
            let f = Arc::clone(&f);
            let result_tx = result_tx.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let next = queue.lock().pop_front();
                    let Some((index, item)) = next else { break };
                    let outcome = f(item).await;
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let mut slots: Vec<Option<Result<T, E>>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = result_rx.recv().await {
            slots[index] = Some(outcome);
        }
        for handle in handles {
            let _ = handle.await;
        }

        slots
            .into_iter()
            .map(|slot| slot.expect("worker pool lost a result slot"))
            .collect()
    }
}
