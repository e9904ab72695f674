use std::ops::Range;

use tracing::debug;

use crate::budget::FrameBudget;

/// One batch handed out by [`BatchLoop::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStep<K> {
    pub key: K,
    /// Item indices to process in this batch.
    pub range: Range<usize>,
    /// Set on the last batch of a loop; the loop is gone once this is returned.
    pub finished: bool,
}

#[derive(Debug, Clone)]
struct Job<K> {
    key: K,
    front: usize,
    total: usize,
    batch_size: usize,
}

/// Keyed, cooperative batch iteration.
///
/// Each running loop walks `0..total` in chunks of `batch_size`. The host
/// drives progress by calling [`tick`](Self::tick) once per animation frame;
/// work never runs outside a tick, so cancellation is immediate.
///
/// Ordering contract:
/// - Loops are served round-robin in start order, one batch per loop per pass.
/// - Restarting a key cancels the old loop and appends the new one at the end.
#[derive(Debug, Clone)]
pub struct BatchLoop<K> {
    jobs: Vec<Job<K>>,
}

impl<K> Default for BatchLoop<K> {
    fn default() -> Self {
        Self { jobs: Vec::new() }
    }
}

impl<K: Clone + PartialEq + std::fmt::Debug> BatchLoop<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start iterating `0..total` under `key`, replacing any loop already
    /// running under the same key. A zero `batch_size` is treated as 1.
    pub fn start(&mut self, key: K, total: usize, batch_size: usize) {
        if self.stop(&key) {
            debug!(?key, "restarting batch loop");
        }
        self.jobs.push(Job {
            key,
            front: 0,
            total,
            batch_size: batch_size.max(1),
        });
    }

    /// Cancel the loop under `key`. Returns whether one was running.
    pub fn stop(&mut self, key: &K) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|j| &j.key != key);
        before != self.jobs.len()
    }

    pub fn stop_all(&mut self) {
        self.jobs.clear();
    }

    pub fn is_running(&self, key: &K) -> bool {
        self.jobs.iter().any(|j| &j.key == key)
    }

    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Items processed so far and total, for progress reporting.
    pub fn progress(&self, key: &K) -> Option<(usize, usize)> {
        self.jobs
            .iter()
            .find(|j| &j.key == key)
            .map(|j| (j.front, j.total))
    }

    /// Hand out batches until the budget runs dry or every loop finished.
    /// Each batch costs one unit.
    pub fn tick(&mut self, budget: &mut FrameBudget) -> Vec<BatchStep<K>> {
        let mut steps = Vec::new();
        while !self.jobs.is_empty() {
            let mut i = 0;
            while i < self.jobs.len() {
                if !budget.try_consume(1) {
                    return steps;
                }
                let job = &mut self.jobs[i];
                let end = (job.front + job.batch_size).min(job.total);
                let range = job.front..end;
                job.front = end;
                let finished = job.front >= job.total;
                steps.push(BatchStep {
                    key: job.key.clone(),
                    range,
                    finished,
                });
                if finished {
                    let job = self.jobs.remove(i);
                    debug!(key = ?job.key, total = job.total, "batch loop finished");
                } else {
                    i += 1;
                }
            }
        }
        steps
    }
}
