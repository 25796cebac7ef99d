use std::collections::BTreeMap;

use crate::queue::QueueRegistry;

/// Alive instance count of one worker at sampling time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStat {
    pub worker_name: String,
    pub alive_instance_count: usize,
}

/// Point-in-time view of a running pipeline.
///
/// Queue sizes are read without locking and may be stale by the time the
/// snapshot is logged. Sampling never changes pipeline state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub active_workers: usize,
    pub queue_sizes: BTreeMap<String, usize>,
    pub worker_stats: Vec<WorkerStat>,
}

impl ProgressSnapshot {
    pub fn queue_size(&self, queue: &str) -> Option<usize> {
        self.queue_sizes.get(queue).copied()
    }

    pub fn worker(&self, worker_name: &str) -> Option<&WorkerStat> {
        self.worker_stats.iter().find(|s| s.worker_name == worker_name)
    }
}

/// Samples queue depths alongside the liveness counts the supervisor hands in.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    queues: QueueRegistry,
}

impl ProgressReporter {
    pub fn new(queues: QueueRegistry) -> Self {
        Self { queues }
    }

    /// Build a snapshot from per-worker alive counts, in the order given.
    ///
    /// `active_workers` is the total number of alive instances across all
    /// workers.
    pub fn sample<'a, I>(&self, alive: I) -> ProgressSnapshot
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let worker_stats: Vec<WorkerStat> = alive
            .into_iter()
            .map(|(worker_name, alive_instance_count)| WorkerStat {
                worker_name: worker_name.to_string(),
                alive_instance_count,
            })
            .collect();

        ProgressSnapshot {
            active_workers: worker_stats.iter().map(|s| s.alive_instance_count).sum(),
            queue_sizes: self.queues.depths(),
            worker_stats,
        }
    }
}
