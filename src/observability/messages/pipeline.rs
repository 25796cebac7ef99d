// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline build, supervision and shutdown events.

use crate::engine::ProgressSnapshot;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Pipeline graph built and ready to start.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use yaml_pipeline::observability::messages::pipeline::PipelineBuilt;
///
/// let msg = PipelineBuilt {
///     queue_count: 2,
///     worker_count: 3,
///     instance_count: 5,
/// };
///
/// assert_eq!(msg.to_string(), "Pipeline built: 2 queues, 3 workers, 5 instances");
/// ```
pub struct PipelineBuilt {
    pub queue_count: usize,
    pub worker_count: usize,
    pub instance_count: usize,
}

impl Display for PipelineBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline built: {} queues, {} workers, {} instances",
            self.queue_count, self.worker_count, self.instance_count
        )
    }
}

impl StructuredLog for PipelineBuilt {
    fn log(&self) {
        tracing::info!(
            queue_count = self.queue_count,
            worker_count = self.worker_count,
            instance_count = self.instance_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_built",
            span_name = name,
            queue_count = self.queue_count,
            worker_count = self.worker_count,
            instance_count = self.instance_count,
        )
    }
}

/// Pipeline construction failed; nothing was started.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PipelineBuildFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for PipelineBuildFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline build failed: {}", self.error)
    }
}

impl StructuredLog for PipelineBuildFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("pipeline_build_failed", span_name = name, error = %self.error)
    }
}

/// All worker instances launched and supervision begun.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineStarted {
    pub instance_count: usize,
    pub poll_interval: std::time::Duration,
}

impl Display for PipelineStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline started: {} instances, polling every {:?}",
            self.instance_count, self.poll_interval
        )
    }
}

impl StructuredLog for PipelineStarted {
    fn log(&self) {
        tracing::info!(
            instance_count = self.instance_count,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline",
            span_name = name,
            instance_count = self.instance_count,
            poll_interval = ?self.poll_interval,
        )
    }
}

/// Periodic sample of active instances and queue depths.
///
/// # Log Level
/// `info!` - One record per supervision cycle
pub struct ProgressSampled<'a> {
    pub snapshot: &'a ProgressSnapshot,
}

impl Display for ProgressSampled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Active workers: {}, queue sizes: {:?}, worker stats: [",
            self.snapshot.active_workers, self.snapshot.queue_sizes
        )?;
        for (i, stat) in self.snapshot.worker_stats.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", stat.worker_name, stat.alive_instance_count)?;
        }
        write!(f, "]")
    }
}

impl StructuredLog for ProgressSampled<'_> {
    fn log(&self) {
        tracing::info!(
            active_workers = self.snapshot.active_workers,
            queue_sizes = ?self.snapshot.queue_sizes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "progress",
            span_name = name,
            active_workers = self.snapshot.active_workers,
        )
    }
}

/// Every instance of a worker has exited; its shutdown cascade fires.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerExhausted<'a> {
    pub worker_name: &'a str,
    pub output_queues: &'a [String],
}

impl Display for WorkerExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.output_queues.is_empty() {
            write!(f, "Worker '{}' exhausted", self.worker_name)
        } else {
            write!(
                f,
                "Worker '{}' exhausted, closing downstream queues: {}",
                self.worker_name,
                self.output_queues.join(", ")
            )
        }
    }
}

impl StructuredLog for WorkerExhausted<'_> {
    fn log(&self) {
        tracing::info!(
            worker_name = self.worker_name,
            output_queues = ?self.output_queues,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_exhausted",
            span_name = name,
            worker_name = self.worker_name,
        )
    }
}

/// Termination sentinels pushed into one downstream queue.
///
/// # Log Level
/// `debug!` - Detail of the shutdown cascade
pub struct SentinelsDispatched<'a> {
    pub worker_name: &'a str,
    pub queue_name: &'a str,
    pub count: usize,
}

impl Display for SentinelsDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sent {} termination sentinel(s) to '{}' after '{}' exhausted",
            self.count, self.queue_name, self.worker_name
        )
    }
}

impl StructuredLog for SentinelsDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_name = self.worker_name,
            queue_name = self.queue_name,
            count = self.count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "sentinels",
            span_name = name,
            worker_name = self.worker_name,
            queue_name = self.queue_name,
            count = self.count,
        )
    }
}

/// No instances remain alive; the pipeline has terminated.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineTerminated {
    pub worker_count: usize,
    pub failed_instances: usize,
    pub duration: std::time::Duration,
}

impl Display for PipelineTerminated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline terminated: {} workers in {:?}, {} abnormal instance exit(s)",
            self.worker_count, self.duration, self.failed_instances
        )
    }
}

impl StructuredLog for PipelineTerminated {
    fn log(&self) {
        tracing::info!(
            worker_count = self.worker_count,
            failed_instances = self.failed_instances,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_terminated",
            span_name = name,
            worker_count = self.worker_count,
            failed_instances = self.failed_instances,
            duration = ?self.duration,
        )
    }
}
