// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline execution and the shutdown cascade.
//!
//! The [`Orchestrator`] launches every worker instance on its own tokio task
//! and then runs a supervision loop on a fixed interval. Each cycle it:
//!
//! 1. counts the alive instances of every worker still being supervised
//! 2. samples progress (alive counts and queue depths)
//! 3. retires every worker whose alive count reached zero
//!
//! Retiring a worker pushes `consumers(queue)` termination sentinels into each
//! of its output queues and removes it from supervision, so the cascade fires
//! exactly once per worker. When no supervised workers remain the pipeline
//! moves through `Draining` to `Terminated`.
//!
//! A worker counts as alive from the moment it is launched, so a worker whose
//! instances all exit before the first cycle still has its cascade fired.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

use crate::config::{PipelineConfig, PipelineOptions};
use crate::engine::graph::{build, BuiltPipeline, ConsumerCounts};
use crate::engine::progress::ProgressReporter;
use crate::errors::{ConfigurationError, PipelineError};
use crate::observability::messages::pipeline::{
    PipelineStarted, PipelineTerminated, ProgressSampled, SentinelsDispatched, WorkerExhausted,
};
use crate::observability::messages::worker::{
    InstanceAborted, InstanceFailed, InstanceFinished, InstanceStarted,
};
use crate::observability::messages::StructuredLog;
use crate::queue::{Queue, QueueRegistry};
use crate::traits::Worker;
use crate::workers::WorkerRegistry;

/// Lifecycle of a pipeline. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Built,
    Running,
    Draining,
    Terminated,
}

/// Outcome of one worker definition once all its instances have exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_name: String,
    pub implementation_ref: String,
    pub instances: usize,
    /// Instances that returned an error or panicked.
    pub failed_instances: usize,
}

/// Summary returned by [`Orchestrator::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Workers in the order they were retired.
    pub workers: Vec<WorkerReport>,
    /// Sentinels pushed into each queue by the shutdown cascade.
    pub sentinels_sent: BTreeMap<String, usize>,
    pub duration: Duration,
}

impl PipelineReport {
    pub fn failed_instances(&self) -> usize {
        self.workers.iter().map(|w| w.failed_instances).sum()
    }

    pub fn worker(&self, worker_name: &str) -> Option<&WorkerReport> {
        self.workers.iter().find(|w| w.worker_name == worker_name)
    }

    pub fn sentinels_sent_to(&self, queue: &str) -> usize {
        self.sentinels_sent.get(queue).copied().unwrap_or(0)
    }
}

enum InstanceOutcome {
    Finished,
    Failed,
}

/// Supervision state of one worker definition.
struct SupervisedWorker {
    name: String,
    implementation_ref: String,
    output_queues: Vec<Queue>,
    handles: Vec<(usize, JoinHandle<InstanceOutcome>)>,
}

impl SupervisedWorker {
    fn alive_count(&self) -> usize {
        self.handles.iter().filter(|(_, handle)| !handle.is_finished()).count()
    }
}

/// Enough for every transition after `Built`.
const TRANSITION_BUFFER: usize = 4;

/// Current status for polling plus an ordered feed of every transition.
struct StatusChannel {
    current: watch::Sender<PipelineStatus>,
    transitions: broadcast::Sender<PipelineStatus>,
}

impl StatusChannel {
    fn new() -> Self {
        let (current, _) = watch::channel(PipelineStatus::Built);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self { current, transitions }
    }

    fn set(&self, status: PipelineStatus) {
        self.current.send_replace(status);
        // No transition subscribers is fine.
        let _ = self.transitions.send(status);
    }
}

/// Drives a built pipeline from launch to termination.
pub struct Orchestrator {
    pipeline: Option<BuiltPipeline>,
    queues: QueueRegistry,
    status: Arc<StatusChannel>,
    supervisor: Option<JoinHandle<PipelineReport>>,
}

impl Orchestrator {
    pub fn new(pipeline: BuiltPipeline) -> Self {
        Self {
            queues: pipeline.queues.clone(),
            pipeline: Some(pipeline),
            status: Arc::new(StatusChannel::new()),
            supervisor: None,
        }
    }

    /// Builds the pipeline described by `config`. Nothing is launched.
    pub fn from_config(config: &PipelineConfig, registry: &WorkerRegistry) -> Result<Self, ConfigurationError> {
        build(config, registry).map(Self::new)
    }

    pub fn status(&self) -> PipelineStatus {
        *self.status.current.borrow()
    }

    /// Receiver for the latest status. Intermediate states may be skipped
    /// when transitions happen back to back.
    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.status.current.subscribe()
    }

    /// Every transition from now on, in order.
    pub fn transitions(&self) -> broadcast::Receiver<PipelineStatus> {
        self.status.transitions.subscribe()
    }

    pub fn queues(&self) -> &QueueRegistry {
        &self.queues
    }

    /// Launches every worker instance and the supervision loop.
    ///
    /// Returns as soon as everything has been spawned. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        let pipeline = self.pipeline.take().ok_or(PipelineError::AlreadyStarted)?;
        let BuiltPipeline {
            queues,
            workers,
            consumer_counts,
            options,
        } = pipeline;

        let mut wired = Vec::with_capacity(workers.len());
        for group in workers {
            let output_queues = group
                .output_queues
                .iter()
                .map(|name| queues.get(name))
                .collect::<Result<Vec<_>, _>>()?;
            wired.push((group, output_queues));
        }

        let started_at = Instant::now();
        let mut supervised = Vec::with_capacity(wired.len());
        let mut instance_count = 0;
        for (group, output_queues) in wired {
            let mut handles = Vec::with_capacity(group.instances.len());
            for instance in group.instances {
                let started = InstanceStarted {
                    worker_name: &instance.worker_name,
                    instance_index: instance.instance_index,
                    implementation: instance.implementation(),
                };
                started.log();
                let span = started.span("run");

                let index = instance.instance_index;
                let task = run_instance(instance.worker_name.clone(), index, instance.into_worker());
                handles.push((index, tokio::spawn(task.instrument(span))));
                instance_count += 1;
            }
            supervised.push(SupervisedWorker {
                name: group.name,
                implementation_ref: group.implementation_ref,
                output_queues,
                handles,
            });
        }

        PipelineStarted {
            instance_count,
            poll_interval: options.poll_interval(),
        }
        .log();
        self.status.set(PipelineStatus::Running);

        let supervisor = Supervisor {
            workers: supervised,
            reporter: ProgressReporter::new(queues),
            consumer_counts,
            options,
            status: Arc::clone(&self.status),
            started_at,
        };
        self.supervisor = Some(tokio::spawn(supervisor.run()));
        Ok(())
    }

    /// Waits until the pipeline reaches `Terminated`.
    pub async fn join(&mut self) -> Result<PipelineReport, PipelineError> {
        if self.pipeline.is_some() {
            return Err(PipelineError::NotStarted);
        }
        let handle = self.supervisor.take().ok_or(PipelineError::AlreadyJoined)?;
        handle
            .await
            .map_err(|e| PipelineError::SupervisorFailed(e.to_string()))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("status", &self.status())
            .field("queues", &self.queues.len())
            .finish()
    }
}

/// Build, start and join in one call.
pub async fn run(config: &PipelineConfig, registry: &WorkerRegistry) -> Result<PipelineReport, PipelineError> {
    let mut orchestrator = Orchestrator::from_config(config, registry)?;
    orchestrator.start()?;
    orchestrator.join().await
}

async fn run_instance(worker_name: String, instance_index: usize, mut worker: Box<dyn Worker>) -> InstanceOutcome {
    let started = Instant::now();
    match worker.run().await {
        Ok(()) => {
            InstanceFinished {
                worker_name: &worker_name,
                instance_index,
                duration: started.elapsed(),
            }
            .log();
            InstanceOutcome::Finished
        }
        Err(error) => {
            InstanceFailed {
                worker_name: &worker_name,
                instance_index,
                error: &format!("{:#}", error),
            }
            .log();
            InstanceOutcome::Failed
        }
    }
}

struct Supervisor {
    workers: Vec<SupervisedWorker>,
    reporter: ProgressReporter,
    consumer_counts: ConsumerCounts,
    options: PipelineOptions,
    status: Arc<StatusChannel>,
    started_at: Instant,
}

impl Supervisor {
    async fn run(mut self) -> PipelineReport {
        let worker_count = self.workers.len();
        let mut retired = Vec::with_capacity(worker_count);
        let mut sentinels_sent = BTreeMap::new();

        let mut interval = tokio::time::interval(self.options.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.workers.is_empty() {
            interval.tick().await;

            let alive: Vec<usize> = self.workers.iter().map(SupervisedWorker::alive_count).collect();
            if self.options.report_progress {
                let snapshot = self
                    .reporter
                    .sample(self.workers.iter().map(|w| w.name.as_str()).zip(alive.iter().copied()));
                ProgressSampled { snapshot: &snapshot }.log();
            }

            let (exhausted, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.workers)
                .into_iter()
                .zip(alive)
                .partition(|(_, alive)| *alive == 0);
            self.workers = remaining.into_iter().map(|(worker, _)| worker).collect();

            for (worker, _) in exhausted {
                retired.push(self.retire(worker, &mut sentinels_sent).await);
            }
        }

        self.status.set(PipelineStatus::Draining);

        let report = PipelineReport {
            workers: retired,
            sentinels_sent,
            duration: self.started_at.elapsed(),
        };

        PipelineTerminated {
            worker_count,
            failed_instances: report.failed_instances(),
            duration: report.duration,
        }
        .log();
        self.status.set(PipelineStatus::Terminated);

        report
    }

    /// Fires the shutdown cascade for a worker with no alive instances and
    /// collects its instance outcomes.
    async fn retire(&self, worker: SupervisedWorker, sentinels_sent: &mut BTreeMap<String, usize>) -> WorkerReport {
        let output_names: Vec<String> = worker.output_queues.iter().map(|q| q.name().to_string()).collect();
        WorkerExhausted {
            worker_name: &worker.name,
            output_queues: &output_names,
        }
        .log();

        for queue in &worker.output_queues {
            let count = self.consumer_counts.get(queue.name());
            for _ in 0..count {
                queue.send_done();
            }
            SentinelsDispatched {
                worker_name: &worker.name,
                queue_name: queue.name(),
                count,
            }
            .log();
            *sentinels_sent.entry(queue.name().to_string()).or_insert(0) += count;
        }

        let instances = worker.handles.len();
        let mut failed_instances = 0;
        for (instance_index, handle) in worker.handles {
            match handle.await {
                Ok(InstanceOutcome::Finished) => {}
                Ok(InstanceOutcome::Failed) => failed_instances += 1,
                Err(join_error) => {
                    let reason = if join_error.is_panic() { "panicked" } else { "cancelled" };
                    InstanceAborted {
                        worker_name: &worker.name,
                        instance_index,
                        reason,
                    }
                    .log();
                    failed_instances += 1;
                }
            }
        }

        WorkerReport {
            worker_name: worker.name,
            implementation_ref: worker.implementation_ref,
            instances,
            failed_instances,
        }
    }
}
