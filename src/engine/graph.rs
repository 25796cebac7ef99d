// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline graph construction.
//!
//! [`build`] turns a [`PipelineConfig`] into a [`BuiltPipeline`]: the queue
//! registry, every constructed worker instance grouped by worker name, and
//! the per-queue consumer counts used to size the shutdown cascade.
//!
//! Construction is all-or-nothing. Any failure is returned before a single
//! instance has been started, and everything constructed so far is dropped.

use std::collections::HashMap;

use crate::config::{validate_pipeline_config, PipelineConfig, PipelineOptions};
use crate::errors::ConfigurationError;
use crate::observability::messages::pipeline::{PipelineBuildFailed, PipelineBuilt};
use crate::observability::messages::validation::UnknownWorkerType;
use crate::observability::messages::StructuredLog;
use crate::queue::QueueRegistry;
use crate::workers::{WorkerInstance, WorkerRegistry};

/// Number of worker instances reading from each queue.
///
/// Computed once at build time as the sum of `instances` over every worker
/// whose `input_queue` is that queue. A queue nobody reads from has zero
/// consumers and never receives sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerCounts(HashMap<String, usize>);

impl ConsumerCounts {
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut counts = HashMap::new();
        for worker in &config.workers {
            if let Some(input) = &worker.input_queue {
                *counts.entry(input.clone()).or_insert(0) += worker.instances;
            }
        }
        Self(counts)
    }

    /// Consumers of `queue`, zero when nothing reads from it.
    pub fn get(&self, queue: &str) -> usize {
        self.0.get(queue).copied().unwrap_or(0)
    }
}

/// All constructed instances of one worker definition plus the structural
/// metadata the orchestrator needs once they exit.
#[derive(Debug)]
pub struct WorkerGroup {
    pub name: String,
    pub implementation_ref: String,
    pub output_queues: Vec<String>,
    pub instances: Vec<WorkerInstance>,
}

/// A fully wired pipeline that has not been started yet.
#[derive(Debug)]
pub struct BuiltPipeline {
    pub queues: QueueRegistry,
    /// Worker groups in configuration order.
    pub workers: Vec<WorkerGroup>,
    pub consumer_counts: ConsumerCounts,
    pub options: PipelineOptions,
}

impl BuiltPipeline {
    pub fn instance_count(&self) -> usize {
        self.workers.iter().map(|w| w.instances.len()).sum()
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerGroup> {
        self.workers.iter().find(|w| w.name == name)
    }
}

/// Build a pipeline from configuration, resolving worker implementations in
/// `registry`.
///
/// Steps, each of which must fully succeed before the next one runs:
/// 1. structural validation (unique names, positive instance counts, queue references)
/// 2. queue registry creation
/// 3. implementation lookup for every worker
/// 4. instance construction through the worker factory
///
/// The first failure is returned.
pub fn build(config: &PipelineConfig, registry: &WorkerRegistry) -> Result<BuiltPipeline, ConfigurationError> {
    build_inner(config, registry).inspect_err(|error| PipelineBuildFailed { error }.log())
}

fn build_inner(config: &PipelineConfig, registry: &WorkerRegistry) -> Result<BuiltPipeline, ConfigurationError> {
    if let Err(errors) = validate_pipeline_config(config) {
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }
    }

    let queues = QueueRegistry::create(config.queues.iter().map(|q| q.name.as_str()))?;
    let consumer_counts = ConsumerCounts::from_config(config);

    for spec in &config.workers {
        let implementation_ref = spec.implementation_ref();
        if !registry.contains(&implementation_ref) {
            UnknownWorkerType {
                worker_name: &spec.name,
                implementation_ref: &implementation_ref,
            }
            .log();
            return Err(ConfigurationError::UnknownWorkerType(implementation_ref));
        }
    }

    let mut workers = Vec::with_capacity(config.workers.len());
    for spec in &config.workers {
        workers.push(WorkerGroup {
            name: spec.name.clone(),
            implementation_ref: spec.implementation_ref(),
            output_queues: spec.output_queues.clone(),
            instances: registry.instantiate(spec, &queues)?,
        });
    }

    let pipeline = BuiltPipeline {
        queues,
        workers,
        consumer_counts,
        options: config.options.clone(),
    };

    PipelineBuilt {
        queue_count: pipeline.queues.len(),
        worker_count: pipeline.workers.len(),
        instance_count: pipeline.instance_count(),
    }
    .log();

    Ok(pipeline)
}
