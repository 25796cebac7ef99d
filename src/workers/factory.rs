// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::WorkerConfig;
use crate::errors::ConfigurationError;
use crate::observability::messages::validation::{UnknownQueueReference, UnknownWorkerType};
use crate::observability::messages::StructuredLog;
use crate::queue::QueueRegistry;
use crate::traits::{Worker, WorkerContext};

/// Builds one worker instance from its wiring and static parameters.
pub type WorkerConstructor =
    Arc<dyn Fn(WorkerContext) -> anyhow::Result<Box<dyn Worker>> + Send + Sync>;

/// One constructed, not yet running, worker instance.
pub struct WorkerInstance {
    pub worker_name: String,
    pub instance_index: usize,
    worker: Box<dyn Worker>,
}

impl WorkerInstance {
    /// Implementation name reported by the worker itself.
    pub fn implementation(&self) -> &'static str {
        self.worker.name()
    }

    pub fn into_worker(self) -> Box<dyn Worker> {
        self.worker
    }
}

impl std::fmt::Debug for WorkerInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerInstance")
            .field("worker_name", &self.worker_name)
            .field("instance_index", &self.instance_index)
            .field("implementation", &self.implementation())
            .finish()
    }
}

/// Name → constructor table for worker implementations.
///
/// Populated by the embedding application before any pipeline is built.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    constructors: HashMap<String, WorkerConstructor>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under an implementation reference.
    ///
    /// Registering the same reference twice replaces the earlier constructor.
    pub fn register<F, W>(&mut self, implementation_ref: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(WorkerContext) -> anyhow::Result<W> + Send + Sync + 'static,
        W: Worker + 'static,
    {
        let constructor: WorkerConstructor =
            Arc::new(move |ctx: WorkerContext| constructor(ctx).map(|worker| Box::new(worker) as Box<dyn Worker>));
        self.constructors.insert(implementation_ref.into(), constructor);
        self
    }

    /// Look up the constructor registered under `implementation_ref`.
    pub fn resolve(&self, implementation_ref: &str) -> Result<WorkerConstructor, ConfigurationError> {
        self.constructors
            .get(implementation_ref)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownWorkerType(implementation_ref.to_string()))
    }

    pub fn contains(&self, implementation_ref: &str) -> bool {
        self.constructors.contains_key(implementation_ref)
    }

    /// Registered implementation references, sorted.
    pub fn implementations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct every instance of one worker definition.
    ///
    /// Resolves the implementation and the queue handles first, then builds
    /// `spec.instances` independent instances. Each instance gets its own
    /// context; instances share queues but no other state.
    pub fn instantiate(
        &self,
        spec: &WorkerConfig,
        queues: &QueueRegistry,
    ) -> Result<Vec<WorkerInstance>, ConfigurationError> {
        let implementation_ref = spec.implementation_ref();
        let constructor = self.resolve(&implementation_ref).inspect_err(|_| {
            UnknownWorkerType {
                worker_name: &spec.name,
                implementation_ref: &implementation_ref,
            }
            .log();
        })?;

        if spec.instances == 0 {
            return Err(ConfigurationError::InvalidInstanceCount {
                worker: spec.name.clone(),
            });
        }

        let lookup = |queue_name: &String| {
            queues.get(queue_name).inspect_err(|_| {
                UnknownQueueReference {
                    worker_name: &spec.name,
                    queue_name,
                }
                .log();
            })
        };
        let input_queue = spec.input_queue.as_ref().map(lookup).transpose()?;
        let output_queues = spec
            .output_queues
            .iter()
            .map(lookup)
            .collect::<Result<Vec<_>, _>>()?;

        (0..spec.instances)
            .map(|instance_index| {
                let ctx = WorkerContext {
                    worker_name: spec.name.clone(),
                    instance_index,
                    input_queue: input_queue.clone(),
                    output_queues: output_queues.clone(),
                    params: spec.input_values.clone(),
                };
                let worker = constructor(ctx).map_err(|e| ConfigurationError::WorkerConstructionFailed {
                    worker: spec.name.clone(),
                    reason: format!("{:#}", e),
                })?;
                Ok(WorkerInstance {
                    worker_name: spec.name.clone(),
                    instance_index,
                    worker,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("implementations", &self.implementations())
            .finish()
    }
}
