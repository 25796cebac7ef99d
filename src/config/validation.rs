//! Structural validation of pipeline configurations.
//!
//! Checks run in a fixed order and every problem found is collected, so a
//! user fixing a pipeline file sees all of them at once:
//!
//! 1. **Queue names are unique**
//! 2. **Worker names are unique**
//! 3. **Instance counts are positive**
//! 4. **Queue references resolve** - every `input_queue` and `output_queues`
//!    entry names a declared queue
//!
//! Worker implementation references are not checked here; they depend on
//! the registry the pipeline is built against and are resolved at build time.

use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::errors::ConfigurationError;
use crate::observability::messages::validation::{
    DuplicateName, InvalidInstanceCount, UnknownQueueReference,
};
use crate::observability::messages::StructuredLog;

/// Validates a pipeline configuration.
///
/// Returns every problem found, in check order. An empty pipeline is valid.
pub fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();

    errors.extend(check_unique_queue_names(config));
    errors.extend(check_unique_worker_names(config));
    errors.extend(check_instance_counts(config));
    errors.extend(check_queue_references(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unique_queue_names(config: &PipelineConfig) -> Vec<ConfigurationError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for queue in &config.queues {
        if !seen.insert(queue.name.as_str()) {
            DuplicateName { kind: "queue", name: &queue.name }.log();
            errors.push(ConfigurationError::DuplicateQueueName(queue.name.clone()));
        }
    }

    errors
}

fn check_unique_worker_names(config: &PipelineConfig) -> Vec<ConfigurationError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for worker in &config.workers {
        if !seen.insert(worker.name.as_str()) {
            DuplicateName { kind: "worker", name: &worker.name }.log();
            errors.push(ConfigurationError::DuplicateWorkerName(worker.name.clone()));
        }
    }

    errors
}

fn check_instance_counts(config: &PipelineConfig) -> Vec<ConfigurationError> {
    config
        .workers
        .iter()
        .filter(|worker| worker.instances == 0)
        .map(|worker| {
            InvalidInstanceCount { worker_name: &worker.name }.log();
            ConfigurationError::InvalidInstanceCount {
                worker: worker.name.clone(),
            }
        })
        .collect()
}

fn check_queue_references(config: &PipelineConfig) -> Vec<ConfigurationError> {
    let declared: HashSet<&str> = config.queues.iter().map(|q| q.name.as_str()).collect();
    let mut errors = Vec::new();

    for worker in &config.workers {
        let referenced = worker
            .input_queue
            .iter()
            .chain(worker.output_queues.iter());

        for queue in referenced {
            if !declared.contains(queue.as_str()) {
                UnknownQueueReference {
                    worker_name: &worker.name,
                    queue_name: queue,
                }
                .log();
                errors.push(ConfigurationError::UnknownQueue(queue.clone()));
            }
        }
    }

    errors
}
