// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while validating a pipeline configuration and wiring its workers.
//!
//! Every variant is fatal and is reported before any worker instance is started.

use thiserror::Error;

/// A pipeline configuration that cannot be turned into a running pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two queue declarations share a name.
    #[error("Duplicate queue name: '{0}'")]
    DuplicateQueueName(String),

    /// Two worker declarations share a name.
    #[error("Duplicate worker name: '{0}'")]
    DuplicateWorkerName(String),

    /// A worker references a queue that was never declared.
    #[error("Unknown queue: '{0}'")]
    UnknownQueue(String),

    /// No constructor is registered under the worker's implementation reference.
    #[error("Unknown worker type: '{0}'")]
    UnknownWorkerType(String),

    /// A worker was configured with zero instances.
    #[error("Worker '{worker}' must run at least one instance")]
    InvalidInstanceCount { worker: String },

    /// The registered constructor rejected the worker's wiring or parameters.
    #[error("Failed to construct worker '{worker}': {reason}")]
    WorkerConstructionFailed { worker: String, reason: String },
}
