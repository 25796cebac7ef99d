// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation errors.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A queue or worker name declared more than once.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateName<'a> {
    /// `"queue"` or `"worker"`
    pub kind: &'a str,
    pub name: &'a str,
}

impl Display for DuplicateName<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate {} name: '{}'", self.kind, self.name)
    }
}

impl StructuredLog for DuplicateName<'_> {
    fn log(&self) {
        tracing::error!(kind = self.kind, duplicate = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("duplicate_name", span_name = name, kind = self.kind, duplicate = self.name)
    }
}

/// A worker references a queue that is not declared.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use yaml_pipeline::observability::messages::validation::UnknownQueueReference;
///
/// let msg = UnknownQueueReference {
///     worker_name: "producer",
///     queue_name: "q_missing",
/// };
///
/// assert_eq!(msg.to_string(), "Worker 'producer' references undeclared queue 'q_missing'");
/// ```
pub struct UnknownQueueReference<'a> {
    pub worker_name: &'a str,
    pub queue_name: &'a str,
}

impl Display for UnknownQueueReference<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' references undeclared queue '{}'",
            self.worker_name, self.queue_name
        )
    }
}

impl StructuredLog for UnknownQueueReference<'_> {
    fn log(&self) {
        tracing::error!(
            worker_name = self.worker_name,
            queue_name = self.queue_name,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unknown_queue",
            span_name = name,
            worker_name = self.worker_name,
            queue_name = self.queue_name,
        )
    }
}

/// No constructor is registered for a worker's implementation reference.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnknownWorkerType<'a> {
    pub worker_name: &'a str,
    pub implementation_ref: &'a str,
}

impl Display for UnknownWorkerType<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' uses unregistered implementation '{}'",
            self.worker_name, self.implementation_ref
        )
    }
}

impl StructuredLog for UnknownWorkerType<'_> {
    fn log(&self) {
        tracing::error!(
            worker_name = self.worker_name,
            implementation_ref = self.implementation_ref,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unknown_worker_type",
            span_name = name,
            worker_name = self.worker_name,
            implementation_ref = self.implementation_ref,
        )
    }
}

/// A worker configured with zero instances.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InvalidInstanceCount<'a> {
    pub worker_name: &'a str,
}

impl Display for InvalidInstanceCount<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker '{}' is configured with 0 instances", self.worker_name)
    }
}

impl StructuredLog for InvalidInstanceCount<'_> {
    fn log(&self) {
        tracing::error!(worker_name = self.worker_name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("invalid_instance_count", span_name = name, worker_name = self.worker_name)
    }
}
