// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for worker instance lifecycle events.
//!
//! Instance failures are informational from the engine's point of view: a
//! failed or panicked instance simply stops counting as alive.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A worker instance task has been spawned.
///
/// # Log Level
/// `debug!` - One record per instance
pub struct InstanceStarted<'a> {
    pub worker_name: &'a str,
    pub instance_index: usize,
    pub implementation: &'a str,
}

impl Display for InstanceStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' instance {} started ({})",
            self.worker_name, self.instance_index, self.implementation
        )
    }
}

impl StructuredLog for InstanceStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            implementation = self.implementation,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_instance",
            span_name = name,
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            implementation = self.implementation,
        )
    }
}

/// A worker instance returned from `run()` successfully.
///
/// # Log Level
/// `debug!` - One record per instance
pub struct InstanceFinished<'a> {
    pub worker_name: &'a str,
    pub instance_index: usize,
    pub duration: std::time::Duration,
}

impl Display for InstanceFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' instance {} finished in {:?}",
            self.worker_name, self.instance_index, self.duration
        )
    }
}

impl StructuredLog for InstanceFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "instance_finished",
            span_name = name,
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            duration = ?self.duration,
        )
    }
}

/// A worker instance returned an error from `run()`.
///
/// # Log Level
/// `warn!` - The pipeline keeps going, downstream may starve
pub struct InstanceFailed<'a> {
    pub worker_name: &'a str,
    pub instance_index: usize,
    pub error: &'a dyn Display,
}

impl Display for InstanceFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' instance {} failed: {}",
            self.worker_name, self.instance_index, self.error
        )
    }
}

impl StructuredLog for InstanceFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "instance_failed",
            span_name = name,
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            error = %self.error,
        )
    }
}

/// A worker instance task panicked or was aborted.
///
/// # Log Level
/// `error!` - Abnormal termination
pub struct InstanceAborted<'a> {
    pub worker_name: &'a str,
    pub instance_index: usize,
    pub reason: &'a str,
}

impl Display for InstanceAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' instance {} terminated abnormally: {}",
            self.worker_name, self.instance_index, self.reason
        )
    }
}

impl StructuredLog for InstanceAborted<'_> {
    fn log(&self) {
        tracing::error!(
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "instance_aborted",
            span_name = name,
            worker_name = self.worker_name,
            instance_index = self.instance_index,
            reason = self.reason,
        )
    }
}
