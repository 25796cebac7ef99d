// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod graph;
pub mod orchestrator;
pub mod progress;
#[cfg(test)]
pub mod integration_tests;

pub use graph::{build, BuiltPipeline, ConsumerCounts, WorkerGroup};
pub use orchestrator::{run, Orchestrator, PipelineReport, PipelineStatus, WorkerReport};
pub use progress::{ProgressReporter, ProgressSnapshot, WorkerStat};
