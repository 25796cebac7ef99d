// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_INSTANCES, DEFAULT_POLL_INTERVAL_MS, IMPLEMENTATION_REF_SEPARATOR};
use crate::errors::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete description of a worker pipeline.
///
/// The engine consumes this in-memory model; how it was produced (YAML,
/// TOML, or built in code) does not matter to the build step.
///
/// # Example
/// ```yaml
/// options:
///   poll_interval_ms: 500
/// queues:
///   - name: numbers
/// workers:
///   - name: producer
///     location: builtin
///     class: Emit
///     output_queues: [numbers]
///     input_values:
///       values: [1, 2, 3]
///   - name: consumer
///     location: builtin
///     class: Sink
///     input_queue: numbers
///     instances: 2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub options: PipelineOptions,
    #[serde(default)]
    pub queues: Vec<QueueConfig>,
    #[serde(default)]
    pub workers: Vec<WorkerConfig>,
}

/// Orchestrator tuning knobs. All optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineOptions {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Emit a progress record on every supervision cycle.
    #[serde(default = "default_report_progress")]
    pub report_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            report_progress: true,
        }
    }
}

impl PipelineOptions {
    pub fn poll_interval(&self) -> Duration {
        // a zero interval would spin the supervisor
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_report_progress() -> bool {
    true
}

fn default_instances() -> usize {
    DEFAULT_INSTANCES
}

/// A named message queue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueueConfig {
    pub name: String,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One worker definition: what to run, how many copies, and how it is wired.
///
/// * `location` + `class` - opaque implementation reference resolved through
///   the worker registry
/// * `input_queue` - queue the instances read from (absent for producers)
/// * `output_queues` - queues the instances write to
/// * `instances` - number of independent instances (defaults to 1)
/// * `input_values` - static parameters handed to every instance
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkerConfig {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub class: String,
    #[serde(default)]
    pub input_queue: Option<String>,
    #[serde(default)]
    pub output_queues: Vec<String>,
    #[serde(default = "default_instances")]
    pub instances: usize,
    #[serde(default)]
    pub input_values: HashMap<String, serde_yaml::Value>,
}

impl WorkerConfig {
    pub fn new(name: impl Into<String>, location: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Some(location.into()),
            class: class.into(),
            input_queue: None,
            output_queues: Vec::new(),
            instances: DEFAULT_INSTANCES,
            input_values: HashMap::new(),
        }
    }

    pub fn with_input(mut self, queue: impl Into<String>) -> Self {
        self.input_queue = Some(queue.into());
        self
    }

    pub fn with_outputs<I, S>(mut self, queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_queues = queues.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.input_values.insert(key.into(), value.into());
        self
    }

    /// Key used to look up the worker's constructor: `location.class`, or
    /// just `class` when no location is given.
    pub fn implementation_ref(&self) -> String {
        match self.location.as_deref() {
            Some(location) if !location.is_empty() => {
                format!("{}{}{}", location, IMPLEMENTATION_REF_SEPARATOR, self.class)
            }
            _ => self.class.clone(),
        }
    }
}

/// Load a pipeline from a YAML file, or a TOML file when the extension is `.toml`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let cfg = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(cfg)
}

/// Load a pipeline file and validate its structure.
///
/// All validation problems are reported together in [`LoadError::Invalid`].
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, LoadError> {
    let cfg = load_config(path)?;
    crate::config::validate_pipeline_config(&cfg).map_err(LoadError::Invalid)?;
    Ok(cfg)
}
