use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::queue::Queue;

/// A unit of pipeline work, executed on its own task.
///
/// Implementations are supplied by the embedding application and registered
/// by name in a [`crate::workers::WorkerRegistry`]. The engine only calls
/// [`Worker::run`] once and watches for it to return.
///
/// A worker with an input queue is expected to treat [`crate::queue::Message::Done`]
/// as end of stream and return after reading exactly one sentinel.
#[async_trait]
pub trait Worker: Send {
    async fn run(&mut self) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}

/// Everything a worker constructor gets to build one instance.
///
/// Each instance receives its own context; queue handles are shared with the
/// rest of the pipeline, parameters are cloned per instance.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub worker_name: String,
    pub instance_index: usize,
    pub input_queue: Option<Queue>,
    pub output_queues: Vec<Queue>,
    pub params: HashMap<String, serde_yaml::Value>,
}

impl WorkerContext {
    /// Deserializes a static parameter into `T`.
    ///
    /// Returns `Ok(None)` when the parameter is absent.
    pub fn param<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.params.get(key) {
            Some(value) => {
                let parsed = serde_yaml::from_value(value.clone()).map_err(|e| {
                    anyhow::anyhow!(
                        "parameter '{}' of worker '{}' is invalid: {}",
                        key,
                        self.worker_name,
                        e
                    )
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Like [`WorkerContext::param`] but fails when the parameter is absent.
    pub fn required_param<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<T> {
        self.param(key)?.ok_or_else(|| {
            anyhow::anyhow!(
                "worker '{}' is missing required parameter '{}'",
                self.worker_name,
                key
            )
        })
    }

    /// Returns the input queue or fails if the worker was wired without one.
    pub fn require_input(&self) -> anyhow::Result<Queue> {
        self.input_queue
            .clone()
            .ok_or_else(|| anyhow::anyhow!("worker '{}' needs an input_queue", self.worker_name))
    }
}
