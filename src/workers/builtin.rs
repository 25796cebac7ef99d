// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plumbing workers that ship with the engine.
//!
//! These move messages around without interpreting them, which makes them
//! useful for wiring demos and for exercising a pipeline layout before the
//! real worker implementations exist.
//!
//! | Reference        | Input    | Behaviour                                           |
//! |------------------|----------|-----------------------------------------------------|
//! | `builtin.Emit`   | none     | pushes `input_values.values` to every output, exits |
//! | `builtin.Relay`  | required | forwards every message to every output until `Done` |
//! | `builtin.Sink`   | required | logs and drops every message until `Done`           |

use async_trait::async_trait;
use std::time::Duration;

use crate::config::consts::IMPLEMENTATION_REF_SEPARATOR;
use crate::queue::{Message, Payload, Queue};
use crate::traits::{Worker, WorkerContext};
use crate::workers::WorkerRegistry;

pub const BUILTIN_LOCATION: &str = "builtin";

/// Register every built-in worker under `builtin.<Class>`.
pub fn register_builtins(registry: &mut WorkerRegistry) {
    registry
        .register(builtin_ref("Emit"), EmitWorker::from_context)
        .register(builtin_ref("Relay"), RelayWorker::from_context)
        .register(builtin_ref("Sink"), SinkWorker::from_context);
}

fn builtin_ref(class: &str) -> String {
    format!("{}{}{}", BUILTIN_LOCATION, IMPLEMENTATION_REF_SEPARATOR, class)
}

/// Source worker: emits a fixed list of values, then exits.
///
/// Parameters: `values` (required sequence), `interval_ms` (optional pause
/// between values).
pub struct EmitWorker {
    values: Vec<Payload>,
    interval: Option<Duration>,
    outputs: Vec<Queue>,
}

impl EmitWorker {
    pub fn from_context(ctx: WorkerContext) -> anyhow::Result<Self> {
        let values: Vec<Payload> = ctx.required_param("values")?;
        let interval = ctx.param::<u64>("interval_ms")?.map(Duration::from_millis);
        Ok(Self {
            values,
            interval,
            outputs: ctx.output_queues,
        })
    }
}

#[async_trait]
impl Worker for EmitWorker {
    async fn run(&mut self) -> anyhow::Result<()> {
        for value in &self.values {
            for output in &self.outputs {
                output.push(value.clone());
            }
            if let Some(interval) = self.interval {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "emit"
    }
}

/// Pass-through worker: copies every data message to all outputs.
pub struct RelayWorker {
    input: Queue,
    outputs: Vec<Queue>,
}

impl RelayWorker {
    pub fn from_context(ctx: WorkerContext) -> anyhow::Result<Self> {
        Ok(Self {
            input: ctx.require_input()?,
            outputs: ctx.output_queues,
        })
    }
}

#[async_trait]
impl Worker for RelayWorker {
    async fn run(&mut self) -> anyhow::Result<()> {
        while let Message::Data(payload) = self.input.recv().await {
            for output in &self.outputs {
                output.push(payload.clone());
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}

/// Terminal worker: logs every message it receives.
pub struct SinkWorker {
    worker_name: String,
    instance_index: usize,
    input: Queue,
}

impl SinkWorker {
    pub fn from_context(ctx: WorkerContext) -> anyhow::Result<Self> {
        Ok(Self {
            input: ctx.require_input()?,
            worker_name: ctx.worker_name,
            instance_index: ctx.instance_index,
        })
    }
}

#[async_trait]
impl Worker for SinkWorker {
    async fn run(&mut self) -> anyhow::Result<()> {
        let mut received = 0usize;
        while let Message::Data(payload) = self.input.recv().await {
            received += 1;
            tracing::info!(
                worker_name = %self.worker_name,
                instance_index = self.instance_index,
                payload = %payload,
                "Sink received message"
            );
        }
        tracing::debug!(
            worker_name = %self.worker_name,
            instance_index = self.instance_index,
            received,
            "Sink reached end of stream"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sink"
    }
}
