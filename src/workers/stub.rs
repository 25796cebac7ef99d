// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only workers for exercising the engine.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::queue::{Message, Payload, Queue};
use crate::traits::{Worker, WorkerContext};
use crate::workers::WorkerRegistry;

/// What one consumer instance observed before it stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerRecord {
    pub worker_name: String,
    pub instance_index: usize,
    pub values: Vec<Payload>,
    pub sentinels: usize,
}

/// Shared log that recording consumers append to when they exit.
pub type Journal = Arc<Mutex<Vec<ConsumerRecord>>>;

/// Registers every stub under `test.<Class>`.
pub fn register_stubs(registry: &mut WorkerRegistry, journal: &Journal) {
    let journal = journal.clone();
    registry
        .register("test.Idle", |ctx| Ok(IdleWorker::new(ctx)))
        .register("test.Failing", |_ctx| Ok(FailingWorker))
        .register("test.Panicking", |_ctx| Ok(PanickingWorker))
        .register("test.Recorder", move |ctx| RecordingConsumer::new(ctx, journal.clone()));
}

/// Returns immediately.
pub struct IdleWorker {
    _ctx: WorkerContext,
}

impl IdleWorker {
    pub fn new(ctx: WorkerContext) -> Self {
        Self { _ctx: ctx }
    }
}

#[async_trait]
impl Worker for IdleWorker {
    async fn run(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "idle"
    }
}

/// Always returns an error from `run()`.
pub struct FailingWorker;

#[async_trait]
impl Worker for FailingWorker {
    async fn run(&mut self) -> anyhow::Result<()> {
        anyhow::bail!("simulated worker failure")
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Panics inside `run()`.
pub struct PanickingWorker;

#[async_trait]
impl Worker for PanickingWorker {
    async fn run(&mut self) -> anyhow::Result<()> {
        panic!("simulated worker panic");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Reads its input until one sentinel, optionally forwarding data, and
/// journals everything it saw.
pub struct RecordingConsumer {
    record: ConsumerRecord,
    input: Queue,
    outputs: Vec<Queue>,
    journal: Journal,
}

impl RecordingConsumer {
    pub fn new(ctx: WorkerContext, journal: Journal) -> anyhow::Result<Self> {
        Ok(Self {
            input: ctx.require_input()?,
            outputs: ctx.output_queues,
            record: ConsumerRecord {
                worker_name: ctx.worker_name,
                instance_index: ctx.instance_index,
                values: Vec::new(),
                sentinels: 0,
            },
            journal,
        })
    }
}

#[async_trait]
impl Worker for RecordingConsumer {
    async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match self.input.recv().await {
                Message::Data(payload) => {
                    for output in &self.outputs {
                        output.push(payload.clone());
                    }
                    self.record.values.push(payload);
                }
                Message::Done => {
                    self.record.sentinels += 1;
                    break;
                }
            }
        }
        self.journal
            .lock()
            .map_err(|_| anyhow::anyhow!("journal poisoned"))?
            .push(self.record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}
