// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named message queues connecting worker instances.
//!
//! A [`Queue`] is an unbounded FIFO channel that any number of producers may
//! write to and any number of consumers may read from. Consumers share a single
//! receiving half, so the total enqueue order is preserved for the readers as
//! a group; which consumer receives a given message is unspecified.
//!
//! End of stream is signalled in-band with [`Message::Done`]. A consumer is
//! expected to stop after reading exactly one sentinel.

mod registry;

pub use registry::QueueRegistry;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Payload carried by a data message.
pub type Payload = serde_json::Value;

/// A single item travelling through a queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A unit of work produced by an upstream worker.
    Data(Payload),
    /// Termination sentinel: no further data will arrive for this consumer.
    Done,
}

impl Message {
    pub fn is_done(&self) -> bool {
        matches!(self, Message::Done)
    }

    /// Returns the payload of a data message, `None` for the sentinel.
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            Message::Data(payload) => Some(payload),
            Message::Done => None,
        }
    }
}

/// Cloneable handle to a named multi-producer, multi-consumer FIFO channel.
///
/// Cloning is cheap; every clone refers to the same underlying channel.
#[derive(Clone)]
pub struct Queue {
    name: Arc<str>,
    sender: mpsc::UnboundedSender<Message>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Message>>>,
    depth: Arc<AtomicUsize>,
}

impl Queue {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            name: name.into(),
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueues a message. Never blocks.
    pub fn send(&self, message: Message) {
        // Incremented first: a consumer must never decrement below zero.
        self.depth.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(message).is_err() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Enqueues a data message.
    pub fn push(&self, payload: impl Into<Payload>) {
        self.send(Message::Data(payload.into()));
    }

    /// Enqueues one termination sentinel.
    pub fn send_done(&self) {
        self.send(Message::Done);
    }

    /// Waits for the next message.
    ///
    /// Consumers wait their turn on the shared receiver, then on the channel.
    /// A closed channel is reported as [`Message::Done`].
    pub async fn recv(&self) -> Message {
        let message = {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        };
        match message {
            Some(message) => {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                message
            }
            None => Message::Done,
        }
    }

    /// Takes the next message if one is immediately available.
    ///
    /// Returns `None` when the queue is empty or another consumer currently
    /// holds the receiver.
    pub fn try_recv(&self) -> Option<Message> {
        let mut receiver = self.receiver.try_lock().ok()?;
        let message = receiver.try_recv().ok()?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Some(message)
    }

    /// Point-in-time estimate of queued messages, sentinels included.
    ///
    /// May be stale under concurrent traffic; use for observability only.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("depth", &self.len())
            .finish()
    }
}
