// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker construction for pipeline execution.
//!
//! Worker implementations are looked up by name in a [`WorkerRegistry`] that
//! the embedding application fills before building a pipeline:
//!
//! ```text
//! WorkerConfig.implementation_ref() → WorkerRegistry → WorkerConstructor → N × WorkerInstance
//! ```
//!
//! The [`builtin`] module provides a few plumbing workers (emit, relay, sink)
//! that carry no business logic of their own.
//!
//! ```rust
//! use yaml_pipeline::config::{QueueConfig, WorkerConfig};
//! use yaml_pipeline::queue::QueueRegistry;
//! use yaml_pipeline::workers::{builtin, WorkerRegistry};
//!
//! let mut registry = WorkerRegistry::new();
//! builtin::register_builtins(&mut registry);
//!
//! let queues = QueueRegistry::create(["numbers"]).unwrap();
//! let spec = WorkerConfig::new("sink", "builtin", "Sink")
//!     .with_input("numbers")
//!     .with_instances(3);
//!
//! let instances = registry.instantiate(&spec, &queues).unwrap();
//! assert_eq!(instances.len(), 3);
//! ```

pub mod builtin;
pub mod factory;
#[cfg(test)]
pub mod stub;

pub use factory::{WorkerConstructor, WorkerInstance, WorkerRegistry};
