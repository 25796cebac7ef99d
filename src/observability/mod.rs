// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Every diagnostic and operational log record emitted by the pipeline engine
//! is a small message struct with a `Display` implementation and a
//! [`messages::StructuredLog`] implementation that attaches the struct's
//! fields to the `tracing` event. This keeps message text in one place and
//! keeps log fields consistent between call sites.
//!
//! # Usage
//!
//! ```rust
//! use yaml_pipeline::observability::messages::worker::InstanceFailed;
//! use yaml_pipeline::observability::messages::StructuredLog;
//!
//! let error = anyhow::anyhow!("disk full");
//! InstanceFailed {
//!     worker_name: "writer",
//!     instance_index: 0,
//!     error: &error,
//! }
//! .log();
//! ```
//!
//! Installing a subscriber is left to the binary; the library only emits events.

pub mod messages;
