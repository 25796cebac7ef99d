// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `pipeline` - build, supervision cycle, sentinel cascade and shutdown events
//! * `worker` - worker instance lifecycle events
//! * `validation` - configuration validation errors

use tracing::Span;

pub mod pipeline;
pub mod validation;
pub mod worker;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event at its natural level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
