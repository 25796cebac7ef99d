// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // pipeline description, loading, validation
pub mod engine;     // graph build, orchestrator, progress
pub mod errors;     // error handling
pub mod observability;
pub mod queue;      // MPMC queues and the queue registry
pub mod traits;     // worker abstraction
pub mod workers;    // worker registry, factory, built-ins
