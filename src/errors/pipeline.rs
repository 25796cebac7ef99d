// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::ConfigurationError;

/// Orchestrator lifecycle misuse, build failures and supervisor faults.
///
/// Worker failures never show up here: they are absorbed into liveness
/// accounting and reported through [`crate::engine::PipelineReport`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline has already been started")]
    AlreadyStarted,

    #[error("Pipeline has not been started")]
    NotStarted,

    #[error("Pipeline has already been joined")]
    AlreadyJoined,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Supervisor task failed: {0}")]
    SupervisorFailed(String),
}
