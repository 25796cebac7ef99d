// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigurationError;
use thiserror::Error;

/// Errors from reading a pipeline file off disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read pipeline file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML pipeline: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML pipeline: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file parsed but describes an invalid pipeline. Carries every problem found.
    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ConfigurationError>),
}

fn join_errors(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
