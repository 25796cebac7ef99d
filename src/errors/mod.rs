// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod load;
mod pipeline;

pub use config::ConfigurationError;
pub use load::LoadError;
pub use pipeline::PipelineError;
