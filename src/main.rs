// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yaml_pipeline::config::load_and_validate_config;
use yaml_pipeline::engine::run as run_pipeline;
use yaml_pipeline::workers::builtin::register_builtins;
use yaml_pipeline::workers::WorkerRegistry;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "yaml-pipeline".into());
    let config_path = match (args.next(), args.next()) {
        (Some(path), None) => PathBuf::from(path),
        _ => {
            eprintln!("Usage: {} <pipeline.yaml>", program);
            eprintln!("Example: {} configs/round-trip.yaml", program);
            std::process::exit(1);
        }
    };

    info!("Loading pipeline from {:?}", config_path);
    let config = load_and_validate_config(&config_path)
        .with_context(|| format!("Failed to load pipeline from {:?}", config_path))?;

    let mut registry = WorkerRegistry::new();
    register_builtins(&mut registry);

    let report = run_pipeline(&config, &registry)
        .await
        .context("Pipeline failed")?;

    for worker in &report.workers {
        info!(
            worker_name = %worker.worker_name,
            implementation = %worker.implementation_ref,
            instances = worker.instances,
            failed_instances = worker.failed_instances,
            "Worker '{}' done",
            worker.worker_name
        );
    }
    for (queue, count) in &report.sentinels_sent {
        info!(queue = %queue, sentinels = count, "Queue '{}' closed", queue);
    }
    if report.failed_instances() > 0 {
        warn!(
            "{} worker instance(s) exited abnormally",
            report.failed_instances()
        );
    }
    info!("Pipeline finished in {:?}", report.duration);

    Ok(())
}
