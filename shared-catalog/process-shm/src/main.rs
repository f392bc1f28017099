// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod process_runtime;
mod shutdown;

use clap::Parser;
use process_runtime::ProcessRuntime;
use shared_catalog_core::config::Config;
use shared_catalog_core::coordinator::Coordinator;
use shared_catalog_core::error::CatalogError;
use shared_catalog_core::layout::CatalogLayout;
use shared_catalog_core::teardown::Teardown;
use shared_catalog_core::worker_runtime::Runnable;
use shared_catalog_core::worker_task::WorkerTask;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Run as a worker process (used internally by the coordinator)
    #[arg(long)]
    worker: bool,

    /// Serialized worker task
    #[arg(long, requires = "worker")]
    task: Option<String>,

    /// Coordinator configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        if cli.worker {
            run_worker(cli.task).await
        } else {
            run_coordinator(&cli.config).await
        }
    });
    // An interrupted round can leave a semaphore wait parked on the blocking pool
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CatalogError::Interrupted) => {
            info!("shared resources released after interruption");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_worker(task: Option<String>) -> Result<(), CatalogError> {
    let task_json =
        task.ok_or_else(|| CatalogError::Config("--task is required in worker mode".into()))?;
    let task: WorkerTask = serde_json::from_str(&task_json)
        .map_err(|e| CatalogError::Config(format!("invalid worker task: {}", e)))?;
    task.run().await
}

async fn run_coordinator(config_path: &Path) -> Result<(), CatalogError> {
    let start_time = Instant::now();

    let config = Config::load_or_default(config_path)?;
    let layout = CatalogLayout::LIBRARY;
    config.log_summary(&layout);

    let teardown = Teardown::new();
    let cancel_token = CancellationToken::new();
    shutdown::listen(cancel_token.clone())?;

    let mut coordinator = Coordinator::<ProcessRuntime>::new(layout, config, teardown.clone());
    let mut stdout = io::stdout();

    tokio::select! {
        result = coordinator.run(&mut stdout) => {
            let records = result?;
            info!(
                records = records.len(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "catalog complete"
            );
            Ok(())
        }
        _ = cancel_token.cancelled() => {
            warn!("round interrupted, releasing shared resources");
            teardown.release()?;
            Err(CatalogError::Interrupted)
        }
    }
}
