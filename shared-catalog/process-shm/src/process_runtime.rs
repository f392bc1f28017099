// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use shared_catalog_core::error::CatalogError;
use shared_catalog_core::worker_runtime::WorkerRuntime;
use shared_catalog_core::worker_task::WorkerTask;
use std::io;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

/// Child process that is killed if its handle is dropped before it exits
pub struct AutoKillChild {
    row: usize,
    child: Child,
}

impl Drop for AutoKillChild {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// Runs each worker as a separate process by re-executing this binary in
/// worker mode
pub struct ProcessRuntime;

impl WorkerRuntime for ProcessRuntime {
    type Handle = AutoKillChild;

    fn spawn(task: WorkerTask) -> Result<Self::Handle, CatalogError> {
        let row = task.row;
        let exe = std::env::current_exe().map_err(|source| CatalogError::Spawn { row, source })?;
        let task_json = serde_json::to_string(&task).map_err(|e| CatalogError::Spawn {
            row,
            source: io::Error::new(io::ErrorKind::InvalidInput, e),
        })?;

        // stdout belongs to the coordinator's report
        let child = Command::new(exe)
            .arg("--worker")
            .arg("--task")
            .arg(task_json)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| CatalogError::Spawn { row, source })?;

        debug!(row, pid = child.id(), "worker process spawned");
        Ok(AutoKillChild { row, child })
    }

    async fn join(mut handle: Self::Handle) -> Result<(), CatalogError> {
        let status = handle.child.wait().await.map_err(|e| {
            CatalogError::Runtime(format!("failed to wait for worker {}: {}", handle.row, e))
        })?;
        if !status.success() {
            return Err(CatalogError::Runtime(format!(
                "worker {} exited with {}",
                handle.row, status
            )));
        }
        Ok(())
    }
}
