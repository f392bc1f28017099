// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::CatalogError;
use crate::worker_task::WorkerTask;
use async_trait::async_trait;
use std::future::Future;
use tokio::task::{self, JoinHandle};

/// Defines a unit of work that can be executed
#[async_trait]
pub trait Runnable: Send + 'static {
    type Output;
    async fn run(self) -> Self::Output;
}

/// Trait for abstracting where workers run (tasks, processes)
pub trait WorkerRuntime: Send + 'static {
    type Handle: Send;

    /// Start a worker for the task's row
    fn spawn(task: WorkerTask) -> Result<Self::Handle, CatalogError>;

    /// Wait for the worker to exit
    fn join(handle: Self::Handle) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

/// Runs workers as tokio tasks inside the current process
///
/// Each task still attaches to the segment and the semaphore by name, so the
/// protocol is the same as with separate processes.
pub struct TokioRuntime;

impl WorkerRuntime for TokioRuntime {
    type Handle = JoinHandle<Result<(), CatalogError>>;

    fn spawn(task: WorkerTask) -> Result<Self::Handle, CatalogError> {
        Ok(task::spawn(task.run()))
    }

    async fn join(handle: Self::Handle) -> Result<(), CatalogError> {
        handle
            .await
            .map_err(|e| CatalogError::Runtime(format!("worker task failed: {}", e)))?
    }
}
