// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod completion_signal;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod layout;
pub mod named_semaphore;
pub mod record;
pub mod report;
pub mod shared_segment;
pub mod teardown;
pub mod worker_runtime;
pub mod worker_task;
