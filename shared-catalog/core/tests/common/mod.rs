// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use shared_catalog_core::config::Config;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_NAME: AtomicUsize = AtomicUsize::new(0);

/// A POSIX object name no other test or process is using
pub fn unique_name(tag: &str) -> String {
    let n = NEXT_NAME.fetch_add(1, Ordering::SeqCst);
    format!("/catalog_test_{}_{}_{}", tag, std::process::id(), n)
}

/// Config with fresh names and no simulated delay
pub fn test_config(tag: &str) -> Config {
    Config {
        segment_name: unique_name(&format!("{}_shm", tag)),
        signal_name: unique_name(&format!("{}_sem", tag)),
        max_worker_delay_ms: 0,
    }
}
