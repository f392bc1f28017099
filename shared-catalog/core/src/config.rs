// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::CatalogError;
use crate::layout::CatalogLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Longest object name accepted by every platform's sem_open
const MAX_NAME_LEN: usize = 250;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name of the shared-memory segment, e.g. `/book_shm`
    #[serde(default = "default_segment_name")]
    pub segment_name: String,
    /// Name of the completion semaphore, e.g. `/book_sem`
    #[serde(default = "default_signal_name")]
    pub signal_name: String,
    /// Maximum simulated work delay per worker in milliseconds (0 = no delay)
    #[serde(default = "default_max_worker_delay")]
    pub max_worker_delay_ms: u64,
}

fn default_segment_name() -> String {
    "/book_shm".to_string()
}

fn default_signal_name() -> String {
    "/book_sem".to_string()
}

fn default_max_worker_delay() -> u64 {
    14_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_name: default_segment_name(),
            signal_name: default_signal_name(),
            max_worker_delay_ms: default_max_worker_delay(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to the defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            _ => Self::load(path),
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        validate_name("segment_name", &self.segment_name)?;
        validate_name("signal_name", &self.signal_name)
    }

    pub fn log_summary(&self, layout: &CatalogLayout) {
        info!(
            rows = layout.rows,
            shelves = layout.shelves,
            slots = layout.slots,
            records = layout.capacity(),
            segment = %self.segment_name,
            signal = %self.signal_name,
            max_worker_delay_ms = self.max_worker_delay_ms,
            "catalog configuration"
        );
    }
}

/// POSIX object names are a single leading slash followed by a non-empty
/// slash-free component
fn validate_name(field: &str, name: &str) -> Result<(), CatalogError> {
    let Some(rest) = name.strip_prefix('/') else {
        return Err(CatalogError::Config(format!("{} must start with '/'", field)));
    };
    if rest.is_empty() || rest.contains('/') || rest.contains('\0') {
        return Err(CatalogError::Config(format!(
            "{} '{}' must be '/' followed by a plain name",
            field, name
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CatalogError::Config(format!(
            "{} is longer than {} bytes",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}
