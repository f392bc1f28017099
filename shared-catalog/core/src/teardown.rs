// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::CatalogError;
use crate::named_semaphore::NamedSemaphore;
use crate::shared_segment::SharedSegment;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A named resource that must leave the system namespace at the end of a round
pub trait Releasable: Send {
    fn describe(&self) -> String;
    fn release(self: Box<Self>) -> Result<(), CatalogError>;
}

/// Removes a shared segment name
pub struct ReleaseSegment {
    name: String,
}

impl ReleaseSegment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Releasable for ReleaseSegment {
    fn describe(&self) -> String {
        format!("segment {}", self.name)
    }

    fn release(self: Box<Self>) -> Result<(), CatalogError> {
        SharedSegment::unlink(&self.name)
    }
}

/// Removes a semaphore name
pub struct ReleaseSignal {
    name: String,
}

impl ReleaseSignal {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Releasable for ReleaseSignal {
    fn describe(&self) -> String {
        format!("semaphore {}", self.name)
    }

    fn release(self: Box<Self>) -> Result<(), CatalogError> {
        NamedSemaphore::unlink(&self.name)
    }
}

/// Registry of resources to release, shared by the normal exit path and the
/// interrupt handler
///
/// Resources are only registered after they were created, and each one is
/// released at most once no matter how often `release` runs.
#[derive(Clone, Default)]
pub struct Teardown {
    pending: Arc<Mutex<Vec<Box<dyn Releasable>>>>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, resource: impl Releasable + 'static) {
        debug!(resource = %resource.describe(), "registered for teardown");
        self.lock().push(Box::new(resource));
    }

    /// Number of resources not yet released
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Releases everything registered so far, newest first
    ///
    /// Every resource is attempted; the first failure is returned.
    pub fn release(&self) -> Result<(), CatalogError> {
        let resources = mem::take(&mut *self.lock());
        let mut first_error = None;

        for resource in resources.into_iter().rev() {
            let what = resource.describe();
            match resource.release() {
                Ok(()) => debug!(resource = %what, "released"),
                Err(e) => {
                    warn!(resource = %what, error = %e, "release failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Box<dyn Releasable>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
