// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::completion_signal::CompletionSignal;
use crate::error::CatalogError;
use nix::errno::Errno;
use std::ffi::CString;
use std::ptr::NonNull;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};

const SEMAPHORE_MODE: libc::c_uint = 0o644;

/// Open handle to a POSIX named semaphore, closed on drop
struct RawSemaphore {
    name: String,
    sem: NonNull<libc::sem_t>,
}

// POSIX semaphores may be used from any thread of the process.
unsafe impl Send for RawSemaphore {}
unsafe impl Sync for RawSemaphore {}

impl RawSemaphore {
    fn post(&self) -> Result<(), CatalogError> {
        // SAFETY: `sem` came from a successful sem_open and stays open until drop.
        if unsafe { libc::sem_post(self.sem.as_ptr()) } == -1 {
            return Err(CatalogError::Signal {
                op: "sem_post",
                source: Errno::last(),
            });
        }
        Ok(())
    }

    fn wait_blocking(&self) -> Result<(), CatalogError> {
        loop {
            // SAFETY: as in `post`.
            if unsafe { libc::sem_wait(self.sem.as_ptr()) } == 0 {
                return Ok(());
            }
            match Errno::last() {
                Errno::EINTR => continue,
                source => {
                    return Err(CatalogError::Signal {
                        op: "sem_wait",
                        source,
                    })
                }
            }
        }
    }

    fn try_wait(&self) -> Result<bool, CatalogError> {
        loop {
            // SAFETY: as in `post`.
            if unsafe { libc::sem_trywait(self.sem.as_ptr()) } == 0 {
                return Ok(true);
            }
            match Errno::last() {
                Errno::EINTR => continue,
                Errno::EAGAIN => return Ok(false),
                source => {
                    return Err(CatalogError::Signal {
                        op: "sem_trywait",
                        source,
                    })
                }
            }
        }
    }
}

impl Drop for RawSemaphore {
    fn drop(&mut self) {
        // SAFETY: last reference to a handle returned by sem_open.
        if unsafe { libc::sem_close(self.sem.as_ptr()) } == -1 {
            warn!(name = %self.name, error = %Errno::last(), "sem_close failed");
        }
    }
}

/// A system-wide counting semaphore identified by name
///
/// Clones share one OS handle, which is closed when the last clone drops.
#[derive(Clone)]
pub struct NamedSemaphore {
    raw: Arc<RawSemaphore>,
}

impl NamedSemaphore {
    /// Creates the semaphore with a count of zero
    ///
    /// A stale semaphore left under the same name is removed first.
    pub fn create(name: &str) -> Result<Self, CatalogError> {
        let c_name = c_name(name)?;
        let oflag = libc::O_CREAT | libc::O_EXCL;

        let sem = match open_raw(&c_name, oflag) {
            Ok(sem) => sem,
            Err(Errno::EEXIST) => {
                warn!(name, "reclaiming stale semaphore");
                Self::unlink(name)?;
                open_raw(&c_name, oflag).map_err(|e| CatalogError::resource("sem_open", name, e))?
            }
            Err(e) => return Err(CatalogError::resource("sem_open", name, e)),
        };

        debug!(name, "semaphore created");
        Ok(Self::from_raw(name, sem))
    }

    /// Attaches to a semaphore created by the coordinator
    pub fn open(name: &str) -> Result<Self, CatalogError> {
        let c_name = c_name(name)?;
        let sem = open_raw(&c_name, 0).map_err(|e| CatalogError::resource("sem_open", name, e))?;
        Ok(Self::from_raw(name, sem))
    }

    fn from_raw(name: &str, sem: NonNull<libc::sem_t>) -> Self {
        Self {
            raw: Arc::new(RawSemaphore {
                name: name.to_string(),
                sem,
            }),
        }
    }

    /// Removes the semaphore name; a name that is already gone is not an error
    pub fn unlink(name: &str) -> Result<(), CatalogError> {
        let c_name = c_name(name)?;
        // SAFETY: c_name is a valid NUL-terminated string.
        if unsafe { libc::sem_unlink(c_name.as_ptr()) } == -1 {
            match Errno::last() {
                Errno::ENOENT => {}
                e => return Err(CatalogError::resource("sem_unlink", name, e)),
            }
        }
        Ok(())
    }

    /// Closes this handle and removes the name
    pub fn destroy(self) -> Result<(), CatalogError> {
        let name = self.name().to_string();
        drop(self);
        Self::unlink(&name)
    }

    pub fn name(&self) -> &str {
        &self.raw.name
    }

    /// Consumes one unit if available without blocking
    pub fn try_wait(&self) -> Result<bool, CatalogError> {
        self.raw.try_wait()
    }
}

impl CompletionSignal for NamedSemaphore {
    fn post(&self) -> Result<(), CatalogError> {
        self.raw.post()
    }

    async fn wait(&self) -> Result<(), CatalogError> {
        let raw = Arc::clone(&self.raw);
        task::spawn_blocking(move || raw.wait_blocking())
            .await
            .map_err(|e| CatalogError::Runtime(format!("semaphore wait task failed: {}", e)))?
    }
}

fn c_name(name: &str) -> Result<CString, CatalogError> {
    CString::new(name).map_err(|_| CatalogError::resource("sem_open", name, Errno::EINVAL))
}

fn open_raw(name: &CString, oflag: libc::c_int) -> Result<NonNull<libc::sem_t>, Errno> {
    // SAFETY: name is NUL-terminated; mode and initial value are only read
    // when O_CREAT is set.
    let sem = unsafe { libc::sem_open(name.as_ptr(), oflag, SEMAPHORE_MODE, 0 as libc::c_uint) };
    if sem == libc::SEM_FAILED {
        return Err(Errno::last());
    }
    NonNull::new(sem).ok_or(Errno::EINVAL)
}
