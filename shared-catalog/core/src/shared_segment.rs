// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::CatalogError;
use crate::layout::CatalogLayout;
use crate::record::CatalogRecord;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use std::fs::File;
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use std::slice;
use tracing::{debug, warn};

/// A named POSIX shared-memory segment holding the whole catalog
///
/// The segment does no synchronization of its own. Concurrent writers must
/// stay inside the partition they were assigned.
pub struct SharedSegment {
    name: String,
    layout: CatalogLayout,
    base: NonNull<CatalogRecord>,
}

// The mapping is plain memory owned by this handle; cross-process access is
// governed by partition ownership, not by the handle.
unsafe impl Send for SharedSegment {}
unsafe impl Sync for SharedSegment {}

impl SharedSegment {
    /// Creates the named segment sized for `layout` and maps it
    ///
    /// A stale segment left under the same name is removed first.
    pub fn create(name: &str, layout: CatalogLayout) -> Result<Self, CatalogError> {
        let create_flags = OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR;
        let fd = match shm_open(name, create_flags, segment_mode()) {
            Ok(fd) => fd,
            Err(Errno::EEXIST) => {
                warn!(name, "reclaiming stale shared segment");
                Self::unlink(name)?;
                shm_open(name, create_flags, segment_mode())
                    .map_err(|e| CatalogError::resource("shm_open", name, e))?
            }
            Err(e) => return Err(CatalogError::resource("shm_open", name, e)),
        };

        let file = File::from(fd);
        let mapped = file
            .set_len(layout.size_bytes() as u64)
            .map_err(|e| CatalogError::resource("ftruncate", name, io_errno(&e)))
            .and_then(|_| Self::map(name, layout, &file));

        match mapped {
            Ok(segment) => {
                debug!(name, bytes = layout.size_bytes(), "shared segment created");
                Ok(segment)
            }
            Err(e) => {
                // Creation did not complete; leave nothing behind under the name
                let _ = Self::unlink(name);
                Err(e)
            }
        }
    }

    /// Maps an existing segment created by the coordinator
    pub fn open(name: &str, layout: CatalogLayout) -> Result<Self, CatalogError> {
        let fd = shm_open(name, OFlag::O_RDWR, Mode::empty())
            .map_err(|e| CatalogError::resource("shm_open", name, e))?;
        let file = File::from(fd);

        let actual = file
            .metadata()
            .map_err(|e| CatalogError::resource("fstat", name, io_errno(&e)))?
            .len();
        if actual != layout.size_bytes() as u64 {
            return Err(CatalogError::resource("open", name, Errno::EINVAL));
        }

        Self::map(name, layout, &file)
    }

    fn map(name: &str, layout: CatalogLayout, file: &File) -> Result<Self, CatalogError> {
        let length = NonZeroUsize::new(layout.size_bytes())
            .ok_or_else(|| CatalogError::resource("mmap", name, Errno::EINVAL))?;

        // SAFETY: a fresh shared mapping of a descriptor sized to `length`;
        // no existing Rust memory is aliased.
        let base = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                file,
                0,
            )
        }
        .map_err(|e| CatalogError::resource("mmap", name, e))?;

        Ok(Self {
            name: name.to_string(),
            layout,
            base: base.cast(),
        })
    }

    /// Removes the segment name; a name that is already gone is not an error
    pub fn unlink(name: &str) -> Result<(), CatalogError> {
        match shm_unlink(name) {
            Ok(()) | Err(Errno::ENOENT) => Ok(()),
            Err(e) => Err(CatalogError::resource("shm_unlink", name, e)),
        }
    }

    /// Unmaps the segment and removes its name
    pub fn destroy(self) -> Result<(), CatalogError> {
        let name = self.name.clone();
        drop(self);
        Self::unlink(&name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[CatalogRecord] {
        // SAFETY: the mapping holds `capacity` records and lives as long as self.
        // Every bit pattern is a valid CatalogRecord.
        unsafe { slice::from_raw_parts(self.base.as_ptr(), self.layout.capacity()) }
    }

    pub fn records_mut(&mut self) -> &mut [CatalogRecord] {
        // SAFETY: as in `records`, and `&mut self` makes this the only view in
        // this process.
        unsafe { slice::from_raw_parts_mut(self.base.as_ptr(), self.layout.capacity()) }
    }

    pub fn record_at(&mut self, index: usize) -> &mut CatalogRecord {
        &mut self.records_mut()[index]
    }

    /// The records owned by the worker for `row`
    pub fn partition_mut(&mut self, row: usize) -> &mut [CatalogRecord] {
        let range = self.layout.partition(row);
        &mut self.records_mut()[range]
    }
}

impl Drop for SharedSegment {
    fn drop(&mut self) {
        // SAFETY: base and size are exactly what mmap returned for this handle.
        if let Err(e) = unsafe { munmap(self.base.cast(), self.layout.size_bytes()) } {
            warn!(name = %self.name, error = %e, "munmap failed");
        }
    }
}

fn segment_mode() -> Mode {
    Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH
}

fn io_errno(e: &std::io::Error) -> Errno {
    e.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO)
}
