// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::layout::Coordinate;
use nix::errno::Errno;
use std::fmt;
use std::io;

/// Errors raised while running a coordination round
#[derive(Debug)]
pub enum CatalogError {
    /// A named segment or semaphore could not be created, opened, mapped or removed
    Resource {
        op: &'static str,
        name: String,
        source: Errno,
    },

    /// A worker could not be spawned for the given row
    Spawn { row: usize, source: io::Error },

    /// Posting to or waiting on the completion signal failed
    Signal { op: &'static str, source: Errno },

    /// A blocking wait or a worker join failed inside the runtime
    Runtime(String),

    /// Id text does not fit in a record
    IdTooLong { len: usize },

    /// Id text is not a canonical coordinate encoding
    MalformedId(String),

    /// A coordinate component does not fit in a record field
    CoordinateOutOfRange(Coordinate),

    /// Configuration could not be loaded
    Config(String),

    /// The catalog report could not be written
    Output(io::Error),

    /// The operator asked the round to stop
    Interrupted,
}

impl CatalogError {
    pub(crate) fn resource(op: &'static str, name: &str, source: Errno) -> Self {
        CatalogError::Resource {
            op,
            name: name.to_string(),
            source,
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Resource { op, name, source } => {
                write!(f, "{} failed for '{}': {}", op, name, source)
            }
            CatalogError::Spawn { row, source } => {
                write!(f, "failed to spawn worker for row {}: {}", row, source)
            }
            CatalogError::Signal { op, source } => write!(f, "{} failed: {}", op, source),
            CatalogError::Runtime(msg) => write!(f, "runtime failure: {}", msg),
            CatalogError::IdTooLong { len } => write!(
                f,
                "id of {} bytes exceeds the {} byte limit",
                len,
                crate::record::BookId::CAPACITY
            ),
            CatalogError::MalformedId(text) => write!(f, "malformed book id '{}'", text),
            CatalogError::CoordinateOutOfRange(c) => write!(
                f,
                "coordinate {}-{}-{} does not fit in a record",
                c.row, c.shelf, c.slot
            ),
            CatalogError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            CatalogError::Output(e) => write!(f, "failed to write catalog: {}", e),
            CatalogError::Interrupted => write!(f, "interrupted by operator"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Resource { source, .. } => Some(source),
            CatalogError::Spawn { source, .. } => Some(source),
            CatalogError::Signal { source, .. } => Some(source),
            CatalogError::Output(source) => Some(source),
            _ => None,
        }
    }
}
