// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::CatalogError;
use crate::layout::Coordinate;
use std::cmp::Ordering;
use std::fmt;

const ID_PREFIX: &str = "Book ";

/// Bounded-length book identifier stored inline in a record
///
/// The text is NUL-padded, so an all-zero value is the empty id.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookId([u8; BookId::CAPACITY]);

impl BookId {
    /// Maximum id length in bytes
    pub const CAPACITY: usize = 32;

    pub const EMPTY: BookId = BookId([0; BookId::CAPACITY]);

    /// Builds an id from arbitrary text, rejecting text that does not fit
    pub fn new(text: &str) -> Result<Self, CatalogError> {
        let bytes = text.as_bytes();
        if bytes.len() > Self::CAPACITY {
            return Err(CatalogError::IdTooLong { len: bytes.len() });
        }
        if bytes.contains(&0) {
            return Err(CatalogError::MalformedId(text.to_string()));
        }
        let mut buf = [0u8; Self::CAPACITY];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Canonical encoding of a coordinate: `Book <row>-<shelf>-<slot>`
    pub fn from_coordinate(coordinate: Coordinate) -> Result<Self, CatalogError> {
        Self::new(&format!(
            "{}{}-{}-{}",
            ID_PREFIX, coordinate.row, coordinate.shelf, coordinate.slot
        ))
    }

    /// Decodes the coordinate this id was encoded from
    pub fn coordinate(&self) -> Result<Coordinate, CatalogError> {
        let text = self.as_str()?;
        let malformed = || CatalogError::MalformedId(text.to_string());

        let rest = text.strip_prefix(ID_PREFIX).ok_or_else(malformed)?;
        let mut parts = rest.split('-').map(parse_index);
        let (Some(Some(row)), Some(Some(shelf)), Some(Some(slot)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let coordinate = Coordinate::new(row, shelf, slot);
        // Rejects leading zeros and anything else that would not re-encode identically
        if Self::from_coordinate(coordinate)? != *self {
            return Err(malformed());
        }
        Ok(coordinate)
    }

    /// The id bytes without NUL padding
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(Self::CAPACITY);
        &self.0[..len]
    }

    pub fn as_str(&self) -> Result<&str, CatalogError> {
        std::str::from_utf8(self.as_bytes())
            .map_err(|_| CatalogError::MalformedId(String::from_utf8_lossy(self.as_bytes()).into()))
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

fn parse_index(part: &str) -> Option<usize> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl Default for BookId {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Ord for BookId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialOrd for BookId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookId({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// One catalog entry as laid out in shared memory
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogRecord {
    pub id: BookId,
    pub row: i32,
    pub shelf: i32,
    pub slot: i32,
}

impl CatalogRecord {
    pub fn new(coordinate: Coordinate) -> Result<Self, CatalogError> {
        let field = |value: usize| {
            i32::try_from(value).map_err(|_| CatalogError::CoordinateOutOfRange(coordinate))
        };
        Ok(Self {
            id: BookId::from_coordinate(coordinate)?,
            row: field(coordinate.row)?,
            shelf: field(coordinate.shelf)?,
            slot: field(coordinate.slot)?,
        })
    }

    /// The coordinate stored in the numeric fields
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(
            usize::try_from(self.row).ok()?,
            usize::try_from(self.shelf).ok()?,
            usize::try_from(self.slot).ok()?,
        ))
    }

    /// True when the id is the canonical encoding of the numeric fields
    pub fn is_consistent(&self) -> bool {
        match (self.coordinate(), self.id.coordinate()) {
            (Some(fields), Ok(decoded)) => fields == decoded,
            _ => false,
        }
    }
}
