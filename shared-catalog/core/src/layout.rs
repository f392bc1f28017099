// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::record::CatalogRecord;
use serde::{Deserialize, Serialize};
use std::mem;
use std::ops::Range;

/// Number of rows in the library; one worker per row
pub const ROWS: usize = 5;
/// Number of shelves in each row
pub const SHELVES: usize = 10;
/// Number of book slots on each shelf
pub const SLOTS: usize = 20;

/// Position of a book in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub row: usize,
    pub shelf: usize,
    pub slot: usize,
}

impl Coordinate {
    pub const fn new(row: usize, shelf: usize, slot: usize) -> Self {
        Self { row, shelf, slot }
    }
}

/// Dimensions of the catalog and the linear addressing derived from them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLayout {
    pub rows: usize,
    pub shelves: usize,
    pub slots: usize,
}

impl CatalogLayout {
    /// The layout the binary is built with
    pub const LIBRARY: CatalogLayout = CatalogLayout::new(ROWS, SHELVES, SLOTS);

    pub const fn new(rows: usize, shelves: usize, slots: usize) -> Self {
        Self {
            rows,
            shelves,
            slots,
        }
    }

    /// Total number of records in the segment
    pub const fn capacity(&self) -> usize {
        self.rows * self.shelves * self.slots
    }

    /// Number of records owned by one worker
    pub const fn row_len(&self) -> usize {
        self.shelves * self.slots
    }

    pub const fn size_bytes(&self) -> usize {
        self.capacity() * mem::size_of::<CatalogRecord>()
    }

    pub const fn index_of(&self, coordinate: Coordinate) -> usize {
        coordinate.row * self.row_len() + coordinate.shelf * self.slots + coordinate.slot
    }

    pub const fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.row < self.rows
            && coordinate.shelf < self.shelves
            && coordinate.slot < self.slots
    }

    /// Index range written by the worker owning `row`
    pub const fn partition(&self, row: usize) -> Range<usize> {
        let start = row * self.row_len();
        start..start + self.row_len()
    }

    /// Every coordinate of one row, in index order
    pub fn row_coordinates(&self, row: usize) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.shelves).flat_map(move |shelf| {
            (0..self.slots).map(move |slot| Coordinate::new(row, shelf, slot))
        })
    }

    /// Every coordinate of the catalog, in index order
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.rows).flat_map(move |row| self.row_coordinates(row))
    }
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self::LIBRARY
    }
}
