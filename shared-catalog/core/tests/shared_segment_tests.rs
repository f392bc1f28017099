// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::unique_name;
use shared_catalog_core::error::CatalogError;
use shared_catalog_core::layout::{CatalogLayout, Coordinate};
use shared_catalog_core::record::CatalogRecord;
use shared_catalog_core::shared_segment::SharedSegment;

const LAYOUT: CatalogLayout = CatalogLayout::new(2, 3, 4);

#[test]
fn test_new_segment_is_zeroed() {
    let name = unique_name("zeroed");
    let segment = SharedSegment::create(&name, LAYOUT).unwrap();

    assert_eq!(segment.records().len(), LAYOUT.capacity());
    assert!(segment.records().iter().all(|r| *r == CatalogRecord::default()));

    segment.destroy().unwrap();
}

#[test]
fn test_writes_are_visible_through_another_mapping() {
    let name = unique_name("shared");
    let mut creator = SharedSegment::create(&name, LAYOUT).unwrap();
    let mut attached = SharedSegment::open(&name, LAYOUT).unwrap();

    let coordinate = Coordinate::new(1, 2, 3);
    let index = LAYOUT.index_of(coordinate);
    *attached.record_at(index) = CatalogRecord::new(coordinate).unwrap();
    drop(attached);

    let record = *creator.record_at(index);
    assert_eq!(record.id.as_str().unwrap(), "Book 1-2-3");
    assert_eq!((record.row, record.shelf, record.slot), (1, 2, 3));

    creator.destroy().unwrap();
}

#[test]
fn test_partition_view_matches_index_range() {
    let name = unique_name("partition");
    let mut segment = SharedSegment::create(&name, LAYOUT).unwrap();

    for record in segment.partition_mut(1) {
        record.row = 1;
    }
    let rows: Vec<i32> = segment.records().iter().map(|r| r.row).collect();
    let row_len = LAYOUT.row_len();
    assert!(rows[..row_len].iter().all(|&row| row == 0));
    assert!(rows[row_len..].iter().all(|&row| row == 1));

    segment.destroy().unwrap();
}

#[test]
fn test_open_missing_segment_fails() {
    let name = unique_name("missing");
    assert!(matches!(
        SharedSegment::open(&name, LAYOUT),
        Err(CatalogError::Resource { op: "shm_open", .. })
    ));
}

#[test]
fn test_open_with_wrong_layout_fails() {
    let name = unique_name("mismatch");
    let segment = SharedSegment::create(&name, LAYOUT).unwrap();

    assert!(matches!(
        SharedSegment::open(&name, CatalogLayout::new(3, 3, 4)),
        Err(CatalogError::Resource { .. })
    ));

    segment.destroy().unwrap();
}

#[test]
fn test_destroy_removes_the_name() {
    let name = unique_name("destroy");
    let segment = SharedSegment::create(&name, LAYOUT).unwrap();
    segment.destroy().unwrap();

    assert!(SharedSegment::open(&name, LAYOUT).is_err());
    SharedSegment::unlink(&name).unwrap();
}

#[test]
fn test_create_reclaims_stale_segment() {
    let name = unique_name("stale");
    let mut stale = SharedSegment::create(&name, LAYOUT).unwrap();
    stale.records_mut()[0].row = 42;
    // Simulate a killed run: the mapping goes away but the name stays
    drop(stale);

    let fresh = SharedSegment::create(&name, LAYOUT).unwrap();
    assert_eq!(fresh.records()[0].row, 0);

    fresh.destroy().unwrap();
}

#[test]
fn test_empty_layout_cannot_be_mapped() {
    let name = unique_name("empty");
    let result = SharedSegment::create(&name, CatalogLayout::new(0, 1, 1));
    assert!(matches!(result, Err(CatalogError::Resource { op: "mmap", .. })));
    assert!(SharedSegment::open(&name, LAYOUT).is_err(), "failed create leaves no name");
}
