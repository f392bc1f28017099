// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::unique_name;
use shared_catalog_core::error::CatalogError;
use shared_catalog_core::layout::CatalogLayout;
use shared_catalog_core::named_semaphore::NamedSemaphore;
use shared_catalog_core::shared_segment::SharedSegment;
use shared_catalog_core::teardown::{Releasable, ReleaseSegment, ReleaseSignal, Teardown};
use std::sync::{Arc, Mutex};

const LAYOUT: CatalogLayout = CatalogLayout::new(1, 1, 2);

struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    fail: bool,
}

impl Releasable for Recorder {
    fn describe(&self) -> String {
        self.label.to_string()
    }

    fn release(self: Box<Self>) -> Result<(), CatalogError> {
        self.log.lock().unwrap().push(self.label);
        if self.fail {
            return Err(CatalogError::Runtime(format!("{} refused", self.label)));
        }
        Ok(())
    }
}

#[test]
fn test_release_removes_both_names() {
    let segment_name = unique_name("td_shm");
    let signal_name = unique_name("td_sem");
    let teardown = Teardown::new();

    let signal = NamedSemaphore::create(&signal_name).unwrap();
    teardown.register(ReleaseSignal::new(&signal_name));
    let segment = SharedSegment::create(&segment_name, LAYOUT).unwrap();
    teardown.register(ReleaseSegment::new(&segment_name));
    drop(segment);
    drop(signal);

    teardown.release().unwrap();

    assert!(SharedSegment::open(&segment_name, LAYOUT).is_err());
    assert!(NamedSemaphore::open(&signal_name).is_err());
}

#[test]
fn test_release_twice_is_harmless() {
    let segment_name = unique_name("twice_shm");
    let teardown = Teardown::new();
    let _segment = SharedSegment::create(&segment_name, LAYOUT).unwrap();
    teardown.register(ReleaseSegment::new(&segment_name));

    teardown.release().unwrap();
    assert_eq!(teardown.pending(), 0);
    teardown.release().unwrap();

    assert!(SharedSegment::open(&segment_name, LAYOUT).is_err());
}

#[test]
fn test_release_with_nothing_registered() {
    let teardown = Teardown::new();
    teardown.release().unwrap();
}

#[test]
fn test_release_of_already_removed_names_succeeds() {
    let teardown = Teardown::new();
    teardown.register(ReleaseSignal::new(&unique_name("never_sem")));
    teardown.register(ReleaseSegment::new(&unique_name("never_shm")));
    teardown.release().unwrap();
}

#[test]
fn test_clones_share_one_registry() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let teardown = Teardown::new();
    let handler = teardown.clone();

    teardown.register(Recorder {
        label: "segment",
        log: log.clone(),
        fail: false,
    });
    handler.release().unwrap();
    teardown.release().unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["segment"]);
}

#[test]
fn test_release_runs_newest_first_and_attempts_everything() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let teardown = Teardown::new();
    for (label, fail) in [("signal", false), ("segment", true), ("extra", false)] {
        teardown.register(Recorder {
            label,
            log: log.clone(),
            fail,
        });
    }

    let result = teardown.release();

    assert!(matches!(result, Err(CatalogError::Runtime(msg)) if msg == "segment refused"));
    assert_eq!(*log.lock().unwrap(), vec!["extra", "segment", "signal"]);
    assert_eq!(teardown.pending(), 0);
}
