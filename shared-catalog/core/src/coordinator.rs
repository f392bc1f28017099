// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::completion_signal::CompletionSignal;
use crate::config::Config;
use crate::error::CatalogError;
use crate::layout::CatalogLayout;
use crate::named_semaphore::NamedSemaphore;
use crate::record::CatalogRecord;
use crate::report::render_catalog;
use crate::shared_segment::SharedSegment;
use crate::teardown::{ReleaseSegment, ReleaseSignal, Teardown};
use crate::worker_runtime::WorkerRuntime;
use crate::worker_task::WorkerTask;
use std::io::Write;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Stages of one coordination round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Spawning,
    AwaitingCompletions,
    Sorting,
    Reporting,
    Teardown,
    Done,
}

/// Orders records by id, comparing the raw id bytes
pub fn sort_catalog(records: &mut [CatalogRecord]) {
    records.sort_by(|a, b| a.id.cmp(&b.id));
}

/// Runs one round: spawn a worker per row, wait for every completion, then
/// sort and report the catalog
///
/// Generic over where the workers run.
pub struct Coordinator<R: WorkerRuntime> {
    layout: CatalogLayout,
    config: Config,
    teardown: Teardown,
    phase: Phase,
    _runtime: PhantomData<R>,
}

impl<R: WorkerRuntime> Coordinator<R> {
    pub fn new(layout: CatalogLayout, config: Config, teardown: Teardown) -> Self {
        Self {
            layout,
            config,
            teardown,
            phase: Phase::Init,
            _runtime: PhantomData,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs the round, writing the report to `out`, and returns the sorted
    /// catalog
    ///
    /// Named resources are released whether or not the round succeeds.
    pub async fn run<W: Write>(&mut self, out: &mut W) -> Result<Vec<CatalogRecord>, CatalogError> {
        let result = self.round(out).await;

        if self.phase != Phase::Teardown {
            self.enter(Phase::Teardown);
        }
        let released = self.teardown.release();

        let records = result?;
        released?;
        self.enter(Phase::Done);
        Ok(records)
    }

    async fn round<W: Write>(&mut self, out: &mut W) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.enter(Phase::Init);
        self.config.validate()?;

        let signal = NamedSemaphore::create(&self.config.signal_name)?;
        self.teardown.register(ReleaseSignal::new(signal.name()));
        let mut segment = SharedSegment::create(&self.config.segment_name, self.layout)?;
        self.teardown.register(ReleaseSegment::new(segment.name()));

        self.enter(Phase::Spawning);
        let mut workers = Vec::with_capacity(self.layout.rows);
        for row in 0..self.layout.rows {
            // On failure the handles spawned so far are dropped with `workers`
            workers.push(R::spawn(self.task_for(row))?);
        }
        info!(workers = workers.len(), "workers spawned");

        self.enter(Phase::AwaitingCompletions);
        for completed in 1..=self.layout.rows {
            signal.wait().await?;
            debug!(completed, expected = self.layout.rows, "worker completion observed");
        }

        self.enter(Phase::Sorting);
        sort_catalog(segment.records_mut());

        self.enter(Phase::Reporting);
        render_catalog(segment.records(), out).map_err(CatalogError::Output)?;
        let records = segment.records().to_vec();

        self.enter(Phase::Teardown);
        for (row, handle) in workers.into_iter().enumerate() {
            if let Err(e) = R::join(handle).await {
                warn!(row, error = %e, "worker exited abnormally");
            }
        }
        drop(segment);
        drop(signal);

        Ok(records)
    }

    fn task_for(&self, row: usize) -> WorkerTask {
        WorkerTask {
            row,
            layout: self.layout,
            segment_name: self.config.segment_name.clone(),
            signal_name: self.config.signal_name.clone(),
            max_delay_ms: self.config.max_worker_delay_ms,
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "coordinator phase");
        self.phase = phase;
    }
}
