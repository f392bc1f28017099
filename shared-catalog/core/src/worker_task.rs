// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::completion_signal::CompletionSignal;
use crate::error::CatalogError;
use crate::layout::{CatalogLayout, Coordinate};
use crate::named_semaphore::NamedSemaphore;
use crate::record::CatalogRecord;
use crate::shared_segment::SharedSegment;
use crate::worker_runtime::Runnable;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Everything a worker needs to populate one row, serializable so it can be
/// handed to a child process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTask {
    pub row: usize,
    pub layout: CatalogLayout,
    pub segment_name: String,
    pub signal_name: String,
    /// Upper bound of the simulated work delay (0 = post immediately)
    pub max_delay_ms: u64,
}

impl WorkerTask {
    fn simulated_delay(&self) -> Duration {
        if self.max_delay_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=self.max_delay_ms))
    }
}

#[async_trait]
impl Runnable for WorkerTask {
    type Output = Result<(), CatalogError>;

    async fn run(self) -> Self::Output {
        if self.row >= self.layout.rows {
            return Err(CatalogError::CoordinateOutOfRange(Coordinate::new(self.row, 0, 0)));
        }
        let mut segment = SharedSegment::open(&self.segment_name, self.layout)?;
        let signal = NamedSemaphore::open(&self.signal_name)?;

        populate_partition(self.layout, self.row, segment.partition_mut(self.row))?;
        drop(segment);
        debug!(row = self.row, "partition written");

        let delay = self.simulated_delay();
        if !delay.is_zero() {
            debug!(row = self.row, delay_ms = delay.as_millis() as u64, "simulating work");
            tokio::time::sleep(delay).await;
        }

        signal.post()?;
        info!(row = self.row, "worker finished");
        Ok(())
    }
}

/// Writes every record of `row` into `partition`, the slice owned by that row
pub fn populate_partition(
    layout: CatalogLayout,
    row: usize,
    partition: &mut [CatalogRecord],
) -> Result<(), CatalogError> {
    let base = layout.partition(row).start;
    for coordinate in layout.row_coordinates(row) {
        partition[layout.index_of(coordinate) - base] = CatalogRecord::new(coordinate)?;
    }
    Ok(())
}
