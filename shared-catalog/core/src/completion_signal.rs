// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::CatalogError;
use std::future::Future;

/// Counting signal used by workers to report that their partition is written
pub trait CompletionSignal: Send + Sync {
    /// Increment the count and wake one waiter, if any
    fn post(&self) -> Result<(), CatalogError>;

    /// Consume one unit, waiting until a participant has posted
    fn wait(&self) -> impl Future<Output = Result<(), CatalogError>> + Send;
}
