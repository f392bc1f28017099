// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use shared_catalog_core::error::CatalogError;
use tokio::signal::unix::{signal, SignalKind};
use tokio::spawn;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Installs SIGINT and SIGTERM handlers that cancel `token`
///
/// Handlers are installed before this returns, so no signal delivered
/// afterwards falls back to the default termination.
pub fn listen(token: CancellationToken) -> Result<(), CatalogError> {
    let install = |kind: SignalKind, label: &str| {
        signal(kind).map_err(|e| {
            CatalogError::Runtime(format!("failed to install {} handler: {}", label, e))
        })
    };
    let mut interrupt = install(SignalKind::interrupt(), "SIGINT")?;
    let mut terminate = install(SignalKind::terminate(), "SIGTERM")?;

    spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("SIGINT received, initiating shutdown"),
            _ = terminate.recv() => info!("SIGTERM received, initiating shutdown"),
        }
        token.cancel();
    });

    Ok(())
}
