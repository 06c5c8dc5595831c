// src/engine/runtime.rs

use tokio::sync::mpsc;
use tracing::info;

use crate::config::ConfigStore;
use crate::errors::Result;
use crate::protocol::{LineTag, emit};
use crate::watch::FolderWatcher;

/// Events buffered between the watcher callback and the dispatch loop.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Run the watch-and-transform pipeline until the process is terminated.
///
/// Loads the folder list from `store`, registers a recursive watcher per
/// folder, announces readiness on stdout, and then dispatches change
/// events forever. Missing folders are skipped; a pipeline with zero
/// registered folders still runs (it just never receives events).
pub async fn run_pipeline(store: &ConfigStore) -> Result<()> {
    let config = store.load()?;
    info!(folders = config.folders.len(), "starting pipeline");

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut watcher = FolderWatcher::spawn(events_tx)?;

    let added = watcher.watch_folders(&config.folders);
    info!(
        registered = watcher.registered_count(),
        added, "folder registration complete"
    );
    emit(LineTag::SetIsWatching, "true");

    // Runs until the watcher (held on this stack frame) stops feeding the
    // channel, which in practice means process termination.
    crate::engine::run_dispatch(events_rx).await;
    Ok(())
}
