// src/watch/watcher.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{LineTag, emit};
use crate::watch::events::{ChangeEvent, ChangeKind};

/// Recursive folder watcher over a deduplicated set of roots.
///
/// One `notify` watcher backs all registered folders; at most one observer
/// exists per canonical root path. Dropping the `FolderWatcher` tears down
/// observation entirely.
pub struct FolderWatcher {
    inner: RecommendedWatcher,
    registered: HashSet<PathBuf>,
}

impl std::fmt::Debug for FolderWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderWatcher")
            .field("registered", &self.registered)
            .finish_non_exhaustive()
    }
}

impl FolderWatcher {
    /// Create the watcher and spawn the forwarding task that converts raw
    /// notify events into classified [`ChangeEvent`]s on `events_tx`.
    pub fn spawn(events_tx: mpsc::Sender<ChangeEvent>) -> Result<Self> {
        // Channel from the blocking notify callback into the async world.
        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<Event>();

        let inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if raw_tx.send(event).is_err() {
                        // Forwarding task is gone; nothing left to notify.
                    }
                }
                Err(err) => {
                    warn!(error = %err, "filesystem watch error");
                }
            },
            Config::default(),
        )
        .context("creating filesystem watcher")?;

        tokio::spawn(forward_events(raw_rx, events_tx));

        Ok(Self {
            inner,
            registered: HashSet::new(),
        })
    }

    /// Register every folder in `folders`, skipping missing and duplicate
    /// entries. Returns how many new observers were set up.
    pub fn watch_folders<I, P>(&mut self, folders: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for folder in folders {
            match self.watch_folder(folder.as_ref()) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(folder = ?folder.as_ref(), error = %err, "failed to register folder");
                    emit(
                        LineTag::WatchError,
                        format_args!("Error starting watcher: {err}"),
                    );
                }
            }
        }
        added
    }

    /// Register a single folder root.
    ///
    /// - A nonexistent path is skipped with a warning; other folders are
    ///   unaffected.
    /// - An already-registered canonical path is left untouched, so no
    ///   duplicate event delivery can occur.
    ///
    /// Returns `true` if a new observer was registered.
    pub fn watch_folder(&mut self, folder: &Path) -> Result<bool> {
        if !folder.exists() {
            warn!(folder = ?folder, "watched folder does not exist; skipping");
            emit(
                LineTag::WatchError,
                format_args!("Folder does not exist: {}", folder.display()),
            );
            return Ok(false);
        }

        let canonical = folder
            .canonicalize()
            .unwrap_or_else(|_| folder.to_path_buf());

        if self.registered.contains(&canonical) {
            debug!(folder = ?canonical, "already watching folder");
            return Ok(false);
        }

        self.inner
            .watch(&canonical, RecursiveMode::Recursive)
            .with_context(|| format!("watching folder {canonical:?}"))?;
        self.registered.insert(canonical.clone());

        info!(folder = ?canonical, "watching folder");
        emit(
            LineTag::DebugMessage,
            format_args!("Starting watcher for folder: {}", canonical.display()),
        );
        Ok(true)
    }

    /// Tear down the observer for a folder root. Returns `true` if one was
    /// actually registered.
    pub fn unwatch_folder(&mut self, folder: &Path) -> Result<bool> {
        let canonical = folder
            .canonicalize()
            .unwrap_or_else(|_| folder.to_path_buf());

        if !self.registered.remove(&canonical) {
            return Ok(false);
        }

        self.inner
            .unwatch(&canonical)
            .with_context(|| format!("unwatching folder {canonical:?}"))?;
        info!(folder = ?canonical, "stopped watching folder");
        Ok(true)
    }

    /// Number of active observers.
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn is_watching(&self, folder: &Path) -> bool {
        let canonical = folder
            .canonicalize()
            .unwrap_or_else(|_| folder.to_path_buf());
        self.registered.contains(&canonical)
    }
}

/// Consume raw notify events and forward classified change events.
async fn forward_events(
    mut raw_rx: mpsc::UnboundedReceiver<Event>,
    events_tx: mpsc::Sender<ChangeEvent>,
) {
    while let Some(event) = raw_rx.recv().await {
        let Some(kind) = ChangeKind::from_notify(&event.kind) else {
            continue;
        };

        for path in event.paths {
            // Directory creation/modification carries nothing to transform.
            if kind != ChangeKind::Removed && path.is_dir() {
                continue;
            }

            debug!(?path, ?kind, "filesystem change");
            if events_tx.send(ChangeEvent::new(path, kind)).await.is_err() {
                debug!("dispatch channel closed; stopping event forwarding");
                return;
            }
        }
    }
    debug!("watcher event loop finished");
}
