// src/engine/dispatch.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{MinifydError, Result};
use crate::protocol::{LineTag, emit};
use crate::transform::{self, SourceFamily};
use crate::watch::{ChangeEvent, ChangeKind, Classification, IgnoreReason};

/// Consume change events until the channel closes, transforming source
/// files as they arrive.
///
/// Transforms for distinct artifacts run concurrently. Events targeting
/// the same artifact are serialized in arrival order, so the last event
/// always determines the final bytes on disk.
pub async fn run_dispatch(mut events_rx: mpsc::Receiver<ChangeEvent>) {
    // Latest in-flight task per artifact path. A new task for the same
    // artifact awaits its predecessor before touching the file. Completed
    // entries are swept on every event so the map tracks only in-flight
    // work instead of growing with each distinct artifact ever seen.
    let mut active: HashMap<PathBuf, JoinHandle<()>> = HashMap::new();

    while let Some(event) = events_rx.recv().await {
        active.retain(|_, handle| !handle.is_finished());
        if event.kind == ChangeKind::Removed {
            // Every removal is reported, whatever the path classifies as;
            // no transform runs and no artifact is cleaned up.
            emit(
                LineTag::WatchUpdate,
                format_args!("File removed: {}", event.path.display()),
            );
            continue;
        }

        let family = match event.classification {
            Classification::Source(family) => family,
            Classification::Ignored(IgnoreReason::ArtifactSuffix) => {
                emit(
                    LineTag::DebugMessage,
                    format_args!("Ignoring minified file: {}", event.path.display()),
                );
                continue;
            }
            Classification::Ignored(IgnoreReason::IgnoredDirectory) => {
                debug!(path = ?event.path, "change in ignored directory");
                continue;
            }
            Classification::Ignored(IgnoreReason::UnsupportedExtension) => {
                warn!(path = ?event.path, "unsupported file type");
                emit(
                    LineTag::WatchError,
                    format_args!("Unsupported file type: {}", event.path.display()),
                );
                continue;
            }
        };

        emit(
            LineTag::WatchUpdate,
            format_args!("Processing {} file: {}", family.label(), event.path.display()),
        );

        let output_path = family.output_path(&event.path);
        let previous = active.remove(&output_path);
        let source_path = event.path.clone();
        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            if let Err(err) = process_source(family, &source_path).await {
                error!(path = ?source_path, error = %err, "transform failed");
                emit(LineTag::WatchError, err);
            }
        });
        active.insert(output_path, handle);
    }

    // Channel closed: let outstanding transforms finish before returning.
    for (_, handle) in active.drain() {
        let _ = handle.await;
    }
    debug!("dispatch loop finished");
}

/// Read, transform, and write one source file.
async fn process_source(family: SourceFamily, source_path: &Path) -> Result<()> {
    let source = fs::read_to_string(source_path)
        .await
        .map_err(|err| MinifydError::transform(family.label(), err.to_string()))?;

    let path = source_path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || transform::transform(family, &source, &path))
        .await
        .map_err(|err| MinifydError::transform(family.label(), err.to_string()))??;

    if let Some(parent) = result.output_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| MinifydError::transform(family.label(), err.to_string()))?;
    }
    fs::write(&result.output_path, &result.bytes)
        .await
        .map_err(|err| MinifydError::transform(family.label(), err.to_string()))?;

    info!(source = ?source_path, artifact = ?result.output_path, "artifact written");
    emit(
        LineTag::WatchUpdate,
        format_args!(
            "{} processing completed: {}",
            family.label(),
            result.output_path.display()
        ),
    );
    Ok(())
}
