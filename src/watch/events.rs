// src/watch/events.rs

use std::path::PathBuf;

use notify::EventKind;

use crate::watch::filter::Classification;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Map a raw notify event kind. Access and metadata-only events carry
    /// no content change and are dropped.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Added),
            EventKind::Modify(_) => Some(ChangeKind::Modified),
            EventKind::Remove(_) => Some(ChangeKind::Removed),
            _ => None,
        }
    }
}

/// One classified filesystem change, produced by the watcher and consumed
/// exactly once by the dispatch loop.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub classification: Classification,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        let path = path.into();
        let classification = crate::watch::filter::classify(&path);
        Self {
            path,
            kind,
            classification,
        }
    }
}
