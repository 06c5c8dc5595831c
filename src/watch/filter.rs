// src/watch/filter.rs

//! Path filter and source-family classifier.
//!
//! The rules run in a fixed order:
//!
//! 1. Paths whose base name carries an artifact suffix (`.min.js`,
//!    `.min.css`) are ignored. This is the loop-prevention invariant:
//!    every transform's output name must land here (or in rule 3), or the
//!    watcher would re-trigger on its own output forever.
//! 2. Paths with an ignored segment anywhere in them (hidden entries,
//!    dependency and vendor directories) are ignored.
//! 3. The extension picks the [`SourceFamily`]; anything else is an
//!    unsupported file type, surfaced on the log stream but never fatal.

use std::path::{Component, Path};

use crate::transform::SourceFamily;

/// Output-artifact suffixes that must never be reprocessed.
pub const ARTIFACT_SUFFIXES: [&str; 2] = [".min.js", ".min.css"];

/// Path segments that exclude a path from processing at any depth, matched
/// exactly. Hidden segments (leading `.`) are excluded as well.
pub const IGNORED_SEGMENTS: [&str; 4] = ["node_modules", "lib", "assets", "cometchat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Source(SourceFamily),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Already-generated output (`.min.js` / `.min.css`).
    ArtifactSuffix,
    /// Inside a hidden, dependency, or vendor directory.
    IgnoredDirectory,
    /// Extension maps to no source family.
    UnsupportedExtension,
}

impl Classification {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Classification::Ignored(_))
    }
}

/// Classify a path into a source family or an ignore reason.
pub fn classify(path: &Path) -> Classification {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if ARTIFACT_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            return Classification::Ignored(IgnoreReason::ArtifactSuffix);
        }
    }

    if has_ignored_segment(path) {
        return Classification::Ignored(IgnoreReason::IgnoredDirectory);
    }

    let family = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(SourceFamily::from_extension);

    match family {
        Some(family) => Classification::Source(family),
        None => Classification::Ignored(IgnoreReason::UnsupportedExtension),
    }
}

fn has_ignored_segment(path: &Path) -> bool {
    path.components().any(|component| {
        let Component::Normal(segment) = component else {
            return false;
        };
        let Some(segment) = segment.to_str() else {
            return false;
        };
        segment.starts_with('.') || IGNORED_SEGMENTS.contains(&segment)
    })
}
