// src/watch/mod.rs

//! Folder watching and path classification.
//!
//! This module is responsible for:
//! - Deciding whether a filesystem path should trigger processing at all,
//!   and which source family applies ([`filter`]).
//! - Wiring up a cross-platform recursive watcher (`notify`) over a
//!   deduplicated set of folder roots ([`watcher`]).
//! - Converting raw notify events into classified [`ChangeEvent`]s
//!   ([`events`]).
//!
//! It does **not** run any transforms; it only turns filesystem activity
//! into events for the dispatch loop.

pub mod events;
pub mod filter;
pub mod watcher;

pub use events::{ChangeEvent, ChangeKind};
pub use filter::{Classification, IgnoreReason, classify};
pub use watcher::FolderWatcher;
