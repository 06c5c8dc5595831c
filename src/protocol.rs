// src/protocol.rs

//! The line protocol spoken on the worker's stdout.
//!
//! Every line the pipeline emits is `<tag> <text>`, with one of four fixed
//! tags. The supervisor relays lines verbatim and treats the text as opaque;
//! `LineTag::split` exists for consumers (UI layers, tests) that want the
//! tag back.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    /// Diagnostic chatter (ignored files, watcher registration).
    DebugMessage,
    /// Normal progress: a file was picked up or an artifact was written.
    WatchUpdate,
    /// A per-file or per-folder failure; never fatal to the pipeline.
    WatchError,
    /// Watch status change, payload "true"/"false".
    SetIsWatching,
}

impl LineTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTag::DebugMessage => "debug-message",
            LineTag::WatchUpdate => "watch-update",
            LineTag::WatchError => "watch-error",
            LineTag::SetIsWatching => "set-is-watching",
        }
    }

    /// Split a protocol line into tag and text, if it carries a known tag.
    pub fn split(line: &str) -> Option<(LineTag, &str)> {
        let (tag, rest) = line.split_once(' ').unwrap_or((line, ""));
        let tag = match tag {
            "debug-message" => LineTag::DebugMessage,
            "watch-update" => LineTag::WatchUpdate,
            "watch-error" => LineTag::WatchError,
            "set-is-watching" => LineTag::SetIsWatching,
            _ => return None,
        };
        Some((tag, rest))
    }
}

/// Emit one tagged protocol line on stdout.
///
/// `println!` locks stdout per call, so concurrent transform tasks cannot
/// interleave partial lines.
pub fn emit(tag: LineTag, text: impl Display) {
    println!("{} {}", tag.as_str(), text);
}
