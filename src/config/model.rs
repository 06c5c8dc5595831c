// src/config/model.rs

use serde::{Deserialize, Serialize};

/// The persisted watch configuration.
///
/// Field names on disk are fixed by the data-file contract: `folders`,
/// `isWatching`, `allowNotify`, `nodePath`.
///
/// `folders` is an insertion-ordered list with no duplicates (exact,
/// case-sensitive string match); [`WatchConfig::add_folder`] enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub folders: Vec<String>,

    #[serde(rename = "isWatching")]
    pub is_watching: bool,

    #[serde(rename = "allowNotify")]
    pub allow_notify: bool,

    /// Path to the runtime executable the supervisor launches. Empty means
    /// "use the worker binary next to the current executable".
    #[serde(rename = "nodePath")]
    pub runtime_path: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            is_watching: false,
            allow_notify: true,
            runtime_path: String::new(),
        }
    }
}

impl WatchConfig {
    /// Append a folder, keeping insertion order. Returns `false` if the
    /// exact path is already present.
    pub fn add_folder(&mut self, folder: impl Into<String>) -> bool {
        let folder = folder.into();
        if self.folders.iter().any(|f| *f == folder) {
            return false;
        }
        self.folders.push(folder);
        true
    }

    /// Remove a folder by exact match. Returns `false` if it was absent.
    pub fn remove_folder(&mut self, folder: &str) -> bool {
        let before = self.folders.len();
        self.folders.retain(|f| f != folder);
        self.folders.len() != before
    }
}
