// src/config/store.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, warn};

use crate::config::model::WatchConfig;
use crate::errors::Result;

/// On-disk location of the config record, relative to the user's home
/// directory.
pub const DATA_FILE_RELATIVE: &str = "MinifierData/minifierData.json";

/// Loads and overwrites the persisted [`WatchConfig`].
///
/// The store is deliberately dumb: `save` is a full overwrite, never a
/// merge, and `load` repairs a missing or corrupt record by writing the
/// defaults back. Callers doing read-modify-write from concurrent tasks
/// must serialize through [`crate::config::SharedConfig`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the fixed per-user application-data path.
    pub fn at_default_location() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow!("could not determine the user home directory"))?;
        Ok(Self::new(home.join(DATA_FILE_RELATIVE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted record.
    ///
    /// A missing or unparseable file is treated as absent: the defaults are
    /// returned and written back to disk so a record exists afterwards.
    pub fn load(&self) -> Result<WatchConfig> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<WatchConfig>(&contents) {
                Ok(config) => {
                    debug!(path = ?self.path, "loaded watch configuration");
                    Ok(config)
                }
                Err(err) => {
                    warn!(
                        path = ?self.path,
                        error = %err,
                        "corrupt configuration record; replacing with defaults"
                    );
                    self.reset_to_defaults()
                }
            },
            Err(err) => {
                debug!(
                    path = ?self.path,
                    error = %err,
                    "no readable configuration record; creating defaults"
                );
                self.reset_to_defaults()
            }
        }
    }

    /// Fully overwrite the persisted record.
    pub fn save(&self, config: &WatchConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {parent:?}"))?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing config file {:?}", self.path))?;
        debug!(path = ?self.path, "saved watch configuration");
        Ok(())
    }

    fn reset_to_defaults(&self) -> Result<WatchConfig> {
        let defaults = WatchConfig::default();
        if let Err(err) = self.save(&defaults) {
            // The caller asked to read, not write; a failed repair is not
            // worth aborting over.
            warn!(path = ?self.path, error = %err, "failed to write default config record");
        }
        Ok(defaults)
    }
}
