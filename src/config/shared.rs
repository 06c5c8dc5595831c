// src/config/shared.rs

use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::config::model::WatchConfig;
use crate::config::store::ConfigStore;
use crate::errors::Result;

/// Single-writer handle over a [`ConfigStore`].
///
/// The store itself performs no merging, so every read-modify-write must go
/// through [`SharedConfig::update`], which holds a lock across the whole
/// load-mutate-save sequence. Each persisted version is also published over
/// a `watch` channel so any number of read-only subscribers can observe the
/// latest configuration without touching the disk.
#[derive(Debug)]
pub struct SharedConfig {
    store: ConfigStore,
    write_lock: Mutex<()>,
    tx: watch::Sender<WatchConfig>,
}

impl SharedConfig {
    /// Load the current record (creating the defaults if absent) and start
    /// publishing from it.
    pub fn new(store: ConfigStore) -> Result<Self> {
        let initial = store.load()?;
        let (tx, _) = watch::channel(initial);
        Ok(Self {
            store,
            write_lock: Mutex::new(()),
            tx,
        })
    }

    /// Latest published configuration.
    pub fn current(&self) -> WatchConfig {
        self.tx.borrow().clone()
    }

    /// Subscribe to configuration versions.
    pub fn subscribe(&self) -> watch::Receiver<WatchConfig> {
        self.tx.subscribe()
    }

    /// Apply a mutation to the configuration, persist it, and publish the
    /// new version. Concurrent callers are serialized; lost updates cannot
    /// occur.
    pub async fn update<F>(&self, mutate: F) -> Result<WatchConfig>
    where
        F: FnOnce(&mut WatchConfig),
    {
        let _guard = self.write_lock.lock().await;
        let mut config = self.tx.borrow().clone();
        mutate(&mut config);
        self.store.save(&config)?;
        self.tx.send_replace(config.clone());
        debug!("published updated watch configuration");
        Ok(config)
    }
}
