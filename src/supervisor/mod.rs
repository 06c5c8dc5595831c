// src/supervisor/mod.rs

//! Lifecycle management for the worker process.
//!
//! The supervisor owns at most one worker at a time and exposes an
//! idempotent start/stop pair. Observers get the worker's stdout lines
//! through a broadcast channel and state changes through a watch channel;
//! the supervisor itself never interprets the relayed lines.

pub mod runtime_check;
pub mod session;

pub use runtime_check::check_runtime;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::config::{SharedConfig, WatchConfig};
use crate::errors::Result;
use crate::supervisor::session::Session;

#[cfg(windows)]
const WORKER_BINARY: &str = "minifyd-worker.exe";
#[cfg(not(windows))]
const WORKER_BINARY: &str = "minifyd-worker";

/// Lines buffered per log subscriber before old lines are dropped.
const LOG_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Supervises the single worker process.
///
/// Configuration access goes through the [`SharedConfig`] handle, so the
/// supervisor's own writes (clearing the watch flag after an exit) stay
/// inside the single-writer discipline alongside the CLI's updates.
pub struct Supervisor {
    shared: Arc<SharedConfig>,
    state_tx: watch::Sender<SupervisorState>,
    log_tx: broadcast::Sender<String>,
    session: Option<Session>,
}

impl Supervisor {
    pub fn new(shared: Arc<SharedConfig>) -> Self {
        let (state_tx, _) = watch::channel(SupervisorState::Stopped);
        let (log_tx, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);
        Self {
            shared,
            state_tx,
            log_tx,
            session: None,
        }
    }

    pub fn state(&self) -> SupervisorState {
        *self.state_tx.borrow()
    }

    /// Observe state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SupervisorState> {
        self.state_tx.subscribe()
    }

    /// Observe the worker's stdout, one line per message, in emission
    /// order. Slow subscribers lose the oldest lines first.
    pub fn subscribe_logs(&self) -> broadcast::Receiver<String> {
        self.log_tx.subscribe()
    }

    /// Start the worker.
    ///
    /// Returns `Ok(false)` without side effects when a start is already in
    /// progress or the worker is running. The runtime precheck runs before
    /// anything is spawned; on failure the supervisor stays `Stopped` and
    /// the error is returned.
    pub async fn start(&mut self) -> Result<bool> {
        match self.state() {
            SupervisorState::Starting | SupervisorState::Running => {
                info!("worker already running; start request ignored");
                return Ok(false);
            }
            SupervisorState::Stopping => {
                // A stop is being processed; treat like running to keep
                // start/stop strictly alternating.
                info!("worker is stopping; start request ignored");
                return Ok(false);
            }
            SupervisorState::Stopped => {}
        }

        self.state_tx.send_replace(SupervisorState::Starting);

        let config = self.shared.current();
        let program = resolve_worker(&config)?;

        let version = match check_runtime(&program).await {
            Ok(version) => version,
            Err(err) => {
                self.state_tx.send_replace(SupervisorState::Stopped);
                return Err(err);
            }
        };
        info!(program = ?program, %version, "runtime check passed");

        // Published before the spawn so a worker that dies instantly still
        // leaves a Running -> Stopped transition for observers.
        self.state_tx.send_replace(SupervisorState::Running);
        let session = match Session::spawn(
            &program,
            self.shared.clone(),
            self.log_tx.clone(),
            self.state_tx.clone(),
        ) {
            Ok(session) => session,
            Err(err) => {
                self.state_tx.send_replace(SupervisorState::Stopped);
                return Err(err);
            }
        };

        self.session = Some(session);
        info!("worker started");
        Ok(true)
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Returns `Ok(false)` without side effects when no worker is running.
    /// The exit outcome line is delivered through the log channel.
    pub async fn stop(&mut self) -> Result<bool> {
        if self.state() == SupervisorState::Stopped {
            info!("worker not running; stop request ignored");
            return Ok(false);
        }

        self.state_tx.send_replace(SupervisorState::Stopping);
        match self.session.take() {
            Some(session) => session.stop().await,
            None => warn!("stop requested but no session is active"),
        }
        self.state_tx.send_replace(SupervisorState::Stopped);
        info!("worker stopped");
        Ok(true)
    }

    pub fn config(&self) -> &Arc<SharedConfig> {
        &self.shared
    }
}

/// Pick the program the supervisor launches: the configured runtime path
/// when one is set, otherwise the worker binary next to the current
/// executable.
pub fn resolve_worker(config: &WatchConfig) -> Result<PathBuf> {
    if !config.runtime_path.trim().is_empty() {
        return Ok(PathBuf::from(config.runtime_path.trim()));
    }

    let exe = std::env::current_exe().context("locating the current executable")?;
    let dir = exe
        .parent()
        .ok_or_else(|| anyhow!("current executable has no parent directory"))?;
    Ok(dir.join(WORKER_BINARY))
}
