// src/supervisor/session.rs

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SharedConfig;
use crate::errors::Result;
use crate::supervisor::SupervisorState;

/// How long a signaled worker gets to exit before it is killed outright.
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// One spawned worker process with its relay and wait tasks.
///
/// The session ends either through [`Session::stop`] or when the worker
/// exits on its own; in both cases the wait task publishes the outcome
/// line and flips the supervisor state to `Stopped`.
pub struct Session {
    stop_tx: Option<oneshot::Sender<()>>,
    waiter: JoinHandle<()>,
}

impl Session {
    pub fn spawn(
        program: &Path,
        shared: Arc<SharedConfig>,
        log_tx: broadcast::Sender<String>,
        state_tx: watch::Sender<SupervisorState>,
    ) -> Result<Self> {
        let mut child = Command::new(program)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning worker {program:?}"))?;

        let stdout = child
            .stdout
            .take()
            .context("worker spawned without a stdout pipe")?;
        tokio::spawn(relay_stdout(stdout, log_tx.clone()));

        let (stop_tx, stop_rx) = oneshot::channel();
        let waiter = tokio::spawn(wait_for_exit(child, stop_rx, shared, log_tx, state_tx));

        Ok(Self {
            stop_tx: Some(stop_tx),
            waiter,
        })
    }

    /// Ask the worker to terminate and wait for the wait task to finish.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Err means the wait task already finished on its own.
            let _ = stop_tx.send(());
        }
        if let Err(err) = (&mut self.waiter).await {
            warn!(error = %err, "session wait task panicked");
        }
    }
}

/// Forward worker stdout lines to log subscribers in arrival order.
async fn relay_stdout(stdout: ChildStdout, log_tx: broadcast::Sender<String>) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                // Err just means nobody is subscribed right now.
                let _ = log_tx.send(line);
            }
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "failed reading worker stdout");
                break;
            }
        }
    }
    debug!("worker stdout closed");
}

/// Wait for the worker to exit, either naturally or after a stop request,
/// then publish the outcome.
async fn wait_for_exit(
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
    shared: Arc<SharedConfig>,
    log_tx: broadcast::Sender<String>,
    state_tx: watch::Sender<SupervisorState>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = stop_rx => {
            terminate(&mut child);
            // A worker that ignores the termination signal is killed
            // after the grace period so stop() can never hang.
            match tokio::time::timeout(TERMINATE_GRACE, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!("worker ignored termination signal; killing it");
                    if let Err(err) = child.start_kill() {
                        warn!(error = %err, "failed to kill worker");
                    }
                    child.wait().await
                }
            }
        }
    };

    let message = match status {
        Ok(status) => exit_message(status),
        Err(err) => format!("Watcher exited with error: {err}"),
    };
    info!(%message, "worker exited");
    let _ = log_tx.send(message);

    // An exit leaves the persisted flag stale; clear it through the shared
    // handle so the write is serialized with CLI updates and published to
    // subscribers.
    if shared.current().is_watching {
        if let Err(err) = shared.update(|config| config.is_watching = false).await {
            warn!(error = %err, "failed to clear watch flag after exit");
        }
    }

    state_tx.send_replace(SupervisorState::Stopped);
}

/// Ask the worker to terminate. On Unix this is SIGTERM so the worker can
/// exit with the conventional 143; elsewhere the process is killed.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            use nix::sys::signal::{Signal, kill};
            use nix::unistd::Pid;
            match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => return,
                Err(err) => warn!(%err, "SIGTERM failed; killing worker"),
            }
        }
    }
    if let Err(err) = child.start_kill() {
        warn!(error = %err, "failed to kill worker");
    }
}

/// Map an exit status to the outcome line shown to the user.
fn exit_message(status: ExitStatus) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal() == Some(15) {
            return "Watcher terminated successfully".to_string();
        }
    }
    match status.code() {
        Some(0) => "Watcher stopped successfully".to_string(),
        // 128 + SIGTERM, the shell convention for a clean termination.
        Some(143) => "Watcher terminated successfully".to_string(),
        Some(code) => format!("Watcher exited with error, code {code}"),
        None => "Watcher exited with error".to_string(),
    }
}
