#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use minifyd::config::{ConfigStore, SharedConfig, WatchConfig};
use minifyd::supervisor::{Supervisor, SupervisorState, check_runtime};

fn supervisor_for(store: ConfigStore) -> (Arc<SharedConfig>, Supervisor) {
    let shared = Arc::new(SharedConfig::new(store).unwrap());
    let supervisor = Supervisor::new(shared.clone());
    (shared, supervisor)
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// A store whose record points at `runtime` as the worker executable.
fn store_with_runtime(dir: &Path, runtime: &Path) -> ConfigStore {
    let store = ConfigStore::new(dir.join("minifierData.json"));
    let config = WatchConfig {
        runtime_path: runtime.to_string_lossy().into_owned(),
        ..WatchConfig::default()
    };
    store.save(&config).unwrap();
    store
}

async fn wait_for_line(
    logs: &mut broadcast::Receiver<String>,
    needle: &str,
) -> Option<String> {
    timeout(Duration::from_secs(5), async {
        loop {
            match logs.recv().await {
                Ok(line) if line.contains(needle) => return Some(line),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}

async fn wait_for_stopped(supervisor: &Supervisor) {
    let mut state_rx = supervisor.subscribe_state();
    timeout(Duration::from_secs(5), async {
        loop {
            if *state_rx.borrow_and_update() == SupervisorState::Stopped {
                return;
            }
            if state_rx.changed().await.is_err() {
                return;
            }
        }
    })
    .await
    .expect("worker never reached the stopped state");
}

#[tokio::test]
async fn runtime_check_accepts_a_version_report() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let script = write_script(dir.path(), "worker", "#!/bin/sh\necho v9.9.9\n");

    let version = check_runtime(&script).await.unwrap();
    assert_eq!(version, "v9.9.9");
}

#[tokio::test]
async fn runtime_check_rejects_bad_version_output() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let script = write_script(dir.path(), "worker", "#!/bin/sh\necho 9.9.9\n");

    let err = check_runtime(&script).await.unwrap_err();
    assert!(err.to_string().contains("runtime not installed"));
}

#[tokio::test]
async fn runtime_check_rejects_a_missing_binary() {
    common::init_tracing();
    let err = check_runtime(Path::new("/no/such/worker")).await.unwrap_err();
    assert!(err.to_string().contains("runtime not installed"));
}

#[tokio::test]
async fn start_and_stop_are_idempotent() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let script = write_script(
        dir.path(),
        "worker",
        "#!/bin/sh\n\
         if [ \"$1\" = \"-v\" ]; then echo v0.0.1; exit 0; fi\n\
         echo \"watch-update pipeline ready\"\n\
         exec sleep 100\n",
    );
    let store = store_with_runtime(dir.path(), &script);

    let (_shared, mut supervisor) = supervisor_for(store);
    assert_eq!(supervisor.state(), SupervisorState::Stopped);
    assert!(!supervisor.stop().await.unwrap());

    let mut logs = supervisor.subscribe_logs();
    assert!(supervisor.start().await.unwrap());
    assert_eq!(supervisor.state(), SupervisorState::Running);
    // A second start while running is a no-op.
    assert!(!supervisor.start().await.unwrap());

    let line = wait_for_line(&mut logs, "pipeline ready").await;
    assert!(line.is_some(), "worker output was not relayed");

    assert!(supervisor.stop().await.unwrap());
    assert_eq!(supervisor.state(), SupervisorState::Stopped);
    assert!(!supervisor.stop().await.unwrap());

    // SIGTERM termination maps to the clean-termination outcome line.
    let outcome = wait_for_line(&mut logs, "Watcher terminated successfully").await;
    assert!(outcome.is_some(), "no termination outcome line");
}

#[tokio::test]
async fn failing_worker_reports_its_exit_code() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let script = write_script(
        dir.path(),
        "worker",
        "#!/bin/sh\n\
         if [ \"$1\" = \"-v\" ]; then echo v0.0.1; exit 0; fi\n\
         exit 7\n",
    );
    let store = store_with_runtime(dir.path(), &script);

    let (_shared, mut supervisor) = supervisor_for(store);
    let mut logs = supervisor.subscribe_logs();
    assert!(supervisor.start().await.unwrap());

    wait_for_stopped(&supervisor).await;
    let outcome = wait_for_line(&mut logs, "Watcher exited with error, code 7").await;
    assert!(outcome.is_some(), "exit code was not reported");

    // The worker is already gone; stop is a no-op.
    assert!(!supervisor.stop().await.unwrap());
}

#[tokio::test]
async fn clean_exit_clears_the_persisted_watch_flag() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let script = write_script(
        dir.path(),
        "worker",
        "#!/bin/sh\n\
         if [ \"$1\" = \"-v\" ]; then echo v0.0.1; exit 0; fi\n\
         exit 0\n",
    );
    let store = store_with_runtime(dir.path(), &script);
    let mut flagged = store.load().unwrap();
    flagged.is_watching = true;
    store.save(&flagged).unwrap();

    let (shared, mut supervisor) = supervisor_for(store.clone());
    let mut logs = supervisor.subscribe_logs();
    assert!(supervisor.start().await.unwrap());

    wait_for_stopped(&supervisor).await;
    let outcome = wait_for_line(&mut logs, "Watcher stopped successfully").await;
    assert!(outcome.is_some(), "no clean-exit outcome line");
    // The flag is cleared both on disk and in the published snapshot, so
    // the write went through the shared handle rather than a raw save.
    assert!(!store.load().unwrap().is_watching);
    assert!(!shared.current().is_watching);
}

#[tokio::test]
async fn stop_kills_a_worker_that_ignores_termination() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let script = write_script(
        dir.path(),
        "worker",
        "#!/bin/sh\n\
         if [ \"$1\" = \"-v\" ]; then echo v0.0.1; exit 0; fi\n\
         trap '' TERM\n\
         echo \"watch-update stubborn worker up\"\n\
         while true; do sleep 1; done\n",
    );
    let store = store_with_runtime(dir.path(), &script);

    let (_shared, mut supervisor) = supervisor_for(store);
    let mut logs = supervisor.subscribe_logs();
    assert!(supervisor.start().await.unwrap());
    let line = wait_for_line(&mut logs, "stubborn worker up").await;
    assert!(line.is_some(), "worker never came up");

    // SIGTERM is trapped, so stop must fall back to killing the worker
    // once the grace period runs out rather than waiting forever.
    let stopped = timeout(Duration::from_secs(15), supervisor.stop())
        .await
        .expect("stop did not return within the kill deadline")
        .unwrap();
    assert!(stopped);
    assert_eq!(supervisor.state(), SupervisorState::Stopped);

    // A killed worker has no exit code, which maps to the error outcome.
    let outcome = wait_for_line(&mut logs, "Watcher exited with error").await;
    assert!(outcome.is_some(), "no outcome line after the kill");
}

#[tokio::test]
async fn start_fails_cleanly_when_the_runtime_is_broken() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let script = write_script(dir.path(), "worker", "#!/bin/sh\necho broken\n");
    let store = store_with_runtime(dir.path(), &script);

    let (_shared, mut supervisor) = supervisor_for(store);
    let err = supervisor.start().await.unwrap_err();
    assert!(err.to_string().contains("runtime not installed"));
    assert_eq!(supervisor.state(), SupervisorState::Stopped);

    // Nothing was spawned, so stop has nothing to do.
    assert!(!supervisor.stop().await.unwrap());
}
