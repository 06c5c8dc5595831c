mod common;

use std::fs;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use minifyd::watch::{ChangeEvent, ChangeKind, FolderWatcher};

#[tokio::test]
async fn nonexistent_folders_are_skipped() {
    common::init_tracing();
    let (tx, _rx) = mpsc::channel(8);
    let mut watcher = FolderWatcher::spawn(tx).unwrap();

    let added = watcher.watch_folder("/definitely/not/a/real/folder".as_ref()).unwrap();
    assert!(!added);
    assert_eq!(watcher.registered_count(), 0);
}

#[tokio::test]
async fn registration_is_idempotent() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let (tx, _rx) = mpsc::channel(8);
    let mut watcher = FolderWatcher::spawn(tx).unwrap();

    assert!(watcher.watch_folder(dir.path()).unwrap());
    assert!(!watcher.watch_folder(dir.path()).unwrap());
    assert_eq!(watcher.registered_count(), 1);
    assert!(watcher.is_watching(dir.path()));

    assert!(watcher.unwatch_folder(dir.path()).unwrap());
    assert!(!watcher.unwatch_folder(dir.path()).unwrap());
    assert_eq!(watcher.registered_count(), 0);
}

#[tokio::test]
async fn mixed_folder_lists_register_the_valid_ones() {
    common::init_tracing();
    let dir_a = common::visible_tempdir();
    let dir_b = common::visible_tempdir();
    let (tx, _rx) = mpsc::channel(8);
    let mut watcher = FolderWatcher::spawn(tx).unwrap();

    let folders = [
        dir_a.path().to_string_lossy().into_owned(),
        "/no/such/place".to_string(),
        dir_b.path().to_string_lossy().into_owned(),
    ];
    let added = watcher.watch_folders(&folders);
    assert_eq!(added, 2);
    assert_eq!(watcher.registered_count(), 2);
}

#[tokio::test]
async fn file_changes_arrive_as_classified_events() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let (tx, mut rx) = mpsc::channel(64);
    let mut watcher = FolderWatcher::spawn(tx).unwrap();
    assert!(watcher.watch_folder(dir.path()).unwrap());

    // Give the backend a moment to set up before producing the change.
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(dir.path().join("fresh.js"), "const x = 1;\n").unwrap();

    let event = wait_for_file(&mut rx, "fresh.js")
        .await
        .expect("no event for fresh.js within the timeout");
    assert!(matches!(event.kind, ChangeKind::Added | ChangeKind::Modified));
    assert!(!event.classification.is_ignored());
}

/// Drain events until one for `name` arrives. Platform backends may emit
/// several events per write, and for unrelated paths first.
async fn wait_for_file(
    rx: &mut mpsc::Receiver<ChangeEvent>,
    name: &str,
) -> Option<ChangeEvent> {
    let deadline = Duration::from_secs(5);
    timeout(deadline, async {
        while let Some(event) = rx.recv().await {
            if event.path.file_name().is_some_and(|n| n == name) {
                return Some(event);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}
