//! Live filesystem watcher tests

mod common;

use common::TestProject;
use smgr_store::{AssetEvent, SceneWatcher};
use std::fs;
use std::time::{Duration, Instant};

/// Collect events until one matches or the deadline passes
fn wait_for(watcher: &SceneWatcher, matches: impl Fn(&AssetEvent) -> bool) -> Option<AssetEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if let Some(event) = watcher.recv_timeout(Duration::from_millis(200)).unwrap() {
            if matches(&event) {
                return Some(event);
            }
        }
    }
    None
}

#[test]
fn test_rename_under_watcher_is_reported_as_move() {
    let project = TestProject::new();
    let from = project.touch("Assets/A/foo.unity");
    let to = project.path("Assets/A/bar.unity");

    let watcher = SceneWatcher::start(&project.store.assets_root(), "unity").unwrap();
    // Give the backend a moment to register the watches
    std::thread::sleep(Duration::from_millis(200));
    fs::rename(&from, &to).unwrap();

    let event = wait_for(&watcher, |e| matches!(e, AssetEvent::Moved { .. }))
        .expect("no move event received");
    let AssetEvent::Moved { from: seen_from, to: seen_to } = event else {
        unreachable!()
    };
    assert_eq!(seen_from.file_name(), from.file_name());
    assert_eq!(seen_to.file_name(), to.file_name());
}

#[test]
fn test_watched_move_relocates_record() {
    let project = TestProject::new();
    let from = project.touch("Assets/A/foo.unity");
    project.store.ensure_record(&from, None).unwrap();
    fs::create_dir_all(project.path("Assets/B")).unwrap();
    let to = project.path("Assets/B/bar.unity");

    let watcher = SceneWatcher::start(&project.store.assets_root(), "unity").unwrap();
    std::thread::sleep(Duration::from_millis(200));
    fs::rename(&from, &to).unwrap();

    let event = wait_for(&watcher, |e| matches!(e, AssetEvent::Moved { .. }))
        .expect("no move event received");
    project.store.handle(&event).unwrap();

    assert!(project.path("Assets/B/.bar.json").is_file());
    assert!(!project.path("Assets/A/.foo.json").exists());
}

#[test]
fn test_start_on_missing_directory_fails() {
    let project = TestProject::new();
    let result = SceneWatcher::start(&project.path("Nope"), "unity");
    assert!(result.is_err());
}
