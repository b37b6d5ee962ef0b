//! Filesystem observer producing [`AssetEvent`]s
//!
//! Watches the assets directory recursively and translates raw `notify`
//! events into scene moves, deletions and rescan requests. Translation runs
//! on the watcher's thread; the events are handed over a channel so the
//! store itself is only ever used from the consumer's thread.

use crate::reconcile::AssetEvent;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use smgr_common::{paths, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, warn};

/// Stateful translation of `notify` events
///
/// Platforms report renames differently: paired (`RenameMode::Both`), as a
/// `From`/`To` sequence, or as unpaired `Any` events. Unpaired halves are
/// matched up here; a `From` that is never followed by a `To` (moved out of
/// the watched tree) is reported as a deletion.
#[derive(Debug)]
pub struct EventTranslator {
    scene_extension: String,
    pending_from: Option<PathBuf>,
    last_move: Option<(PathBuf, PathBuf)>,
}

impl EventTranslator {
    pub fn new(scene_extension: impl Into<String>) -> Self {
        Self {
            scene_extension: scene_extension.into(),
            pending_from: None,
            last_move: None,
        }
    }

    pub fn translate(&mut self, event: Event) -> Vec<AssetEvent> {
        if event.need_rescan() {
            return vec![AssetEvent::Rescan];
        }

        let mut out = Vec::new();
        match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if let [from, to, ..] = event.paths.as_slice() {
                    self.pending_from = None;
                    self.push_move(&mut out, from.clone(), to.clone());
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                if let Some(from) = event.paths.into_iter().next() {
                    self.start_rename(&mut out, from);
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                if let (Some(from), Some(to)) = (self.pending_from.take(), event.paths.into_iter().next()) {
                    self.push_move(&mut out, from, to);
                }
            }
            EventKind::Modify(ModifyKind::Name(_)) => {
                // Unpaired rename half: the old name no longer exists
                for path in event.paths {
                    if path.exists() {
                        if let Some(from) = self.pending_from.take() {
                            self.push_move(&mut out, from, path);
                        }
                    } else {
                        self.start_rename(&mut out, path);
                    }
                }
            }
            EventKind::Remove(_) => {
                for path in event.paths {
                    if self.is_scene(&path) {
                        out.push(AssetEvent::Deleted(path));
                    }
                }
            }
            _ => {}
        }
        out
    }

    /// Remember a rename source, flushing an older one as a deletion
    fn start_rename(&mut self, out: &mut Vec<AssetEvent>, from: PathBuf) {
        if let Some(stale) = self.pending_from.replace(from) {
            if self.is_scene(&stale) {
                out.push(AssetEvent::Deleted(stale));
            }
        }
    }

    fn push_move(&mut self, out: &mut Vec<AssetEvent>, from: PathBuf, to: PathBuf) {
        if !self.is_scene(&to) {
            return;
        }
        // inotify reports From, To and Both for one rename
        let pair = (from, to);
        if self.last_move.as_ref() == Some(&pair) {
            return;
        }
        self.last_move = Some(pair.clone());
        out.push(AssetEvent::Moved {
            from: pair.0,
            to: pair.1,
        });
    }

    fn is_scene(&self, path: &Path) -> bool {
        paths::is_scene_file(path, &self.scene_extension)
    }
}

/// Recursive watcher over an assets directory
pub struct SceneWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<AssetEvent>,
}

impl SceneWatcher {
    /// Start watching `assets_root` for changes to `.{scene_extension}` files
    pub fn start(assets_root: &Path, scene_extension: &str) -> Result<Self> {
        let (tx, rx) = channel();
        let mut translator = EventTranslator::new(scene_extension);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let events = match res {
                Ok(event) => translator.translate(event),
                Err(e) => {
                    warn!("Watcher error, requesting rescan: {}", e);
                    vec![AssetEvent::Rescan]
                }
            };
            for event in events {
                debug!(?event, "Asset event");
                let _ = tx.send(event);
            }
        })
        .map_err(|e| Error::Watcher(e.to_string()))?;

        watcher
            .watch(assets_root, RecursiveMode::Recursive)
            .map_err(|e| Error::Watcher(format!("{}: {}", assets_root.display(), e)))?;

        debug!(assets = %assets_root.display(), "Scene watcher started");
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait up to `timeout` for the next event
    ///
    /// Returns `Ok(None)` on timeout and an error once the watcher is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<AssetEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::Watcher("watcher channel closed".to_string()))
            }
        }
    }

    /// Drain events that are already queued
    pub fn try_iter(&self) -> impl Iterator<Item = AssetEvent> + '_ {
        self.rx.try_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{Flag, RemoveKind};

    fn rename(mode: RenameMode, paths: &[&str]) -> Event {
        paths.iter().fold(
            Event::new(EventKind::Modify(ModifyKind::Name(mode))),
            |event, p| event.add_path(PathBuf::from(p)),
        )
    }

    fn moved(from: &str, to: &str) -> AssetEvent {
        AssetEvent::Moved {
            from: PathBuf::from(from),
            to: PathBuf::from(to),
        }
    }

    #[test]
    fn test_paired_rename() {
        let mut translator = EventTranslator::new("unity");
        let out = translator.translate(rename(RenameMode::Both, &["A/foo.unity", "B/bar.unity"]));
        assert_eq!(out, vec![moved("A/foo.unity", "B/bar.unity")]);
    }

    #[test]
    fn test_from_to_sequence_then_both_reports_once() {
        let mut translator = EventTranslator::new("unity");
        assert!(translator.translate(rename(RenameMode::From, &["A/foo.unity"])).is_empty());
        assert_eq!(
            translator.translate(rename(RenameMode::To, &["B/bar.unity"])),
            vec![moved("A/foo.unity", "B/bar.unity")]
        );
        assert!(translator
            .translate(rename(RenameMode::Both, &["A/foo.unity", "B/bar.unity"]))
            .is_empty());
    }

    #[test]
    fn test_unmatched_from_becomes_deletion() {
        let mut translator = EventTranslator::new("unity");
        translator.translate(rename(RenameMode::From, &["A/gone.unity"]));
        let out = translator.translate(rename(RenameMode::From, &["A/other.unity"]));
        assert_eq!(out, vec![AssetEvent::Deleted(PathBuf::from("A/gone.unity"))]);
    }

    #[test]
    fn test_non_scene_files_ignored() {
        let mut translator = EventTranslator::new("unity");
        assert!(translator
            .translate(rename(RenameMode::Both, &["A/tex.png", "B/tex.png"]))
            .is_empty());

        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("A/tex.png"));
        assert!(translator.translate(remove).is_empty());
    }

    #[test]
    fn test_remove_scene() {
        let mut translator = EventTranslator::new("unity");
        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("A/foo.unity"));
        assert_eq!(
            translator.translate(remove),
            vec![AssetEvent::Deleted(PathBuf::from("A/foo.unity"))]
        );
    }

    #[test]
    fn test_rescan_flag() {
        let mut translator = EventTranslator::new("unity");
        let event = Event::new(EventKind::Other).set_flag(Flag::Rescan);
        assert_eq!(translator.translate(event), vec![AssetEvent::Rescan]);
    }
}
