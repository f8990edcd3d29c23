//! Directory watching for the file browser.
//!
//! Uses notify crate for cross-platform file system events.
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace, warn};

use crate::document::is_markdown_file;

/// Watches one directory and emits debounced "listing changed" notifications.
pub struct DirWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl std::fmt::Debug for DirWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirWatcher")
            .field("dir", &self.dir)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl DirWatcher {
    /// Create a watcher for `dir`.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or the directory cannot be watched.
    pub fn new(dir: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths from the OS are absolute and canonical.
        let dir = dir
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| dir.as_ref().to_path_buf());

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        debug!(dir = %dir.display(), "watching directory");

        Ok(Self {
            _watcher: watcher,
            rx,
            dir,
            debounce,
            pending_since: None,
        })
    }

    /// The canonical directory being watched.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns true once a debounced change to the listing is ready.
    pub fn take_change_ready(&mut self) -> bool {
        let mut saw_relevant_event = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => saw_relevant_event = true,
                Ok(ev) => trace!(kind = ?ev.kind, paths = ?ev.paths, "ignored watcher event"),
                Err(err) => warn!(%err, dir = %self.dir.display(), "watcher error"),
            }
        }

        if saw_relevant_event {
            self.pending_since = Some(Instant::now());
        }

        let Some(pending_since) = self.pending_since else {
            return false;
        };
        if pending_since.elapsed() >= self.debounce {
            self.pending_since = None;
            return true;
        }
        false
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event
            .paths
            .iter()
            .any(|path| path == &self.dir || is_markdown_file(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event(paths: Vec<PathBuf>) -> Event {
        Event {
            kind: EventKind::Any,
            paths,
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_directory_level_event_is_relevant() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let watcher = DirWatcher::new(dir.path(), Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event(vec![canonical_dir])));
    }

    #[test]
    fn test_only_markdown_files_are_relevant() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let watcher = DirWatcher::new(dir.path(), Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event(vec![canonical_dir.join("notes.MD")])));
        assert!(!watcher.is_relevant(&event(vec![canonical_dir.join("photo.png")])));
    }

    #[test]
    fn test_new_markdown_file_detected() {
        let dir = tempdir().expect("tempdir");
        let mut watcher = DirWatcher::new(dir.path(), Duration::from_millis(50)).expect("watcher");

        // Give the backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));

        std::fs::write(dir.path().join("fresh.md"), "# Fresh").expect("write");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_change_ready() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        assert!(detected, "watcher should notice a new markdown file within 5 seconds");
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(DirWatcher::new(&missing, Duration::from_millis(10)).is_err());
    }
}
