//! Persisted "last known directory".
//!
//! The bookmark records both the path the user chose and the canonical
//! location it resolved to when saved. On load, a bookmark whose path now
//! resolves somewhere else (or whose path is gone while the resolved target
//! remains) is reported stale and refreshed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("bookmark I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("bookmark {} is corrupt: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("bookmarked directory {} no longer exists", path.display())]
    Missing { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BookmarkRecord {
    path: PathBuf,
    resolved: PathBuf,
    saved_at: u64,
}

/// A bookmark read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBookmark {
    pub dir: PathBuf,
    pub stale: bool,
}

/// JSON-file backed bookmark for one directory.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    file: PathBuf,
}

impl BookmarkStore {
    pub const fn new(file: PathBuf) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Record `dir` as the last known directory.
    pub fn save(&self, dir: &Path) -> Result<(), BookmarkError> {
        let io_err = |source| BookmarkError::Io {
            path: self.file.clone(),
            source,
        };
        let resolved = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let record = BookmarkRecord {
            path: dir.to_path_buf(),
            resolved,
            saved_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
        };
        let json = serde_json::to_string_pretty(&record).map_err(|source| BookmarkError::Format {
            path: self.file.clone(),
            source,
        })?;
        if let Some(parent) = self.file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.file, json).map_err(io_err)?;
        debug!(dir = %dir.display(), file = %self.file.display(), "saved directory bookmark");
        Ok(())
    }

    /// Read the bookmark. `Ok(None)` means none was ever saved.
    pub fn load(&self) -> Result<Option<ResolvedBookmark>, BookmarkError> {
        let raw = match fs::read_to_string(&self.file) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(BookmarkError::Io {
                    path: self.file.clone(),
                    source,
                });
            }
        };
        let record: BookmarkRecord =
            serde_json::from_str(&raw).map_err(|source| BookmarkError::Format {
                path: self.file.clone(),
                source,
            })?;
        resolve(record).map(Some)
    }

    /// Resolve the bookmarked directory, refreshing stale bookmarks and
    /// falling back to `fallback` when nothing usable is stored.
    pub fn restore(&self, fallback: &Path) -> PathBuf {
        match self.load() {
            Ok(Some(bookmark)) => {
                if bookmark.stale {
                    info!(dir = %bookmark.dir.display(), "refreshing stale directory bookmark");
                    if let Err(err) = self.save(&bookmark.dir) {
                        warn!(%err, "failed to refresh directory bookmark");
                    }
                }
                bookmark.dir
            }
            Ok(None) => {
                debug!(dir = %fallback.display(), "no directory bookmark, using default");
                fallback.to_path_buf()
            }
            Err(err) => {
                warn!(%err, dir = %fallback.display(), "directory bookmark unusable, using default");
                fallback.to_path_buf()
            }
        }
    }
}

fn resolve(record: BookmarkRecord) -> Result<ResolvedBookmark, BookmarkError> {
    if record.path.is_dir() {
        let canonical = fs::canonicalize(&record.path).unwrap_or_else(|_| record.path.clone());
        let stale = canonical != record.resolved;
        return Ok(ResolvedBookmark {
            dir: record.path,
            stale,
        });
    }
    if record.resolved.is_dir() {
        return Ok(ResolvedBookmark {
            dir: record.resolved,
            stale: true,
        });
    }
    Err(BookmarkError::Missing { path: record.path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let store = BookmarkStore::new(dir.path().join("bookmark.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_is_fresh() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        let store = BookmarkStore::new(dir.path().join("state").join("bookmark.json"));

        store.save(&docs).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.dir, docs);
        assert!(!loaded.stale);
    }

    #[test]
    fn test_moved_directory_falls_back_to_resolved_and_is_stale() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        let record = BookmarkRecord {
            path: dir.path().join("renamed-away"),
            resolved: target.clone(),
            saved_at: 0,
        };
        let file = dir.path().join("bookmark.json");
        fs::write(&file, serde_json::to_string(&record).unwrap()).unwrap();

        let store = BookmarkStore::new(file);
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.dir, target);
        assert!(loaded.stale);
    }

    #[test]
    fn test_retargeted_path_is_stale_and_refreshed() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        let record = BookmarkRecord {
            path: docs.clone(),
            resolved: dir.path().join("somewhere-else"),
            saved_at: 0,
        };
        let file = dir.path().join("bookmark.json");
        fs::write(&file, serde_json::to_string(&record).unwrap()).unwrap();
        let store = BookmarkStore::new(file);

        let restored = store.restore(Path::new("/fallback"));
        assert_eq!(restored, docs);
        let refreshed = store.load().unwrap().unwrap();
        assert!(!refreshed.stale, "restore should re-save a stale bookmark");
    }

    #[test]
    fn test_vanished_directory_uses_fallback() {
        let dir = tempdir().unwrap();
        let record = BookmarkRecord {
            path: dir.path().join("gone"),
            resolved: dir.path().join("also-gone"),
            saved_at: 0,
        };
        let file = dir.path().join("bookmark.json");
        fs::write(&file, serde_json::to_string(&record).unwrap()).unwrap();
        let store = BookmarkStore::new(file);

        assert!(matches!(store.load(), Err(BookmarkError::Missing { .. })));
        assert_eq!(store.restore(dir.path()), dir.path());
    }

    #[test]
    fn test_corrupt_file_is_format_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bookmark.json");
        fs::write(&file, "{not json").unwrap();
        let store = BookmarkStore::new(file);
        assert!(matches!(store.load(), Err(BookmarkError::Format { .. })));
    }
}
