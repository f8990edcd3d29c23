//! Loading, saving, and listing markdown files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{Document, FileEntry};
use crate::bookmark::BookmarkStore;

/// Why a file could not be turned into document text.
#[derive(Debug, Error)]
pub enum ReadFailure {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("file is not valid UTF-8")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Errors raised by [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadFailure,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot list {}: {source}", dir.display())]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The text was written to the document's location.
    Saved(PathBuf),
    /// The document has no location; the caller must supply one and call
    /// [`DocumentStore::save_as`].
    NeedsLocation { suggested: PathBuf },
}

/// Reads and writes documents and remembers the last directory used.
#[derive(Debug)]
pub struct DocumentStore {
    last_dir: PathBuf,
    bookmarks: Option<BookmarkStore>,
}

impl DocumentStore {
    /// Create a store rooted at `dir` that does not persist its directory.
    pub const fn new(dir: PathBuf) -> Self {
        Self {
            last_dir: dir,
            bookmarks: None,
        }
    }

    /// Create a store whose directory is restored from (and saved to) a bookmark.
    pub fn restore(bookmarks: BookmarkStore, fallback: &Path) -> Self {
        let last_dir = bookmarks.restore(fallback);
        Self {
            last_dir,
            bookmarks: Some(bookmarks),
        }
    }

    /// The last known directory.
    pub fn last_dir(&self) -> &Path {
        &self.last_dir
    }

    /// Produce a fresh untitled document.
    #[allow(clippy::unused_self)]
    pub fn create_new(&self) -> Document {
        debug!("creating untitled document");
        Document::untitled()
    }

    /// Read the file at `path` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file cannot be read or is not UTF-8.
    pub fn open(&mut self, path: &Path) -> Result<Document, StoreError> {
        let read_err = |source: ReadFailure| StoreError::Read {
            path: path.to_path_buf(),
            source,
        };
        let bytes = fs::read(path).map_err(|e| read_err(e.into()))?;
        let text = String::from_utf8(bytes).map_err(|e| read_err(e.into()))?;
        info!(path = %path.display(), bytes = text.len(), "opened document");
        if let Some(dir) = parent_dir(path) {
            self.remember_dir(&dir);
        }
        Ok(Document::from_file(path, text))
    }

    /// Save `text` as the content of `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the document has a location and the
    /// write fails.
    pub fn save(&mut self, doc: &mut Document, text: &str) -> Result<SaveOutcome, StoreError> {
        let Some(path) = doc.location().map(Path::to_path_buf) else {
            let suggested = self.last_dir.join(doc.name());
            debug!(suggested = %suggested.display(), "save needs a location");
            return Ok(SaveOutcome::NeedsLocation { suggested });
        };
        self.write_to(doc, text, path).map(SaveOutcome::Saved)
    }

    /// Save `text` to `path`, which becomes the document's location.
    ///
    /// A path without an extension gets `.md` appended.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the file cannot be written.
    pub fn save_as(
        &mut self,
        doc: &mut Document,
        text: &str,
        path: &Path,
    ) -> Result<PathBuf, StoreError> {
        let mut path = path.to_path_buf();
        if path.extension().is_none() {
            path.set_extension("md");
        }
        self.write_to(doc, text, path)
    }

    fn write_to(
        &mut self,
        doc: &mut Document,
        text: &str,
        path: PathBuf,
    ) -> Result<PathBuf, StoreError> {
        write_atomically(&path, text).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = text.len(), "saved document");
        doc.persisted(&path, text);
        if let Some(dir) = parent_dir(&path) {
            self.remember_dir(&dir);
        }
        Ok(path)
    }

    /// List the markdown files in `dir`, sorted case-insensitively by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::List`] if the directory cannot be read.
    #[allow(clippy::unused_self)]
    pub fn list_available(&self, dir: &Path) -> Result<Vec<FileEntry>, StoreError> {
        let list_err = |source| StoreError::List {
            dir: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let name = entry.file_name().to_string_lossy().to_string();
            // Skip hidden files
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if !path.is_file() || !super::is_markdown_file(&path) {
                continue;
            }
            files.push(FileEntry { name, path });
        }
        files.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(files)
    }

    /// List the markdown files in the last known directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::List`] if the directory cannot be read.
    pub fn list_last_dir(&self) -> Result<Vec<FileEntry>, StoreError> {
        self.list_available(&self.last_dir)
    }

    /// Make `dir` the last known directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::List`] if `dir` is not a readable directory.
    pub fn set_directory(&mut self, dir: &Path) -> Result<(), StoreError> {
        fs::read_dir(dir).map_err(|source| StoreError::List {
            dir: dir.to_path_buf(),
            source,
        })?;
        self.remember_dir(dir);
        Ok(())
    }

    fn remember_dir(&mut self, dir: &Path) {
        if self.last_dir == dir {
            return;
        }
        dir.clone_into(&mut self.last_dir);
        if let Some(bookmarks) = &self.bookmarks
            && let Err(err) = bookmarks.save(dir)
        {
            warn!(dir = %dir.display(), %err, "failed to persist directory bookmark");
        }
    }
}

fn parent_dir(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(parent.to_path_buf())
    }
}

fn write_atomically(path: &Path, text: &str) -> io::Result<()> {
    let dir = parent_dir(path).unwrap_or_else(|| PathBuf::from("."));
    let Some(file_name) = path.file_name() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path has no file name",
        ));
    };
    let tmp = dir.join(format!(".{}.tripane-tmp", file_name.to_string_lossy()));
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_reads_name_and_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Hi").unwrap();

        let mut store = DocumentStore::new(PathBuf::from("."));
        let doc = store.open(&path).unwrap();
        assert_eq!(doc.name(), "notes.md");
        assert_eq!(doc.text(), "# Hi");
        assert_eq!(store.last_dir(), dir.path());
    }

    #[test]
    fn test_open_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let mut store = DocumentStore::new(dir.path().to_path_buf());
        let err = store.open(&dir.path().join("gone.md")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Read {
                source: ReadFailure::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn test_open_invalid_utf8_is_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("binary.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();
        let mut store = DocumentStore::new(dir.path().to_path_buf());
        let err = store.open(&path).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Read {
                source: ReadFailure::Decode(_),
                ..
            }
        ));
    }

    #[test]
    fn test_failed_open_keeps_last_dir() {
        let dir = tempdir().unwrap();
        let mut store = DocumentStore::new(dir.path().to_path_buf());
        let _ = store.open(Path::new("/definitely/not/here.md"));
        assert_eq!(store.last_dir(), dir.path());
    }

    #[test]
    fn test_save_without_location_requests_one() {
        let dir = tempdir().unwrap();
        let mut store = DocumentStore::new(dir.path().to_path_buf());
        let mut doc = store.create_new();
        let outcome = store.save(&mut doc, "text").unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::NeedsLocation {
                suggested: dir.path().join("Untitled.md")
            }
        );
        assert!(doc.location().is_none());
    }

    #[test]
    fn test_save_as_sets_location_and_writes() {
        let dir = tempdir().unwrap();
        let mut store = DocumentStore::new(PathBuf::from("."));
        let mut doc = store.create_new();
        let target = dir.path().join("draft");
        let written = store.save_as(&mut doc, "# Draft", &target).unwrap();

        assert_eq!(written, dir.path().join("draft.md"));
        assert_eq!(fs::read_to_string(&written).unwrap(), "# Draft");
        assert_eq!(doc.location(), Some(written.as_path()));
        assert_eq!(doc.name(), "draft.md");
        assert_eq!(store.last_dir(), dir.path());
    }

    #[test]
    fn test_save_overwrites_existing_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "old").unwrap();
        let mut store = DocumentStore::new(dir.path().to_path_buf());
        let mut doc = store.open(&path).unwrap();

        let outcome = store.save(&mut doc, "new").unwrap();
        assert_eq!(outcome, SaveOutcome::Saved(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(doc.text(), "new");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with("tripane-tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp file should be renamed away");
    }

    #[test]
    fn test_save_into_missing_directory_is_write_error() {
        let dir = tempdir().unwrap();
        let mut store = DocumentStore::new(dir.path().to_path_buf());
        let mut doc = store.create_new();
        let err = store
            .save_as(&mut doc, "x", &dir.path().join("missing/sub/doc.md"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(doc.location().is_none());
    }

    #[test]
    fn test_list_available_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["beta.md", "Alpha.markdown", "gamma.txt", "delta.MD", ".hidden.md"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.md")).unwrap();

        let store = DocumentStore::new(dir.path().to_path_buf());
        let names: Vec<_> = store
            .list_last_dir()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Alpha.markdown", "beta.md", "delta.MD"]);
    }

    #[test]
    fn test_list_missing_directory_is_list_error() {
        let store = DocumentStore::new(PathBuf::from("."));
        let err = store
            .list_available(Path::new("/no/such/dir/anywhere"))
            .unwrap_err();
        assert!(matches!(err, StoreError::List { .. }));
    }

    #[test]
    fn test_set_directory_rejects_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.md");
        fs::write(&file, "x").unwrap();
        let mut store = DocumentStore::new(dir.path().to_path_buf());
        assert!(store.set_directory(&file).is_err());
        assert_eq!(store.last_dir(), dir.path());
    }
}
