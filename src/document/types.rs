//! Core document types.

use std::path::{Path, PathBuf};

/// Display name given to documents that have never been saved.
pub const UNTITLED_NAME: &str = "Untitled.md";

/// Text a freshly created document starts with.
pub const PLACEHOLDER_TEXT: &str = "# New Document\n\nStart writing here...\n";

/// A markdown document: where it lives (if anywhere), what it is called, and
/// its text as of the last load or save.
#[derive(Debug, Clone)]
pub struct Document {
    location: Option<PathBuf>,
    name: String,
    text: String,
}

impl Document {
    /// Create the default in-memory document used by "new".
    pub fn untitled() -> Self {
        Self {
            location: None,
            name: UNTITLED_NAME.to_string(),
            text: PLACEHOLDER_TEXT.to_string(),
        }
    }

    /// Create a document backed by `path`.
    pub fn from_file(path: &Path, text: String) -> Self {
        Self {
            location: Some(path.to_path_buf()),
            name: display_name(path),
            text,
        }
    }

    /// The persisted location, if the document has been saved or opened.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// File name shown in the browser and status bar.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text as of the last load or save.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the document has a persisted location.
    pub const fn has_location(&self) -> bool {
        self.location.is_some()
    }

    /// Record a successful write of `text` to `path`.
    pub(crate) fn persisted(&mut self, path: &Path, text: &str) {
        self.location = Some(path.to_path_buf());
        self.name = display_name(path);
        text.clone_into(&mut self.text);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::untitled()
    }
}

// Documents with a location are the same document when they point at the
// same file; unsaved ones compare by name and content.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        match (&self.location, &other.location) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == other.name && self.text == other.text,
        }
    }
}

impl Eq for Document {}

/// A markdown file shown in the file browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untitled_has_placeholder_and_no_location() {
        let doc = Document::untitled();
        assert_eq!(doc.name(), "Untitled.md");
        assert!(doc.text().starts_with("# New Document\n\n"));
        assert!(doc.location().is_none());
    }

    #[test]
    fn test_from_file_uses_file_name() {
        let doc = Document::from_file(Path::new("/tmp/notes/todo.md"), "x".to_string());
        assert_eq!(doc.name(), "todo.md");
        assert_eq!(doc.location(), Some(Path::new("/tmp/notes/todo.md")));
    }

    #[test]
    fn test_equality_prefers_location() {
        let a = Document::from_file(Path::new("a.md"), "one".to_string());
        let b = Document::from_file(Path::new("a.md"), "two".to_string());
        assert_eq!(a, b);

        let c = Document::untitled();
        let mut d = Document::untitled();
        assert_eq!(c, d);
        d.persisted(Path::new("d.md"), "changed");
        assert_ne!(c, d);
    }

    #[test]
    fn test_persisted_updates_identity() {
        let mut doc = Document::untitled();
        doc.persisted(Path::new("/docs/plan.md"), "# Plan");
        assert_eq!(doc.name(), "plan.md");
        assert_eq!(doc.text(), "# Plan");
        assert!(doc.has_location());
    }
}
