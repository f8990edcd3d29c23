//! Documents and the file-system store behind them.
//!
//! This module handles:
//! - The current document's identity (location, name) and text
//! - Opening and saving markdown files
//! - Listing the markdown files of a directory for the file browser

mod store;
mod types;

pub use store::{DocumentStore, ReadFailure, SaveOutcome, StoreError};
pub use types::{Document, FileEntry, PLACEHOLDER_TEXT, UNTITLED_NAME};

/// File extensions treated as markdown.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Returns true if the path has a markdown extension (case-insensitive).
pub fn is_markdown_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_markdown_extensions_are_recognized() {
        assert!(is_markdown_file(Path::new("README.md")));
        assert!(is_markdown_file(Path::new("notes.markdown")));
        assert!(is_markdown_file(Path::new("LOUD.MD")));
    }

    #[test]
    fn test_other_files_are_rejected() {
        assert!(!is_markdown_file(Path::new("main.rs")));
        assert!(!is_markdown_file(Path::new("md")));
        assert!(!is_markdown_file(Path::new("archive.md.bak")));
    }
}
