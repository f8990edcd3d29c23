//! Rope-backed markdown editing.
//!
//! The buffer is shared by the embedded renderer's editing surface and the
//! raw pane's monospace mode. Formatting commands live in [`format`].

mod buffer;
pub mod format;

pub use buffer::{Cursor, EditorBuffer};
