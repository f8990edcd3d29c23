// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. adapters::RawAdapter)
    clippy::module_name_repetitions
)]

//! # Tripane
//!
//! A terminal markdown editor that shows one document three ways at once:
//! - a rich editor hosted by an embedded renderer
//! - the raw markdown source, editable or syntax highlighted
//! - a live rendered preview, exportable as HTML
//!
//! ## Architecture
//!
//! Tripane uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! Every edit goes through [`bridge::EditorState`], which owns the
//! authoritative text and decides which panes need the change.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`bridge`]: Authoritative text, revisions and pane visibility
//! - [`adapters`]: The three panes as push targets
//! - [`channel`] / [`protocol`]: Message transport to the embedded renderer
//! - [`renderer`]: The embedded rich editing surface
//! - [`editor`]: Text buffer and formatting commands
//! - [`document`] / [`bookmark`]: Files, saving and the last directory
//! - [`preview`] / [`highlight`]: Markdown rendering and syntax highlighting
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: Directory watching

pub mod adapters;
pub mod app;
pub mod bookmark;
pub mod bridge;
pub mod channel;
pub mod config;
pub mod document;
pub mod editor;
pub mod highlight;
pub mod preview;
pub mod protocol;
pub mod renderer;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::bridge::{EditorState, Pane, PaneSet};
    pub use crate::document::{Document, DocumentStore};
}
