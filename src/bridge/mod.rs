//! Shared editing state mediating the panes and the document store.
//!
//! [`EditorState`] holds the authoritative text. Panes report edits to it and
//! receive [`ChangeNotice`]s naming which panes must re-render. Every accepted
//! change bumps a revision so late edits from a pane that missed a change can
//! be detected and dropped.

mod pane;
mod state;

pub use pane::{Pane, PaneSet};
pub use state::{ChangeNotice, Edit, EditOutcome, EditorState, Readiness, Replay};
