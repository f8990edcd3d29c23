use tracing::{debug, info};

use super::pane::{Pane, PaneSet};
use crate::document::Document;

/// Whether the embedded renderer finished initializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

/// Text and revision delivered to the renderer when it becomes ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub text: String,
    pub revision: u64,
}

/// Which panes must re-render after an accepted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    pub revision: u64,
    pub targets: PaneSet,
}

/// A text change reported by a pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub origin: Pane,
    /// Revision the pane last received; `None` when the pane does not track
    /// revisions.
    pub base: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied(ChangeNotice),
    /// A change from another source landed after the edit's base revision.
    /// The edit was dropped; the origin should be re-synced.
    Stale { current: u64 },
}

/// The authoritative editing state shared by all panes.
#[derive(Debug)]
pub struct EditorState {
    document: Document,
    text: String,
    dirty: bool,
    readiness: Readiness,
    visible: PaneSet,
    revision: u64,
    /// Per pane, the latest revision produced by some other source.
    foreign: [u64; 3],
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Document::untitled())
    }
}

impl EditorState {
    pub fn new(document: Document) -> Self {
        let mut state = Self {
            text: String::new(),
            document,
            dirty: false,
            readiness: Readiness::NotReady,
            visible: PaneSet::all(),
            revision: 0,
            foreign: [0; 3],
        };
        let text = state.document.text().to_string();
        state.load(text);
        state
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub const fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub const fn visible(&self) -> PaneSet {
        self.visible
    }

    pub const fn is_visible(&self, pane: Pane) -> bool {
        self.visible.contains(pane)
    }

    /// Replace the text with freshly loaded content and notify every pane.
    pub fn load(&mut self, text: impl Into<String>) -> ChangeNotice {
        self.text = text.into();
        self.dirty = false;
        let notice = self.accept(None);
        debug!(revision = notice.revision, bytes = self.text.len(), "loaded text");
        notice
    }

    /// Accept `text` from `origin` unconditionally.
    pub fn edit(&mut self, text: impl Into<String>, origin: Pane) -> ChangeNotice {
        self.text = text.into();
        self.dirty = true;
        let notice = self.accept(Some(origin));
        debug!(revision = notice.revision, %origin, "accepted edit");
        notice
    }

    /// Accept an edit unless another source changed the text after the
    /// edit's base revision.
    pub fn edit_sequenced(&mut self, edit: Edit) -> EditOutcome {
        if let Some(base) = edit.base
            && self.foreign[edit.origin.index()] > base
        {
            info!(
                origin = %edit.origin,
                base,
                current = self.revision,
                "discarding stale edit"
            );
            return EditOutcome::Stale {
                current: self.revision,
            };
        }
        EditOutcome::Applied(self.edit(edit.text, edit.origin))
    }

    pub const fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Make `doc` the current document and load its text.
    pub fn open_document(&mut self, doc: Document) -> ChangeNotice {
        info!(name = doc.name(), "opening document");
        let text = doc.text().to_string();
        self.document = doc;
        self.load(text)
    }

    /// Make a freshly created `doc` current.
    pub fn new_document(&mut self, doc: Document) -> ChangeNotice {
        info!("starting new document");
        let text = doc.text().to_string();
        self.document = doc;
        self.load(text)
    }

    /// Transition to ready. Returns the content to replay on the first call
    /// only.
    pub fn mark_ready(&mut self) -> Option<Replay> {
        if self.readiness == Readiness::Ready {
            debug!("renderer reported ready again; ignoring");
            return None;
        }
        self.readiness = Readiness::Ready;
        info!(revision = self.revision, "renderer ready, replaying content");
        Some(Replay {
            text: self.text.clone(),
            revision: self.revision,
        })
    }

    /// Forget readiness after the renderer channel was re-created.
    pub fn reset_readiness(&mut self) {
        debug!("renderer readiness reset");
        self.readiness = Readiness::NotReady;
    }

    /// Show or hide `pane`. Hiding the last visible pane is refused.
    pub fn toggle_pane(&mut self, pane: Pane) -> bool {
        if self.visible.contains(pane) {
            if self.visible.len() == 1 {
                debug!(%pane, "refusing to hide the last visible pane");
                return false;
            }
            self.visible.remove(pane);
        } else {
            self.visible.insert(pane);
        }
        true
    }

    /// Set the visible panes; an empty set is ignored.
    pub fn set_visible(&mut self, panes: PaneSet) {
        if !panes.is_empty() {
            self.visible = panes;
        }
    }

    fn accept(&mut self, origin: Option<Pane>) -> ChangeNotice {
        self.revision += 1;
        for pane in Pane::ALL {
            if Some(pane) != origin {
                self.foreign[pane.index()] = self.revision;
            }
        }
        let targets = origin.map_or_else(PaneSet::all, PaneSet::all_except);
        ChangeNotice {
            revision: self.revision,
            targets,
        }
    }
}
