use ratatui::text::Line;
use tracing::debug;

use super::{AdapterError, PushOutcome, RenderAdapter, Snapshot};
use crate::bridge::Pane;
use crate::editor::{Cursor, EditorBuffer};
use crate::highlight::{self, BackgroundMode};
use crate::protocol::EditorKey;

/// How the raw markdown pane presents the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawMode {
    /// Plain, directly editable text.
    #[default]
    Monospace,
    /// Read-only syntax-highlighted text.
    Highlight,
}

impl RawMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Monospace => Self::Highlight,
            Self::Highlight => Self::Monospace,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monospace => "monospace",
            Self::Highlight => "highlight",
        }
    }
}

/// The raw markdown pane.
#[derive(Debug)]
pub struct RawAdapter {
    mode: RawMode,
    background: BackgroundMode,
    buffer: EditorBuffer,
    highlighted: Vec<Line<'static>>,
    synced: Option<u64>,
}

impl Default for RawAdapter {
    fn default() -> Self {
        Self::new(RawMode::default(), BackgroundMode::Dark)
    }
}

impl RawAdapter {
    pub fn new(mode: RawMode, background: BackgroundMode) -> Self {
        Self {
            mode,
            background,
            buffer: EditorBuffer::from_text(""),
            highlighted: Vec::new(),
            synced: None,
        }
    }

    pub const fn mode(&self) -> RawMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RawMode) {
        if self.mode == mode {
            return;
        }
        debug!(mode = mode.label(), "raw pane mode changed");
        self.mode = mode;
        self.refresh_highlight();
    }

    pub fn set_background(&mut self, background: BackgroundMode) {
        if self.background != background {
            self.background = background;
            self.refresh_highlight();
        }
    }

    pub fn is_editable(&self) -> bool {
        self.mode == RawMode::Monospace
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub const fn cursor(&self) -> Cursor {
        self.buffer.cursor()
    }

    pub fn line(&self, idx: usize) -> Option<String> {
        self.buffer.line(idx)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// Lines to display in the current mode.
    pub fn lines(&self) -> Vec<Line<'static>> {
        match self.mode {
            RawMode::Highlight => self.highlighted.clone(),
            RawMode::Monospace => (0..self.buffer.line_count())
                .map(|idx| Line::raw(self.buffer.line(idx).unwrap_or_default()))
                .collect(),
        }
    }

    /// Apply a key in monospace mode. Returns the new text if it changed.
    pub fn apply_key(&mut self, key: EditorKey) -> Option<String> {
        if !self.is_editable() {
            return None;
        }
        self.buffer.apply_key(key).then(|| self.buffer.text())
    }

    fn refresh_highlight(&mut self) {
        if self.mode == RawMode::Highlight {
            self.highlighted = highlight::highlight_markdown(&self.buffer.text(), self.background);
        } else {
            self.highlighted.clear();
        }
    }
}

impl RenderAdapter for RawAdapter {
    fn pane(&self) -> Pane {
        Pane::Raw
    }

    fn push(&mut self, snapshot: Snapshot<'_>) -> Result<PushOutcome, AdapterError> {
        if self.synced == Some(snapshot.revision) {
            return Ok(PushOutcome::Unchanged);
        }
        self.buffer.set_text(snapshot.text);
        self.refresh_highlight();
        self.synced = Some(snapshot.revision);
        Ok(PushOutcome::Delivered)
    }

    fn synced_revision(&self) -> Option<u64> {
        self.synced
    }

    fn mark_synced(&mut self, revision: u64) {
        self.synced = Some(revision);
    }
}
