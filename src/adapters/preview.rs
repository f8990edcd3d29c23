use ratatui::text::Line;

use super::{AdapterError, PushOutcome, RenderAdapter, Snapshot};
use crate::bridge::Pane;
use crate::config::PreviewTheme;
use crate::highlight::BackgroundMode;
use crate::preview;

/// The rendered preview pane.
#[derive(Debug, Default)]
pub struct PreviewAdapter {
    theme: PreviewTheme,
    text: String,
    lines: Vec<Line<'static>>,
    synced: Option<u64>,
}

impl PreviewAdapter {
    pub fn new(theme: PreviewTheme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub const fn theme(&self) -> PreviewTheme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: PreviewTheme) {
        if self.theme != theme {
            self.theme = theme;
            self.render();
        }
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Standalone HTML page of the current preview.
    pub fn export_html(&self, title: &str) -> String {
        preview::render_page(&self.text, title, self.theme)
    }

    fn render(&mut self) {
        self.lines = preview::render_lines(&self.text, BackgroundMode::for_theme(self.theme));
    }
}

impl RenderAdapter for PreviewAdapter {
    fn pane(&self) -> Pane {
        Pane::Preview
    }

    fn push(&mut self, snapshot: Snapshot<'_>) -> Result<PushOutcome, AdapterError> {
        if self.synced == Some(snapshot.revision) {
            return Ok(PushOutcome::Unchanged);
        }
        snapshot.text.clone_into(&mut self.text);
        self.render();
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
