use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::RenderAdapter;
use crate::app::model::{Prompt, PromptKind};
use crate::app::{App, Message, Model, ToastLevel};
use crate::bridge::{Pane, PaneSet};
use crate::document::{SaveOutcome, StoreError};

impl App {
    /// Run the file-system work a message asks for.
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        match msg {
            Message::BrowserOpenSelected | Message::BrowserClick(_) => {
                if let Some(path) = model.selected_file().map(|f| f.path.clone()) {
                    model.open_path(&path);
                }
            }
            Message::RefreshFiles => {
                if model.refresh_files() {
                    model.show_toast(ToastLevel::Info, "File list refreshed");
                }
            }
            Message::DirectoryChanged => {
                model.refresh_files();
            }
            Message::RendererLost(_) => model.restart_renderer(),
            Message::Save => model.save(),
            Message::PromptSubmit => {
                if let Some(prompt) = model.prompt.take() {
                    model.submit_prompt(prompt);
                }
            }
            Message::ExportHtml => match model.export_html() {
                Ok(path) => model.show_toast(
                    ToastLevel::Info,
                    format!("Exported {}", path.display()),
                ),
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "export failed");
                    model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
                }
            },
            _ => {}
        }
    }
}

impl Model {
    /// Open `path` and make it the current document. On failure the previous
    /// document stays current.
    pub(super) fn open_path(&mut self, path: &Path) {
        match self.store.open(path) {
            Ok(doc) => {
                let name = doc.name().to_string();
                let notice = self.editor.open_document(doc);
                self.raw_scroll = 0;
                self.preview_scroll = 0;
                self.deliver(&notice);
                self.refresh_files();
                self.show_toast(ToastLevel::Info, format!("Opened {name}"));
            }
            Err(err) => self.report_store_error("Open failed", &err),
        }
    }

    pub(super) fn save(&mut self) {
        let text = self.editor.text().to_string();
        match self.store.save(self.editor.document_mut(), &text) {
            Ok(SaveOutcome::Saved(path)) => self.saved(&path),
            Ok(SaveOutcome::NeedsLocation { suggested }) => {
                self.prompt = Some(Prompt {
                    kind: PromptKind::SaveAs,
                    input: suggested.display().to_string(),
                });
            }
            Err(err) => self.report_store_error("Save failed", &err),
        }
    }

    pub(super) fn save_as(&mut self, path: &Path) {
        let text = self.editor.text().to_string();
        match self.store.save_as(self.editor.document_mut(), &text, path) {
            Ok(path) => self.saved(&path),
            Err(err) => self.report_store_error("Save failed", &err),
        }
    }

    fn saved(&mut self, path: &Path) {
        self.editor.mark_saved();
        self.refresh_files();
        self.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
    }

    pub(super) fn change_directory(&mut self, dir: &Path) {
        match self.store.set_directory(dir) {
            Ok(()) => {
                self.file_selected = None;
                self.refresh_files();
            }
            Err(err) => self.report_store_error("Cannot open directory", &err),
        }
    }

    /// Re-read the last directory. Returns false (and shows the error) on failure.
    pub(super) fn refresh_files(&mut self) -> bool {
        match self.store.list_last_dir() {
            Ok(files) => {
                self.set_files(files);
                true
            }
            Err(err) => {
                self.report_store_error("Listing failed", &err);
                false
            }
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        let input = prompt.input.trim();
        if input.is_empty() {
            return;
        }
        let path = self.resolve_input(input);
        match prompt.kind {
            PromptKind::Open => self.open_path(&path),
            PromptKind::SaveAs => self.save_as(&path),
            PromptKind::ChangeDir => self.change_directory(&path),
        }
    }

    /// Relative prompt input is taken relative to the last directory.
    pub(super) fn resolve_input(&self, input: &str) -> PathBuf {
        let path = Path::new(input);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.store.last_dir().join(path)
        }
    }

    /// Write the preview next to the document as `<name>.html`.
    pub(super) fn export_html(&mut self) -> Result<PathBuf> {
        if self.preview.is_behind(self.editor.revision()) {
            self.push_panes(PaneSet::from_iter([Pane::Preview]));
        }
        let doc = self.editor.document();
        let target = doc.location().map_or_else(
            || self.store.last_dir().join(doc.name()),
            Path::to_path_buf,
        );
        let target = target.with_extension("html");
        let html = self.preview.export_html(doc.name());
        std::fs::write(&target, html)
            .with_context(|| format!("failed to write {}", target.display()))?;
        info!(path = %target.display(), "exported preview");
        Ok(target)
    }

    fn report_store_error(&mut self, action: &str, err: &StoreError) {
        warn!(%err, "{action}");
        self.show_toast(ToastLevel::Error, format!("{action}: {err}"));
    }
}
