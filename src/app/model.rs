use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::adapters::{
    AdapterSignal, PreviewAdapter, RawAdapter, RawMode, RenderAdapter, RequestKind, Snapshot,
    WysiwygAdapter,
};
use crate::bridge::{ChangeNotice, Edit, EditOutcome, EditorState, Pane, PaneSet};
use crate::channel;
use crate::config::{ConfigFlags, PreviewTheme};
use crate::document::{DocumentStore, FileEntry};
use crate::highlight::BackgroundMode;
use crate::renderer::{self, RendererOptions};

/// Restarts allowed after the embedded renderer is lost.
const MAX_RENDERER_RESTARTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which part of the window receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Browser,
    Pane(Pane),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    SaveAs,
    ChangeDir,
}

impl PromptKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Open => "Open file",
            Self::SaveAs => "Save as",
            Self::ChangeDir => "Change directory",
        }
    }
}

/// A one-line path prompt standing in for a file dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug)]
pub struct Model {
    /// Authoritative text, dirty flag, readiness and pane visibility
    pub editor: EditorState,
    /// File-system access and the last known directory
    pub store: DocumentStore,
    /// Host side of the embedded rich editor
    pub wysiwyg: WysiwygAdapter,
    /// Raw markdown pane
    pub raw: RawAdapter,
    /// Rendered preview pane
    pub preview: PreviewAdapter,
    /// Markdown files of the last known directory
    pub files: Vec<FileEntry>,
    /// Selected file browser entry
    pub file_selected: Option<usize>,
    pub focus: Focus,
    /// Active path prompt, if any
    pub prompt: Option<Prompt>,
    pub help_visible: bool,
    /// First visible line of the raw pane in highlight mode
    pub raw_scroll: usize,
    /// First visible line of the preview pane
    pub preview_scroll: usize,
    pub terminal_size: (u16, u16),
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    toast: Option<Toast>,
    /// How to start the embedded renderer again; `None` never restarts it
    pub(super) renderer_options: Option<RendererOptions>,
    pub(super) renderer_thread: Option<JoinHandle<()>>,
    renderer_restarts: u32,
    /// Set after first quit attempt with unsaved changes; allows second quit to proceed
    pub quit_confirmed: bool,
    pub should_quit: bool,
}

impl Model {
    /// Create a model showing a fresh untitled document.
    pub fn new(store: DocumentStore, wysiwyg: WysiwygAdapter, terminal_size: (u16, u16)) -> Self {
        let editor = EditorState::new(store.create_new());
        Self {
            editor,
            store,
            wysiwyg,
            terminal_size,
            ..Self::default()
        }
    }

    /// Apply startup flags: visible panes, raw mode and preview theme.
    pub fn with_flags(mut self, flags: &ConfigFlags) -> Self {
        let visible: PaneSet = [
            (Pane::Wysiwyg, flags.no_editor),
            (Pane::Raw, flags.no_raw),
            (Pane::Preview, flags.no_preview),
        ]
        .into_iter()
        .filter(|(_, hidden)| !hidden)
        .map(|(pane, _)| pane)
        .collect();
        if visible.is_empty() {
            warn!("every pane was disabled; showing all panes");
        }
        self.editor.set_visible(visible);
        if flags.highlight {
            self.raw.set_mode(RawMode::Highlight);
        }
        if let Some(theme) = flags.theme {
            self.set_theme(theme);
        }
        self
    }

    pub fn theme(&self) -> PreviewTheme {
        self.preview.theme()
    }

    pub fn background(&self) -> BackgroundMode {
        BackgroundMode::for_theme(self.preview.theme())
    }

    pub(super) fn set_theme(&mut self, theme: PreviewTheme) {
        self.preview.set_theme(theme);
        self.raw.set_background(BackgroundMode::for_theme(theme));
    }

    /// Whether the embedded editor can take requests right now.
    pub fn editor_online(&self) -> bool {
        self.wysiwyg.is_connected() && self.wysiwyg.is_ready()
    }

    pub fn selected_file(&self) -> Option<&FileEntry> {
        self.file_selected.and_then(|idx| self.files.get(idx))
    }

    /// Panes in focus order: the visible ones, left to right.
    pub fn focus_order(&self) -> Vec<Focus> {
        std::iter::once(Focus::Browser)
            .chain(self.editor.visible().iter().map(Focus::Pane))
            .collect()
    }

    pub(super) fn cycle_focus(&mut self) {
        let order = self.focus_order();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(current + 1) % order.len()];
    }

    /// Move focus off a pane that is no longer visible.
    pub(super) fn fix_focus(&mut self) {
        if let Focus::Pane(pane) = self.focus
            && !self.editor.is_visible(pane)
        {
            self.focus = self
                .editor
                .visible()
                .iter()
                .next()
                .map_or(Focus::Browser, Focus::Pane);
        }
    }

    pub(super) fn select_file_path(&mut self, path: &Path) {
        if let Some(idx) = self.files.iter().position(|f| f.path == path) {
            self.file_selected = Some(idx);
        }
    }

    pub(super) fn set_files(&mut self, files: Vec<FileEntry>) {
        let previous = self.selected_file().map(|f| f.path.clone());
        self.files = files;
        self.file_selected = if self.files.is_empty() {
            None
        } else {
            Some(0)
        };
        if let Some(path) = previous {
            self.select_file_path(&path);
        }
        if let Some(path) = self.editor.document().location().map(Path::to_path_buf) {
            self.select_file_path(&path);
        }
    }

    /// Push the current text to every visible pane in `notice.targets`.
    pub(super) fn deliver(&mut self, notice: &ChangeNotice) {
        let visible = self.editor.visible();
        let targets: PaneSet = notice.targets.iter().filter(|p| visible.contains(*p)).collect();
        debug!(revision = notice.revision, ?targets, "delivering change");
        self.push_panes(targets);
    }

    /// Bring every visible pane that missed changes up to date.
    pub(super) fn sync_visible_panes(&mut self) {
        let revision = self.editor.revision();
        let behind: PaneSet = self
            .editor
            .visible()
            .iter()
            .filter(|pane| self.adapter(*pane).is_behind(revision))
            .collect();
        self.push_panes(behind);
    }

    pub(super) fn push_panes(&mut self, targets: PaneSet) {
        let snapshot = Snapshot {
            text: self.editor.text(),
            revision: self.editor.revision(),
        };
        let mut failures = Vec::new();
        for pane in targets.iter() {
            let result = match pane {
                Pane::Wysiwyg => self.wysiwyg.push(snapshot),
                Pane::Raw => self.raw.push(snapshot),
                Pane::Preview => self.preview.push(snapshot),
            };
            match result {
                Ok(outcome) => debug!(%pane, revision = snapshot.revision, ?outcome, "pushed"),
                Err(err) => failures.push((pane, err)),
            }
        }
        for (pane, err) in failures {
            warn!(%pane, %err, "pane push failed");
            self.show_toast(ToastLevel::Error, format!("{pane}: {err}"));
        }
    }

    fn adapter(&self, pane: Pane) -> &dyn RenderAdapter {
        match pane {
            Pane::Wysiwyg => &self.wysiwyg,
            Pane::Raw => &self.raw,
            Pane::Preview => &self.preview,
        }
    }

    /// Decode one frame from the renderer and act on it.
    pub(super) fn handle_renderer_frame(&mut self, frame: &str) {
        match self.wysiwyg.handle_frame(frame) {
            Ok(AdapterSignal::Edit(edit)) => self.apply_renderer_edit(edit),
            Ok(AdapterSignal::Ready { message }) => self.renderer_ready(message.as_deref()),
            Ok(AdapterSignal::Failed(error)) => {
                self.show_toast(ToastLevel::Error, format!("Editor error: {error}"));
            }
            Ok(AdapterSignal::Settled {
                kind: Some(RequestKind::Command(_) | RequestKind::Input | RequestKind::SetContent),
                ..
            }) => self.refresh_marks(),
            Ok(AdapterSignal::Settled { .. } | AdapterSignal::Redraw | AdapterSignal::Logged) => {}
            Err(err) => {
                self.show_toast(ToastLevel::Warning, format!("Editor message ignored: {err}"));
            }
        }
    }

    fn apply_renderer_edit(&mut self, edit: Edit) {
        match self.editor.edit_sequenced(edit) {
            EditOutcome::Applied(notice) => {
                self.wysiwyg.mark_synced(notice.revision);
                self.deliver(&notice);
            }
            EditOutcome::Stale { current } => {
                let snapshot = Snapshot {
                    text: self.editor.text(),
                    revision: current,
                };
                if let Err(err) = self.wysiwyg.resync(snapshot) {
                    warn!(%err, "could not resend text to the editor");
                    self.show_toast(ToastLevel::Error, format!("Editor: {err}"));
                }
            }
        }
    }

    fn renderer_ready(&mut self, message: Option<&str>) {
        info!(message = message.unwrap_or_default(), "editor ready");
        let Some(replay) = self.editor.mark_ready() else {
            return;
        };
        if let Err(err) = self.wysiwyg.on_ready(&replay) {
            warn!(%err, "editor replay failed");
            self.show_toast(ToastLevel::Error, format!("Editor: {err}"));
            return;
        }
        self.refresh_marks();
    }

    /// Start a fresh renderer after the old one went away. Its `editorReady`
    /// replays the current text.
    pub(super) fn restart_renderer(&mut self) {
        let Some(options) = self.renderer_options else {
            return;
        };
        if self.renderer_restarts >= MAX_RENDERER_RESTARTS {
            warn!(
                restarts = self.renderer_restarts,
                "editor renderer keeps failing; leaving it offline"
            );
            return;
        }
        if let Some(old) = self.renderer_thread.take()
            && old.join().is_err()
        {
            warn!("renderer thread panicked");
        }
        let (host, end) = channel::pair();
        match renderer::spawn(end, options) {
            Ok(handle) => {
                self.renderer_restarts += 1;
                info!(attempt = self.renderer_restarts, "restarting editor renderer");
                self.renderer_thread = Some(handle);
                self.wysiwyg.replace_channel(host);
            }
            Err(err) => {
                warn!(%err, "could not restart editor renderer");
                self.show_toast(ToastLevel::Error, format!("Editor restart failed: {err}"));
            }
        }
    }

    fn refresh_marks(&mut self) {
        if let Err(err) = self.wysiwyg.request_marks() {
            debug!(%err, "could not request active marks");
        }
    }

    /// Accept an edit made in the raw pane.
    pub(super) fn apply_raw_edit(&mut self, text: String) {
        let notice = self.editor.edit(text, Pane::Raw);
        self.raw.mark_synced(notice.revision);
        self.deliver(&notice);
    }

    pub(super) fn start_new_document(&mut self) {
        let doc = self.store.create_new();
        let notice = self.editor.new_document(doc);
        self.raw_scroll = 0;
        self.preview_scroll = 0;
        self.deliver(&notice);
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Cursor of the focused editable pane as 1-based (line, column).
    pub fn cursor_position(&self) -> Option<(usize, usize)> {
        match self.focus {
            Focus::Pane(Pane::Wysiwyg) if self.wysiwyg.is_ready() => {
                let (line, col) = self.wysiwyg.cursor();
                Some((line + 1, col + 1))
            }
            Focus::Pane(Pane::Raw) if self.raw.is_editable() => {
                let cursor = self.raw.cursor();
                Some((cursor.line + 1, cursor.col + 1))
            }
            _ => None,
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            editor: EditorState::default(),
            store: DocumentStore::new(PathBuf::from(".")),
            wysiwyg: WysiwygAdapter::default(),
            raw: RawAdapter::default(),
            preview: PreviewAdapter::default(),
            files: Vec::new(),
            file_selected: None,
            focus: Focus::Browser,
            prompt: None,
            help_visible: false,
            raw_scroll: 0,
            preview_scroll: 0,
            terminal_size: (80, 24),
            config_global_path: None,
            config_local_path: None,
            toast: None,
            renderer_options: None,
            renderer_thread: None,
            renderer_restarts: 0,
            quit_confirmed: false,
            should_quit: false,
        }
    }
}
