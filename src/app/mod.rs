//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Renderer frames are drained on the UI thread and dispatched as
//! [`Message::RendererFrame`], so editing state is only ever touched here.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Focus, Model, Prompt, PromptKind, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::adapters::WysiwygAdapter;
use crate::bookmark::BookmarkStore;
use crate::config::{self, ConfigFlags};
use crate::document::DocumentStore;

/// Initialization time of the embedded renderer when not configured.
pub const DEFAULT_RENDERER_INIT_MS: u64 = 150;

/// Main application struct that owns the startup settings and runs the event loop.
#[derive(Debug)]
pub struct App {
    start_path: Option<PathBuf>,
    flags: ConfigFlags,
    bookmark_file: PathBuf,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application, optionally starting from a file or directory.
    pub fn new(start_path: Option<PathBuf>) -> Self {
        Self {
            start_path,
            flags: ConfigFlags::default(),
            bookmark_file: config::bookmark_path(),
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Apply merged config-file and command-line flags.
    pub fn with_flags(mut self, flags: ConfigFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Store the last-directory bookmark somewhere else.
    pub fn with_bookmark_file(mut self, path: PathBuf) -> Self {
        self.bookmark_file = path;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    fn renderer_init_delay(&self) -> Duration {
        Duration::from_millis(
            self.flags
                .renderer_init_ms
                .unwrap_or(DEFAULT_RENDERER_INIT_MS),
        )
    }

    /// Build the first model: restore the last directory, open the start
    /// path, list files and fill the read-only panes.
    pub(super) fn initial_model(&self, wysiwyg: WysiwygAdapter, terminal_size: (u16, u16)) -> Model {
        let store = DocumentStore::restore(
            BookmarkStore::new(self.bookmark_file.clone()),
            &config::default_directory(),
        );
        info!(dir = %store.last_dir().display(), "starting");
        let mut model = Model::new(store, wysiwyg, terminal_size).with_flags(&self.flags);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        match &self.start_path {
            Some(path) if path.is_dir() => model.change_directory(path),
            Some(path) => model.open_path(path),
            None => {}
        }
        model.refresh_files();
        model.sync_visible_panes();
        if let Some(pane) = model.editor.visible().iter().next() {
            model.focus = Focus::Pane(pane);
        }
        model
    }
}
