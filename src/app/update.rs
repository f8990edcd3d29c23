use tracing::{debug, warn};

use crate::adapters::AdapterError;
use crate::app::model::{Focus, Prompt, PromptKind};
use crate::app::{Model, ToastLevel};
use crate::bridge::Pane;
use crate::channel::HostEndpoint;
use crate::protocol::{EditorKey, FormatCommand};

/// All possible events and actions in the application.
///
/// These represent user input, renderer traffic, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // File browser
    /// Move the browser selection up
    BrowserUp,
    /// Move the browser selection down
    BrowserDown,
    /// Open the selected file
    BrowserOpenSelected,
    /// Select and open the file at an index
    BrowserClick(usize),
    /// Re-read the directory listing
    RefreshFiles,
    /// The watched directory changed on disk
    DirectoryChanged,

    // Documents
    /// Replace the current document with a new untitled one
    NewDocument,
    /// Save the current document, asking for a location if it has none
    Save,
    /// Show a path prompt
    StartPrompt(PromptKind),
    /// Type into the prompt
    PromptInput(char),
    /// Delete the last prompt character
    PromptBackspace,
    /// Act on the prompt input
    PromptSubmit,
    /// Close the prompt without acting
    PromptCancel,
    /// Write the preview as a standalone HTML page
    ExportHtml,

    // Panes
    /// Show or hide a pane
    TogglePane(Pane),
    /// Move focus to the next visible pane (or the browser)
    CycleFocus,
    /// Focus a pane directly (mouse click)
    FocusPane(Pane),
    /// Cycle the preview theme
    CycleTheme,
    /// Switch the raw pane between monospace and highlight
    ToggleRawMode,
    /// Scroll a read-only pane up
    ScrollUp(Pane, usize),
    /// Scroll a read-only pane down
    ScrollDown(Pane, usize),

    // Editing
    /// Key for the rich editor
    EditorInput(EditorKey),
    /// Formatting command for the rich editor
    Format(FormatCommand),
    /// Key for the raw pane in monospace mode
    RawInput(EditorKey),
    /// Ask the rich editor to send its content
    SyncEditor,

    // Renderer
    /// A frame arrived from the renderer
    RendererFrame(String),
    /// The renderer channel broke
    RendererLost(String),
    /// Requests that were never acknowledged
    RequestsExpired(usize),

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Quit the application
    Quit,
}

impl Message {
    /// Messages that arrive without the user doing anything.
    pub const fn is_background(&self) -> bool {
        matches!(
            self,
            Self::RendererFrame(_)
                | Self::RendererLost(_)
                | Self::RequestsExpired(_)
                | Self::DirectoryChanged
                | Self::Resize(..)
        )
    }
}

/// Update the model based on a message.
///
/// File-system work (open, save, listing, export) happens afterwards in the
/// side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Reset quit confirmation on any user action other than quit or save.
    if !msg.is_background() && !matches!(msg, Message::Quit | Message::Save) {
        model.quit_confirmed = false;
    }

    match msg {
        // File browser
        Message::BrowserUp => {
            if let Some(sel) = model.file_selected {
                model.file_selected = Some(sel.saturating_sub(1));
            }
        }
        Message::BrowserDown => {
            if let Some(sel) = model.file_selected {
                let last = model.files.len().saturating_sub(1);
                model.file_selected = Some((sel + 1).min(last));
            }
        }
        Message::BrowserClick(idx) => {
            if idx < model.files.len() {
                model.file_selected = Some(idx);
                model.focus = Focus::Browser;
            }
        }
        Message::BrowserOpenSelected
        | Message::RefreshFiles
        | Message::DirectoryChanged
        | Message::Save
        | Message::PromptSubmit
        | Message::ExportHtml => {}

        // Documents
        Message::NewDocument => {
            model.start_new_document();
            model.show_toast(ToastLevel::Info, "New document");
        }
        Message::StartPrompt(kind) => {
            let input = match kind {
                PromptKind::Open | PromptKind::ChangeDir => {
                    with_trailing_separator(&model.store.last_dir().display().to_string())
                }
                PromptKind::SaveAs => model
                    .store
                    .last_dir()
                    .join(model.editor.document().name())
                    .display()
                    .to_string(),
            };
            model.prompt = Some(Prompt { kind, input });
        }
        Message::PromptInput(c) => {
            if let Some(prompt) = model.prompt.as_mut() {
                prompt.input.push(c);
            }
        }
        Message::PromptBackspace => {
            if let Some(prompt) = model.prompt.as_mut() {
                prompt.input.pop();
            }
        }
        Message::PromptCancel => model.prompt = None,

        // Panes
        Message::TogglePane(pane) => {
            if model.editor.toggle_pane(pane) {
                model.fix_focus();
                model.sync_visible_panes();
            } else {
                model.show_toast(ToastLevel::Warning, "At least one pane must stay visible");
            }
        }
        Message::CycleFocus => model.cycle_focus(),
        Message::FocusPane(pane) => {
            if model.editor.is_visible(pane) {
                model.focus = Focus::Pane(pane);
            }
        }
        Message::CycleTheme => {
            let theme = model.theme().next();
            model.set_theme(theme);
            model.show_toast(ToastLevel::Info, format!("Preview theme: {}", theme.as_str()));
        }
        Message::ToggleRawMode => {
            let mode = model.raw.mode().toggled();
            model.raw.set_mode(mode);
            model.raw_scroll = 0;
            model.show_toast(ToastLevel::Info, format!("Markdown pane: {}", mode.label()));
        }
        Message::ScrollUp(pane, n) => match pane {
            Pane::Raw => model.raw_scroll = model.raw_scroll.saturating_sub(n),
            Pane::Preview => model.preview_scroll = model.preview_scroll.saturating_sub(n),
            Pane::Wysiwyg => {}
        },
        Message::ScrollDown(pane, n) => match pane {
            Pane::Raw => {
                let max = model.raw.line_count().saturating_sub(1);
                model.raw_scroll = (model.raw_scroll + n).min(max);
            }
            Pane::Preview => {
                let max = model.preview.lines().len().saturating_sub(1);
                model.preview_scroll = (model.preview_scroll + n).min(max);
            }
            Pane::Wysiwyg => {}
        },

        // Editing
        Message::EditorInput(key) => {
            let result = model.wysiwyg.send_key(key).map(drop);
            report_editor_failure(&mut model, result);
        }
        Message::Format(command) => {
            let result = model.wysiwyg.execute(command).map(drop);
            report_editor_failure(&mut model, result);
        }
        Message::SyncEditor => {
            let result = model.wysiwyg.request_sync().map(drop);
            report_editor_failure(&mut model, result);
        }
        Message::RawInput(key) => {
            if let Some(text) = model.raw.apply_key(key) {
                model.apply_raw_edit(text);
            }
        }

        // Renderer
        Message::RendererFrame(frame) => model.handle_renderer_frame(&frame),
        Message::RendererLost(reason) => {
            warn!(%reason, "editor renderer lost");
            model.editor.reset_readiness();
            model.wysiwyg.replace_channel(HostEndpoint::detached());
            model.show_toast(ToastLevel::Error, format!("Editor disconnected: {reason}"));
        }
        Message::RequestsExpired(count) => {
            model.show_toast(
                ToastLevel::Warning,
                format!("Editor did not answer {count} request(s)"),
            );
        }

        // Window
        Message::Resize(width, height) => model.terminal_size = (width, height),
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Quit => {
            if model.editor.is_dirty() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+Q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
    }
    model
}

fn report_editor_failure(model: &mut Model, result: Result<(), AdapterError>) {
    match result {
        Ok(()) => {}
        Err(AdapterError::NotReady) => {
            debug!("editor not ready for requests");
            model.show_toast(ToastLevel::Warning, "Editor is still loading");
        }
        Err(err) => {
            warn!(%err, "editor request failed");
            model.show_toast(ToastLevel::Error, format!("Editor: {err}"));
        }
    }
}

fn with_trailing_separator(dir: &str) -> String {
    if dir.ends_with(std::path::MAIN_SEPARATOR) {
        dir.to_string()
    } else {
        format!("{dir}{}", std::path::MAIN_SEPARATOR)
    }
}
