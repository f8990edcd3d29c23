use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::trace;

use crate::app::model::{Focus, PromptKind};
use crate::app::{App, Message, Model};
use crate::bridge::Pane;
use crate::protocol::{EditorKey, FormatCommand};

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => Some(Message::Resize(*w, *h)),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.prompt.is_some() {
            return None;
        }
        let (width, height) = model.terminal_size;
        let regions = crate::ui::regions(
            Rect::new(0, 0, width, height),
            model.editor.visible(),
            model.active_toast().is_some(),
        );

        let sidebar = regions.sidebar;
        let in_list = mouse.column > sidebar.x
            && mouse.column < sidebar.right().saturating_sub(1)
            && mouse.row > sidebar.y
            && mouse.row < sidebar.bottom().saturating_sub(1);
        if in_list {
            return match mouse.kind {
                MouseEventKind::Up(MouseButton::Left) => {
                    let rows = usize::from(sidebar.height.saturating_sub(2));
                    let start = crate::ui::list_window_start(model.file_selected, rows);
                    let idx = start + usize::from(mouse.row - sidebar.y - 1);
                    (idx < model.files.len()).then_some(Message::BrowserClick(idx))
                }
                MouseEventKind::ScrollUp => Some(Message::BrowserUp),
                MouseEventKind::ScrollDown => Some(Message::BrowserDown),
                _ => None,
            };
        }

        let pane = regions.pane_at(mouse.column, mouse.row)?;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Message::FocusPane(pane)),
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(pane, 3)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(pane, 3)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        if model.prompt.is_some() {
            return match key.code {
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Backspace => Some(Message::PromptBackspace),
                KeyCode::Char(c) if !ctrl && !alt => Some(Message::PromptInput(c)),
                _ => None,
            };
        }

        if ctrl {
            let msg = match key.code {
                KeyCode::Char('q' | 'c') => Some(Message::Quit),
                KeyCode::Char('n') => Some(Message::NewDocument),
                KeyCode::Char('o') => Some(Message::StartPrompt(PromptKind::Open)),
                KeyCode::Char('s') => Some(Message::Save),
                KeyCode::Char('d') => Some(Message::StartPrompt(PromptKind::ChangeDir)),
                KeyCode::Char('t') => Some(Message::CycleTheme),
                KeyCode::Char('e') => Some(Message::ExportHtml),
                KeyCode::Char('r') => Some(Message::SyncEditor),
                _ => None,
            };
            if msg.is_some() {
                return msg;
            }
        }

        match key.code {
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::F(2) => return Some(Message::TogglePane(Pane::Wysiwyg)),
            KeyCode::F(3) => return Some(Message::TogglePane(Pane::Raw)),
            KeyCode::F(4) => return Some(Message::TogglePane(Pane::Preview)),
            KeyCode::F(5) => return Some(Message::RefreshFiles),
            KeyCode::F(6) => return Some(Message::ToggleRawMode),
            KeyCode::F(12) => return Some(Message::StartPrompt(PromptKind::SaveAs)),
            KeyCode::Tab => return Some(Message::CycleFocus),
            _ => {}
        }

        match model.focus {
            Focus::Browser => match key.code {
                KeyCode::Char('j') | KeyCode::Down => Some(Message::BrowserDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Message::BrowserUp),
                KeyCode::Enter => Some(Message::BrowserOpenSelected),
                _ => None,
            },
            Focus::Pane(Pane::Wysiwyg) => {
                if alt && let Some(command) = format_shortcut(key.code) {
                    return Some(Message::Format(command));
                }
                editor_key(key).map(Message::EditorInput)
            }
            Focus::Pane(Pane::Raw) if model.raw.is_editable() => {
                editor_key(key).map(Message::RawInput)
            }
            Focus::Pane(pane @ (Pane::Raw | Pane::Preview)) => scroll_key(key.code, pane),
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

/// Editing keys forwarded to an editor buffer.
fn editor_key(key: KeyEvent) -> Option<EditorKey> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    let mapped = match key.code {
        KeyCode::Char(c) => EditorKey::Char(c),
        KeyCode::Enter => EditorKey::Enter,
        KeyCode::Backspace => EditorKey::Backspace,
        KeyCode::Delete => EditorKey::Delete,
        KeyCode::Left => EditorKey::Left,
        KeyCode::Right => EditorKey::Right,
        KeyCode::Up => EditorKey::Up,
        KeyCode::Down => EditorKey::Down,
        KeyCode::Home => EditorKey::Home,
        KeyCode::End => EditorKey::End,
        other => {
            trace!(?other, "key not forwarded to editor");
            return None;
        }
    };
    Some(mapped)
}

fn format_shortcut(code: KeyCode) -> Option<FormatCommand> {
    let command = match code {
        KeyCode::Char('1') => FormatCommand::ToggleHeading1,
        KeyCode::Char('2') => FormatCommand::ToggleHeading2,
        KeyCode::Char('3') => FormatCommand::ToggleHeading3,
        KeyCode::Char('b') => FormatCommand::ToggleBold,
        KeyCode::Char('i') => FormatCommand::ToggleItalic,
        KeyCode::Char('u') => FormatCommand::ToggleUnderline,
        KeyCode::Char('c') => FormatCommand::ToggleCode,
        KeyCode::Char('l') => FormatCommand::ToggleBulletList,
        KeyCode::Char('o') => FormatCommand::ToggleOrderedList,
        KeyCode::Char('q') => FormatCommand::ToggleBlockquote,
        KeyCode::Char('k') => FormatCommand::ToggleCodeBlock,
        _ => return None,
    };
    Some(command)
}

fn scroll_key(code: KeyCode, pane: Pane) -> Option<Message> {
    match code {
        KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(pane, 1)),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(pane, 1)),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(Message::ScrollDown(pane, 20)),
        KeyCode::PageUp => Some(Message::ScrollUp(pane, 20)),
        KeyCode::Home | KeyCode::Char('g') => Some(Message::ScrollUp(pane, usize::MAX)),
        _ => None,
    }
}
