use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::adapters::RawMode;
use crate::app::{Focus, Model};
use crate::bridge::{Pane, PaneSet};

use super::style::{self, Theme};
use super::{SIDEBAR_WIDTH_PERCENT, overlays, status};

/// Screen areas of the main window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regions {
    pub toolbar: Rect,
    pub sidebar: Rect,
    /// Visible panes, left to right.
    pub panes: Vec<(Pane, Rect)>,
    pub toast: Option<Rect>,
    pub status: Rect,
}

impl Regions {
    pub fn pane_at(&self, column: u16, row: u16) -> Option<Pane> {
        self.panes
            .iter()
            .find(|(_, rect)| rect.contains(Position::new(column, row)))
            .map(|(pane, _)| *pane)
    }
}

pub fn regions(area: Rect, visible: PaneSet, toast_active: bool) -> Regions {
    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(u16::from(toast_active)),
        Constraint::Length(1),
    ])
    .split(area);
    let columns = Layout::horizontal([
        Constraint::Percentage(SIDEBAR_WIDTH_PERCENT),
        Constraint::Percentage(100 - SIDEBAR_WIDTH_PERCENT),
    ])
    .split(rows[1]);

    let count = u32::try_from(visible.len()).unwrap_or(1).max(1);
    let pane_areas =
        Layout::horizontal(visible.iter().map(|_| Constraint::Ratio(1, count))).split(columns[1]);
    let panes = visible.iter().zip(pane_areas.iter().copied()).collect();

    Regions {
        toolbar: rows[0],
        sidebar: columns[0],
        panes,
        toast: toast_active.then_some(rows[2]),
        status: rows[3],
    }
}

/// First list row shown when `selected` must stay within `rows` rows.
pub fn list_window_start(selected: Option<usize>, rows: usize) -> usize {
    selected.map_or(0, |sel| (sel + 1).saturating_sub(rows))
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let regions = regions(area, model.editor.visible(), model.active_toast().is_some());
    let theme = Theme::for_mode(model.background());

    status::render_toolbar(model, frame, regions.toolbar);
    render_browser(model, frame, regions.sidebar);
    for &(pane, rect) in &regions.panes {
        match pane {
            Pane::Wysiwyg => render_wysiwyg(model, &theme, frame, rect),
            Pane::Raw => render_raw(model, frame, rect),
            Pane::Preview => render_preview(model, frame, rect),
        }
    }
    if let Some(rect) = regions.toast {
        status::render_toast_bar(model, frame, rect);
    }
    status::render_status_bar(model, frame, regions.status);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else if let Some(prompt) = &model.prompt {
        overlays::render_prompt_overlay(prompt, frame, area);
    }
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_browser(model: &Model, frame: &mut Frame, area: Rect) {
    let rows = usize::from(area.height.saturating_sub(2));
    let start = list_window_start(model.file_selected, rows);
    let current = model.editor.document().location();

    let items: Vec<Line> = if model.files.is_empty() {
        vec![Line::styled(
            "  (no markdown files)",
            Style::default().fg(Color::Indexed(245)),
        )]
    } else {
        model
            .files
            .iter()
            .enumerate()
            .skip(start)
            .take(rows)
            .map(|(i, entry)| {
                let selected = model.file_selected == Some(i);
                let marker = if selected { ">" } else { " " };
                let style = if current == Some(entry.path.as_path()) {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let style = if selected { style.reversed() } else { style };
                Line::styled(format!("{marker} {}", entry.name), style)
            })
            .collect()
    };

    let dir = model.store.last_dir();
    let title = dir.file_name().map_or_else(
        || dir.display().to_string(),
        |n| n.to_string_lossy().to_string(),
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_border(model.focus == Focus::Browser));

    frame.render_widget(Paragraph::new(items).block(block), area);
}

fn pane_block(model: &Model, pane: Pane) -> Block<'static> {
    let title = match pane {
        Pane::Raw => format!("{} ({})", pane.title(), model.raw.mode().label()),
        Pane::Wysiwyg | Pane::Preview => pane.title().to_string(),
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_border(model.focus == Focus::Pane(pane)))
}

fn render_wysiwyg(model: &Model, theme: &Theme, frame: &mut Frame, area: Rect) {
    let block = pane_block(model, Pane::Wysiwyg);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !model.wysiwyg.is_connected() {
        let line = Line::styled("Editor unavailable", Style::default().fg(Color::Red));
        frame.render_widget(Paragraph::new(line), inner);
        return;
    }
    if !model.wysiwyg.is_ready() {
        frame.render_widget(
            Paragraph::new(Line::styled("Loading editor...", theme.hint)),
            inner,
        );
        return;
    }

    let content = model.wysiwyg.content();
    let (line, col) = model.wysiwyg.cursor();
    let top = follow_cursor(line, inner.height);
    let lines = style::rich_lines(content, theme);
    frame.render_widget(Paragraph::new(lines).scroll((to_u16(top), 0)), inner);

    if model.focus == Focus::Pane(Pane::Wysiwyg) {
        let text = content.lines().nth(line).unwrap_or_default();
        place_cursor(frame, inner, text, line - top, col);
    }
}

fn render_raw(model: &Model, frame: &mut Frame, area: Rect) {
    let block = pane_block(model, Pane::Raw);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match model.raw.mode() {
        RawMode::Monospace => {
            let cursor = model.raw.cursor();
            let top = follow_cursor(cursor.line, inner.height);
            let paragraph = Paragraph::new(model.raw.lines()).scroll((to_u16(top), 0));
            frame.render_widget(paragraph, inner);
            if model.focus == Focus::Pane(Pane::Raw) {
                let text = model.raw.line(cursor.line).unwrap_or_default();
                place_cursor(frame, inner, &text, cursor.line - top, cursor.col);
            }
        }
        RawMode::Highlight => {
            let paragraph =
                Paragraph::new(model.raw.lines()).scroll((to_u16(model.raw_scroll), 0));
            frame.render_widget(paragraph, inner);
        }
    }
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let block = pane_block(model, Pane::Preview);
    let paragraph = Paragraph::new(model.preview.lines().to_vec())
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((to_u16(model.preview_scroll), 0));
    frame.render_widget(paragraph, area);
}

/// Top line that keeps `line` inside a view `height` rows tall.
fn follow_cursor(line: usize, height: u16) -> usize {
    (line + 1).saturating_sub(usize::from(height.max(1)))
}

fn place_cursor(frame: &mut Frame, inner: Rect, text: &str, row: usize, col: usize) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let col = col.min(text.len());
    let prefix = text.get(..col).unwrap_or(text);
    let x = inner
        .x
        .saturating_add(to_u16(prefix.width()))
        .min(inner.right().saturating_sub(1));
    let y = inner
        .y
        .saturating_add(to_u16(row))
        .min(inner.bottom().saturating_sub(1));
    frame.set_cursor_position((x, y));
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
