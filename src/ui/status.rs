use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::bridge::Pane;

const PANE_KEYS: [(&str, Pane); 3] = [
    ("F2", Pane::Wysiwyg),
    ("F3", Pane::Raw),
    ("F4", Pane::Preview),
];

pub fn render_toolbar(model: &Model, frame: &mut Frame, area: Rect) {
    let separator = Span::styled(" \u{2502} ", Style::default().fg(Color::Indexed(240)));
    let mut spans = Vec::new();

    for (key, pane) in PANE_KEYS {
        let style = if model.editor.is_visible(pane) {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Indexed(245))
        };
        spans.push(Span::styled(format!(" {key} {} ", pane.title()), style));
        spans.push(Span::raw(" "));
    }

    spans.push(separator.clone());
    spans.push(if !model.wysiwyg.is_connected() {
        Span::styled("editor offline", Style::default().fg(Color::Red))
    } else if model.editor_online() {
        Span::styled("editor ready", Style::default().fg(Color::Green))
    } else {
        Span::styled("editor loading", Style::default().fg(Color::Yellow))
    });

    let marks = model.wysiwyg.marks();
    if !marks.is_empty() {
        spans.push(separator.clone());
        let labels: Vec<&str> = marks.iter().map(|m| m.label()).collect();
        spans.push(Span::styled(
            labels.join(" "),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    spans.push(separator.clone());
    spans.push(Span::raw(format!("theme: {}", model.theme().as_str())));
    spans.push(separator.clone());
    spans.push(Span::raw(format!("raw: {}", model.raw.mode().label())));

    if model.editor.is_dirty() {
        spans.push(separator);
        spans.push(Span::styled(
            "Unsaved",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let doc = model.editor.document();
    let location = doc.location().map_or_else(
        || "not saved".to_string(),
        |path| path.display().to_string(),
    );
    let cursor = model
        .cursor_position()
        .map(|(line, col)| format!("  Ln {line}, Col {col}"))
        .unwrap_or_default();

    let status = format!(
        " {}  [{}]  rev {}{}  F1:help",
        doc.name(),
        location,
        model.editor.revision(),
        cursor
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
