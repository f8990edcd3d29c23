use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::{Model, Prompt};

pub fn prompt_rect(area: Rect) -> Rect {
    let popup_width = area.width.saturating_sub(16).max(44);
    centered_popup_rect(popup_width, 6, area)
}

pub fn render_prompt_overlay(prompt: &Prompt, frame: &mut Frame, area: Rect) {
    let popup = prompt_rect(area);
    let block = Block::default()
        .title(prompt.kind.title())
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);

    // Keep the end of long paths in view.
    let room = usize::from(inner.width.saturating_sub(3));
    let mut shown = prompt.input.as_str();
    while shown.width() > room {
        let mut chars = shown.chars();
        chars.next();
        shown = chars.as_str();
    }

    let lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(shown.to_string()),
        ]),
        Line::raw(""),
        Line::styled(
            "Enter confirm \u{00b7} Esc cancel",
            Style::default().fg(Color::Indexed(245)),
        ),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);

    let width = u16::try_from(shown.width()).unwrap_or(u16::MAX);
    let x = inner.x.saturating_add(2).saturating_add(width);
    frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut all_lines: Vec<Line> = Vec::new();

    all_lines.push(Line::styled("Files", section_style));
    all_lines.push(Line::raw("  j/k or Up/Down      Move in file list"));
    all_lines.push(Line::raw("  Enter / click       Open file"));
    all_lines.push(Line::raw("  F5                  Refresh file list"));
    all_lines.push(Line::raw("  Ctrl-d              Change directory"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Document", section_style));
    all_lines.push(Line::raw("  Ctrl-n              New document"));
    all_lines.push(Line::raw("  Ctrl-o              Open by path"));
    all_lines.push(Line::raw("  Ctrl-s              Save"));
    all_lines.push(Line::raw("  F12                 Save as"));
    all_lines.push(Line::raw("  Ctrl-e              Export preview HTML"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Panes", section_style));
    all_lines.push(Line::raw("  F2 / F3 / F4        Editor / Markdown / Preview"));
    all_lines.push(Line::raw("  Tab                 Switch focus"));
    all_lines.push(Line::raw("  F6                  Markdown monospace / highlight"));
    all_lines.push(Line::raw("  Ctrl-t              Preview theme"));
    all_lines.push(Line::raw("  Ctrl-r              Sync editor"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Formatting (editor pane)", section_style));
    all_lines.push(Line::raw("  Alt-1 / 2 / 3       Heading 1-3"));
    all_lines.push(Line::raw("  Alt-b / i / u / c   Bold / italic / underline / code"));
    all_lines.push(Line::raw("  Alt-l / o           Bullet / numbered list"));
    all_lines.push(Line::raw("  Alt-q / k           Quote / code block"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Other", section_style));
    all_lines.push(Line::raw("  Ctrl-q / Ctrl-c     Quit"));
    all_lines.push(Line::raw("  F1                  Toggle help"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Config", section_style));
    all_lines.push(Line::raw(format!("  Global: {global_cfg}")));
    all_lines.push(Line::raw(format!("  Local override: {local_cfg}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );

    // Reserve 1 row at bottom for footer hint
    let content_height = inner.height.saturating_sub(1);
    let visible: Vec<Line> = all_lines
        .into_iter()
        .take(usize::from(content_height))
        .collect();
    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);
    frame.render_widget(Paragraph::new(visible), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    let footer = Line::styled("any key closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
