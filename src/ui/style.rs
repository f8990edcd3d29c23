//! Theming and the styled rendering of the rich editor surface.
//!
//! The rich pane keeps every source character in place so the renderer's
//! cursor maps straight onto the screen; markup characters are dimmed and the
//! text they enclose is styled.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::editor::format::heading_level;
use crate::highlight::BackgroundMode;

/// Colors of the rich pane and the window chrome.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Heading level 1 style
    pub h1: Style,
    /// Heading level 2 style
    pub h2: Style,
    /// Heading level 3 style
    pub h3: Style,
    /// Heading level 4+ style
    pub h4: Style,
    /// Code block style
    pub code: Style,
    /// Inline code style
    pub inline_code: Style,
    /// Block quote style
    pub quote: Style,
    /// List bullet/number style
    pub list_marker: Style,
    /// Markup characters (`**`, `#`, fences)
    pub markup: Style,
    /// Dimmed hints and placeholders
    pub hint: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            h1: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Indexed(245)),
            inline_code: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            quote: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::ITALIC),
            list_marker: Style::default().fg(Color::Yellow),
            markup: Style::default().fg(Color::Indexed(240)),
            hint: Style::default().fg(Color::Indexed(245)),
        }
    }
}

impl Theme {
    /// Create a theme optimized for dark terminals.
    pub fn dark() -> Self {
        Self::default()
    }

    /// Create a theme optimized for light terminals.
    pub fn light() -> Self {
        Self {
            h1: Style::default()
                .fg(Color::Indexed(31)) // Darker cyan
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Indexed(28)) // Darker green
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Indexed(136)) // Darker yellow/olive
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::Indexed(25)) // Darker blue
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Indexed(240)),
            inline_code: Style::default()
                .fg(Color::Indexed(124)) // Darker red
                .add_modifier(Modifier::BOLD),
            quote: Style::default()
                .fg(Color::Indexed(25))
                .add_modifier(Modifier::ITALIC),
            list_marker: Style::default().fg(Color::Indexed(136)),
            markup: Style::default().fg(Color::Indexed(248)),
            hint: Style::default().fg(Color::Indexed(241)),
        }
    }

    pub fn for_mode(mode: BackgroundMode) -> Self {
        match mode {
            BackgroundMode::Dark => Self::dark(),
            BackgroundMode::Light => Self::light(),
        }
    }

    fn heading(&self, level: usize) -> Style {
        match level {
            1 => self.h1,
            2 => self.h2,
            3 => self.h3,
            _ => self.h4,
        }
    }
}

/// Style markdown source line by line for the rich pane.
pub fn rich_lines(text: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut in_fence = false;
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                return Line::styled(line.to_string(), theme.markup);
            }
            if in_fence {
                return Line::styled(line.to_string(), theme.code);
            }
            rich_line(line, theme)
        })
        .collect()
}

fn rich_line(line: &str, theme: &Theme) -> Line<'static> {
    if let Some(level) = heading_level(line) {
        let marker_len = line[level..]
            .chars()
            .take_while(|c| *c == ' ')
            .count()
            + level;
        let mut spans = vec![Span::styled(line[..marker_len].to_string(), theme.markup)];
        spans.extend(inline_spans(&line[marker_len..], theme.heading(level), theme));
        return Line::from(spans);
    }
    if let Some(body) = line.strip_prefix("> ") {
        let mut spans = vec![Span::styled("> ".to_string(), theme.markup)];
        spans.extend(inline_spans(body, theme.quote, theme));
        return Line::from(spans);
    }
    if let Some(marker_len) = list_marker_len(line) {
        let mut spans = vec![Span::styled(line[..marker_len].to_string(), theme.list_marker)];
        spans.extend(inline_spans(&line[marker_len..], Style::default(), theme));
        return Line::from(spans);
    }
    Line::from(inline_spans(line, Style::default(), theme))
}

/// Byte length of a leading `- `, `* `, `+ ` or `N. ` marker (with indentation).
fn list_marker_len(line: &str) -> Option<usize> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[indent..];
    if ["- ", "* ", "+ "].iter().any(|m| rest.starts_with(m)) {
        return Some(indent + 2);
    }
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    (digits > 0 && rest[digits..].starts_with(". ")).then_some(indent + digits + 2)
}

const INLINE_MARKERS: [&str; 5] = ["**", "*", "`", "<u>", "</u>"];

/// Split `text` at inline markup, keeping the markers as dimmed spans.
fn inline_spans(text: &str, base: Style, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let (mut bold, mut italic, mut code, mut underline) = (false, false, false, false);
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        let marker = if code {
            rest.starts_with('`').then_some("`")
        } else {
            INLINE_MARKERS.into_iter().find(|m| rest.starts_with(m))
        };
        let Some(marker) = marker else {
            run.push(ch);
            rest = &rest[ch.len_utf8()..];
            continue;
        };
        if !run.is_empty() {
            let style = if code {
                theme.inline_code
            } else {
                let mut style = base;
                if bold {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if italic {
                    style = style.add_modifier(Modifier::ITALIC);
                }
                if underline {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                style
            };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        spans.push(Span::styled(marker.to_string(), theme.markup));
        match marker {
            "**" => bold = !bold,
            "*" => italic = !italic,
            "`" => code = !code,
            "<u>" => underline = true,
            _ => underline = false,
        }
        rest = &rest[marker.len()..];
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, base));
    }
    spans
}
