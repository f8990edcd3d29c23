//! Syntax highlighting for the raw markdown pane and preview code blocks.
//!
//! Uses syntect with the bundled Sublime Text syntax definitions.

use std::sync::OnceLock;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

use crate::config::PreviewTheme;

/// Terminal background brightness the colors are tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    Dark,
    Light,
}

impl BackgroundMode {
    /// Resolve a preview theme, consulting `COLORFGBG` for the system theme.
    pub fn for_theme(theme: PreviewTheme) -> Self {
        match theme {
            PreviewTheme::Light => Self::Light,
            PreviewTheme::Dark => Self::Dark,
            PreviewTheme::System => {
                background_mode_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
            }
        }
    }
}

/// Highlight markdown source, one line per source line.
pub fn highlight_markdown(text: &str, mode: BackgroundMode) -> Vec<Line<'static>> {
    highlight_code(Some("md"), text, mode)
}

/// Highlight `code` in `language`. Unknown languages come back unstyled.
pub fn highlight_code(language: Option<&str>, code: &str, mode: BackgroundMode) -> Vec<Line<'static>> {
    let syntax_set = syntax_set();
    let syntax = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .or_else(|| language.and_then(|lang| syntax_set.find_syntax_by_name(lang)));

    let Some(syntax) = syntax else {
        return code.lines().map(|l| Line::raw(l.to_string())).collect();
    };

    let mut highlighter = HighlightLines::new(syntax, theme(mode));
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter
            .highlight_line(line, syntax_set)
            .unwrap_or_default();
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .filter_map(|(style, text)| {
                let text = text.trim_end_matches(['\n', '\r']);
                if text.is_empty() {
                    return None;
                }
                let fg = adjust_fg_for_background(
                    (style.foreground.r, style.foreground.g, style.foreground.b),
                    mode,
                );
                Some(Span::styled(text.to_string(), Style::default().fg(fg)))
            })
            .collect();
        lines.push(Line::from(spans));
    }
    lines
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        debug!("loading syntax definitions");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEMES: OnceLock<ThemeSet> = OnceLock::new();
    THEMES.get_or_init(ThemeSet::load_defaults)
}

fn theme(mode: BackgroundMode) -> &'static Theme {
    static DARK: OnceLock<Theme> = OnceLock::new();
    static LIGHT: OnceLock<Theme> = OnceLock::new();
    let (cell, preferred): (_, &[&str]) = match mode {
        BackgroundMode::Dark => (
            &DARK,
            &["Monokai Extended", "base16-ocean.dark", "Solarized (dark)"],
        ),
        BackgroundMode::Light => (
            &LIGHT,
            &["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
        ),
    };
    cell.get_or_init(|| {
        let themes = &theme_set().themes;
        preferred
            .iter()
            .find_map(|name| themes.get(*name))
            .or_else(|| themes.values().next())
            .cloned()
            .unwrap_or_default()
    })
}

fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> BackgroundMode {
    let Some(value) = colorfgbg else {
        return BackgroundMode::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return BackgroundMode::Dark;
    };

    if bg >= 7 {
        BackgroundMode::Light
    } else {
        BackgroundMode::Dark
    }
}

fn adjust_fg_for_background((r, g, b): (u8, u8, u8), mode: BackgroundMode) -> Color {
    if mode == BackgroundMode::Light {
        let luma = 0.0722f32.mul_add(
            f32::from(b),
            0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
        );
        if luma >= 155.0 {
            let darken = |c: u8| (f32::from(c) * 0.42).round() as u8;
            return Color::Rgb(darken(r), darken(g), darken(b));
        }
    }
    Color::Rgb(r, g, b)
}
