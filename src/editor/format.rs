//! Formatting commands applied at the cursor.
//!
//! Block commands (headings, lists, quotes, code blocks) rewrite the cursor's
//! line; inline commands wrap or unwrap the word under the cursor. Applying a
//! command twice restores the original text.

use super::buffer::EditorBuffer;
use crate::protocol::{FormatCommand, Mark};

/// Apply `command` at the cursor. Returns true if the text changed.
pub fn apply(buffer: &mut EditorBuffer, command: FormatCommand) -> bool {
    let before = buffer.text();
    match command {
        FormatCommand::ToggleHeading1 => toggle_heading(buffer, 1),
        FormatCommand::ToggleHeading2 => toggle_heading(buffer, 2),
        FormatCommand::ToggleHeading3 => toggle_heading(buffer, 3),
        FormatCommand::ToggleBulletList => toggle_prefix(buffer, LinePrefix::Bullet),
        FormatCommand::ToggleOrderedList => toggle_prefix(buffer, LinePrefix::Ordered),
        FormatCommand::ToggleBlockquote => toggle_prefix(buffer, LinePrefix::Quote),
        FormatCommand::ToggleCodeBlock => toggle_code_block(buffer),
        FormatCommand::ToggleBold => toggle_inline(buffer, Inline::Bold),
        FormatCommand::ToggleItalic => toggle_inline(buffer, Inline::Italic),
        FormatCommand::ToggleUnderline => toggle_inline(buffer, Inline::Underline),
        FormatCommand::ToggleCode => toggle_inline(buffer, Inline::Code),
    }
    buffer.text() != before
}

/// Marks active at the cursor.
pub fn active_marks(buffer: &EditorBuffer) -> Vec<Mark> {
    let cursor = buffer.cursor();
    let line = buffer.line(cursor.line).unwrap_or_default();
    let mut marks = Vec::new();

    if fence_around(buffer, cursor.line).is_some() {
        marks.push(Mark::CodeBlock);
        return marks;
    }

    match heading_level(&line) {
        Some(1) => marks.push(Mark::Heading1),
        Some(2) => marks.push(Mark::Heading2),
        Some(3) => marks.push(Mark::Heading3),
        _ => {}
    }
    let (_, body) = split_indent(&line);
    if quote_len(body) > 0 {
        marks.push(Mark::Blockquote);
    }
    if bullet_len(body) > 0 {
        marks.push(Mark::BulletList);
    }
    if ordered_len(body) > 0 {
        marks.push(Mark::OrderedList);
    }

    let (start, end) = word_bounds(&line, cursor.col);
    let before = &line[..start];
    let after = &line[end..];
    let stars = star_run(before, after);
    if stars >= 2 {
        marks.push(Mark::Bold);
    }
    if stars % 2 == 1 {
        marks.push(Mark::Italic);
    }
    if before.ends_with("<u>") && after.starts_with("</u>") {
        marks.push(Mark::Underline);
    }
    if before.ends_with('`') && after.starts_with('`') {
        marks.push(Mark::Code);
    }
    marks.sort();
    marks
}

/// Heading level of a line, if it is an ATX heading.
pub fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    let rest = &line[hashes..];
    ((1..=6).contains(&hashes) && (rest.is_empty() || rest.starts_with(' '))).then_some(hashes)
}

fn toggle_heading(buffer: &mut EditorBuffer, level: usize) {
    let idx = buffer.cursor().line;
    let line = buffer.line(idx).unwrap_or_default();
    let (current, body) = match heading_level(&line) {
        Some(n) => (Some(n), line[n..].trim_start_matches(' ')),
        None => (None, line.as_str()),
    };
    let updated = if current == Some(level) {
        body.to_string()
    } else {
        format!("{} {body}", "#".repeat(level))
    };
    rewrite_line(buffer, idx, &line, &updated);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinePrefix {
    Bullet,
    Ordered,
    Quote,
}

fn split_indent(line: &str) -> (&str, &str) {
    let body = line.trim_start_matches([' ', '\t']);
    (&line[..line.len() - body.len()], body)
}

fn bullet_len(body: &str) -> usize {
    if ["- ", "* ", "+ "].iter().any(|p| body.starts_with(p)) {
        2
    } else {
        0
    }
}

fn ordered_len(body: &str) -> usize {
    let digits = body.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && body[digits..].starts_with(". ") {
        digits + 2
    } else {
        0
    }
}

fn quote_len(body: &str) -> usize {
    if body.starts_with("> ") {
        2
    } else {
        usize::from(body.starts_with('>'))
    }
}

fn toggle_prefix(buffer: &mut EditorBuffer, prefix: LinePrefix) {
    let idx = buffer.cursor().line;
    let line = buffer.line(idx).unwrap_or_default();
    let (indent, body) = split_indent(&line);
    let own = match prefix {
        LinePrefix::Bullet => bullet_len(body),
        LinePrefix::Ordered => ordered_len(body),
        LinePrefix::Quote => quote_len(body),
    };
    let updated = if own > 0 {
        format!("{indent}{}", &body[own..])
    } else {
        let list = bullet_len(body).max(ordered_len(body));
        let rest = if prefix == LinePrefix::Quote {
            body
        } else {
            &body[list..]
        };
        let marker = match prefix {
            LinePrefix::Bullet => "- ",
            LinePrefix::Ordered => "1. ",
            LinePrefix::Quote => "> ",
        };
        format!("{indent}{marker}{rest}")
    };
    rewrite_line(buffer, idx, &line, &updated);
}

/// Replace a line and shift the cursor by the change in prefix length.
fn rewrite_line(buffer: &mut EditorBuffer, idx: usize, old: &str, new: &str) {
    let cursor = buffer.cursor();
    buffer.replace_line(idx, new);
    let shifted = (cursor.col + new.len()).saturating_sub(old.len());
    buffer.move_to(idx, shifted);
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// The opening and closing fence lines of the code block containing `line`.
fn fence_around(buffer: &EditorBuffer, line: usize) -> Option<(usize, usize)> {
    let mut open: Option<usize> = None;
    for idx in 0..buffer.line_count() {
        let text = buffer.line(idx).unwrap_or_default();
        if !is_fence(&text) {
            continue;
        }
        match open {
            None => open = Some(idx),
            Some(start) => {
                if (start..=idx).contains(&line) {
                    return Some((start, idx));
                }
                if idx > line {
                    return None;
                }
                open = None;
            }
        }
    }
    None
}

fn toggle_code_block(buffer: &mut EditorBuffer) {
    let line = buffer.cursor().line;
    if let Some((open, close)) = fence_around(buffer, line) {
        buffer.remove_line(close);
        buffer.remove_line(open);
    } else {
        buffer.insert_line(line + 1, "```");
        buffer.insert_line(line, "```");
    }
}

#[derive(Debug, Clone, Copy)]
enum Inline {
    Bold,
    Italic,
    Underline,
    Code,
}

impl Inline {
    const fn markers(self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("**", "**"),
            Self::Italic => ("*", "*"),
            Self::Underline => ("<u>", "</u>"),
            Self::Code => ("`", "`"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

/// Byte range of the word touching `col`.
fn word_bounds(line: &str, col: usize) -> (usize, usize) {
    let col = col.min(line.len());
    let start = line[..col]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word_char(c))
        .last()
        .map_or(col, |(i, _)| i);
    let end = line[col..]
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(line.len(), |(i, _)| col + i);
    (start, end)
}

/// Number of `*` wrapping the word on both sides.
fn star_run(before: &str, after: &str) -> usize {
    let left = before.chars().rev().take_while(|&c| c == '*').count();
    let right = after.chars().take_while(|&c| c == '*').count();
    left.min(right)
}

fn inline_active(kind: Inline, before: &str, after: &str) -> bool {
    match kind {
        Inline::Bold => star_run(before, after) >= 2,
        Inline::Italic => star_run(before, after) % 2 == 1,
        Inline::Underline | Inline::Code => {
            let (open, close) = kind.markers();
            before.ends_with(open) && after.starts_with(close)
        }
    }
}

fn toggle_inline(buffer: &mut EditorBuffer, kind: Inline) {
    let cursor = buffer.cursor();
    let line = buffer.line(cursor.line).unwrap_or_default();
    let (start, end) = word_bounds(&line, cursor.col);
    let (open, close) = kind.markers();
    let before = &line[..start];
    let word = &line[start..end];
    let after = &line[end..];

    let (updated, col) = if inline_active(kind, before, after) {
        let before = &before[..before.len() - open.len()];
        let after = &after[close.len()..];
        (
            format!("{before}{word}{after}"),
            cursor.col.saturating_sub(open.len()),
        )
    } else {
        (
            format!("{before}{open}{word}{close}{after}"),
            cursor.col + open.len(),
        )
    };
    buffer.replace_line(cursor.line, &updated);
    buffer.move_to(cursor.line, col);
}
