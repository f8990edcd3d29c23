//! Markdown to styled terminal lines.
//!
//! Lines are not wrapped here; the pane wraps them to its width.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::highlight::{self, BackgroundMode};

#[derive(Debug, Clone, Copy)]
struct Palette {
    heading: Color,
    code: Color,
    quote: Color,
    link: Color,
    rule: Color,
}

impl Palette {
    const fn for_mode(mode: BackgroundMode) -> Self {
        match mode {
            BackgroundMode::Dark => Self {
                heading: Color::Cyan,
                code: Color::Yellow,
                quote: Color::Gray,
                link: Color::LightBlue,
                rule: Color::DarkGray,
            },
            BackgroundMode::Light => Self {
                heading: Color::Blue,
                code: Color::Magenta,
                quote: Color::DarkGray,
                link: Color::Blue,
                rule: Color::Gray,
            },
        }
    }
}

/// Leading text for the lines of a nested block. The first line of a list
/// item carries its marker; the rest are indented to match.
#[derive(Debug, Clone, Default)]
struct Prefix {
    first: Option<String>,
    rest: String,
}

impl Prefix {
    fn next(&mut self) -> String {
        self.first.take().unwrap_or_else(|| self.rest.clone())
    }

    fn nest(&mut self, first: &str, rest: &str) -> Self {
        let head = self.next();
        Self {
            first: Some(format!("{head}{first}")),
            rest: format!("{}{rest}", self.rest),
        }
    }
}

/// Render markdown to preview lines.
pub fn render_lines(markdown: &str, mode: BackgroundMode) -> Vec<Line<'static>> {
    let arena = Arena::new();
    let mut options = Options::default();
    super::configure(&mut options);
    let root = parse_document(&arena, markdown, &options);

    let mut walker = Walker {
        lines: Vec::new(),
        palette: Palette::for_mode(mode),
        mode,
        underline: false,
    };
    walker.children(root, &mut Prefix::default(), true);
    while walker.lines.last().is_some_and(|l| l.width() == 0) {
        walker.lines.pop();
    }
    walker.lines
}

struct Walker {
    lines: Vec<Line<'static>>,
    palette: Palette,
    mode: BackgroundMode,
    underline: bool,
}

impl Walker {
    fn emit(&mut self, prefix: &mut Prefix, spans: Vec<Span<'static>>) {
        let lead = prefix.next();
        let mut line = Vec::with_capacity(spans.len() + 1);
        if !lead.is_empty() {
            line.push(Span::styled(lead, Style::default().fg(self.palette.quote)));
        }
        line.extend(spans);
        self.lines.push(Line::from(line));
    }

    fn blank(&mut self, prefix: &Prefix) {
        let lead = prefix.rest.trim_end().to_string();
        if lead.is_empty() {
            self.lines.push(Line::default());
        } else {
            self.lines
                .push(Line::from(Span::styled(lead, Style::default().fg(self.palette.quote))));
        }
    }

    fn children<'a>(&mut self, node: &'a AstNode<'a>, prefix: &mut Prefix, spaced: bool) {
        let mut first = true;
        for child in node.children() {
            if spaced && !first {
                self.blank(prefix);
            }
            first = false;
            self.block(child, prefix);
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, prefix: &mut Prefix) {
        match &node.data.borrow().value {
            NodeValue::Heading(heading) => {
                let mut style = Style::default()
                    .fg(self.palette.heading)
                    .add_modifier(Modifier::BOLD);
                if heading.level == 1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                } else if heading.level > 2 {
                    style = style.add_modifier(Modifier::ITALIC);
                }
                for spans in self.inline_lines(node, style) {
                    self.emit(prefix, spans);
                }
            }
            NodeValue::Paragraph => {
                for spans in self.inline_lines(node, Style::default()) {
                    self.emit(prefix, spans);
                }
            }
            NodeValue::CodeBlock(block) => {
                let language = block.info.split_whitespace().next();
                let bar = Style::default().fg(self.palette.rule);
                for line in highlight::highlight_code(language, &block.literal, self.mode) {
                    let mut spans = vec![Span::styled("│ ", bar)];
                    spans.extend(line.spans);
                    self.emit(prefix, spans);
                }
            }
            NodeValue::HtmlBlock(html) => {
                let style = Style::default().fg(self.palette.rule);
                for line in html.literal.lines() {
                    self.emit(prefix, vec![Span::styled(line.to_string(), style)]);
                }
            }
            NodeValue::List(list) => {
                for (index, item) in node.children().enumerate() {
                    let marker = match &item.data.borrow().value {
                        NodeValue::TaskItem(Some(_)) => "☑ ".to_string(),
                        NodeValue::TaskItem(None) => "☐ ".to_string(),
                        _ => match list.list_type {
                            ListType::Bullet => "• ".to_string(),
                            ListType::Ordered => {
                                let delim = match list.delimiter {
                                    ListDelimType::Period => '.',
                                    ListDelimType::Paren => ')',
                                };
                                format!("{}{delim} ", list.start + index)
                            }
                        },
                    };
                    let indent = " ".repeat(marker.chars().count());
                    let mut nested = prefix.nest(&marker, &indent);
                    self.children(item, &mut nested, !list.tight);
                }
            }
            NodeValue::BlockQuote => {
                let mut nested = prefix.nest("▌ ", "▌ ");
                self.children(node, &mut nested, true);
            }
            NodeValue::ThematicBreak => {
                let style = Style::default().fg(self.palette.rule);
                self.emit(prefix, vec![Span::styled("─".repeat(40), style)]);
            }
            NodeValue::Table(_) => {
                for row in node.children() {
                    let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
                    let style = if header {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let mut spans = Vec::new();
                    for (i, cell) in row.children().enumerate() {
                        if i > 0 {
                            spans.push(Span::styled(" │ ", Style::default().fg(self.palette.rule)));
                        }
                        for line in self.inline_lines(cell, style) {
                            spans.extend(line);
                        }
                    }
                    self.emit(prefix, spans);
                }
            }
            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let indent = " ".repeat(label.chars().count());
                let mut nested = prefix.nest(&label, &indent);
                self.children(node, &mut nested, false);
            }
            _ => self.children(node, prefix, false),
        }
    }

    /// Inline content of `node`, split at hard line breaks.
    fn inline_lines<'a>(&mut self, node: &'a AstNode<'a>, style: Style) -> Vec<Vec<Span<'static>>> {
        let mut out = vec![Vec::new()];
        for child in node.children() {
            self.inline(child, style, &mut out);
        }
        out
    }

    fn inline<'a>(&mut self, node: &'a AstNode<'a>, style: Style, out: &mut Vec<Vec<Span<'static>>>) {
        let push = |out: &mut Vec<Vec<Span<'static>>>, span: Span<'static>| {
            if let Some(line) = out.last_mut() {
                line.push(span);
            }
        };
        let text_style = if self.underline {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        };
        match &node.data.borrow().value {
            NodeValue::Text(text) => push(out, Span::styled(text.clone(), text_style)),
            NodeValue::Code(code) => push(
                out,
                Span::styled(code.literal.clone(), text_style.fg(self.palette.code)),
            ),
            NodeValue::SoftBreak => push(out, Span::styled(" ", text_style)),
            NodeValue::LineBreak => out.push(Vec::new()),
            NodeValue::HtmlInline(html) => match html.trim() {
                "<u>" => self.underline = true,
                "</u>" => self.underline = false,
                other => push(
                    out,
                    Span::styled(other.to_string(), Style::default().fg(self.palette.rule)),
                ),
            },
            NodeValue::Image(image) => {
                let alt: String = node
                    .children()
                    .filter_map(|c| match &c.data.borrow().value {
                        NodeValue::Text(t) => Some(t.clone()),
                        _ => None,
                    })
                    .collect();
                let label = if alt.is_empty() { image.url.clone() } else { alt };
                push(
                    out,
                    Span::styled(format!("[image: {label}]"), style.fg(self.palette.link)),
                );
            }
            NodeValue::FootnoteReference(reference) => push(
                out,
                Span::styled(format!("[^{}]", reference.name), style.fg(self.palette.link)),
            ),
            value => {
                let next = match value {
                    NodeValue::Emph => style.add_modifier(Modifier::ITALIC),
                    NodeValue::Strong => style.add_modifier(Modifier::BOLD),
                    NodeValue::Strikethrough => style.add_modifier(Modifier::CROSSED_OUT),
                    NodeValue::Link(_) => style
                        .fg(self.palette.link)
                        .add_modifier(Modifier::UNDERLINED),
                    _ => style,
                };
                for child in node.children() {
                    self.inline(child, next, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn render(md: &str) -> Vec<String> {
        render_lines(md, BackgroundMode::Dark)
            .iter()
            .map(text_of)
            .collect()
    }

    #[test]
    fn test_heading_drops_markers() {
        let lines = render_lines("# Hello", BackgroundMode::Dark);
        assert_eq!(lines.len(), 1);
        assert_eq!(text_of(&lines[0]), "Hello");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_blocks_are_separated_by_blank_lines() {
        assert_eq!(render("# Title\n\nBody text."), vec!["Title", "", "Body text."]);
    }

    #[test]
    fn test_inline_styles() {
        let lines = render_lines("**bold** *it* `code`", BackgroundMode::Dark);
        let spans = &lines[0].spans;
        assert_eq!(spans[0].content, "bold");
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[2].style.add_modifier.contains(Modifier::ITALIC));
        assert_eq!(spans[4].content, "code");
        assert!(spans[4].style.fg.is_some());
    }

    #[test]
    fn test_underline_html_is_applied() {
        let lines = render_lines("a <u>b</u> c", BackgroundMode::Dark);
        let b = lines[0].spans.iter().find(|s| s.content == "b").unwrap();
        assert!(b.style.add_modifier.contains(Modifier::UNDERLINED));
        let c = lines[0].spans.iter().find(|s| s.content == " c").unwrap();
        assert!(!c.style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_lists_get_markers() {
        assert_eq!(render("- one\n- two"), vec!["• one", "• two"]);
        assert_eq!(render("3. three\n4. four"), vec!["3. three", "4. four"]);
    }

    #[test]
    fn test_nested_list_indents() {
        assert_eq!(render("- outer\n  - inner"), vec!["• outer", "  • inner"]);
    }

    #[test]
    fn test_blockquote_prefix() {
        assert_eq!(render("> quoted"), vec!["▌ quoted"]);
    }

    #[test]
    fn test_code_block_is_framed_without_fences() {
        let lines = render("```rust\nfn main() {}\n```");
        assert_eq!(lines, vec!["│ fn main() {}"]);
    }

    #[test]
    fn test_hard_break_starts_new_line() {
        assert_eq!(render("one  \ntwo"), vec!["one", "two"]);
        assert_eq!(render("one\ntwo"), vec!["one two"]);
    }

    #[test]
    fn test_task_list_markers() {
        assert_eq!(render("- [x] done\n- [ ] todo"), vec!["☑ done", "☐ todo"]);
    }
}
