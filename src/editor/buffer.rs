use ropey::Rope;

use crate::protocol::EditorKey;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Column vertical movement tries to return to.
    goal: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            goal: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.goal = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::at(0, 0)
    }
}

/// Rope-backed markdown text with a single cursor.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
        }
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its line ending.
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut line = self.rope.line(idx).to_string();
        if line.ends_with("\r\n") {
            line.truncate(line.len() - 2);
        } else if line.ends_with(is_line_break) {
            line.pop();
        }
        Some(line)
    }

    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx).map_or(0, |l| l.len())
    }

    /// Replace the whole text, keeping the cursor as close as possible to
    /// where it was.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let Cursor { line, col, .. } = self.cursor;
        self.move_to(line, col);
    }

    /// Replace the content of line `idx` (line ending untouched).
    pub fn replace_line(&mut self, idx: usize, content: &str) {
        if idx >= self.rope.len_lines() {
            return;
        }
        let start = self.rope.line_to_char(idx);
        let old_chars = self
            .line(idx)
            .map_or(0, |l| l.chars().count());
        self.rope.remove(start..start + old_chars);
        self.rope.insert(start, content);
        if self.cursor.line == idx {
            self.cursor.set_col(floor_char_boundary(content, self.cursor.col));
        }
    }

    /// Insert a whole line before `idx`; the cursor stays on its text.
    pub fn insert_line(&mut self, idx: usize, content: &str) {
        let idx = idx.min(self.rope.len_lines());
        if idx == self.rope.len_lines() {
            let end = self.rope.len_chars();
            let needs_break = end > 0 && self.rope.char(end - 1) != '\n';
            let text = if needs_break {
                format!("\n{content}")
            } else {
                content.to_string()
            };
            self.rope.insert(end, &text);
        } else {
            let start = self.rope.line_to_char(idx);
            self.rope.insert(start, &format!("{content}\n"));
            if self.cursor.line >= idx {
                self.cursor.line += 1;
            }
        }
    }

    /// Remove line `idx` including its line ending.
    pub fn remove_line(&mut self, idx: usize) {
        let count = self.rope.len_lines();
        if idx >= count {
            return;
        }
        let start = self.rope.line_to_char(idx);
        let end = if idx + 1 < count {
            self.rope.line_to_char(idx + 1)
        } else {
            self.rope.len_chars()
        };
        // Removing the last line takes the preceding break with it.
        let start = if idx + 1 >= count && idx > 0 {
            start - 1
        } else {
            start
        };
        self.rope.remove(start..end);
        if self.cursor.line > idx || self.cursor.line >= self.rope.len_lines() {
            self.cursor.line = self.cursor.line.saturating_sub(1);
        }
        let Cursor { line, col, .. } = self.cursor;
        self.move_to(line, col);
    }

    /// Apply a key press. Returns true if the text changed.
    pub fn apply_key(&mut self, key: EditorKey) -> bool {
        match key {
            EditorKey::Char(ch) => {
                self.insert_char(ch);
                true
            }
            EditorKey::Enter => {
                self.insert_char('\n');
                true
            }
            EditorKey::Backspace => self.delete_back(),
            EditorKey::Delete => self.delete_forward(),
            EditorKey::Left => {
                self.move_left();
                false
            }
            EditorKey::Right => {
                self.move_right();
                false
            }
            EditorKey::Up => {
                self.move_vertical(-1);
                false
            }
            EditorKey::Down => {
                self.move_vertical(1);
                false
            }
            EditorKey::Home => {
                self.cursor.set_col(0);
                false
            }
            EditorKey::End => {
                self.cursor.set_col(self.line_len(self.cursor.line));
                false
            }
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        let idx = self.char_index();
        self.rope.insert_char(idx, ch);
        self.place_at_char(idx + 1);
    }

    /// Insert `s` at the cursor and leave the cursor after it.
    pub fn insert_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.insert_char(ch);
        }
    }

    pub fn delete_back(&mut self) -> bool {
        let idx = self.char_index();
        if idx == 0 {
            return false;
        }
        if self.cursor.col == 0 {
            let prev = self.cursor.line - 1;
            let prev_len = self.line_len(prev);
            let width = if idx >= 2
                && self.rope.char(idx - 1) == '\n'
                && self.rope.char(idx - 2) == '\r'
            {
                2
            } else {
                1
            };
            self.rope.remove(idx - width..idx);
            self.cursor.line = prev;
            self.cursor.set_col(prev_len);
        } else {
            let line = self.line(self.cursor.line).unwrap_or_default();
            let prev_len = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.rope.remove(idx - 1..idx);
            self.cursor.set_col(self.cursor.col - prev_len);
        }
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        let idx = self.char_index();
        if idx >= self.rope.len_chars() {
            return false;
        }
        let width = if self.rope.char(idx) == '\r'
            && idx + 1 < self.rope.len_chars()
            && self.rope.char(idx + 1) == '\n'
        {
            2
        } else {
            1
        };
        self.rope.remove(idx..idx + width);
        true
    }

    /// Move the cursor, clamping to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        let text = self.line(line).unwrap_or_default();
        self.cursor.line = line;
        self.cursor.set_col(floor_char_boundary(&text, col));
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line(self.cursor.line).unwrap_or_default();
            let width = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - width);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line = self.line(self.cursor.line).unwrap_or_default();
        if let Some(ch) = line[self.cursor.col.min(line.len())..].chars().next() {
            self.cursor.set_col(self.cursor.col + ch.len_utf8());
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let Some(target) = self.cursor.line.checked_add_signed(delta) else {
            return;
        };
        if target >= self.line_count() {
            return;
        }
        let text = self.line(target).unwrap_or_default();
        self.cursor.line = target;
        self.cursor.col = floor_char_boundary(&text, self.cursor.goal);
    }

    /// Put the cursor on char index `idx`. Inserting a break can merge with
    /// a neighbouring one (`\r` + `\n`), so the line is read back from the rope.
    fn place_at_char(&mut self, idx: usize) {
        let line = self.rope.char_to_line(idx);
        let offset = idx - self.rope.line_to_char(line);
        self.cursor.line = line;
        self.cursor.set_col(self.rope.line(line).char_to_byte(offset));
    }

    fn char_index(&self) -> usize {
        let start = self.rope.line_to_char(self.cursor.line);
        let line = self.rope.line(self.cursor.line);
        start + line.byte_to_char(self.cursor.col.min(line.len_bytes()))
    }
}

/// Characters the rope treats as line breaks.
const fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

fn floor_char_boundary(s: &str, col: usize) -> usize {
    let mut col = col.min(s.len());
    while !s.is_char_boundary(col) {
        col -= 1;
    }
    col
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(buf: &mut EditorBuffer, s: &str) {
        for ch in s.chars() {
            buf.apply_key(EditorKey::Char(ch));
        }
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::from_text("");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), Some(String::new()));
        assert_eq!(buf.line(1), None);
    }

    #[test]
    fn test_line_strips_crlf() {
        let buf = EditorBuffer::from_text("a\r\nb");
        assert_eq!(buf.line(0), Some("a".to_string()));
        assert_eq!(buf.line_len(0), 1);
    }

    #[test]
    fn test_line_strips_lone_carriage_return() {
        let mut buf = EditorBuffer::from_text("abc\rdef");
        assert_eq!(buf.line(0), Some("abc".to_string()));

        buf.apply_key(EditorKey::End);
        assert_eq!(buf.cursor(), Cursor::at(0, 3));
        buf.apply_key(EditorKey::Char('x'));
        assert_eq!(buf.text(), "abcx\rdef");
        assert!(buf.apply_key(EditorKey::Backspace));
        assert_eq!(buf.text(), "abc\rdef");
        assert_eq!(buf.cursor(), Cursor::at(0, 3));
    }

    #[test]
    fn test_line_separator_is_a_break() {
        let mut buf = EditorBuffer::from_text("abc\u{2028}def");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_len(0), 3);

        buf.apply_key(EditorKey::End);
        buf.apply_key(EditorKey::Char('x'));
        buf.apply_key(EditorKey::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 3));
        buf.apply_key(EditorKey::Backspace);
        assert_eq!(buf.text(), "abx\u{2028}def");
    }

    #[test]
    fn test_backspace_over_lone_carriage_return() {
        let mut buf = EditorBuffer::from_text("a\r\rb");
        buf.move_to(2, 0);
        assert!(buf.apply_key(EditorKey::Backspace));
        assert_eq!(buf.text(), "a\rb");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_enter_after_carriage_return_stays_on_text() {
        let mut buf = EditorBuffer::from_text("a\rb");
        buf.move_to(1, 0);
        buf.apply_key(EditorKey::Enter);
        assert_eq!(buf.text(), "a\r\nb");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
        assert_eq!(buf.line(1), Some("b".to_string()));
    }

    #[test]
    fn test_typing_and_enter() {
        let mut buf = EditorBuffer::from_text("");
        typed(&mut buf, "# Hi");
        assert!(buf.apply_key(EditorKey::Enter));
        typed(&mut buf, "body");
        assert_eq!(buf.text(), "# Hi\nbody");
        assert_eq!(buf.cursor(), Cursor::at(1, 4));
    }

    #[test]
    fn test_navigation_does_not_change_text() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        for key in [
            EditorKey::Right,
            EditorKey::Down,
            EditorKey::End,
            EditorKey::Home,
            EditorKey::Up,
            EditorKey::Left,
        ] {
            assert!(!buf.apply_key(key));
        }
        assert_eq!(buf.text(), "ab\ncd");
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        assert!(buf.apply_key(EditorKey::Backspace));
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_backspace_removes_crlf_pair() {
        let mut buf = EditorBuffer::from_text("a\r\nb");
        buf.move_to(1, 0);
        buf.delete_back();
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut buf = EditorBuffer::from_text("x");
        assert!(!buf.apply_key(EditorKey::Backspace));
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut buf = EditorBuffer::from_text("x");
        buf.move_to(0, 1);
        assert!(!buf.apply_key(EditorKey::Delete));
        buf.move_to(0, 0);
        assert!(buf.apply_key(EditorKey::Delete));
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_multibyte_movement_and_delete() {
        let mut buf = EditorBuffer::from_text("café");
        buf.apply_key(EditorKey::End);
        assert_eq!(buf.cursor().col, 5);
        buf.apply_key(EditorKey::Left);
        assert_eq!(buf.cursor().col, 3);
        buf.apply_key(EditorKey::Right);
        buf.apply_key(EditorKey::Backspace);
        assert_eq!(buf.text(), "caf");
    }

    #[test]
    fn test_vertical_movement_remembers_column() {
        let mut buf = EditorBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.apply_key(EditorKey::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.apply_key(EditorKey::Down);
        assert_eq!(buf.cursor(), Cursor::at(2, 4));
    }

    #[test]
    fn test_set_text_clamps_cursor() {
        let mut buf = EditorBuffer::from_text("one\ntwo\nthree");
        buf.move_to(2, 5);
        buf.set_text("x");
        assert_eq!(buf.cursor(), Cursor::at(0, 1));
    }

    #[test]
    fn test_replace_line_keeps_other_lines() {
        let mut buf = EditorBuffer::from_text("a\nb\nc");
        buf.replace_line(1, "# b");
        assert_eq!(buf.text(), "a\n# b\nc");
    }

    #[test]
    fn test_insert_and_remove_lines() {
        let mut buf = EditorBuffer::from_text("code");
        buf.insert_line(0, "```");
        buf.insert_line(2, "```");
        assert_eq!(buf.text(), "```\ncode\n```");
        assert_eq!(buf.cursor().line, 1);

        buf.remove_line(2);
        buf.remove_line(0);
        assert_eq!(buf.text(), "code");
        assert_eq!(buf.cursor().line, 0);
    }
}
