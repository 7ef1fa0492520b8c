use std::path::{Path, PathBuf};

use miette::Result;
use tab_jump_core::Position;

use super::{Cursor, CursorMovement, FileType};
use crate::renderer::display_width;

/// Characters that open a block and add one indentation level to the next line
const BLOCK_OPENERS: [char; 4] = ['{', '(', '[', ':'];
/// Characters that close a block and remove one indentation level from their own line
const BLOCK_CLOSERS: [char; 3] = ['}', ')', ']'];

/// Document buffer that manages content editing
#[derive(Debug, Clone)]
pub struct DocumentBuffer {
    /// File type classification
    file_type: FileType,
    /// Path to the file (if loaded from disk)
    file_path: Option<PathBuf>,
    cursor: Cursor,
    /// Content as lines
    lines: Vec<String>,
    /// Whether the content ended with a newline when loaded
    trailing_newline: bool,
    /// Whether the buffer has been modified
    modified: bool,
    /// Lowest line edited since the last call to `take_edited_from`
    edited_from: Option<usize>,
}

impl DocumentBuffer {
    /// Create a new empty plain text buffer
    pub fn new() -> Self {
        Self {
            file_type: FileType::PlainText,
            file_path: None,
            cursor: Cursor::default(),
            lines: vec![String::new()],
            trailing_newline: false,
            modified: false,
            edited_from: Some(0),
        }
    }

    /// Create buffer from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read file {}: {}", path.display(), e))?;

        Ok(Self {
            file_type: FileType::from_path(path),
            file_path: Some(path.to_path_buf()),
            ..Self::from_string(&content)
        })
    }

    /// Create buffer from string (plain text until a file type is set)
    pub fn from_string(content: &str) -> Self {
        Self {
            lines: Self::extract_lines(content),
            trailing_newline: content.ends_with('\n'),
            ..Self::new()
        }
    }

    /// Override the detected file type
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self.edited_from = Some(0);
        self
    }

    /// Extract lines from content
    fn extract_lines(content: &str) -> Vec<String> {
        if content.is_empty() {
            vec![String::new()]
        } else {
            content.lines().map(|s| s.to_string()).collect()
        }
    }

    /// Get the current cursor position
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Cursor as a document position
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Place the cursor, clamping to the buffer contents
    pub fn set_cursor(&mut self, line: usize, column: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        let column = column.min(self.line_char_count(line));
        self.cursor = Cursor::at(Position::new(line, column));
    }

    /// Get the file path
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Check if buffer has been modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Get the file type
    pub fn file_type(&self) -> &FileType {
        &self.file_type
    }

    /// Get all lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Get a specific line
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|s| s.as_str())
    }

    /// Get total line count
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Character at a position, `None` past the end of the line
    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.line(pos.line)?.chars().nth(pos.column)
    }

    /// Character immediately after the cursor
    pub fn char_at_cursor(&self) -> Option<char> {
        self.char_at(self.position())
    }

    /// Lowest line whose content changed since the previous call
    ///
    /// A fresh buffer reports line 0 so caches built for another buffer are
    /// dropped.
    pub fn take_edited_from(&mut self) -> Option<usize> {
        self.edited_from.take()
    }

    fn mark_edited(&mut self, line: usize) {
        self.modified = true;
        self.edited_from = Some(self.edited_from.map_or(line, |l| l.min(line)));
    }

    /// Convert character position to byte position for a given line
    fn char_to_byte_idx(&self, line_idx: usize, char_pos: usize) -> usize {
        if let Some(line) = self.line(line_idx) {
            line.char_indices()
                .nth(char_pos)
                .map(|(byte_idx, _)| byte_idx)
                .unwrap_or(line.len())
        } else {
            0
        }
    }

    /// Get the character count (not byte count) for a line
    fn line_char_count(&self, line_idx: usize) -> usize {
        self.line(line_idx).map(|s| s.chars().count()).unwrap_or(0)
    }

    fn move_to_line(&mut self, line: usize) {
        let len = self.line_char_count(line);
        self.cursor.set_line(line, len);
    }

    /// Move cursor
    pub fn move_cursor(&mut self, movement: CursorMovement) {
        let Position { line, column } = self.position();
        let last_line = self.line_count().saturating_sub(1);

        match movement {
            CursorMovement::Up if line > 0 => self.move_to_line(line - 1),
            CursorMovement::Down if line < last_line => self.move_to_line(line + 1),
            CursorMovement::Left if column > 0 => self.cursor.set_column(column - 1),
            CursorMovement::Left if line > 0 => {
                self.set_cursor(line - 1, self.line_char_count(line - 1));
            }
            CursorMovement::Right if column < self.line_char_count(line) => {
                self.cursor.set_column(column + 1);
            }
            CursorMovement::Right if line < last_line => self.set_cursor(line + 1, 0),
            CursorMovement::StartOfLine => self.cursor.set_column(0),
            CursorMovement::EndOfLine => self.cursor.set_column(self.line_char_count(line)),
            CursorMovement::PageUp => self.move_to_line(line.saturating_sub(20)),
            CursorMovement::PageDown => self.move_to_line((line + 20).min(last_line)),
            CursorMovement::StartOfDocument => self.cursor = Cursor::default(),
            CursorMovement::EndOfDocument => {
                self.set_cursor(last_line, self.line_char_count(last_line));
            }
            _ => {}
        }
    }

    /// Insert a character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let Position { line, column } = self.position();
        let byte_idx = self.char_to_byte_idx(line, column);
        if let Some(content) = self.lines.get_mut(line) {
            content.insert(byte_idx, c);
            self.cursor.set_column(column + 1);
            self.mark_edited(line);
        }
    }

    /// Insert a string at cursor position (paste, IME input)
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let mut parts = s.split('\n');
        let Some(first) = parts.next() else {
            return;
        };

        let Position { line: start, column } = self.position();
        let byte_idx = self.char_to_byte_idx(start, column);
        let Some(current_line) = self.lines.get_mut(start) else {
            return;
        };

        let rest = current_line.split_off(byte_idx);
        current_line.push_str(first);
        let mut line = start;
        let mut column = column + first.chars().count();

        for part in parts {
            line += 1;
            self.lines.insert(line, part.to_string());
            column = part.chars().count();
        }

        if let Some(last_line) = self.lines.get_mut(line) {
            last_line.push_str(&rest);
        }
        self.cursor = Cursor::at(Position::new(line, column));
        self.mark_edited(start);
    }

    /// Insert whitespace up to the next tab stop (or a literal tab)
    pub fn insert_tab(&mut self, tab_width: usize, insert_spaces: bool) {
        if !insert_spaces || tab_width == 0 {
            self.insert_char('\t');
            return;
        }

        let Position { line, column } = self.position();
        let display_column = self.display_width_to_column(line, column, tab_width);
        let count = tab_width - display_column % tab_width;
        self.insert_str(&" ".repeat(count));
    }

    /// Re-indent the cursor line relative to the previous non-blank line
    ///
    /// One level is added after a line ending with a block opener and one
    /// level is removed from a line starting with a block closer. A cursor
    /// inside the old indentation ends up at the first non-blank character.
    pub fn indent_line(&mut self, tab_width: usize, insert_spaces: bool) {
        let Position {
            line: line_idx,
            column,
        } = self.position();
        let unit = if insert_spaces {
            " ".repeat(tab_width.max(1))
        } else {
            "\t".to_string()
        };

        let previous = self.lines[..line_idx]
            .iter()
            .rev()
            .find(|l| !l.trim().is_empty());
        let mut target = previous.map(|l| leading_whitespace(l).to_string()).unwrap_or_default();
        if previous
            .and_then(|l| l.trim_end().chars().last())
            .is_some_and(|c| BLOCK_OPENERS.contains(&c))
        {
            target.push_str(&unit);
        }

        let Some(line) = self.lines.get_mut(line_idx) else {
            return;
        };
        let old_indent = leading_whitespace(line).to_string();
        let body = line[old_indent.len()..].to_string();
        if body.chars().next().is_some_and(|c| BLOCK_CLOSERS.contains(&c))
            && let Some(stripped) = target.strip_suffix(unit.as_str())
        {
            target = stripped.to_string();
        }

        let old_width = old_indent.chars().count();
        let new_width = target.chars().count();
        if old_indent != target {
            *line = format!("{target}{body}");
            self.mark_edited(line_idx);
        }

        self.cursor.set_column(if column <= old_width {
            new_width
        } else {
            column - old_width + new_width
        });
    }

    /// Delete character before cursor (backspace)
    pub fn delete_char(&mut self) {
        let Position { line, column } = self.position();
        if column > 0 {
            let byte_idx = self.char_to_byte_idx(line, column - 1);
            if let Some(content) = self.lines.get_mut(line)
                && let Some(ch) = content[byte_idx..].chars().next()
            {
                content.replace_range(byte_idx..byte_idx + ch.len_utf8(), "");
            }
            self.cursor.set_column(column - 1);
            self.mark_edited(line);
        } else if line > 0 {
            // Join with previous line
            let current_line = self.lines.remove(line);
            let join_column = self.line_char_count(line - 1);
            self.lines[line - 1].push_str(&current_line);
            self.cursor = Cursor::at(Position::new(line - 1, join_column));
            self.mark_edited(line - 1);
        }
    }

    /// Insert newline at cursor
    pub fn insert_newline(&mut self) {
        let Position { line, column } = self.position();
        let byte_idx = self.char_to_byte_idx(line, column);
        if let Some(content) = self.lines.get_mut(line) {
            let rest = content.split_off(byte_idx);
            self.lines.insert(line + 1, rest);
            self.cursor = Cursor::at(Position::new(line + 1, 0));
            self.mark_edited(line);
        }
    }

    /// Save buffer to file
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.file_path.clone() else {
            return Err(miette::miette!("No file path set"));
        };
        self.save_as(path)
    }

    /// Save buffer to a specific file
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.content())
            .map_err(|e| miette::miette!("Failed to write file {}: {}", path.display(), e))?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Get buffer content as string, keeping the loaded trailing newline
    pub fn content(&self) -> String {
        let mut content = self.lines.join("\n");
        if self.trailing_newline {
            content.push('\n');
        }
        content
    }

    /// Display width from the start of a line to a given column, with tabs
    /// expanded (wide characters such as CJK take 2 cells)
    pub fn display_width_to_column(&self, line: usize, column: usize, tab_width: usize) -> usize {
        self.line(line)
            .map(|content| {
                let end = content
                    .char_indices()
                    .nth(column)
                    .map(|(i, _)| i)
                    .unwrap_or(content.len());
                display_width(&content[..end], tab_width)
            })
            .unwrap_or(0)
    }
}

impl Default for DocumentBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !matches!(c, ' ' | '\t'))
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buffer = DocumentBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.position(), Position::new(0, 0));
        assert!(!buffer.is_modified());
        assert_eq!(buffer.char_at_cursor(), None);
    }

    #[test]
    fn test_from_string() {
        let buffer = DocumentBuffer::from_string("# Hello\n\nWorld");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(0), Some("# Hello"));
        assert_eq!(buffer.line(1), Some(""));
        assert_eq!(buffer.line(2), Some("World"));
    }

    #[test]
    fn test_char_at_cursor() {
        let mut buffer = DocumentBuffer::from_string("foo(\"héllo\")");
        buffer.set_cursor(0, 3);
        assert_eq!(buffer.char_at_cursor(), Some('('));
        buffer.set_cursor(0, 10);
        assert_eq!(buffer.char_at_cursor(), Some('"'));
        buffer.set_cursor(0, 11);
        assert_eq!(buffer.char_at_cursor(), Some(')'));
        buffer.set_cursor(0, 99);
        assert_eq!(buffer.cursor().column(), 12);
        assert_eq!(buffer.char_at_cursor(), None);
    }

    #[test]
    fn test_cursor_movement() {
        let mut buffer = DocumentBuffer::from_string("Line 1\nLine 2\nLine 3");

        buffer.move_cursor(CursorMovement::Down);
        assert_eq!(buffer.cursor().line(), 1);

        buffer.move_cursor(CursorMovement::Right);
        assert_eq!(buffer.cursor().column(), 1);

        buffer.move_cursor(CursorMovement::EndOfLine);
        assert_eq!(buffer.cursor().column(), 6);

        buffer.move_cursor(CursorMovement::Right);
        assert_eq!(buffer.position(), Position::new(2, 0));
    }

    #[test]
    fn test_insert_char() {
        let mut buffer = DocumentBuffer::from_string("Hello");
        buffer.set_cursor(0, 5);
        buffer.insert_char('!');

        assert_eq!(buffer.line(0), Some("Hello!"));
        assert_eq!(buffer.cursor().column(), 6);
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_delete_char_joins_lines() {
        let mut buffer = DocumentBuffer::from_string("Hello\nWorld");
        buffer.set_cursor(1, 0);
        buffer.delete_char();

        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0), Some("HelloWorld"));
        assert_eq!(buffer.cursor().column(), 5);
    }

    #[test]
    fn test_insert_newline() {
        let mut buffer = DocumentBuffer::from_string("Hello");
        buffer.set_cursor(0, 2);
        buffer.insert_newline();

        assert_eq!(buffer.line(0), Some("He"));
        assert_eq!(buffer.line(1), Some("llo"));
        assert_eq!(buffer.position(), Position::new(1, 0));
    }

    #[test]
    fn test_insert_str_multi_line() {
        let mut buffer = DocumentBuffer::from_string("Hello");
        buffer.set_cursor(0, 2);
        buffer.insert_str("XXX\nYYY\nZZZ");

        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(0), Some("HeXXX"));
        assert_eq!(buffer.line(1), Some("YYY"));
        assert_eq!(buffer.line(2), Some("ZZZllo"));
        assert_eq!(buffer.position(), Position::new(2, 3));
    }

    #[test]
    fn test_insert_str_japanese() {
        let mut buffer = DocumentBuffer::from_string("Hello");
        buffer.set_cursor(0, 5);
        buffer.insert_str("こんにちは");

        assert_eq!(buffer.line(0), Some("Helloこんにちは"));
        assert_eq!(buffer.cursor().column(), 10);
    }

    #[test]
    fn test_insert_tab_spaces_to_next_stop() {
        let mut buffer = DocumentBuffer::from_string("ab");
        buffer.set_cursor(0, 2);
        buffer.insert_tab(4, true);

        assert_eq!(buffer.line(0), Some("ab  "));
        assert_eq!(buffer.cursor().column(), 4);
    }

    #[test]
    fn test_insert_tab_literal() {
        let mut buffer = DocumentBuffer::from_string("ab");
        buffer.insert_tab(4, false);
        assert_eq!(buffer.line(0), Some("\tab"));
    }

    #[test]
    fn test_indent_line_after_opener() {
        let mut buffer = DocumentBuffer::from_string("fn main() {\n\"text\"");
        buffer.set_cursor(1, 0);
        buffer.indent_line(4, true);

        assert_eq!(buffer.line(1), Some("    \"text\""));
        assert_eq!(buffer.cursor().column(), 4);
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_indent_line_dedents_closer() {
        let mut buffer = DocumentBuffer::from_string("    if x {\n            }");
        buffer.set_cursor(1, 13);
        buffer.indent_line(4, true);

        assert_eq!(buffer.line(1), Some("    }"));
        assert_eq!(buffer.cursor().column(), 5);
    }

    #[test]
    fn test_indent_line_already_indented() {
        let mut buffer = DocumentBuffer::from_string("  a\n  b");
        buffer.set_cursor(1, 0);
        buffer.indent_line(2, true);

        assert_eq!(buffer.line(1), Some("  b"));
        assert_eq!(buffer.cursor().column(), 2);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.rs");

        let mut buffer = DocumentBuffer::from_string("let x = (1);");
        buffer.insert_char('/');
        buffer.save_as(&path).unwrap();
        assert!(!buffer.is_modified());

        let reloaded = DocumentBuffer::from_file(&path).unwrap();
        assert_eq!(reloaded.line(0), Some("/let x = (1);"));
        assert_eq!(reloaded.file_type(), &FileType::Code("rust".into()));
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut buffer = DocumentBuffer::new();
        assert!(buffer.save().is_err());
    }

    #[test]
    fn test_display_width_mixed() {
        let buffer = DocumentBuffer::from_string("Hello世界\n\tx");
        assert_eq!(buffer.display_width_to_column(0, 5, 4), 5);
        assert_eq!(buffer.display_width_to_column(0, 6, 4), 7);
        assert_eq!(buffer.display_width_to_column(0, 7, 4), 9);
        assert_eq!(buffer.display_width_to_column(1, 1, 4), 4);
        assert_eq!(buffer.display_width_to_column(1, 2, 8), 9);
    }

    #[test]
    fn test_insert_tab_after_literal_tab() {
        let mut buffer = DocumentBuffer::from_string("\tab");
        buffer.set_cursor(0, 3);
        buffer.insert_tab(4, true);

        // "\tab" spans 6 cells, so two spaces reach the stop at 8
        assert_eq!(buffer.line(0), Some("\tab  "));
        assert_eq!(buffer.cursor().column(), 5);
    }

    #[test]
    fn test_trailing_newline_survives_save() {
        let dir = tempfile::tempdir().unwrap();
        let with_newline = dir.path().join("a.rs");
        let without_newline = dir.path().join("b.rs");
        std::fs::write(&with_newline, "fn a() {}\n\n").unwrap();
        std::fs::write(&without_newline, "fn b() {}").unwrap();

        let mut buffer = DocumentBuffer::from_file(&with_newline).unwrap();
        assert_eq!(buffer.line_count(), 2);
        buffer.insert_char('x');
        buffer.save().unwrap();
        assert_eq!(
            std::fs::read_to_string(&with_newline).unwrap(),
            "xfn a() {}\n\n"
        );

        let mut buffer = DocumentBuffer::from_file(&without_newline).unwrap();
        buffer.save().unwrap();
        assert_eq!(std::fs::read_to_string(&without_newline).unwrap(), "fn b() {}");
    }

    #[test]
    fn test_edited_from_tracks_lowest_line() {
        let mut buffer = DocumentBuffer::from_string("a\nb\nc");
        assert_eq!(buffer.take_edited_from(), Some(0));
        assert_eq!(buffer.take_edited_from(), None);

        buffer.set_cursor(2, 1);
        buffer.insert_char('!');
        buffer.set_cursor(1, 0);
        buffer.insert_char('?');
        buffer.move_cursor(CursorMovement::Down);
        assert_eq!(buffer.take_edited_from(), Some(1));

        buffer.set_cursor(2, 0);
        buffer.delete_char();
        assert_eq!(buffer.take_edited_from(), Some(1));
        assert_eq!(buffer.take_edited_from(), None);
    }
}
