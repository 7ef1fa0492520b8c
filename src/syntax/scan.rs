use std::cell::Cell;

use tab_jump_core::{Position, SyntaxContext};

use super::SyntaxTable;

/// Syntactic state at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanState {
    /// Delimiter of the string literal enclosing the position
    pub string: Option<char>,
    pub in_comment: bool,
}

impl ScanState {
    pub fn string_depth(&self) -> usize {
        usize::from(self.string.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    String(char),
    LineComment,
    BlockComment,
}

/// Length of the char literal at the start of `rest`, if one starts there
///
/// Accepts `'x'`, `'\x'`, `'\x41'` and `'\u{1F600}'`. Anything else, such as
/// a lifetime `'a`, is not a literal.
fn char_literal_len(rest: &[char], escape: Option<char>) -> Option<usize> {
    let quote = *rest.first()?;
    match rest.get(1..)? {
        [c, close, ..] if Some(*c) != escape && *c != quote && *close == quote => Some(3),
        [c, body @ ..] if Some(*c) == escape => {
            // Escaped char plus up to `u{10FFFF}`
            let close = body
                .iter()
                .take(10)
                .skip(1)
                .position(|&ch| ch == quote)?;
            let body = &body[1..close + 1];
            body.iter()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '{' | '}'))
                .then_some(close + 4)
        }
        _ => None,
    }
}

/// Lexical scanner over a syntax table
///
/// Scans from the start of the buffer up to the queried position. The last
/// answer is kept so the string and comment queries of one decision share a
/// scan. Strings may span lines; line comments end at the end of the line.
/// Block comments do not nest.
#[derive(Debug, Clone)]
pub struct ScanContext<'a> {
    lines: &'a [String],
    table: &'a SyntaxTable,
    last: Cell<Option<(Position, ScanState)>>,
}

impl<'a> ScanContext<'a> {
    pub fn new(lines: &'a [String], table: &'a SyntaxTable) -> Self {
        Self {
            lines,
            table,
            last: Cell::new(None),
        }
    }

    pub fn state_at(&self, pos: Position) -> ScanState {
        if let Some((cached, state)) = self.last.get()
            && cached == pos
        {
            return state;
        }

        let state = self.scan(pos);
        self.last.set(Some((pos, state)));
        state
    }

    fn scan(&self, pos: Position) -> ScanState {
        let line_comment: Option<Vec<char>> =
            self.table.line_comment.as_ref().map(|m| m.chars().collect());
        let block_comment: Option<(Vec<char>, Vec<char>)> = self
            .table
            .block_comment
            .as_ref()
            .map(|b| (b.open.chars().collect(), b.close.chars().collect()));

        let mut mode = Mode::Code;

        for (line_idx, line) in self.lines.iter().enumerate().take(pos.line + 1) {
            let chars: Vec<char> = line.chars().collect();
            let end = if line_idx == pos.line {
                pos.column.min(chars.len())
            } else {
                chars.len()
            };

            let mut i = 0;
            while i < end {
                let rest = &chars[i..];
                match mode {
                    Mode::Code => {
                        if let Some(marker) = &line_comment
                            && !marker.is_empty()
                            && rest.starts_with(marker)
                        {
                            mode = Mode::LineComment;
                            i += marker.len();
                        } else if let Some((open, _)) = &block_comment
                            && !open.is_empty()
                            && rest.starts_with(open)
                        {
                            mode = Mode::BlockComment;
                            i += open.len();
                        } else if Some(chars[i]) == self.table.char_literal
                            && let Some(len) = char_literal_len(rest, self.table.escape)
                        {
                            i += len;
                        } else {
                            if self.table.is_string_delimiter(chars[i]) {
                                mode = Mode::String(chars[i]);
                            }
                            i += 1;
                        }
                    }
                    Mode::String(delimiter) => {
                        if Some(chars[i]) == self.table.escape {
                            i += 2;
                        } else {
                            if chars[i] == delimiter {
                                mode = Mode::Code;
                            }
                            i += 1;
                        }
                    }
                    Mode::LineComment => break,
                    Mode::BlockComment => match &block_comment {
                        Some((_, close)) if !close.is_empty() && rest.starts_with(close) => {
                            mode = Mode::Code;
                            i += close.len();
                        }
                        _ => i += 1,
                    },
                }
            }

            if line_idx < pos.line && mode == Mode::LineComment {
                mode = Mode::Code;
            }
        }

        match mode {
            Mode::Code => ScanState::default(),
            Mode::String(delimiter) => ScanState {
                string: Some(delimiter),
                in_comment: false,
            },
            Mode::LineComment | Mode::BlockComment => ScanState {
                string: None,
                in_comment: true,
            },
        }
    }
}

impl SyntaxContext for ScanContext<'_> {
    fn is_string_delimiter(&self, ch: char) -> bool {
        self.table.is_string_delimiter(ch)
    }

    fn string_depth(&self, pos: Position) -> usize {
        self.state_at(pos).string_depth()
    }

    fn in_comment(&self, pos: Position) -> bool {
        self.state_at(pos).in_comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tab_jump_core::{Decision, JumpChars, JumpOut, Reason};

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn state(language: &str, text: &str, line: usize, column: usize) -> ScanState {
        let table = SyntaxTable::builtin(language).unwrap();
        let lines = lines(text);
        ScanContext::new(&lines, &table).state_at(Position::new(line, column))
    }

    #[test]
    fn test_inside_string() {
        let text = r#"let s = "hello";"#;
        assert_eq!(state("rust", text, 0, 14).string, Some('"'));
        assert_eq!(state("rust", text, 0, 14).string_depth(), 1);
        assert_eq!(state("rust", text, 0, 8), ScanState::default());
        assert_eq!(state("rust", text, 0, 15), ScanState::default());
    }

    #[test]
    fn test_escaped_quote_stays_in_string() {
        let text = r#"x = "a\"b""#;
        assert_eq!(state("python", text, 0, 7).string_depth(), 1);
        assert_eq!(state("python", text, 0, 9).string_depth(), 1);
        assert_eq!(state("python", text, 0, 10).string_depth(), 0);
    }

    #[test]
    fn test_quote_inside_line_comment() {
        let text = r#"// say "hi""#;
        let at_quote = state("rust", text, 0, 7);
        assert!(at_quote.in_comment);
        assert_eq!(at_quote.string_depth(), 0);
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let text = "# it's fine\n\"x\"";
        assert_eq!(state("python", text, 1, 0), ScanState::default());
        assert_eq!(state("python", text, 1, 2).string, Some('"'));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let text = "/* start\n \"quoted\" */ \"s\"";
        assert!(state("c", text, 1, 1).in_comment);
        assert!(!state("c", text, 1, 13).in_comment);
        assert_eq!(state("c", text, 1, 14).string, Some('"'));
    }

    #[test]
    fn test_string_spans_lines() {
        let text = "s = `multi\nline` + 1";
        assert_eq!(state("javascript", text, 1, 4).string, Some('`'));
        assert_eq!(state("javascript", text, 1, 5), ScanState::default());
    }

    #[test]
    fn test_other_delimiter_inside_string() {
        let text = r#"x = "it's""#;
        assert_eq!(state("python", text, 0, 9).string, Some('"'));
    }

    #[test]
    fn test_char_literal_is_not_a_string() {
        let text = r#"let c = '"'; let s = "";"#;
        assert_eq!(state("rust", text, 0, 21), ScanState::default());
        assert_eq!(state("rust", text, 0, 22).string, Some('"'));

        let table = SyntaxTable::builtin("rust").unwrap();
        let lines = lines(text);
        let ctx = ScanContext::new(&lines, &table);
        let decision = JumpOut::new(JumpChars::default()).decide(
            Some('"'),
            &ctx,
            Position::new(0, 21),
        );
        assert_eq!(decision, Decision::Fallback(Reason::OpeningQuote));
    }

    #[test]
    fn test_escaped_char_literals() {
        let text = r#"m('\'', '\u{1F600}', '\x22', "x")"#;
        assert_eq!(state("rust", text, 0, 29), ScanState::default());
        assert_eq!(state("rust", text, 0, 30).string, Some('"'));
    }

    #[test]
    fn test_lifetime_is_not_a_char_literal() {
        let text = r#"fn f<'a>(s: &'a str) -> &'a str { "x" }"#;
        assert_eq!(state("rust", text, 0, 34), ScanState::default());
        assert_eq!(state("rust", text, 0, 35).string, Some('"'));
    }

    #[test]
    fn test_char_literal_len() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(char_literal_len(&chars("'x' "), Some('\\')), Some(3));
        assert_eq!(char_literal_len(&chars(r"'\n'"), Some('\\')), Some(4));
        assert_eq!(char_literal_len(&chars(r"'\u{10FFFF}'"), Some('\\')), Some(12));
        assert_eq!(char_literal_len(&chars("'a>"), Some('\\')), None);
        assert_eq!(char_literal_len(&chars("'a"), Some('\\')), None);
    }

    #[test]
    fn test_repeated_query_reuses_scan() {
        let table = SyntaxTable::builtin("rust").unwrap();
        let lines = lines(r#"let s = "a";"#);
        let ctx = ScanContext::new(&lines, &table);

        let pos = Position::new(0, 9);
        assert_eq!(ctx.string_depth(pos), 1);
        assert_eq!(ctx.last.get(), Some((pos, ctx.scan(pos))));
        assert!(!ctx.in_comment(pos));
    }

    #[test]
    fn test_context_trait() {
        let table = SyntaxTable::builtin("rust").unwrap();
        let lines = lines(r#"f("a", /* "b" */ x)"#);
        let ctx = ScanContext::new(&lines, &table);

        assert!(ctx.is_string_delimiter('"'));
        assert!(!ctx.is_string_delimiter('\''));
        assert_eq!(ctx.string_depth(Position::new(0, 4)), 1);
        assert!(ctx.in_comment(Position::new(0, 10)));
        assert!(!ctx.in_comment(Position::new(0, 17)));
    }
}
