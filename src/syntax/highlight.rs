use std::cell::{Cell, RefCell};

use syntect::parsing::{ParseState, ScopeStack, ScopeStackOp, SyntaxReference, SyntaxSet};
use tab_jump_core::{Position, SyntaxContext};

use super::{ScanContext, SyntaxTable};
use crate::document::DocumentBuffer;

/// Scope-derived state at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeState {
    pub string_depth: usize,
    pub in_comment: bool,
}

/// syntect parser state at the start of each line of one document
///
/// Kept alongside the document so a decision only parses the lines between
/// the last edit and the cursor. Call [`ParseCache::invalidate_from`] with
/// the lowest edited line before querying.
#[derive(Debug, Default)]
pub struct ParseCache {
    syntax: Option<String>,
    /// Entry `i` is the state before line `i` is parsed
    line_starts: Vec<(ParseState, ScopeStack)>,
    parsed_lines: usize,
}

impl ParseCache {
    /// Forget the start states of every line after `line`
    pub fn invalidate_from(&mut self, line: usize) {
        self.line_starts.truncate(line + 1);
    }

    /// Lines parsed since the cache was created
    pub fn parsed_lines(&self) -> usize {
        self.parsed_lines
    }

    fn seed(&mut self, syntax: &SyntaxReference) {
        if self.syntax.as_deref() != Some(syntax.name.as_str()) {
            self.syntax = Some(syntax.name.clone());
            self.line_starts.clear();
        }
        if self.line_starts.is_empty() {
            self.line_starts
                .push((ParseState::new(syntax), ScopeStack::new()));
        }
    }

    fn parse_line(
        &mut self,
        state: &mut ParseState,
        line: &str,
        syntax_set: &SyntaxSet,
    ) -> Option<Vec<(usize, ScopeStackOp)>> {
        self.parsed_lines += 1;
        state.parse_line(&format!("{line}\n"), syntax_set).ok()
    }
}

/// Syntax context backed by syntect's scope stack
///
/// String depth is the number of `string` scopes active at the position and
/// a position is in a comment when any `comment` scope is active. Delimiter
/// membership comes from the language's [`SyntaxTable`]. If syntect fails to
/// parse a line the lexical scanner answers instead.
pub struct HighlightContext<'a> {
    syntax_set: &'a SyntaxSet,
    syntax: &'a SyntaxReference,
    lines: &'a [String],
    table: &'a SyntaxTable,
    cache: RefCell<&'a mut ParseCache>,
    last: Cell<Option<(Position, ScopeState)>>,
}

impl<'a> HighlightContext<'a> {
    /// Returns `None` when syntect has no syntax for the buffer's language
    pub fn new(
        buffer: &'a DocumentBuffer,
        table: &'a SyntaxTable,
        syntax_set: &'a SyntaxSet,
        cache: &'a mut ParseCache,
    ) -> Option<Self> {
        let token = buffer.file_type().syntect_token()?;
        let syntax = syntax_set.find_syntax_by_token(token)?;

        Some(Self {
            syntax_set,
            syntax,
            lines: buffer.lines(),
            table,
            cache: RefCell::new(cache),
            last: Cell::new(None),
        })
    }

    pub fn syntax_name(&self) -> &str {
        &self.syntax.name
    }

    /// Scopes active just before the character at `pos`
    fn scopes_at(&self, pos: Position) -> Option<ScopeStack> {
        let mut cache = self.cache.borrow_mut();
        cache.seed(self.syntax);

        while cache.line_starts.len() <= pos.line {
            let idx = cache.line_starts.len() - 1;
            let line = self.lines.get(idx)?;
            let (mut state, mut stack) = cache.line_starts[idx].clone();
            for (_, op) in &cache.parse_line(&mut state, line, self.syntax_set)? {
                stack.apply(op).ok()?;
            }
            cache.line_starts.push((state, stack));
        }

        let line = self.lines.get(pos.line).map(String::as_str).unwrap_or("");
        let (mut state, mut stack) = cache.line_starts[pos.line].clone();
        let ops = cache.parse_line(&mut state, line, self.syntax_set)?;

        let byte = line
            .char_indices()
            .nth(pos.column)
            .map(|(i, _)| i)
            .unwrap_or(line.len());

        // Scopes closing exactly at the position are no longer active there
        for (offset, op) in &ops {
            let applies =
                *offset < byte || (*offset == byte && matches!(op, ScopeStackOp::Pop(_)));
            if !applies {
                break;
            }
            stack.apply(op).ok()?;
        }

        Some(stack)
    }

    pub fn state_at(&self, pos: Position) -> ScopeState {
        if let Some((cached, state)) = self.last.get()
            && cached == pos
        {
            return state;
        }

        let state = self.compute_state(pos);
        self.last.set(Some((pos, state)));
        state
    }

    fn compute_state(&self, pos: Position) -> ScopeState {
        let Some(stack) = self.scopes_at(pos) else {
            tracing::debug!(
                syntax = self.syntax_name(),
                line = pos.line,
                "syntect parse failed, falling back to scanner"
            );
            let scanned = ScanContext::new(self.lines, self.table).state_at(pos);
            return ScopeState {
                string_depth: scanned.string_depth(),
                in_comment: scanned.in_comment,
            };
        };

        let scopes: Vec<String> = stack.as_slice().iter().map(|s| s.build_string()).collect();
        ScopeState {
            string_depth: scopes.iter().filter(|s| s.starts_with("string")).count(),
            in_comment: scopes.iter().any(|s| s.starts_with("comment")),
        }
    }
}

impl SyntaxContext for HighlightContext<'_> {
    fn is_string_delimiter(&self, ch: char) -> bool {
        self.table.is_string_delimiter(ch)
    }

    fn string_depth(&self, pos: Position) -> usize {
        self.state_at(pos).string_depth
    }

    fn in_comment(&self, pos: Position) -> bool {
        self.state_at(pos).in_comment
    }
}
