use serde::{Deserialize, Serialize};

/// Position in a document (0-indexed, column counted in chars)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Syntax information supplied by the host editor
///
/// Implementations answer questions about the language mode of the active
/// document and the syntactic state at a given position. They must be cheap
/// to query and must not mutate the document.
pub trait SyntaxContext {
    /// Does the active language mode use `ch` to delimit string literals?
    fn is_string_delimiter(&self, ch: char) -> bool;

    /// Number of open string literals enclosing `pos` (0 = not in a string)
    fn string_depth(&self, pos: Position) -> usize;

    /// Is `pos` inside a comment?
    fn in_comment(&self, pos: Position) -> bool;
}

/// Context for hosts that cannot provide any syntax information
///
/// Reports that the mode has no notion of strings, which makes every quote
/// jumpable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSyntax;

impl SyntaxContext for NoSyntax {
    fn is_string_delimiter(&self, _ch: char) -> bool {
        false
    }

    fn string_depth(&self, _pos: Position) -> usize {
        0
    }

    fn in_comment(&self, _pos: Position) -> bool {
        false
    }
}

impl<T: SyntaxContext + ?Sized> SyntaxContext for &T {
    fn is_string_delimiter(&self, ch: char) -> bool {
        (**self).is_string_delimiter(ch)
    }

    fn string_depth(&self, pos: Position) -> usize {
        (**self).string_depth(pos)
    }

    fn in_comment(&self, pos: Position) -> bool {
        (**self).in_comment(pos)
    }
}

impl<T: SyntaxContext + ?Sized> SyntaxContext for Box<T> {
    fn is_string_delimiter(&self, ch: char) -> bool {
        (**self).is_string_delimiter(ch)
    }

    fn string_depth(&self, pos: Position) -> usize {
        (**self).string_depth(pos)
    }

    fn in_comment(&self, pos: Position) -> bool {
        (**self).in_comment(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_syntax_has_no_strings() {
        let ctx = NoSyntax;
        assert!(!ctx.is_string_delimiter('"'));
        assert!(!ctx.is_string_delimiter('\''));
        assert_eq!(ctx.string_depth(Position::new(3, 4)), 0);
        assert!(!ctx.in_comment(Position::default()));
    }

    #[test]
    fn test_boxed_context_delegates() {
        let ctx: Box<dyn SyntaxContext> = Box::new(NoSyntax);
        assert!(!ctx.is_string_delimiter('"'));
        assert_eq!(ctx.string_depth(Position::new(0, 0)), 0);
    }
}
