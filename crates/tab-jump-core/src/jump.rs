use serde::Serialize;

use crate::chars::JumpChars;
use crate::context::{Position, SyntaxContext};

/// Why the evaluator decided the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    /// Character is a plain closing character
    ClosingChar,
    /// Quote in a mode without string literals for that character
    NoStringSyntax,
    /// Quote that closes the string the cursor is in
    InsideString,
    /// Quote inside a comment, where opening and closing can't be told apart
    InsideComment,
    /// Quote that would start a new string
    OpeningQuote,
    /// Character is not in the jump set
    NotJumpable,
    /// Nothing after the cursor on this line
    EndOfLine,
}

/// Outcome of a single advance-key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "reason", rename_all = "kebab-case")]
pub enum Decision {
    /// Step the cursor over one character
    Jump(Reason),
    /// Let the next handler for the key run
    Fallback(Reason),
}

impl Decision {
    pub fn is_jump(&self) -> bool {
        matches!(self, Decision::Jump(_))
    }

    pub fn reason(&self) -> Reason {
        match self {
            Decision::Jump(reason) | Decision::Fallback(reason) => *reason,
        }
    }
}

/// Jump-decision evaluator
///
/// Holds only the configured character set; every decision is computed from
/// the character after the cursor and a fresh syntax query.
#[derive(Debug, Clone, Default)]
pub struct JumpOut {
    chars: JumpChars,
}

impl JumpOut {
    pub fn new(chars: JumpChars) -> Self {
        Self { chars }
    }

    pub fn chars(&self) -> &JumpChars {
        &self.chars
    }

    /// Should the cursor step over `next`?
    pub fn should_jump_over(
        &self,
        next: Option<char>,
        ctx: &dyn SyntaxContext,
        pos: Position,
    ) -> bool {
        self.decide(next, ctx, pos).is_jump()
    }

    /// Same as [`JumpOut::should_jump_over`], keeping the reason
    pub fn decide(&self, next: Option<char>, ctx: &dyn SyntaxContext, pos: Position) -> Decision {
        let Some(ch) = next else {
            return Decision::Fallback(Reason::EndOfLine);
        };

        let decision = match self.chars.get(ch) {
            None => Decision::Fallback(Reason::NotJumpable),
            Some(entry) if !entry.quote => Decision::Jump(Reason::ClosingChar),
            Some(_) => Self::decide_quote(ch, ctx, pos),
        };

        tracing::trace!(?ch, line = pos.line, column = pos.column, ?decision, "jump decision");
        decision
    }

    fn decide_quote(ch: char, ctx: &dyn SyntaxContext, pos: Position) -> Decision {
        if !ctx.is_string_delimiter(ch) {
            return Decision::Jump(Reason::NoStringSyntax);
        }

        if ctx.string_depth(pos) > 0 {
            Decision::Jump(Reason::InsideString)
        } else if ctx.in_comment(pos) {
            Decision::Jump(Reason::InsideComment)
        } else {
            Decision::Fallback(Reason::OpeningQuote)
        }
    }
}
