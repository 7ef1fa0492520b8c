pub mod chars;
pub mod context;
pub mod jump;

pub use chars::{JumpChar, JumpChars, JumpCharsError};
pub use context::{NoSyntax, Position, SyntaxContext};
pub use jump::{Decision, JumpOut, Reason};
