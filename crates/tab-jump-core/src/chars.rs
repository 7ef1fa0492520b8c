use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A character the advance key may step over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpChar {
    #[serde(rename = "char")]
    pub ch: char,
    /// Quote characters only jump when they look like a closing quote
    #[serde(default)]
    pub quote: bool,
}

impl JumpChar {
    pub const fn closing(ch: char) -> Self {
        Self { ch, quote: false }
    }

    pub const fn quote(ch: char) -> Self {
        Self { ch, quote: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum JumpCharsError {
    #[error("jump character list is empty")]
    #[diagnostic(
        code(tab_jump::chars::empty),
        help("remove the `chars` key to use the defaults")
    )]
    Empty,

    #[error("jump character {0:?} is listed more than once")]
    #[diagnostic(
        code(tab_jump::chars::duplicate),
        help("each character may appear once; set `quote = true` on the entry that should use quote logic")
    )]
    Duplicate(char),
}

/// Ordered set of jump characters
///
/// The default set is `] ) } > : ; ` '` as plain closing characters and `"`
/// as a quote. `'` is a plain closing character by default, so it jumps
/// regardless of string context; flag it as a quote to change that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<JumpChar>", into = "Vec<JumpChar>")]
pub struct JumpChars {
    entries: Vec<JumpChar>,
}

impl JumpChars {
    pub const DEFAULT: [JumpChar; 9] = [
        JumpChar::closing(']'),
        JumpChar::closing(')'),
        JumpChar::closing('}'),
        JumpChar::closing('>'),
        JumpChar::closing(':'),
        JumpChar::closing(';'),
        JumpChar::closing('`'),
        JumpChar::closing('\''),
        JumpChar::quote('"'),
    ];

    pub fn new(entries: Vec<JumpChar>) -> Result<Self, JumpCharsError> {
        if entries.is_empty() {
            return Err(JumpCharsError::Empty);
        }

        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.ch == entry.ch) {
                return Err(JumpCharsError::Duplicate(entry.ch));
            }
        }

        Ok(Self { entries })
    }

    /// Look up the entry for `ch`
    pub fn get(&self, ch: char) -> Option<&JumpChar> {
        self.entries.iter().find(|e| e.ch == ch)
    }

    pub fn entries(&self) -> &[JumpChar] {
        &self.entries
    }

    /// Plain closing characters, in configured order
    pub fn closing(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.iter().filter(|e| !e.quote).map(|e| e.ch)
    }

    /// Quote characters, in configured order
    pub fn quotes(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.iter().filter(|e| e.quote).map(|e| e.ch)
    }
}

impl Default for JumpChars {
    fn default() -> Self {
        Self {
            entries: Self::DEFAULT.to_vec(),
        }
    }
}

impl TryFrom<Vec<JumpChar>> for JumpChars {
    type Error = JumpCharsError;

    fn try_from(entries: Vec<JumpChar>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<JumpChars> for Vec<JumpChar> {
    fn from(chars: JumpChars) -> Self {
        chars.entries
    }
}
