use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opening and closing markers of a block comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockComment {
    pub open: String,
    pub close: String,
}

impl BlockComment {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

/// Lexical description of a language mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTable {
    /// Characters that open and close string literals
    #[serde(default)]
    pub string_delimiters: Vec<char>,

    /// Escape character inside strings
    #[serde(default = "default_escape")]
    pub escape: Option<char>,

    /// Line comment prefix (e.g. `//`)
    #[serde(default)]
    pub line_comment: Option<String>,

    /// Block comment markers (e.g. `/*` and `*/`)
    #[serde(default)]
    pub block_comment: Option<BlockComment>,

    /// Quote of single-character literals that is not a string delimiter,
    /// such as Rust's `'x'` next to lifetimes like `'a`
    #[serde(default)]
    pub char_literal: Option<char>,
}

fn default_escape() -> Option<char> {
    Some('\\')
}

impl SyntaxTable {
    fn new(delimiters: &str, line_comment: Option<&str>, block: Option<(&str, &str)>) -> Self {
        Self {
            string_delimiters: delimiters.chars().collect(),
            escape: default_escape(),
            line_comment: line_comment.map(str::to_string),
            block_comment: block.map(|(open, close)| BlockComment::new(open, close)),
            char_literal: None,
        }
    }

    fn with_char_literal(mut self, quote: char) -> Self {
        self.char_literal = Some(quote);
        self
    }

    /// Built-in table for a language identifier
    pub fn builtin(language: &str) -> Option<Self> {
        let c_like = Some(("/*", "*/"));
        let table = match language {
            "rust" => Self::new("\"", Some("//"), c_like).with_char_literal('\''),
            "c" | "cpp" | "java" | "csharp" | "kotlin" | "scala" | "swift" => {
                Self::new("\"'", Some("//"), c_like)
            }
            "go" => Self::new("\"'`", Some("//"), c_like),
            "javascript" | "typescript" | "javascriptreact" | "typescriptreact" => {
                Self::new("\"'`", Some("//"), c_like)
            }
            "php" => Self::new("\"'", Some("//"), c_like),
            "css" => Self::new("\"'", None, c_like),
            "python" | "ruby" | "bash" | "yaml" | "toml" => Self::new("\"'", Some("#"), None),
            "lua" => Self::new("\"'", Some("--"), None),
            "sql" => Self::new("'\"", Some("--"), c_like),
            "haskell" => Self::new("\"", Some("--"), Some(("{-", "-}"))),
            "html" | "xml" => Self::new("\"'", None, Some(("<!--", "-->"))),
            "json" => Self::new("\"", None, None),
            _ => return None,
        };
        Some(table)
    }

    pub fn is_string_delimiter(&self, ch: char) -> bool {
        self.string_delimiters.contains(&ch)
    }
}

/// Syntax tables by language identifier
///
/// Built-in tables cover common languages; configured tables take precedence.
#[derive(Debug, Clone)]
pub struct SyntaxTables {
    overrides: HashMap<String, SyntaxTable>,
    builtins: HashMap<String, SyntaxTable>,
}

impl SyntaxTables {
    pub fn new(overrides: HashMap<String, SyntaxTable>) -> Self {
        const BUILTIN_LANGUAGES: [&str; 26] = [
            "rust",
            "c",
            "cpp",
            "java",
            "csharp",
            "kotlin",
            "scala",
            "swift",
            "go",
            "javascript",
            "typescript",
            "javascriptreact",
            "typescriptreact",
            "php",
            "css",
            "python",
            "ruby",
            "bash",
            "yaml",
            "toml",
            "lua",
            "sql",
            "haskell",
            "html",
            "xml",
            "json",
        ];

        let builtins = BUILTIN_LANGUAGES
            .iter()
            .filter_map(|lang| SyntaxTable::builtin(lang).map(|t| (lang.to_string(), t)))
            .collect();

        Self {
            overrides,
            builtins,
        }
    }

    pub fn get(&self, language: &str) -> Option<&SyntaxTable> {
        self.overrides
            .get(language)
            .or_else(|| self.builtins.get(language))
    }
}

impl Default for SyntaxTables {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}
