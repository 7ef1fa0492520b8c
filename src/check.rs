use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tab_jump_core::Decision;

use crate::app::App;
use crate::config::Config;

/// Jump decision for one position of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// Character after the cursor, if any
    pub char: Option<char>,
    pub language: String,
    #[serde(flatten)]
    pub decision: Decision,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.decision.is_jump() {
            "jump"
        } else {
            "fallback"
        };
        let ch = self
            .char
            .map(|c| format!("{c:?}"))
            .unwrap_or_else(|| "end of line".to_string());

        write!(
            f,
            "{}:{}:{} {} ({}): {} [{:?}]",
            self.file.display(),
            self.line,
            self.column,
            ch,
            self.language,
            action,
            self.decision.reason()
        )
    }
}

/// Evaluate the jump decision at a 1-based `line` and `column` of `path`
pub fn check_position(
    config: Config,
    path: impl AsRef<Path>,
    line: usize,
    column: usize,
) -> miette::Result<CheckReport> {
    let path = path.as_ref();
    let mut app = App::with_files(config, &[path])?;

    let line_count = app.buffer().line_count();
    if line == 0 || line > line_count {
        return Err(miette::miette!(
            "Line {} is out of range (file has {} lines)",
            line,
            line_count
        ));
    }

    let line_len = app
        .buffer()
        .line(line - 1)
        .map(|l| l.chars().count())
        .unwrap_or(0);
    if column == 0 || column > line_len + 1 {
        return Err(miette::miette!(
            "Column {} is out of range (line {} has {} characters)",
            column,
            line,
            line_len
        ));
    }

    app.buffer_mut().set_cursor(line - 1, column - 1);
    let decision = app.jump_decision();
    let buffer = app.buffer();

    Ok(CheckReport {
        file: path.to_path_buf(),
        line,
        column,
        char: buffer.char_at_cursor(),
        language: buffer.file_type().display_name().to_string(),
        decision,
    })
}
