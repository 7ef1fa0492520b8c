pub mod code;
pub mod plain_text;

use crate::document::DocumentBuffer;
pub use code::CodeRenderer;
pub use plain_text::PlainTextRenderer;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

/// Trait for rendering document lines
///
/// Implementors provide rendering for a family of file types (code with
/// syntax highlighting, plain text, ...).
pub trait Renderer {
    /// Render a single zero-based line of `buffer` into styled spans
    fn render_line(&self, buffer: &DocumentBuffer, line_idx: usize) -> Vec<Span<'_>>;
}

/// Expand tabs starting at display column `start`; returns the text and end column
fn expand_tabs_from(content: &str, start: usize, tab_width: usize) -> (String, usize) {
    let tab_width = tab_width.max(1);
    let mut out = String::with_capacity(content.len());
    let mut col = start;

    for ch in content.chars() {
        if ch == '\t' {
            let pad = tab_width - col % tab_width;
            out.extend(std::iter::repeat_n(' ', pad));
            col += pad;
        } else {
            out.push(ch);
            col += ch.width().unwrap_or(0);
        }
    }

    (out, col)
}

/// Replace tab characters with spaces up to the next tab stop
pub fn expand_tabs(content: &str, tab_width: usize) -> String {
    expand_tabs_from(content, 0, tab_width).0
}

/// Display width of `content` with tabs expanded
pub fn display_width(content: &str, tab_width: usize) -> usize {
    expand_tabs_from(content, 0, tab_width).1
}

/// Expand tabs across styled spans so tab stops line up over span boundaries
pub fn expand_span_tabs(spans: Vec<Span<'_>>, tab_width: usize) -> Vec<Span<'_>> {
    let mut col = 0;
    spans
        .into_iter()
        .map(|span| {
            let (text, end) = expand_tabs_from(&span.content, col, tab_width);
            col = end;
            Span::styled(text, span.style)
        })
        .collect()
}
