use ratatui::{style::Style, text::Span};

use super::{Renderer, expand_tabs};
use crate::document::DocumentBuffer;

/// Plain text renderer (no highlighting)
///
/// Used for plain text, Markdown and any language syntect does not know.
pub struct PlainTextRenderer {
    tab_width: usize,
}

impl PlainTextRenderer {
    pub fn new(tab_width: usize) -> Self {
        Self { tab_width }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Renderer for PlainTextRenderer {
    fn render_line(&self, buffer: &DocumentBuffer, line_idx: usize) -> Vec<Span<'_>> {
        let content = buffer.line(line_idx).unwrap_or("");
        vec![Span::styled(
            expand_tabs(content, self.tab_width),
            Style::default(),
        )]
    }
}
