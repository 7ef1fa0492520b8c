use std::sync::Arc;

use ratatui::{
    style::{Color, Style},
    text::Span,
};
use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
};

use super::{Renderer, expand_span_tabs, expand_tabs};
use crate::document::DocumentBuffer;

/// Code renderer with syntect syntax highlighting
///
/// Shares its `SyntaxSet` with the jump evaluator's scope-based context so
/// the grammar is loaded once.
pub struct CodeRenderer {
    syntax_set: Arc<SyntaxSet>,
    /// Theme for syntax highlighting
    theme: Theme,
    tab_width: usize,
}

impl CodeRenderer {
    pub fn new(syntax_set: Arc<SyntaxSet>) -> Self {
        Self::with_theme(syntax_set, "base16-ocean.dark")
    }

    /// Create a new code renderer with specified theme
    pub fn with_theme(syntax_set: Arc<SyntaxSet>, theme_name: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get(theme_name)
            .or_else(|| theme_set.themes.get("base16-ocean.dark"))
            .or_else(|| theme_set.themes.values().next())
            .cloned()
            .unwrap_or_default();

        Self {
            syntax_set,
            theme,
            tab_width: 4,
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Get list of available theme names
    pub fn available_themes() -> Vec<String> {
        let theme_set = ThemeSet::load_defaults();
        let mut themes: Vec<String> = theme_set.themes.keys().cloned().collect();
        themes.sort();
        themes
    }

    fn get_syntax(&self, token: &str) -> Option<&SyntaxReference> {
        self.syntax_set.find_syntax_by_token(token)
    }

    /// Whether syntect has a grammar for the buffer's language
    pub fn supports(&self, buffer: &DocumentBuffer) -> bool {
        buffer
            .file_type()
            .syntect_token()
            .and_then(|token| self.get_syntax(token))
            .is_some()
    }

    fn render_with_syntect(&self, content: &str, syntax: &SyntaxReference) -> Vec<Span<'_>> {
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        match highlighter.highlight_line(content, &self.syntax_set) {
            Ok(regions) => {
                let spans = regions
                    .iter()
                    .map(|(style, text)| {
                        let fg_color =
                            Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                        Span::styled(text.to_string(), Style::default().fg(fg_color))
                    })
                    .collect();
                expand_span_tabs(spans, self.tab_width)
            }
            Err(e) => {
                tracing::debug!(error = %e, syntax = %syntax.name, "highlighting failed");
                vec![Span::raw(expand_tabs(content, self.tab_width))]
            }
        }
    }
}

impl Renderer for CodeRenderer {
    fn render_line(&self, buffer: &DocumentBuffer, line_idx: usize) -> Vec<Span<'_>> {
        let content = buffer.line(line_idx).unwrap_or("");

        match buffer
            .file_type()
            .syntect_token()
            .and_then(|token| self.get_syntax(token))
        {
            Some(syntax) => self.render_with_syntect(content, syntax),
            None => vec![Span::raw(expand_tabs(content, self.tab_width))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileType;

    fn renderer() -> CodeRenderer {
        CodeRenderer::new(Arc::new(SyntaxSet::load_defaults_newlines()))
    }

    #[test]
    fn test_available_themes() {
        let themes = CodeRenderer::available_themes();
        assert!(themes.contains(&"base16-ocean.dark".to_string()));
        assert!(themes.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let syntax_set = Arc::new(SyntaxSet::load_defaults_newlines());
        let fallback = CodeRenderer::new(Arc::clone(&syntax_set));
        let unknown = CodeRenderer::with_theme(syntax_set, "no-such-theme");
        assert_eq!(unknown.theme.name, fallback.theme.name);
    }

    #[test]
    fn test_render_rust_line() {
        let renderer = renderer();
        let buffer = DocumentBuffer::from_string("fn main() {}")
            .with_file_type(FileType::Code("rust".into()));

        assert!(renderer.supports(&buffer));
        let spans = renderer.render_line(&buffer, 0);
        assert!(spans.len() > 1);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "fn main() {}");
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let renderer = renderer();
        let buffer = DocumentBuffer::from_string("\tplain");

        assert!(!renderer.supports(&buffer));
        let spans = renderer.render_line(&buffer, 0);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "    plain");
    }
}
