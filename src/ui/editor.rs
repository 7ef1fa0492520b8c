use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::document::DocumentBuffer;
use crate::renderer::{CodeRenderer, PlainTextRenderer, Renderer};

/// Editor widget for rendering the document
pub struct EditorWidget<'a> {
    buffer: &'a DocumentBuffer,
    scroll_offset: usize,
    code_renderer: Option<&'a CodeRenderer>,
    plain_renderer: PlainTextRenderer,
    show_line_numbers: bool,
    show_current_line_highlight: bool,
}

impl<'a> EditorWidget<'a> {
    pub fn new(buffer: &'a DocumentBuffer) -> Self {
        Self {
            buffer,
            scroll_offset: 0,
            code_renderer: None,
            plain_renderer: PlainTextRenderer::default(),
            show_line_numbers: true,
            show_current_line_highlight: true,
        }
    }

    pub fn with_line_numbers(mut self, show: bool) -> Self {
        self.show_line_numbers = show;
        self
    }

    pub fn with_current_line_highlight(mut self, show: bool) -> Self {
        self.show_current_line_highlight = show;
        self
    }

    pub fn with_scroll(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    pub fn with_code_renderer(mut self, renderer: &'a CodeRenderer) -> Self {
        self.code_renderer = Some(renderer);
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.plain_renderer = PlainTextRenderer::new(tab_width);
        self
    }

    /// Calculate visible line range based on viewport
    fn visible_range(&self, height: usize) -> (usize, usize) {
        let start = self.scroll_offset;
        let end = (start + height).min(self.buffer.line_count());
        (start, end)
    }

    fn make_line_number_span(
        &self,
        line_idx: usize,
        width: usize,
        is_current: bool,
    ) -> Span<'static> {
        let formatted = format!("{:>width$} │ ", line_idx + 1, width = width);
        let style = if is_current {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(formatted, style)
    }

    fn renderer(&self) -> &dyn Renderer {
        match self.code_renderer {
            Some(code) if code.supports(self.buffer) => code,
            _ => &self.plain_renderer,
        }
    }
}

/// Digits needed for the largest line number, at least 3
pub fn line_number_width(line_count: usize) -> usize {
    line_count.max(1).to_string().len().max(3)
}

/// Width of the line number gutter including the ` │ ` separator
pub fn gutter_width(line_count: usize, show_line_numbers: bool) -> u16 {
    if show_line_numbers {
        (line_number_width(line_count) + 3) as u16
    } else {
        0
    }
}

impl Widget for EditorWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (start, end) = self.visible_range(area.height as usize);
        let cursor_line = self.buffer.cursor().line();
        let line_num_width = line_number_width(self.buffer.line_count());
        let renderer = self.renderer();

        let lines: Vec<Line> = (start..end)
            .map(|line_idx| {
                let is_current = line_idx == cursor_line;
                let mut spans = Vec::new();

                if self.show_line_numbers {
                    spans.push(self.make_line_number_span(line_idx, line_num_width, is_current));
                }
                spans.extend(renderer.render_line(self.buffer, line_idx));

                if is_current && self.show_current_line_highlight {
                    Line::from(spans).style(Style::default().bg(Color::DarkGray))
                } else {
                    Line::from(spans)
                }
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::NONE))
            .style(Style::default().fg(Color::White).bg(Color::Black));

        paragraph.render(area, buf);
    }
}
