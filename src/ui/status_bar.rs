use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::document::DocumentBuffer;

/// Jump mode state shown in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpIndicator {
    pub active: bool,
    /// The document overrides the global setting
    pub local: bool,
}

impl JumpIndicator {
    pub fn label(&self) -> String {
        let state = if self.active { "JUMP" } else { "jump off" };
        if self.local {
            format!(" {state} (local) ")
        } else {
            format!(" {state} ")
        }
    }

    fn style(&self) -> Style {
        if self.active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray).bg(Color::Black)
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    buffer: &'a DocumentBuffer,
    jump: Option<JumpIndicator>,
    /// (current, total) open documents
    documents: Option<(usize, usize)>,
    message: Option<&'a str>,
    warning_message: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(buffer: &'a DocumentBuffer) -> Self {
        Self {
            buffer,
            jump: None,
            documents: None,
            message: None,
            warning_message: None,
        }
    }

    pub fn with_jump(mut self, jump: JumpIndicator) -> Self {
        self.jump = Some(jump);
        self
    }

    pub fn with_documents(mut self, current: usize, total: usize) -> Self {
        if total > 1 {
            self.documents = Some((current, total));
        }
        self
    }

    pub fn with_message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    pub fn with_warning(mut self, message: &'a str) -> Self {
        self.warning_message = Some(message);
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(warning) = self.warning_message {
            let warning_line = Line::from(vec![Span::styled(
                format!(" ⚠ {} ", warning),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )]);
            let paragraph = Paragraph::new(warning_line).block(Block::default().bg(Color::Yellow));
            paragraph.render(area, buf);
            return;
        }

        let file_name = self
            .buffer
            .file_path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]");

        let modified = if self.buffer.is_modified() {
            " [+]"
        } else {
            ""
        };

        let document_count = self
            .documents
            .map(|(current, total)| format!(" ({}/{})", current + 1, total))
            .unwrap_or_default();

        let file_section = format!(" {}{}{} ", file_name, modified, document_count);
        let jump_section = self.jump.map(|j| j.label()).unwrap_or_default();
        let message = self.message.map(|m| format!(" {m} ")).unwrap_or_default();
        let file_type = format!(" {} ", self.buffer.file_type().display_name());

        let cursor = self.buffer.position();
        let position = format!(" Ln {}, Col {} ", cursor.line + 1, cursor.column + 1);
        let separator = "│";

        let used_width = file_section.width()
            + jump_section.width()
            + message.width()
            + file_type.width()
            + separator.width()
            + position.width();
        let padding = (area.width as usize).saturating_sub(used_width);

        let mut spans = vec![Span::styled(
            file_section,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];

        if let Some(jump) = self.jump {
            spans.push(Span::styled(jump_section, jump.style()));
        }

        spans.push(Span::styled(
            message,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            " ".repeat(padding),
            Style::default().bg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            file_type,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            separator,
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            position,
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));

        let paragraph = Paragraph::new(Line::from(spans)).block(Block::default().bg(Color::DarkGray));
        paragraph.render(area, buf);
    }
}
