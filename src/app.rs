use std::path::Path;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use miette::Result;
use syntect::parsing::SyntaxSet;
use tab_jump_core::{Decision, JumpOut};

use crate::config::Config;
use crate::document::{CursorMovement, DocumentBuffer, DocumentId};
use crate::keymap::{Command, KeyChord, Keymap, Layer};
use crate::mode::JumpMode;
use crate::renderer::CodeRenderer;
use crate::syntax::{self, ParseCache, SyntaxTables};
use crate::ui::{JumpIndicator, gutter_width};

/// An open document and its view state
struct Document {
    id: DocumentId,
    buffer: DocumentBuffer,
    parse_cache: ParseCache,
    scroll_offset: usize,
}

/// Main application state
pub struct App {
    /// Open documents, never empty
    documents: Vec<Document>,
    /// Index of the focused document
    current: usize,
    next_id: u64,
    config: Config,
    keymap: Keymap,
    jump_mode: JumpMode,
    jump_out: JumpOut,
    syntax_tables: SyntaxTables,
    /// Grammar set shared by the renderer and the scope-based syntax context
    syntax_set: Arc<SyntaxSet>,
    code_renderer: CodeRenderer,
    status_message: Option<String>,
    show_quit_dialog: bool,
    should_quit: bool,
    viewport_height: usize,
}

impl App {
    /// Create an app with one empty buffer
    pub fn new(config: Config) -> Result<Self> {
        let keymap = Keymap::from_config(&config.keybindings, config.editor.tab_action)
            .map_err(|e| miette::miette!("Invalid keybinding: {}", e))?;
        let syntax_set = Arc::new(SyntaxSet::load_defaults_newlines());
        let code_renderer = CodeRenderer::with_theme(Arc::clone(&syntax_set), &config.editor.theme)
            .with_tab_width(config.editor.tab_width);

        let mut app = Self {
            documents: Vec::new(),
            current: 0,
            next_id: 0,
            keymap,
            jump_mode: JumpMode::new(config.jump.enabled),
            jump_out: JumpOut::new(config.jump.chars.clone()),
            syntax_tables: SyntaxTables::new(config.languages.clone()),
            syntax_set,
            code_renderer,
            config,
            status_message: None,
            show_quit_dialog: false,
            should_quit: false,
            viewport_height: 20,
        };
        app.open_buffer(DocumentBuffer::new());

        Ok(app)
    }

    /// Create an app with the given files open, the first one focused
    pub fn with_files<P: AsRef<Path>>(config: Config, paths: &[P]) -> Result<Self> {
        let mut app = Self::new(config)?;
        if paths.is_empty() {
            return Ok(app);
        }

        app.documents.clear();
        for path in paths {
            app.open_file(path)?;
        }
        app.current = 0;

        Ok(app)
    }

    /// Open a file in a new document and focus it
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<DocumentId> {
        let buffer = DocumentBuffer::from_file(path.as_ref())?;
        tracing::info!(
            path = %path.as_ref().display(),
            file_type = buffer.file_type().display_name(),
            "opened document"
        );
        Ok(self.open_buffer(buffer))
    }

    /// Add a buffer as a new document and focus it
    pub fn open_buffer(&mut self, buffer: DocumentBuffer) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.documents.push(Document {
            id,
            buffer,
            parse_cache: ParseCache::default(),
            scroll_offset: 0,
        });
        self.current = self.documents.len() - 1;
        id
    }

    fn document(&self) -> &Document {
        &self.documents[self.current]
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.documents[self.current]
    }

    /// Get the focused document buffer
    pub fn buffer(&self) -> &DocumentBuffer {
        &self.document().buffer
    }

    /// Get mutable focused document buffer
    pub fn buffer_mut(&mut self) -> &mut DocumentBuffer {
        &mut self.document_mut().buffer
    }

    pub fn current_id(&self) -> DocumentId {
        self.document().id
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn code_renderer(&self) -> &CodeRenderer {
        &self.code_renderer
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn show_quit_dialog(&self) -> bool {
        self.show_quit_dialog
    }

    pub fn scroll_offset(&self) -> usize {
        self.document().scroll_offset
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.adjust_scroll();
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn line_number_gutter_width(&self) -> u16 {
        gutter_width(self.buffer().line_count(), self.config.editor.show_line_numbers)
    }

    /// Whether jump mode is active for the focused document
    pub fn jump_active(&self) -> bool {
        self.jump_mode.is_active(self.current_id())
    }

    pub fn jump_indicator(&self) -> JumpIndicator {
        let id = self.current_id();
        JumpIndicator {
            active: self.jump_mode.is_active(id),
            local: self.jump_mode.has_override(id),
        }
    }

    /// Evaluate the jump decision for the character after the cursor
    pub fn jump_decision(&mut self) -> Decision {
        let Document {
            buffer,
            parse_cache,
            ..
        } = &mut self.documents[self.current];
        if let Some(line) = buffer.take_edited_from() {
            parse_cache.invalidate_from(line);
        }

        let buffer = &*buffer;
        let ctx = syntax::context_for(
            buffer,
            parse_cache,
            &self.syntax_tables,
            &self.syntax_set,
            self.config.jump.engine,
        );
        self.jump_out
            .decide(buffer.char_at_cursor(), ctx.as_ref(), buffer.position())
    }

    fn layer_enabled(&self, layer: Layer) -> bool {
        match layer {
            Layer::Base => true,
            Layer::JumpOut => self.jump_active(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        self.clear_status_message();

        if self.show_quit_dialog {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.should_quit = true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.show_quit_dialog = false;
                }
                _ => {}
            }
            return Ok(());
        }

        let chord = KeyChord::from_event(&key);
        if let Some((layer, command)) = self.keymap.resolve(&chord, |l| self.layer_enabled(l)) {
            return self.run_command(layer, command, &chord);
        }

        // Navigation and editing keys (not configurable)
        match key.code {
            KeyCode::Up => self.move_cursor(CursorMovement::Up),
            KeyCode::Down => self.move_cursor(CursorMovement::Down),
            KeyCode::Left => self.move_cursor(CursorMovement::Left),
            KeyCode::Right => self.move_cursor(CursorMovement::Right),
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_cursor(CursorMovement::StartOfDocument)
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_cursor(CursorMovement::EndOfDocument)
            }
            KeyCode::Home => self.move_cursor(CursorMovement::StartOfLine),
            KeyCode::End => self.move_cursor(CursorMovement::EndOfLine),
            KeyCode::PageUp => self.move_cursor(CursorMovement::PageUp),
            KeyCode::PageDown => self.move_cursor(CursorMovement::PageDown),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.buffer_mut().insert_char(c);
            }
            KeyCode::Enter => {
                self.buffer_mut().insert_newline();
                self.adjust_scroll();
            }
            KeyCode::Backspace => {
                self.buffer_mut().delete_char();
                self.adjust_scroll();
            }
            KeyCode::Tab => self.run_command(Layer::Base, Command::InsertTab, &chord)?,
            _ => {}
        }

        Ok(())
    }

    /// Handle paste event (clipboard paste and IME input)
    pub fn handle_paste(&mut self, text: &str) {
        self.buffer_mut().insert_str(text);
        self.adjust_scroll();
    }

    fn run_command(&mut self, layer: Layer, command: Command, chord: &KeyChord) -> Result<()> {
        match command {
            Command::JumpOut => return self.jump_out(layer, chord),
            Command::InsertTab => {
                let (width, spaces) = (self.config.editor.tab_width, self.config.editor.insert_spaces);
                self.buffer_mut().insert_tab(width, spaces);
            }
            Command::IndentLine => {
                let (width, spaces) = (self.config.editor.tab_width, self.config.editor.insert_spaces);
                self.buffer_mut().indent_line(width, spaces);
            }
            Command::Quit => {
                if self.documents.iter().any(|d| d.buffer.is_modified()) {
                    self.show_quit_dialog = true;
                } else {
                    self.should_quit = true;
                }
            }
            Command::Save => self.save(),
            Command::ToggleJump => {
                let active = self.jump_mode.toggle_local(self.current_id());
                self.set_status_message(format!(
                    "Jump mode {} for this document",
                    if active { "on" } else { "off" }
                ));
            }
            Command::ToggleJumpGlobal => {
                let active = self.jump_mode.toggle_global();
                self.set_status_message(format!(
                    "Jump mode {} for all documents",
                    if active { "on" } else { "off" }
                ));
            }
            Command::NextDocument => self.switch_document(1),
            Command::PreviousDocument => self.switch_document(self.documents.len() - 1),
        }
        Ok(())
    }

    /// Step over the character after the cursor, or run the binding below `layer`
    fn jump_out(&mut self, layer: Layer, chord: &KeyChord) -> Result<()> {
        let decision = self.jump_decision();

        if decision.is_jump() {
            tracing::debug!(reason = ?decision.reason(), position = ?self.buffer().position(), "jumped out");
            self.move_cursor(CursorMovement::Right);
            return Ok(());
        }

        match self.keymap.resolve_below(layer, chord, |l| self.layer_enabled(l)) {
            Some((below, command)) => {
                tracing::debug!(reason = ?decision.reason(), ?command, "jump declined, falling back");
                self.run_command(below, command, chord)
            }
            None => {
                tracing::debug!(reason = ?decision.reason(), "jump declined, no fallback bound");
                Ok(())
            }
        }
    }

    fn save(&mut self) {
        if self.buffer().file_path().is_none() {
            self.set_status_message("No file name; open a file to save".to_string());
            return;
        }

        match self.buffer_mut().save() {
            Ok(()) => self.set_status_message("File saved successfully.".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.set_status_message(format!("Error saving file: {}", e));
            }
        }
    }

    fn switch_document(&mut self, step: usize) {
        if self.documents.len() > 1 {
            self.current = (self.current + step) % self.documents.len();
        }
    }

    fn move_cursor(&mut self, movement: CursorMovement) {
        self.buffer_mut().move_cursor(movement);
        self.adjust_scroll();
    }

    /// Adjust scroll offset to keep cursor visible
    fn adjust_scroll(&mut self) {
        let viewport_height = self.viewport_height;
        let document = self.document_mut();
        let cursor_line = document.buffer.cursor().line();

        if cursor_line >= document.scroll_offset + viewport_height {
            document.scroll_offset = cursor_line + 1 - viewport_height;
        }
        if cursor_line < document.scroll_offset {
            document.scroll_offset = cursor_line;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TabAction;
    use crate::document::FileType;
    use crate::syntax::SyntaxEngine;
    use tab_jump_core::Reason;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(text: &str, file_type: FileType, config: Config) -> App {
        let mut app = App::new(config).unwrap();
        *app.buffer_mut() = DocumentBuffer::from_string(text).with_file_type(file_type);
        app
    }

    fn rust_app(text: &str) -> App {
        app_with(text, FileType::Code("rust".into()), Config::default())
    }

    #[test]
    fn test_tab_jumps_over_closing_paren() {
        let mut app = rust_app("foo(x)");
        app.buffer_mut().set_cursor(0, 5);

        app.handle_key(key(KeyCode::Tab)).unwrap();

        assert_eq!(app.buffer().cursor().column(), 6);
        assert_eq!(app.buffer().line(0), Some("foo(x)"));
        assert!(!app.buffer().is_modified());
    }

    #[test]
    fn test_tab_falls_back_on_opening_quote() {
        let mut app = rust_app(r#"let s = "";"#);
        app.buffer_mut().set_cursor(0, 8);

        assert_eq!(app.jump_decision(), Decision::Fallback(Reason::OpeningQuote));
        app.handle_key(key(KeyCode::Tab)).unwrap();

        // Default fallback inserts spaces up to the next tab stop
        assert_eq!(app.buffer().line(0), Some(r#"let s = "";"#.replacen("= ", "=     ", 1).as_str()));
        assert_eq!(app.buffer().cursor().column(), 12);
    }

    #[test]
    fn test_tab_jumps_over_closing_quote() {
        let mut app = rust_app(r#"let s = "hello";"#);
        app.buffer_mut().set_cursor(0, 14);

        assert_eq!(app.jump_decision(), Decision::Jump(Reason::InsideString));
        app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(app.buffer().cursor().column(), 15);
    }

    #[test]
    fn test_plain_text_quote_jumps() {
        let mut app = app_with("say \"hi\"", FileType::PlainText, Config::default());
        app.buffer_mut().set_cursor(0, 4);

        assert_eq!(app.jump_decision(), Decision::Jump(Reason::NoStringSyntax));
        app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(app.buffer().cursor().column(), 5);
    }

    #[test]
    fn test_end_of_line_falls_back_to_indent() {
        let mut config = Config::default();
        config.editor.tab_action = TabAction::IndentLine;
        let mut app = app_with("fn f() {\nx", FileType::Code("rust".into()), config);
        app.buffer_mut().set_cursor(1, 1);

        assert_eq!(app.jump_decision(), Decision::Fallback(Reason::EndOfLine));
        app.handle_key(key(KeyCode::Tab)).unwrap();

        assert_eq!(app.buffer().line(1), Some("    x"));
        assert_eq!(app.buffer().cursor().column(), 5);
    }

    #[test]
    fn test_disabled_mode_uses_base_binding() {
        let mut config = Config::default();
        config.jump.enabled = false;
        let mut app = app_with("f()", FileType::Code("rust".into()), config);
        app.buffer_mut().set_cursor(0, 2);

        app.handle_key(key(KeyCode::Tab)).unwrap();

        assert_eq!(app.buffer().line(0), Some("f(  )"));
        assert_eq!(app.buffer().cursor().column(), 4);
    }

    #[test]
    fn test_toggle_local_and_global() {
        let mut app = rust_app("()");
        let first = app.current_id();
        let second = app.open_buffer(DocumentBuffer::from_string("()"));
        assert_eq!(app.current_id(), second);

        let alt_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::ALT);
        app.handle_key(alt_j).unwrap();
        assert!(!app.jump_active());
        assert_eq!(app.status_message(), Some("Jump mode off for this document"));
        assert!(app.jump_indicator().local);

        app.handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(app.current_id(), first);
        assert!(app.jump_active());

        // Global toggle clears the local override of the second document
        let alt_shift_j = KeyEvent::new(KeyCode::Char('J'), KeyModifiers::ALT | KeyModifiers::SHIFT);
        app.handle_key(alt_shift_j).unwrap();
        app.handle_key(alt_shift_j).unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(app.current_id(), second);
        assert!(app.jump_active());
        assert!(!app.jump_indicator().local);
    }

    #[test]
    fn test_scan_engine_comment_quote_jumps() {
        let mut config = Config::default();
        config.jump.engine = SyntaxEngine::Scan;
        let mut app = app_with("// say \"hi\"", FileType::Code("rust".into()), config);
        app.buffer_mut().set_cursor(0, 7);

        assert_eq!(app.jump_decision(), Decision::Jump(Reason::InsideComment));
    }

    #[test]
    fn test_typing_and_quit_flow() {
        let mut app = rust_app("");
        app.handle_key(key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.buffer().line(0), Some("a"));

        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.show_quit_dialog());
        assert!(!app.should_quit());

        app.handle_key(key(KeyCode::Char('n'))).unwrap();
        assert!(!app.show_quit_dialog());

        app.handle_key(key(KeyCode::Esc)).unwrap();
        app.handle_key(key(KeyCode::Char('y'))).unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.rs");
        std::fs::write(&path, "fn main() {}\n").unwrap();

        let mut app = App::with_files(Config::default(), &[&path]).unwrap();
        assert_eq!(app.document_count(), 1);
        app.handle_key(key(KeyCode::Char('x'))).unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();

        assert_eq!(app.status_message(), Some("File saved successfully."));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "xfn main() {}\n");
    }

    #[test]
    fn test_decision_follows_edits_above_cursor() {
        let mut app = rust_app("let a = 1;\nlet s = \"\";");
        app.buffer_mut().set_cursor(1, 8);
        assert_eq!(app.jump_decision(), Decision::Fallback(Reason::OpeningQuote));

        app.buffer_mut().set_cursor(0, 8);
        app.handle_key(key(KeyCode::Char('"'))).unwrap();
        app.buffer_mut().set_cursor(1, 8);
        assert_eq!(app.jump_decision(), Decision::Jump(Reason::InsideString));

        app.buffer_mut().set_cursor(0, 9);
        app.handle_key(key(KeyCode::Backspace)).unwrap();
        app.buffer_mut().set_cursor(1, 8);
        assert_eq!(app.jump_decision(), Decision::Fallback(Reason::OpeningQuote));
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut app = app_with(&text, FileType::PlainText, Config::default());
        app.set_viewport_height(10);

        for _ in 0..15 {
            app.handle_key(key(KeyCode::Down)).unwrap();
        }
        assert_eq!(app.scroll_offset(), 6);

        for _ in 0..15 {
            app.handle_key(key(KeyCode::Up)).unwrap();
        }
        assert_eq!(app.scroll_offset(), 0);
    }

    #[test]
    fn test_invalid_keybinding_is_an_error() {
        let mut config = Config::default();
        config.keybindings.advance.code = "hyper-tab".to_string();
        assert!(App::new(config).is_err());
    }
}
