use tab_jump_core::Position;

/// Editor cursor: a document position plus the sticky column
///
/// Horizontal moves reset the sticky column; vertical moves try to return to
/// it, so walking through a short line does not lose the original column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    position: Position,
    desired_column: usize,
}

impl Cursor {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            desired_column: position.column,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    pub fn desired_column(&self) -> usize {
        self.desired_column
    }

    /// Move within the line; the new column becomes sticky
    pub fn set_column(&mut self, column: usize) {
        self.position.column = column;
        self.desired_column = column;
    }

    /// Move to `line`, landing on the sticky column clamped to `line_len`
    pub fn set_line(&mut self, line: usize, line_len: usize) {
        self.position = Position::new(line, self.desired_column.min(line_len));
    }
}

impl From<Cursor> for Position {
    fn from(cursor: Cursor) -> Self {
        cursor.position
    }
}

/// Cursor movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMovement {
    Up,
    Down,
    Left,
    Right,
    StartOfLine,
    EndOfLine,
    PageUp,
    PageDown,
    StartOfDocument,
    EndOfDocument,
}
