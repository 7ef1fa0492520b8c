pub mod buffer;
pub mod cursor;
pub mod file_type;

pub use buffer::DocumentBuffer;
pub use cursor::{Cursor, CursorMovement};
pub use file_type::FileType;

/// Stable identifier of an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);
