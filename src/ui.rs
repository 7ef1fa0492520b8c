pub mod editor;
pub mod status_bar;

pub use editor::{EditorWidget, gutter_width};
pub use status_bar::{JumpIndicator, StatusBar};
