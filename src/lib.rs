pub mod app;
pub mod check;
pub mod config;
pub mod document;
pub mod keymap;
pub mod logging;
pub mod mode;
pub mod renderer;
pub mod syntax;
pub mod ui;

pub use app::App;
pub use config::Config;
