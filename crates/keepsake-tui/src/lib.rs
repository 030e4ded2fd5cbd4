pub mod animation;
pub mod app;
pub mod content;
pub mod event;
pub mod input;
pub mod keymap;
pub mod surface;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use surface::TerminalSurface;
pub use theme::{load_theme, Theme};
