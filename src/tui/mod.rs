//! Terminal user interface
//!
//! The chat window and its widgets, rendered with ratatui on a crossterm
//! backend. `app` wires a window to a simulated assistant for the `chat`
//! command.

pub mod app;
pub mod chat_window;
pub mod events;
pub mod theme;
pub mod widgets;

pub use app::TuiApp;
pub use chat_window::{ChatWindow, ChatWindowOptions, ChatWindowWidget, Focus, FrameStyle, WindowEvent};
pub use events::{Event, EventHandler};
pub use theme::{Theme, ThemePreset};
