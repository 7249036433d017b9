//! chat-window: a terminal chat window component
//!
//! This library provides:
//! - A line-oriented segment extractor for `<tag attr="...">` annotations
//! - A content router mapping segments to markdown and disclosure blocks
//! - Chat widgets (message list, bubbles, input) built on ratatui
//! - A demo application with a simulated assistant

pub mod config;
pub mod content;
pub mod core;
pub mod tui;

pub use config::Config;
pub use content::{extract, AnnotationSegment, ContentRouter, RenderBlock, Segment, TextSegment};
pub use core::{ChatMessage, ChatUser, MessageUpdate};
pub use tui::{ChatWindow, ChatWindowOptions};
