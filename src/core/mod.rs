//! Core domain modules
//!
//! Chat types and error enums shared by the widgets and the host
//! application.

pub mod errors;
pub mod types;

pub use errors::{ConfigError, MessageListError};
pub use types::{ChatMessage, ChatUser, MessageUpdate};
