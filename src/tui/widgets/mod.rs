//! TUI Widgets - Reusable chat components
//!
//! Each widget borrows its state and the theme; stateful parts (message
//! list, input, disclosure states) live in plain structs owned by the
//! chat window.

pub mod disclosure;
mod header;
pub mod markdown;
mod message_bubble;
mod message_input;
mod message_list;
mod rich_content;

pub use disclosure::{Disclosure, DisclosureKey, DisclosureState, DisclosureStates};
pub use header::Header;
pub use markdown::{lines_to_strings, render_markdown, wrap_lines};
pub use message_bubble::{BubbleLayout, MessageBubble, FAILED_NOTE, MAX_BUBBLE_PERCENT};
pub use message_input::{
    InputOutcome, MessageInput, MessageInputState, DEFAULT_MAX_LINES, DEFAULT_PLACEHOLDER,
};
pub use message_list::{MessageList, MessageListWidget, DEFAULT_USER_NAME, EMPTY_PLACEHOLDER};
pub use rich_content::{DisclosureTarget, RenderedContent, RichContent};
