//! Header Widget
//!
//! Displays the chat title and the number of messages

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Header widget showing the window title
pub struct Header<'a> {
    title: &'a str,
    message_count: usize,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(title: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            message_count: 0,
            theme,
        }
    }

    /// Set the message count shown after the title
    pub fn message_count(mut self, count: usize) -> Self {
        self.message_count = count;
        self
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let count = match self.message_count {
            0 => String::new(),
            1 => "  · 1 message".to_string(),
            n => format!("  · {} messages", n),
        };

        // Format: "💬 Chat Window  · 3 messages"
        let header_text = Line::from(vec![
            Span::styled("💬 ", Style::default().fg(self.theme.cyan)),
            Span::styled(
                self.title,
                Style::default()
                    .fg(self.theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(count, Style::default().fg(self.theme.text_muted)),
        ]);

        Paragraph::new(header_text)
            .style(Style::default().bg(self.theme.bg_header))
            .render(area, buf);
    }
}
