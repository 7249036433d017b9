//! Message bubble
//!
//! Lays out one message: sender name (other users only), rich content, and
//! a timestamp line with the failure note. Own messages are pushed to the
//! right edge; bubbles never exceed 70% of the available width.

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::disclosure::DisclosureStates;
use super::markdown::wrap_lines;
use super::rich_content::{DisclosureTarget, RichContent};
use crate::content::ContentRouter;
use crate::core::ChatMessage;
use crate::tui::theme::Theme;

/// Share of the row a bubble may use, in percent
pub const MAX_BUBBLE_PERCENT: usize = 70;
const MIN_BUBBLE_WIDTH: usize = 12;
const BAR: &str = "▌ ";
const BAR_WIDTH: usize = 2;
pub const FAILED_NOTE: &str = "⚠ Send failed · press r to retry";

/// A bubble laid out for a given width
#[derive(Debug, Clone, Default)]
pub struct BubbleLayout {
    pub lines: Vec<Line<'static>>,
    /// Disclosure headers, with line offsets relative to the bubble
    pub disclosures: Vec<DisclosureTarget>,
}

impl BubbleLayout {
    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

/// Widget for a single message
pub struct MessageBubble<'a> {
    message: &'a ChatMessage,
    own: bool,
    selected: bool,
    router: &'a ContentRouter,
    states: &'a DisclosureStates,
    theme: &'a Theme,
}

impl<'a> MessageBubble<'a> {
    pub fn new(
        message: &'a ChatMessage,
        router: &'a ContentRouter,
        states: &'a DisclosureStates,
        theme: &'a Theme,
    ) -> Self {
        Self {
            message,
            own: false,
            selected: false,
            router,
            states,
            theme,
        }
    }

    /// Mark the message as sent by the current user
    pub fn own(mut self, own: bool) -> Self {
        self.own = own;
        self
    }

    /// Set selected state
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Widest a bubble may be inside a row of `width` columns
    pub fn max_width(width: usize) -> usize {
        (width * MAX_BUBBLE_PERCENT / 100)
            .max(MIN_BUBBLE_WIDTH)
            .min(width)
    }

    fn meta_line(&self) -> Line<'static> {
        let time = self
            .message
            .timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();
        let mut spans = vec![Span::styled(time, Style::default().fg(self.theme.text_muted))];
        if self.message.failed {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                FAILED_NOTE,
                Style::default()
                    .fg(self.theme.red)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }

    /// Lay the bubble out for a row of `width` columns
    pub fn layout(&self, width: usize) -> BubbleLayout {
        let inner = Self::max_width(width).saturating_sub(BAR_WIDTH).max(1);

        let mut body: Vec<Line<'static>> = Vec::new();
        if !self.own {
            body.extend(wrap_lines(
                vec![Line::from(Span::styled(
                    self.message.user.name.clone(),
                    Style::default()
                        .fg(self.theme.other_bubble)
                        .add_modifier(Modifier::BOLD),
                ))],
                inner,
            ));
        }
        let header_lines = body.len();

        let content = RichContent::lines(
            &self.message.message,
            self.message.id,
            self.states,
            self.router,
            self.theme,
            inner,
        );
        body.extend(content.lines);
        body.extend(wrap_lines(vec![self.meta_line()], inner));

        let bar_color = if self.message.failed {
            self.theme.red
        } else if self.own {
            self.theme.own_bubble
        } else {
            self.theme.other_bubble
        };
        let bar_style = Style::default().fg(bar_color);
        let bubble_width = body.iter().map(Line::width).max().unwrap_or(0) + BAR_WIDTH;
        let pad = if self.own {
            width.saturating_sub(bubble_width)
        } else {
            0
        };
        let bg = if self.selected {
            self.theme.selected_bg
        } else if self.own {
            self.theme.own_bubble_bg
        } else {
            self.theme.other_bubble_bg
        };

        let lines = body
            .into_iter()
            .map(|line| {
                let fill = bubble_width.saturating_sub(line.width() + BAR_WIDTH);
                let mut spans = Vec::with_capacity(line.spans.len() + 3);
                if pad > 0 {
                    spans.push(Span::raw(" ".repeat(pad)));
                }
                spans.push(Span::styled(BAR, bar_style.bg(bg)));
                spans.extend(
                    line.spans
                        .into_iter()
                        .map(|span| Span::styled(span.content, span.style.bg(bg))),
                );
                if fill > 0 {
                    spans.push(Span::styled(" ".repeat(fill), Style::default().bg(bg)));
                }
                Line::from(spans)
            })
            .collect();

        let disclosures = content
            .disclosures
            .into_iter()
            .map(|target| DisclosureTarget {
                line: target.line + header_lines,
                ..target
            })
            .collect();

        BubbleLayout { lines, disclosures }
    }
}

impl Widget for MessageBubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = self.layout(area.width as usize);
        Paragraph::new(layout.lines).render(area, buf);
    }
}
