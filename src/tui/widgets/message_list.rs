//! Message list widget
//!
//! Holds the conversation and its scroll/selection state. Rendering is
//! virtualized: per-message heights are cached for the current width and
//! only messages intersecting the viewport are laid out and drawn.
//!
//! Scroll position is a line offset from the top of the conversation. While
//! the viewport is at the bottom the list follows new messages; once the user
//! scrolls up, appends leave the position alone.

use std::collections::HashMap;
use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};
use uuid::Uuid;

use super::disclosure::DisclosureStates;
use super::message_bubble::MessageBubble;
use super::rich_content::RichContent;
use crate::content::ContentRouter;
use crate::core::{ChatMessage, ChatUser, MessageListError, MessageUpdate};
use crate::tui::theme::Theme;

/// Text shown when there are no messages
pub const EMPTY_PLACEHOLDER: &str = "No messages yet";

/// Default display name of the current user
pub const DEFAULT_USER_NAME: &str = "Current User";

/// Disclosure header drawn on screen during the last render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClickTarget {
    message_id: Uuid,
    block_index: usize,
    default_expanded: bool,
}

/// Message list state
#[derive(Debug)]
pub struct MessageList {
    messages: Vec<ChatMessage>,
    /// Sender of messages created with `send`
    current_user: ChatUser,
    /// Rendered height per message (including the gap above it), `None` if stale
    heights: Vec<Option<usize>>,
    /// Width the cached heights were measured at
    last_width: u16,
    /// Viewport height from the last render
    visible_height: u16,
    /// Sum of message heights from the last render
    total_lines: usize,
    /// Line offset of the viewport top
    scroll_offset: usize,
    /// Stick to the bottom on the next render
    follow: bool,
    selected: Option<usize>,
    /// Scroll the selection into view on the next render
    reveal_selected: bool,
    /// Messages drawn by the last render
    visible: Range<usize>,
    disclosures: DisclosureStates,
    /// Screen row -> disclosure header, refreshed every render
    click_targets: HashMap<u16, ClickTarget>,
}

impl MessageList {
    /// Create an empty list for the given current user id
    pub fn new(current_user_id: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            current_user: ChatUser::new(current_user_id, DEFAULT_USER_NAME),
            heights: Vec::new(),
            last_width: 0,
            visible_height: 0,
            total_lines: 0,
            scroll_offset: 0,
            follow: true,
            selected: None,
            reveal_selected: false,
            visible: 0..0,
            disclosures: DisclosureStates::new(),
            click_targets: HashMap::new(),
        }
    }

    /// Seed the list; the initial location is the last message
    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.heights = vec![None; messages.len()];
        self.messages = messages;
        self.follow = true;
        self
    }

    /// Set the user attached to messages created with `send`
    pub fn with_current_user(mut self, user: ChatUser) -> Self {
        self.current_user = user;
        self
    }

    pub fn current_user(&self) -> &ChatUser {
        &self.current_user
    }

    /// Whether `message` was sent by the current user
    pub fn is_own(&self, message: &ChatMessage) -> bool {
        message.is_from(&self.current_user.id)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Append a message, following it if the viewport was at the bottom
    pub fn push(&mut self, message: ChatMessage) -> Uuid {
        let was_at_bottom = self.is_at_bottom();
        let id = message.id;
        self.messages.push(message);
        self.heights.push(None);
        if was_at_bottom {
            self.follow = true;
        }
        tracing::debug!(%id, follow = self.follow, "message appended");
        id
    }

    /// Append a message from the current user
    pub fn send(&mut self, text: impl Into<String>) -> Uuid {
        let message = ChatMessage::new(self.current_user.clone(), text);
        self.push(message)
    }

    /// Append a message from another user
    pub fn receive(&mut self, user: ChatUser, text: impl Into<String>) -> Uuid {
        self.push(ChatMessage::new(user, text))
    }

    /// Merge a partial update into an existing message
    pub fn update(&mut self, id: Uuid, update: MessageUpdate) -> Result<(), MessageListError> {
        let Some(index) = self.index_of(id) else {
            tracing::warn!(%id, "update for unknown message");
            return Err(MessageListError::NotFound(id));
        };
        self.messages[index].apply(update);
        self.heights[index] = None;
        tracing::debug!(%id, "message updated");
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove every message and reset scroll, selection and disclosures
    pub fn clear(&mut self) {
        self.messages.clear();
        self.heights.clear();
        self.disclosures.clear();
        self.click_targets.clear();
        self.total_lines = 0;
        self.scroll_offset = 0;
        self.follow = true;
        self.selected = None;
        self.visible = 0..0;
    }

    fn index_of(&self, id: Uuid) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }

    /// Drop the cached height of a message
    pub fn invalidate(&mut self, id: Uuid) {
        if let Some(index) = self.index_of(id) {
            self.heights[index] = None;
        }
    }

    // ========================================================================
    // Scrolling
    // ========================================================================

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height as usize)
    }

    fn page(&self) -> usize {
        (self.visible_height as usize).saturating_sub(1).max(1)
    }

    /// Whether the last line is in view (or will be after the next render)
    pub fn is_at_bottom(&self) -> bool {
        self.follow || self.scroll_offset >= self.max_scroll()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if self.follow {
            self.scroll_offset = self.max_scroll();
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.follow = self.scroll_offset >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.max_scroll();
        self.scroll_offset = (self.scroll_offset + lines).min(max);
        self.follow = self.scroll_offset >= max;
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.follow = self.max_scroll() == 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
        self.follow = true;
    }

    /// Indices of the messages drawn by the last render
    pub fn visible_range(&self) -> Range<usize> {
        self.visible.clone()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_message(&self) -> Option<&ChatMessage> {
        self.selected.and_then(|i| self.messages.get(i))
    }

    /// Select the next message (the first one if nothing is selected)
    pub fn select_next(&mut self) {
        if self.messages.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(self.messages.len() - 1),
            None => 0,
        });
        self.reveal_selected = true;
    }

    /// Select the previous message (the last one if nothing is selected)
    pub fn select_previous(&mut self) {
        if self.messages.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => i.saturating_sub(1),
            None => self.messages.len() - 1,
        });
        self.reveal_selected = true;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ========================================================================
    // Disclosures
    // ========================================================================

    pub fn disclosures(&self) -> &DisclosureStates {
        &self.disclosures
    }

    /// Toggle the first disclosure of the selected message
    ///
    /// Returns false when nothing is selected or it has no disclosure.
    pub fn toggle_selected_disclosure(&mut self, router: &ContentRouter) -> bool {
        let Some(message) = self.selected_message() else {
            return false;
        };
        let id = message.id;
        let Some(&(block_index, default_expanded)) =
            RichContent::disclosure_blocks(&message.message, router).first()
        else {
            return false;
        };
        self.toggle_disclosure(id, block_index, default_expanded);
        true
    }

    /// Toggle the disclosure whose header was drawn on screen row `row`
    pub fn toggle_disclosure_at_row(&mut self, row: u16) -> bool {
        match self.click_targets.get(&row).copied() {
            Some(target) => {
                self.toggle_disclosure(
                    target.message_id,
                    target.block_index,
                    target.default_expanded,
                );
                true
            }
            None => false,
        }
    }

    fn toggle_disclosure(&mut self, id: Uuid, block_index: usize, default_expanded: bool) {
        let expanded = self
            .disclosures
            .toggle((id, block_index), default_expanded);
        self.invalidate(id);
        tracing::debug!(%id, block_index, expanded, "disclosure toggled");
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Fill in missing heights for `width`; a width change drops the cache
    fn measure(&mut self, width: u16, router: &ContentRouter, theme: &Theme) {
        if width != self.last_width {
            self.heights.iter_mut().for_each(|h| *h = None);
            self.last_width = width;
        }

        for index in 0..self.messages.len() {
            if self.heights[index].is_some() {
                continue;
            }
            let message = &self.messages[index];
            let own = message.is_from(&self.current_user.id);
            let layout = MessageBubble::new(message, router, &self.disclosures, theme)
                .own(own)
                .layout(width as usize);
            self.heights[index] = Some(layout.height() + usize::from(index > 0));
        }
    }

    fn height_at(&self, index: usize) -> usize {
        self.heights.get(index).copied().flatten().unwrap_or(0)
    }

    /// Adjust the offset so the selected message is fully in view if it fits
    fn reveal(&mut self, viewport: usize) {
        let Some(selected) = self.selected else {
            return;
        };
        let top: usize = (0..selected).map(|i| self.height_at(i)).sum();
        let bottom = top + self.height_at(selected);

        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + viewport {
            self.scroll_offset = bottom.saturating_sub(viewport).min(top);
        }
        self.follow = self.scroll_offset >= self.max_scroll();
    }
}

/// Widget that renders a `MessageList`
pub struct MessageListWidget<'a> {
    list: &'a mut MessageList,
    router: &'a ContentRouter,
    theme: &'a Theme,
}

impl<'a> MessageListWidget<'a> {
    pub fn new(list: &'a mut MessageList, router: &'a ContentRouter, theme: &'a Theme) -> Self {
        Self {
            list,
            router,
            theme,
        }
    }
}

impl Widget for MessageListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let list = self.list;
        list.click_targets.clear();
        list.visible_height = area.height;
        if area.width == 0 || area.height == 0 {
            return;
        }

        if list.messages.is_empty() {
            list.total_lines = 0;
            list.visible = 0..0;
            let row = Rect {
                y: area.y + area.height / 2,
                height: 1,
                ..area
            };
            Paragraph::new(EMPTY_PLACEHOLDER)
                .style(Style::default().fg(self.theme.text_muted))
                .alignment(Alignment::Center)
                .render(row, buf);
            return;
        }

        list.measure(area.width, self.router, self.theme);
        list.total_lines = (0..list.messages.len()).map(|i| list.height_at(i)).sum();

        let viewport = area.height as usize;
        if list.reveal_selected {
            list.reveal(viewport);
            list.reveal_selected = false;
        }
        let max_scroll = list.max_scroll();
        list.scroll_offset = if list.follow {
            max_scroll
        } else {
            list.scroll_offset.min(max_scroll)
        };
        list.follow = list.scroll_offset >= max_scroll;

        let offset = list.scroll_offset;
        // Short conversations hug the bottom edge
        let top_pad = viewport.saturating_sub(list.total_lines);

        let mut first = None;
        let mut end = 0;
        let mut y = 0;
        for index in 0..list.messages.len() {
            let height = list.height_at(index);
            if y + height > offset && y < offset + viewport {
                first.get_or_insert(index);
                end = index + 1;
            } else if y >= offset + viewport {
                break;
            }
            y += height;
        }
        let first = first.unwrap_or(end);
        list.visible = first..end;

        let mut y: usize = (0..first).map(|i| list.height_at(i)).sum();
        for index in first..end {
            let message = &list.messages[index];
            let own = message.is_from(&list.current_user.id);
            let layout = MessageBubble::new(message, self.router, &list.disclosures, self.theme)
                .own(own)
                .selected(list.selected == Some(index))
                .layout(area.width as usize);
            let start = y + usize::from(index > 0);

            let screen_row = |content_row: usize| -> Option<u16> {
                let row = (content_row + top_pad).checked_sub(offset)?;
                (row < viewport).then(|| area.y + row as u16)
            };

            for (k, line) in layout.lines.iter().enumerate() {
                if let Some(row) = screen_row(start + k) {
                    buf.set_line(area.x, row, line, area.width);
                }
            }
            for target in &layout.disclosures {
                if let Some(row) = screen_row(start + target.line) {
                    list.click_targets.insert(
                        row,
                        ClickTarget {
                            message_id: message.id,
                            block_index: target.block_index,
                            default_expanded: target.default_expanded,
                        },
                    );
                }
            }
            y += list.height_at(index);
        }
    }
}
