//! Chat window
//!
//! Composes the header, the message list and the input inside an optional
//! rounded frame, and maps key and mouse input onto them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    symbols::border,
    widgets::{Block, Borders, Widget},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::theme::{Theme, ThemePreset};
use super::widgets::{
    Header, InputOutcome, MessageInput, MessageInputState, MessageList, MessageListWidget,
    DEFAULT_MAX_LINES, DEFAULT_PLACEHOLDER, DEFAULT_USER_NAME,
};
use crate::config::Config;
use crate::content::{ContentRouter, DEFAULT_REASONING_TITLE};
use crate::core::{ChatMessage, ChatUser, MessageListError, MessageUpdate};

/// Lines scrolled per mouse wheel notch
const WHEEL_LINES: usize = 3;

/// Outer frame of the window
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FrameStyle {
    /// Rounded border around the whole window
    #[default]
    Default,
    /// No outer border
    Borderless,
}

/// Construction options for `ChatWindow`
#[derive(Debug, Clone)]
pub struct ChatWindowOptions {
    pub title: String,
    pub placeholder: String,
    pub current_user_id: String,
    pub current_user_name: String,
    pub frame: FrameStyle,
    pub theme: ThemePreset,
    pub reasoning_title: String,
    pub input_max_lines: u16,
    pub initial_messages: Vec<ChatMessage>,
}

impl Default for ChatWindowOptions {
    fn default() -> Self {
        Self {
            title: "Chat Window".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            current_user_id: "user-1".to_string(),
            current_user_name: DEFAULT_USER_NAME.to_string(),
            frame: FrameStyle::Default,
            theme: ThemePreset::default(),
            reasoning_title: DEFAULT_REASONING_TITLE.to_string(),
            input_max_lines: DEFAULT_MAX_LINES,
            initial_messages: Vec::new(),
        }
    }
}

impl From<&Config> for ChatWindowOptions {
    fn from(config: &Config) -> Self {
        Self {
            title: config.window.title.clone(),
            placeholder: config.window.placeholder.clone(),
            current_user_id: config.window.current_user_id.clone(),
            current_user_name: config.window.current_user_name.clone(),
            frame: config.window.frame,
            theme: config.theme.preset,
            reasoning_title: config.reasoning.default_title.clone(),
            input_max_lines: config.window.input_max_lines,
            initial_messages: Vec::new(),
        }
    }
}

/// Component receiving keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Messages,
}

/// Something the host application should react to
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The user sent a message (already appended to the list)
    MessageSent(ChatMessage),
    /// The user asked to resend a failed message
    Retry(Uuid),
    /// The user asked to quit
    Quit,
}

/// Chat window state
#[derive(Debug)]
pub struct ChatWindow {
    title: String,
    frame: FrameStyle,
    theme: Theme,
    router: ContentRouter,
    list: MessageList,
    input: MessageInputState,
    focus: Focus,
    /// Where the message list was drawn, for mouse hit tests
    list_area: Rect,
}

impl ChatWindow {
    pub fn new(options: ChatWindowOptions) -> Self {
        let user = ChatUser::new(options.current_user_id, options.current_user_name);
        let list = MessageList::new(user.id.clone())
            .with_current_user(user)
            .with_messages(options.initial_messages);
        let input = MessageInputState::new()
            .with_placeholder(options.placeholder)
            .with_max_lines(options.input_max_lines);

        Self {
            title: options.title,
            frame: options.frame,
            theme: Theme::from_preset(options.theme),
            router: ContentRouter::new(options.reasoning_title),
            list,
            input,
            focus: Focus::Input,
            list_area: Rect::default(),
        }
    }

    // ========================================================================
    // Message operations
    // ========================================================================

    /// Append a message from the current user
    pub fn send(&mut self, text: impl Into<String>) -> Uuid {
        self.list.send(text)
    }

    /// Append a message from another user
    pub fn receive(&mut self, user: ChatUser, text: impl Into<String>) -> Uuid {
        self.list.receive(user, text)
    }

    /// Merge a partial update into a message
    pub fn update(&mut self, id: Uuid, update: MessageUpdate) -> Result<(), MessageListError> {
        self.list.update(id, update)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn frame(&self) -> FrameStyle {
        self.frame
    }

    pub fn list(&self) -> &MessageList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut MessageList {
        &mut self.list
    }

    pub fn input(&self) -> &MessageInputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut MessageInputState {
        &mut self.input
    }

    /// Router used for message content; register extra annotation renderers here
    pub fn router_mut(&mut self) -> &mut ContentRouter {
        &mut self.router
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, preset: ThemePreset) {
        self.theme = Theme::from_preset(preset);
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        match focus {
            Focus::Input => self.list.clear_selection(),
            Focus::Messages => {
                if self.list.selected().is_none() {
                    self.list.select_previous();
                }
            }
        }
    }

    // ========================================================================
    // Input handling
    // ========================================================================

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<WindowEvent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(WindowEvent::Quit);
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                let next = match self.focus {
                    Focus::Input => Focus::Messages,
                    Focus::Messages => Focus::Input,
                };
                self.set_focus(next);
                return None;
            }
            KeyCode::Esc => {
                self.input.clear();
                self.set_focus(Focus::Input);
                return None;
            }
            KeyCode::PageUp => {
                self.list.page_up();
                return None;
            }
            KeyCode::PageDown => {
                self.list.page_down();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Messages => self.handle_list_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Option<WindowEvent> {
        match self.input.handle_key(key) {
            InputOutcome::Submitted(text) => {
                let id = self.list.send(text);
                self.list.scroll_to_bottom();
                tracing::info!(%id, "message sent");
                self.list.get(id).cloned().map(WindowEvent::MessageSent)
            }
            InputOutcome::Edited | InputOutcome::Ignored => None,
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<WindowEvent> {
        match key.code {
            KeyCode::Up => self.list.select_previous(),
            KeyCode::Down => self.list.select_next(),
            KeyCode::Home => self.list.scroll_to_top(),
            KeyCode::End => self.list.scroll_to_bottom(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.list.toggle_selected_disclosure(&self.router);
            }
            KeyCode::Char('r') if self.selected_failed() => return self.retry_selected(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                // Typing while browsing goes back to the input
                self.set_focus(Focus::Input);
                self.input.insert_char(c);
            }
            _ => {}
        }
        None
    }

    fn selected_failed(&self) -> bool {
        self.list.selected_message().is_some_and(|m| m.failed)
    }

    /// Clear the failed flag of the selected message and ask for a resend
    fn retry_selected(&mut self) -> Option<WindowEvent> {
        let message = self.list.selected_message()?;
        if !message.failed {
            return None;
        }
        let id = message.id;
        self.list.update(id, MessageUpdate::failed(false)).ok()?;
        tracing::info!(%id, "retrying message");
        Some(WindowEvent::Retry(id))
    }

    /// Handle a mouse event; returns true if anything changed
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.list.scroll_up(WHEEL_LINES);
                true
            }
            MouseEventKind::ScrollDown => {
                self.list.scroll_down(WHEEL_LINES);
                true
            }
            MouseEventKind::Down(MouseButton::Left) if self.list_area.contains(position) => {
                self.list.toggle_disclosure_at_row(mouse.row)
            }
            _ => false,
        }
    }

    /// Insert pasted text into the input
    pub fn handle_paste(&mut self, text: &str) {
        self.set_focus(Focus::Input);
        self.input.insert_str(&text.replace("\r\n", "\n"));
    }
}

/// Widget that renders a `ChatWindow`
pub struct ChatWindowWidget<'a> {
    window: &'a mut ChatWindow,
}

impl<'a> ChatWindowWidget<'a> {
    pub fn new(window: &'a mut ChatWindow) -> Self {
        Self { window }
    }
}

impl Widget for ChatWindowWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let window = self.window;
        let theme = &window.theme;

        let base = Block::default().style(Style::default().bg(theme.bg_main));
        let block = match window.frame {
            FrameStyle::Default => base
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .border_style(Style::default().fg(theme.border)),
            FrameStyle::Borderless => base,
        };
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(window.input.desired_height()),
            ])
            .split(inner);

        Header::new(&window.title, theme)
            .message_count(window.list.len())
            .render(chunks[0], buf);

        MessageListWidget::new(&mut window.list, &window.router, theme).render(chunks[1], buf);
        window.list_area = chunks[1];

        MessageInput::new(&window.input, theme)
            .focused(window.focus == Focus::Input)
            .render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(window: &mut ChatWindow, text: &str) {
        for c in text.chars() {
            window.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn draw(window: &mut ChatWindow, width: u16, height: u16) -> Vec<String> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(ChatWindowWidget::new(&mut *window), f.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer.cell((x, y)).unwrap().symbol().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_enter_sends_message() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        type_text(&mut window, "hello");
        let event = window.handle_key(key(KeyCode::Enter));

        match event {
            Some(WindowEvent::MessageSent(msg)) => {
                assert_eq!(msg.message, "hello");
                assert_eq!(msg.user.id, "user-1");
                assert_eq!(msg.user.name, "Current User");
            }
            other => panic!("expected MessageSent, got {:?}", other),
        }
        assert_eq!(window.list().len(), 1);
        assert!(window.input().is_empty());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        let event = window.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(event, Some(WindowEvent::Quit));
    }

    #[test]
    fn test_esc_clears_input() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        type_text(&mut window, "draft");
        window.handle_key(key(KeyCode::Esc));
        assert!(window.input().is_empty());
    }

    #[test]
    fn test_tab_switches_focus_and_selects_last() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        window.send("one");
        window.send("two");

        window.handle_key(key(KeyCode::Tab));
        assert_eq!(window.focus(), Focus::Messages);
        assert_eq!(window.list().selected(), Some(1));

        window.handle_key(key(KeyCode::Up));
        assert_eq!(window.list().selected(), Some(0));

        window.handle_key(key(KeyCode::Tab));
        assert_eq!(window.focus(), Focus::Input);
        assert_eq!(window.list().selected(), None);
    }

    #[test]
    fn test_r_retries_failed_message() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        let id = window.send("fail test");
        window.update(id, MessageUpdate::failed(true)).unwrap();

        window.handle_key(key(KeyCode::Tab));
        let event = window.handle_key(key(KeyCode::Char('r')));
        assert_eq!(event, Some(WindowEvent::Retry(id)));
        assert!(!window.list().get(id).unwrap().failed);
    }

    #[test]
    fn test_r_on_healthy_message_types_into_input() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        window.send("fine");
        window.handle_key(key(KeyCode::Tab));
        assert_eq!(window.handle_key(key(KeyCode::Char('r'))), None);
        assert_eq!(window.focus(), Focus::Input);
        assert_eq!(window.input().text(), "r");
    }

    #[test]
    fn test_typing_in_list_returns_to_input() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        window.send("one");
        window.handle_key(key(KeyCode::Tab));
        window.handle_key(key(KeyCode::Char('x')));
        assert_eq!(window.focus(), Focus::Input);
        assert_eq!(window.input().text(), "x");
    }

    #[test]
    fn test_enter_in_list_toggles_disclosure() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        window.receive(
            ChatUser::new("bot", "Bot"),
            "<reasoning>\nsecret\n</reasoning>\nanswer",
        );
        window.handle_key(key(KeyCode::Tab));
        window.handle_key(key(KeyCode::Enter));
        assert_eq!(window.list().disclosures().len(), 1);

        let rows = draw(&mut window, 60, 20);
        assert!(rows.iter().any(|r| r.contains("secret")));
    }

    #[test]
    fn test_default_frame_has_rounded_border() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        let rows = draw(&mut window, 40, 12);
        assert!(rows[0].starts_with('╭'));
        assert!(rows[1].contains("Chat Window"));
        assert!(rows.iter().any(|r| r.contains("No messages yet")));
        assert!(rows.iter().any(|r| r.contains("Type a message...")));
    }

    #[test]
    fn test_borderless_frame() {
        let options = ChatWindowOptions {
            frame: FrameStyle::Borderless,
            title: "Support".to_string(),
            ..ChatWindowOptions::default()
        };
        let mut window = ChatWindow::new(options);
        let rows = draw(&mut window, 40, 12);
        assert!(!rows[0].starts_with('╭'));
        assert!(rows[0].contains("Support"));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.window.title = "Team".to_string();
        config.window.frame = FrameStyle::Borderless;
        config.reasoning.default_title = "Thoughts".to_string();

        let options = ChatWindowOptions::from(&config);
        assert_eq!(options.title, "Team");
        assert_eq!(options.frame, FrameStyle::Borderless);
        assert_eq!(options.reasoning_title, "Thoughts");
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut window = ChatWindow::new(ChatWindowOptions::default());
        window.handle_paste("a\r\nb");
        assert_eq!(window.input().text(), "a\nb");
    }
}
