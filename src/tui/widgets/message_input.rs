//! Message input widget
//!
//! Multi-line text entry with a byte-offset cursor. Enter submits the trimmed
//! text; Shift+Enter or Alt+Enter inserts a newline. The widget grows with
//! its content up to `max_lines` and then scrolls to keep the cursor visible.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::tui::theme::Theme;

pub const DEFAULT_PLACEHOLDER: &str = "Type a message...";
pub const DEFAULT_MAX_LINES: u16 = 8;

/// Rows used by the border and the toolbar
const CHROME_ROWS: u16 = 3;

/// Result of feeding a key to the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Enter was pressed with sendable text
    Submitted(String),
    /// Text or cursor changed
    Edited,
    /// Key not handled by the input
    Ignored,
}

/// Input state
#[derive(Debug, Clone)]
pub struct MessageInputState {
    /// Current text
    text: String,
    /// Cursor position (byte offset, always on a char boundary)
    cursor: usize,
    placeholder: String,
    disabled: bool,
    max_lines: u16,
}

impl Default for MessageInputState {
    fn default() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            disabled: false,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

impl MessageInputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the maximum number of visible text lines
    pub fn with_max_lines(mut self, max_lines: u16) -> Self {
        self.max_lines = max_lines.max(1);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Insert a character at the cursor position
    pub fn insert_char(&mut self, c: char) {
        if self.disabled {
            return;
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert a string at the cursor position
    pub fn insert_str(&mut self, s: &str) {
        if self.disabled {
            return;
        }
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if self.disabled || self.cursor == 0 {
            return;
        }
        let prev = self.prev_boundary();
        self.text.remove(prev);
        self.cursor = prev;
    }

    /// Delete the character at the cursor
    pub fn delete(&mut self) {
        if self.disabled || self.cursor >= self.text.len() {
            return;
        }
        self.text.remove(self.cursor);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.text.len());
    }

    /// Move to the start of the current line
    pub fn move_home(&mut self) {
        self.cursor = self.line_start();
    }

    /// Move to the end of the current line
    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.text.len());
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Whether `submit` would return text
    pub fn can_send(&self) -> bool {
        !self.disabled && !self.text.trim().is_empty()
    }

    /// Take the trimmed text and clear the input
    pub fn submit(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }
        let text = self.text.trim().to_string();
        self.clear();
        Some(text)
    }

    /// Apply a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        let newline_modifier =
            key.modifiers.contains(KeyModifiers::SHIFT) || key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Enter if newline_modifier => {
                self.insert_newline();
                InputOutcome::Edited
            }
            KeyCode::Enter => match self.submit() {
                Some(text) => InputOutcome::Submitted(text),
                None => InputOutcome::Ignored,
            },
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
                InputOutcome::Edited
            }
            KeyCode::Backspace => {
                self.backspace();
                InputOutcome::Edited
            }
            KeyCode::Delete => {
                self.delete();
                InputOutcome::Edited
            }
            KeyCode::Left => {
                self.move_left();
                InputOutcome::Edited
            }
            KeyCode::Right => {
                self.move_right();
                InputOutcome::Edited
            }
            KeyCode::Home => {
                self.move_home();
                InputOutcome::Edited
            }
            KeyCode::End => {
                self.move_end();
                InputOutcome::Edited
            }
            _ => InputOutcome::Ignored,
        }
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Number of text lines (at least 1)
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Zero-based line of the cursor and its byte column within that line
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let line = self.text[..self.cursor].matches('\n').count();
        (line, self.cursor - self.line_start())
    }

    /// Rows needed: text lines clamped to `1..=max_lines`, plus chrome
    pub fn desired_height(&self) -> u16 {
        let lines = self.line_count().clamp(1, self.max_lines as usize) as u16;
        lines + CHROME_ROWS
    }
}

/// Widget that renders a `MessageInputState`
pub struct MessageInput<'a> {
    state: &'a MessageInputState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> MessageInput<'a> {
    pub fn new(state: &'a MessageInputState, theme: &'a Theme) -> Self {
        Self {
            state,
            focused: false,
            theme,
        }
    }

    /// Set focused state
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn text_lines(&self, cursor_line: usize, cursor_col: usize) -> Vec<Line<'a>> {
        let text_style = Style::default().fg(self.theme.text_primary);
        let cursor_style = Style::default()
            .fg(self.theme.bg_main)
            .bg(self.theme.text_primary);

        self.state
            .text
            .split('\n')
            .enumerate()
            .map(|(index, line)| {
                if index != cursor_line || !self.focused {
                    return Line::from(Span::styled(line, text_style));
                }
                let (before, after) = line.split_at(cursor_col.min(line.len()));
                let cursor_char = after.chars().next().unwrap_or(' ');
                let rest = after.get(cursor_char.len_utf8()..).unwrap_or("");
                Line::from(vec![
                    Span::styled(before, text_style),
                    Span::styled(cursor_char.to_string(), cursor_style),
                    Span::styled(rest, text_style),
                ])
            })
            .collect()
    }

    fn toolbar(&self) -> (Line<'a>, Line<'a>) {
        let muted = Style::default().fg(self.theme.text_muted);
        let hint = Line::from(Span::styled("Enter send · Shift+Enter newline", muted));
        let send_style = if self.state.can_send() {
            Style::default()
                .fg(self.theme.green)
                .add_modifier(Modifier::BOLD)
        } else {
            muted
        };
        (hint, Line::from(Span::styled("Send ➤", send_style)))
    }
}

impl Widget for MessageInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.state.disabled {
            self.theme.text_muted
        } else if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let text_area = Rect {
            height: inner.height.saturating_sub(1).max(1),
            ..inner
        };

        if self.state.text.is_empty() {
            let style = Style::default()
                .fg(self.theme.text_muted)
                .add_modifier(Modifier::ITALIC);
            Paragraph::new(Line::from(Span::styled(self.state.placeholder.as_str(), style)))
                .render(text_area, buf);
        } else {
            let (line, col) = self.state.cursor_line_col();
            let rows = text_area.height as usize;
            // Keep the cursor on screen in both directions
            let row_offset = line.saturating_sub(rows.saturating_sub(1));
            let cursor_x = self
                .state
                .text
                .split('\n')
                .nth(line)
                .map(|l| l[..col.min(l.len())].width())
                .unwrap_or(0);
            let col_offset = (cursor_x + 1).saturating_sub(text_area.width as usize);

            Paragraph::new(self.text_lines(line, col))
                .scroll((row_offset as u16, col_offset as u16))
                .render(text_area, buf);
        }

        if inner.height >= 2 {
            let toolbar_area = Rect {
                y: inner.y + inner.height - 1,
                height: 1,
                ..inner
            };
            let (hint, send) = self.toolbar();
            Paragraph::new(hint).render(toolbar_area, buf);
            Paragraph::new(send)
                .alignment(Alignment::Right)
                .render(toolbar_area, buf);
        }
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

    fn typed(text: &str) -> MessageInputState {
        let mut state = MessageInputState::new();
        state.insert_str(text);
        state
    }

    fn render_rows(state: &MessageInputState, width: u16) -> Vec<String> {
        let height = state.desired_height();
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();

        terminal
            .draw(|f| {
                let input = MessageInput::new(state, &theme).focused(true);
                f.render_widget(input, f.area());
            })
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
    fn test_submit_returns_trimmed_text_and_clears() {
        let mut state = typed("  hello  ");
        assert_eq!(state.submit(), Some("hello".to_string()));
        assert!(state.is_empty());
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_blank_text_is_not_sent() {
        let mut state = typed("   \n  ");
        assert!(!state.can_send());
        assert_eq!(state.submit(), None);
        assert_eq!(state.text(), "   \n  ");
    }

    #[test]
    fn test_disabled_input_ignores_edits_and_submit() {
        let mut state = typed("hi");
        state.set_disabled(true);
        state.insert_char('!');
        state.backspace();
        assert_eq!(state.text(), "hi");
        assert_eq!(state.submit(), None);
    }

    #[test]
    fn test_enter_submits_and_shift_enter_inserts_newline() {
        let mut state = typed("line one");
        let outcome = state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        assert_eq!(outcome, InputOutcome::Edited);
        state.insert_str("line two");

        let outcome = state.handle_key(key(KeyCode::Enter));
        assert_eq!(
            outcome,
            InputOutcome::Submitted("line one\nline two".to_string())
        );
    }

    #[test]
    fn test_enter_on_empty_is_ignored() {
        let mut state = MessageInputState::new();
        assert_eq!(state.handle_key(key(KeyCode::Enter)), InputOutcome::Ignored);
    }

    #[test]
    fn test_cursor_moves_over_multibyte_chars() {
        let mut state = typed("aé日");
        state.move_left();
        assert_eq!(state.cursor(), "aé".len());
        state.move_left();
        assert_eq!(state.cursor(), 1);
        state.move_right();
        assert_eq!(state.cursor(), "aé".len());
        state.backspace();
        assert_eq!(state.text(), "a日");
        state.delete();
        assert_eq!(state.text(), "a");
    }

    #[test]
    fn test_home_end_are_line_relative() {
        let mut state = typed("first\nsecond");
        state.move_home();
        assert_eq!(state.cursor(), "first\n".len());
        assert_eq!(state.cursor_line_col(), (1, 0));
        state.move_left();
        state.move_home();
        assert_eq!(state.cursor(), 0);
        state.move_end();
        assert_eq!(state.cursor(), "first".len());
    }

    #[test]
    fn test_desired_height_grows_then_caps() {
        let state = MessageInputState::new();
        assert_eq!(state.desired_height(), 1 + CHROME_ROWS);

        let state = typed("a\nb\nc");
        assert_eq!(state.desired_height(), 3 + CHROME_ROWS);

        let state = typed(&"x\n".repeat(20)).with_max_lines(4);
        assert_eq!(state.desired_height(), 4 + CHROME_ROWS);
    }

    #[test]
    fn test_renders_placeholder_when_empty() {
        let rows = render_rows(&MessageInputState::new(), 50);
        assert!(rows[1].contains(DEFAULT_PLACEHOLDER));
        assert!(rows[2].contains("Enter send"));
    }

    #[test]
    fn test_renders_content() {
        let rows = render_rows(&typed("Hello world"), 50);
        assert!(rows[1].contains("Hello world"));
        assert!(!rows[1].contains(DEFAULT_PLACEHOLDER));
    }

    #[test]
    fn test_overflow_keeps_cursor_line_visible() {
        let mut state = MessageInputState::new().with_max_lines(2);
        for i in 0..5 {
            if i > 0 {
                state.insert_newline();
            }
            state.insert_str(&format!("row {}", i));
        }
        let rows = render_rows(&state, 30);
        assert!(rows.iter().any(|r| r.contains("row 4")));
        assert!(!rows.iter().any(|r| r.contains("row 0")));
    }
}
