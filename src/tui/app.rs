//! Demo application
//!
//! Runs a `ChatWindow` against a simulated assistant. Every sent message gets
//! a reply 1.5 s later, opened by a reasoning block and streamed into an
//! initially empty message a few characters at a time. Messages containing
//! `fail test` are marked failed after 1 s instead; retrying one schedules a
//! normal reply. Timers are deadlines checked on every loop iteration.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Utc;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use uuid::Uuid;

use super::chat_window::{ChatWindow, ChatWindowWidget, WindowEvent};
use super::events::{Event, EventHandler};
use crate::core::{ChatMessage, ChatUser, MessageUpdate};

/// Delay before the simulated reply
pub const REPLY_DELAY: Duration = Duration::from_millis(1500);
/// Delay before a `fail test` message is marked failed
pub const FAIL_DELAY: Duration = Duration::from_millis(1000);
/// Marker that makes a message fail
pub const FAIL_MARKER: &str = "fail test";
/// Delay between two streamed chunks of a reply
pub const STREAM_INTERVAL: Duration = Duration::from_millis(50);
/// Characters revealed per streamed chunk
pub const STREAM_CHUNK_CHARS: usize = 3;

/// Work scheduled for later
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingKind {
    /// Post an empty assistant reply to `text` and start streaming it
    Reply { text: String },
    /// Reveal the next chunk of `full`; `shown` is a byte offset
    Stream { id: Uuid, shown: usize, full: String },
    /// Mark a message as failed
    Fail { id: Uuid },
}

#[derive(Debug, Clone)]
struct Pending {
    due: Instant,
    kind: PendingKind,
}

/// The simulated assistant
pub fn assistant() -> ChatUser {
    ChatUser::new("assistant", "Assistant")
}

/// Conversation shown when the demo starts
pub fn welcome_messages(current_user: &ChatUser) -> Vec<ChatMessage> {
    let now = Utc::now();
    let seeded = [
        (assistant(), "Hello! I'm your assistant. What can I help you with?", 5),
        (current_user.clone(), "Hi! What can you do?", 4),
        (
            assistant(),
            "I can help with:\n\n\
             1. Answering questions\n\
             2. Reading and explaining code\n\
             3. Writing and editing text\n\n\
             Send a message to see a streamed reply. Include `fail test` to \
             see a failed send, then select it with Tab and press `r`.",
            3,
        ),
    ];
    seeded
        .into_iter()
        .map(|(user, text, minutes_ago)| {
            let mut message = ChatMessage::new(user, text);
            message.timestamp = now - chrono::Duration::minutes(minutes_ago);
            message
        })
        .collect()
}

/// Byte offset just past the next `STREAM_CHUNK_CHARS` characters
fn next_chunk_end(full: &str, shown: usize) -> usize {
    full[shown..]
        .char_indices()
        .nth(STREAM_CHUNK_CHARS)
        .map(|(offset, _)| shown + offset)
        .unwrap_or(full.len())
}

/// Reply content for a user message
pub fn reply_for(text: &str) -> String {
    let words = text.split_whitespace().count();
    format!(
        "<reasoning title=\"Thinking\">\n\
         The message has {} word(s) and {} character(s).\n\
         Nothing to look up, so echo it back.\n\
         </reasoning>\n\
         Received: \"{}\"",
        words,
        text.chars().count(),
        text
    )
}

/// Main TUI application
pub struct TuiApp<B: Backend> {
    terminal: Terminal<B>,
    window: ChatWindow,
    events: EventHandler,
    pending: Vec<Pending>,
    should_quit: bool,
}

impl<B: Backend> TuiApp<B> {
    pub fn new(terminal: Terminal<B>, window: ChatWindow) -> Self {
        Self {
            terminal,
            window,
            events: EventHandler::default(),
            pending: Vec::new(),
            should_quit: false,
        }
    }

    pub fn window(&self) -> &ChatWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut ChatWindow {
        &mut self.window
    }

    /// Get reference to terminal (for testing)
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether a reply is still being streamed
    pub fn is_streaming(&self) -> bool {
        self.pending
            .iter()
            .any(|p| matches!(p.kind, PendingKind::Stream { .. }))
    }

    /// Number of scheduled replies, stream steps and failures
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Render the window
    pub fn render(&mut self) -> io::Result<()> {
        let window = &mut self.window;
        self.terminal
            .draw(|frame| frame.render_widget(ChatWindowWidget::new(window), frame.area()))?;
        Ok(())
    }

    /// React to an event raised by the window
    pub fn handle_window_event(&mut self, event: WindowEvent, now: Instant) {
        match event {
            WindowEvent::Quit => self.should_quit = true,
            WindowEvent::MessageSent(message) => {
                let kind = if message.message.contains(FAIL_MARKER) {
                    PendingKind::Fail { id: message.id }
                } else {
                    PendingKind::Reply {
                        text: message.message,
                    }
                };
                self.schedule(kind, now);
            }
            WindowEvent::Retry(id) => {
                let Some(message) = self.window.list().get(id) else {
                    tracing::warn!(%id, "retry for unknown message");
                    return;
                };
                let text = message.message.clone();
                self.schedule(PendingKind::Reply { text }, now);
            }
        }
    }

    fn schedule(&mut self, kind: PendingKind, now: Instant) {
        let delay = match kind {
            PendingKind::Reply { .. } => REPLY_DELAY,
            PendingKind::Stream { .. } => STREAM_INTERVAL,
            PendingKind::Fail { .. } => FAIL_DELAY,
        };
        if !matches!(kind, PendingKind::Stream { .. }) {
            tracing::debug!(?kind, ?delay, "scheduled");
        }
        self.pending.push(Pending {
            due: now + delay,
            kind,
        });
    }

    /// Run everything due at `now`, in deadline order
    pub fn process_due(&mut self, now: Instant) {
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| p.due);

        for pending in due {
            match pending.kind {
                PendingKind::Reply { text } => {
                    let id = self.window.receive(assistant(), "");
                    let full = reply_for(&text);
                    self.schedule(PendingKind::Stream { id, shown: 0, full }, now);
                }
                PendingKind::Stream { id, shown, full } => {
                    let end = next_chunk_end(&full, shown);
                    if let Err(err) = self
                        .window
                        .update(id, MessageUpdate::message(&full[..end]))
                    {
                        tracing::warn!(%err, "stopped streaming reply");
                        continue;
                    }
                    if end < full.len() {
                        self.schedule(
                            PendingKind::Stream {
                                id,
                                shown: end,
                                full,
                            },
                            now,
                        );
                    } else {
                        tracing::debug!(%id, "reply complete");
                    }
                }
                PendingKind::Fail { id } => {
                    if let Err(err) = self.window.update(id, MessageUpdate::failed(true)) {
                        tracing::warn!(%err, "could not mark message failed");
                    }
                }
            }
        }
    }

    /// Handle one terminal event
    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) => {
                if let Some(window_event) = self.window.handle_key(key) {
                    self.handle_window_event(window_event, now);
                }
            }
            Event::Mouse(mouse) => {
                self.window.handle_mouse(mouse);
            }
            Event::Paste(text) => self.window.handle_paste(&text),
            Event::Resize(..) | Event::Tick => {}
        }
    }

    /// Run the main application loop
    pub fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!("chat window started");
        while !self.should_quit {
            self.render().context("Failed to draw frame")?;
            let event = self.events.next().context("Failed to read terminal event")?;
            let now = Instant::now();
            self.handle_event(event, now);
            self.process_due(now);
        }
        tracing::info!("chat window closed");
        Ok(())
    }
}

/// Set up the terminal for TUI rendering
pub fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable terminal raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("Failed to enter alternate screen")?;
    let terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal() -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    Ok(())
}

/// Restore the terminal before the default panic output
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Run the demo in the real terminal
pub fn run(window: ChatWindow) -> anyhow::Result<()> {
    install_panic_hook();
    let terminal = setup_terminal()?;
    let mut app = TuiApp::new(terminal, window);
    let result = app.run();
    restore_terminal()?;
    app.terminal.show_cursor()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::chat_window::ChatWindowOptions;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn app() -> TuiApp<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        TuiApp::new(terminal, ChatWindow::new(ChatWindowOptions::default()))
    }

    fn send(app: &mut TuiApp<TestBackend>, text: &str, now: Instant) {
        for c in text.chars() {
            app.handle_event(
                Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)),
                now,
            );
        }
        app.handle_event(
            Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            now,
        );
    }

    /// Step the stream until the reply is complete; returns the final time
    fn finish_stream(app: &mut TuiApp<TestBackend>, mut now: Instant) -> Instant {
        for _ in 0..10_000 {
            if !app.is_streaming() {
                break;
            }
            now += STREAM_INTERVAL;
            app.process_due(now);
        }
        assert!(!app.is_streaming());
        now
    }

    #[test]
    fn test_reply_arrives_after_delay() {
        let mut app = app();
        let start = Instant::now();
        send(&mut app, "hello", start);
        assert_eq!(app.pending_count(), 1);

        app.process_due(start + Duration::from_millis(1000));
        assert_eq!(app.window().list().len(), 1);

        let now = start + REPLY_DELAY;
        app.process_due(now);
        let messages = app.window().list().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].user.id, "assistant");
        assert!(messages[1].message.is_empty());
        assert!(app.is_streaming());

        finish_stream(&mut app, now);
        let reply = &app.window().list().messages()[1].message;
        assert!(reply.starts_with("<reasoning"));
        assert!(reply.ends_with("Received: \"hello\""));
        assert_eq!(app.pending_count(), 0);
    }

    #[test]
    fn test_stream_reveals_growing_prefixes() {
        let mut app = app();
        let start = Instant::now();
        send(&mut app, "hi", start);
        let mut now = start + REPLY_DELAY;
        app.process_due(now);

        let full = reply_for("hi");
        let mut previous = 0;
        while app.is_streaming() {
            now += STREAM_INTERVAL;
            app.process_due(now);
            let shown = app.window().list().messages()[1].message.clone();
            assert!(full.starts_with(&shown));
            let count = shown.chars().count();
            assert!(count > previous && count <= previous + STREAM_CHUNK_CHARS);
            previous = count;
        }
        assert_eq!(app.window().list().messages()[1].message, full);
    }

    #[test]
    fn test_stream_follows_bottom_while_growing() {
        let mut app = app();
        for i in 0..20 {
            app.window_mut().receive(assistant(), format!("earlier message {}", i));
        }
        app.render().unwrap();
        assert!(app.window().list().is_at_bottom());

        let start = Instant::now();
        send(&mut app, "ping", start);
        let mut now = start + REPLY_DELAY;
        app.process_due(now);

        while app.is_streaming() {
            now += STREAM_INTERVAL;
            app.process_due(now);
            app.render().unwrap();
            assert!(app.window().list().is_at_bottom());
        }

        let buffer = app.terminal().backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Received:"));
        assert!(text.contains("▶ Thinking"));
    }

    #[test]
    fn test_stream_stops_when_message_disappears() {
        let mut app = app();
        let start = Instant::now();
        send(&mut app, "hello", start);
        let now = start + REPLY_DELAY;
        app.process_due(now);
        assert!(app.is_streaming());

        app.window_mut().list_mut().clear();
        app.process_due(now + STREAM_INTERVAL);
        assert!(!app.is_streaming());
        assert_eq!(app.pending_count(), 0);
    }

    #[test]
    fn test_welcome_messages_seed_conversation() {
        let me = ChatUser::new("user-1", "Me");
        let messages = welcome_messages(&me);
        assert_eq!(messages.len(), 3);
        assert!(messages[1].is_from("user-1"));
        assert!(!messages[0].is_from("user-1"));
        assert!(messages.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_fail_marker_marks_message_failed() {
        let mut app = app();
        let start = Instant::now();
        send(&mut app, "please fail test", start);

        app.process_due(start + FAIL_DELAY);
        let messages = app.window().list().messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].failed);
    }

    #[test]
    fn test_retry_schedules_reply() {
        let mut app = app();
        let start = Instant::now();
        send(&mut app, "fail test", start);
        app.process_due(start + FAIL_DELAY);

        let id = app.window().list().messages()[0].id;
        app.handle_event(
            Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
            start,
        );
        app.handle_event(
            Event::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)),
            start + FAIL_DELAY,
        );
        assert!(!app.window().list().get(id).unwrap().failed);

        app.process_due(start + FAIL_DELAY + REPLY_DELAY);
        assert_eq!(app.window().list().len(), 2);
    }

    #[test]
    fn test_ctrl_c_sets_quit() {
        let mut app = app();
        app.handle_event(
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Instant::now(),
        );
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_draws_reply() {
        let mut app = app();
        let start = Instant::now();
        send(&mut app, "ping", start);
        app.process_due(start + REPLY_DELAY);
        finish_stream(&mut app, start + REPLY_DELAY);
        app.render().unwrap();

        let buffer = app.terminal().backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Received:"));
        assert!(text.contains("▶ Thinking"));
    }

    #[test]
    fn test_next_chunk_end_respects_char_boundaries() {
        let full = "héllo wörld";
        let end = next_chunk_end(full, 0);
        assert_eq!(&full[..end], "hél");
        assert_eq!(next_chunk_end(full, full.len()), full.len());
    }

    #[test]
    fn test_reply_for_counts_words() {
        let reply = reply_for("two words");
        assert!(reply.contains("2 word(s)"));
        assert!(reply.contains("9 character(s)"));
    }
}
