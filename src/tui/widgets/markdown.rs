//! Markdown rendering for chat messages
//!
//! Converts markdown text to styled ratatui Lines/Spans. Tolerates partial
//! markdown: whatever pulldown-cmark makes of unfinished syntax is shown.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::tui::theme::Theme;

/// Hard-wrap lines at `max_width` display columns. A width of 0 disables
/// wrapping.
pub fn wrap_lines(lines: Vec<Line<'static>>, max_width: usize) -> Vec<Line<'static>> {
    if max_width == 0 {
        return lines;
    }

    let mut wrapped: Vec<Line<'static>> = Vec::new();

    for line in lines {
        if line.spans.is_empty() {
            wrapped.push(Line::from(""));
            continue;
        }

        let mut current_spans: Vec<Span<'static>> = Vec::new();
        let mut current_width = 0usize;

        for span in line.spans {
            let style = span.style;
            let mut chunk = String::new();

            for ch in span.content.chars() {
                let w = ch.width().unwrap_or(0);
                if current_width + w > max_width && current_width > 0 {
                    if !chunk.is_empty() {
                        current_spans.push(Span::styled(std::mem::take(&mut chunk), style));
                    }
                    wrapped.push(Line::from(std::mem::take(&mut current_spans)));
                    current_width = 0;
                }
                chunk.push(ch);
                current_width += w;
            }

            if !chunk.is_empty() {
                current_spans.push(Span::styled(chunk, style));
            }
        }

        wrapped.push(Line::from(current_spans));
    }

    wrapped
}

/// Event-to-line state for one render pass
struct MarkdownWriter<'t> {
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    in_code_block: bool,
    /// One entry per open list: `Some(next number)` for ordered lists
    list_stack: Vec<Option<u64>>,
    quote_depth: usize,
    table_cell: usize,
    in_table_head: bool,
}

impl<'t> MarkdownWriter<'t> {
    fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![Style::default().fg(theme.text_primary)],
            in_code_block: false,
            list_stack: Vec::new(),
            quote_depth: 0,
            table_cell: 0,
            in_table_head: false,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let style = f(self.style());
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    /// Prefix for block quotes
    fn quote_prefix(&self) -> Option<Span<'static>> {
        (self.quote_depth > 0).then(|| {
            Span::styled(
                "│ ".repeat(self.quote_depth),
                Style::default().fg(self.theme.text_muted),
            )
        })
    }

    fn push_line(&mut self, spans: Vec<Span<'static>>) {
        let mut all = Vec::with_capacity(spans.len() + 1);
        if let Some(prefix) = self.quote_prefix() {
            all.push(prefix);
        }
        all.extend(spans);
        self.lines.push(Line::from(all));
    }

    /// Emit the pending spans as a line, if any
    fn flush(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.push_line(spans);
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            return;
        }
        self.lines.push(Line::from(""));
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            let code_style = Style::default()
                .fg(self.theme.text_primary)
                .bg(self.theme.bg_code);
            for line in text.lines() {
                self.push_line(vec![Span::raw("  "), Span::styled(line.to_string(), code_style)]);
            }
        } else {
            let style = self.style();
            self.current_spans.push(Span::styled(text.to_string(), style));
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } => {
                let cyan = self.theme.cyan;
                self.push_style(|s| s.fg(cyan).add_modifier(Modifier::UNDERLINED));
            }
            Tag::Heading { .. } => {
                self.flush();
                let cyan = self.theme.cyan;
                self.push_style(|s| s.fg(cyan).add_modifier(Modifier::BOLD));
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.in_code_block = true;
                let fence = match kind {
                    CodeBlockKind::Fenced(lang) => format!("```{}", lang),
                    CodeBlockKind::Indented => "```".to_string(),
                };
                let muted = Style::default().fg(self.theme.text_muted);
                self.push_line(vec![Span::styled(fence, muted)]);
            }
            Tag::List(start) => {
                self.flush();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.current_spans.push(Span::raw("  ".repeat(depth)));
                self.current_spans
                    .push(Span::styled(marker, Style::default().fg(self.theme.cyan)));
            }
            Tag::BlockQuote => {
                self.flush();
                self.quote_depth += 1;
                let muted = self.theme.text_muted;
                self.push_style(|s| s.fg(muted).add_modifier(Modifier::ITALIC));
            }
            Tag::Table(_) => {
                self.flush();
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.table_cell = 0;
                self.push_style(|s| s.add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => {
                self.table_cell = 0;
            }
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.current_spans.push(Span::styled(
                        " │ ",
                        Style::default().fg(self.theme.text_muted),
                    ));
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            TagEnd::Heading { .. } => {
                self.pop_style();
                self.flush();
                self.blank_line();
            }
            TagEnd::Paragraph => {
                self.flush();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                let muted = Style::default().fg(self.theme.text_muted);
                self.push_line(vec![Span::styled("```", muted)]);
                self.blank_line();
            }
            TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.flush();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::BlockQuote => {
                self.flush();
                self.pop_style();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            TagEnd::TableHead => {
                self.flush();
                self.pop_style();
                self.in_table_head = false;
                let muted = Style::default().fg(self.theme.text_muted);
                self.push_line(vec![Span::styled("─".repeat(12), muted)]);
            }
            TagEnd::TableRow => self.flush(),
            TagEnd::Table => self.blank_line(),
            _ => {}
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                // Inline code: different background
                self.current_spans.push(Span::styled(
                    format!("`{}`", code),
                    Style::default().fg(self.theme.cyan).bg(self.theme.bg_code),
                ));
            }
            Event::SoftBreak => self.current_spans.push(Span::raw(" ")),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let muted = Style::default().fg(self.theme.text_muted);
                self.push_line(vec![Span::styled("─".repeat(24), muted)]);
                self.blank_line();
            }
            Event::TaskListMarker(done) => {
                let mark = if done { "[x] " } else { "[ ] " };
                self.current_spans
                    .push(Span::styled(mark, Style::default().fg(self.theme.cyan)));
            }
            Event::InlineHtml(html) => {
                // Keep tags such as <reasoning> visible instead of stripping them
                let style = self.style();
                self.current_spans.push(Span::styled(html.to_string(), style));
            }
            Event::Html(html) => {
                let style = self.style();
                for line in html.lines() {
                    self.current_spans
                        .push(Span::styled(line.to_string(), style));
                    self.flush();
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        // Remove trailing empty lines
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render markdown text to styled ratatui Lines
///
/// Supports:
/// - **Bold**, *italic* and ~~struck~~ text
/// - `Inline code` and code blocks with language hints
/// - Headings, block quotes and horizontal rules
/// - Bullet, numbered and task lists
/// - Tables (pipe separated)
/// - Links (shown as underlined text)
pub fn render_markdown(text: &str, theme: &Theme, max_width: usize) -> Vec<Line<'static>> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut writer = MarkdownWriter::new(theme);
    for event in Parser::new_ext(text, options) {
        writer.event(event);
    }
    wrap_lines(writer.finish(), max_width)
}

/// Flatten lines to plain strings (used by tests and the `render` command)
pub fn lines_to_strings(lines: &[Line<'_>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
        .collect()
}
