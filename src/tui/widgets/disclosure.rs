//! Disclosure widget for collapsible annotation blocks
//!
//! A disclosure shows a one-line header (`▶ title` collapsed, `▼ title`
//! expanded) and, when expanded, its content verbatim behind a left rule.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use uuid::Uuid;

use super::markdown::wrap_lines;
use crate::content::DisclosureProps;
use crate::tui::theme::Theme;

const COLLAPSED_ICON: &str = "▶ ";
const EXPANDED_ICON: &str = "▼ ";
const RULE: &str = "│ ";
const RULE_WIDTH: usize = 2;

/// Expansion state of a single disclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureState {
    expanded: bool,
}

impl DisclosureState {
    pub fn new(default_expanded: bool) -> Self {
        Self {
            expanded: default_expanded,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flip visibility
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }
}

impl From<&DisclosureProps> for DisclosureState {
    fn from(props: &DisclosureProps) -> Self {
        Self::new(props.default_expanded)
    }
}

/// Identifies a disclosure: owning message and block index within it
pub type DisclosureKey = (Uuid, usize);

// ============================================================================
// Disclosure states
// ============================================================================

/// Expansion states for every disclosure in the conversation
///
/// Only toggled blocks are stored; anything else reports its own default.
#[derive(Debug, Default, Clone)]
pub struct DisclosureStates {
    states: HashMap<DisclosureKey, DisclosureState>,
}

impl DisclosureStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored state, or the block's default if it was never toggled
    pub fn get(&self, key: DisclosureKey, default_expanded: bool) -> DisclosureState {
        self.states
            .get(&key)
            .copied()
            .unwrap_or_else(|| DisclosureState::new(default_expanded))
    }

    pub fn is_expanded(&self, key: DisclosureKey, default_expanded: bool) -> bool {
        self.get(key, default_expanded).is_expanded()
    }

    /// Toggle a block; returns the new expansion state
    pub fn toggle(&mut self, key: DisclosureKey, default_expanded: bool) -> bool {
        let mut state = self.get(key, default_expanded);
        state.toggle();
        self.states.insert(key, state);
        state.is_expanded()
    }

    pub fn set(&mut self, key: DisclosureKey, expanded: bool) {
        self.states.insert(key, DisclosureState::new(expanded));
    }

    /// Forget every state belonging to a message
    pub fn remove_message(&mut self, message_id: Uuid) {
        self.states.retain(|(id, _), _| *id != message_id);
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

// ============================================================================
// Widget
// ============================================================================

/// Renders a disclosure block
pub struct Disclosure<'a> {
    props: &'a DisclosureProps,
    state: DisclosureState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> Disclosure<'a> {
    pub fn new(props: &'a DisclosureProps, theme: &'a Theme) -> Self {
        Self {
            props,
            state: DisclosureState::from(props),
            focused: false,
            theme,
        }
    }

    /// Override the expansion state
    pub fn state(mut self, state: DisclosureState) -> Self {
        self.state = state;
        self
    }

    /// Set focused state
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn header_line(&self) -> Line<'static> {
        let mut style = Style::default().fg(self.theme.reasoning_fg);
        if self.focused {
            style = style.add_modifier(Modifier::BOLD);
        }
        let icon = if self.state.is_expanded() {
            EXPANDED_ICON
        } else {
            COLLAPSED_ICON
        };
        Line::from(vec![
            Span::styled(icon, style),
            Span::styled(self.props.title.clone(), style),
        ])
    }

    /// Header plus (when expanded) content lines, wrapped to `width`
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = wrap_lines(vec![self.header_line()], width);
        if !self.state.is_expanded() {
            return lines;
        }

        let rule_style = Style::default().fg(self.theme.text_muted);
        let content_style = Style::default()
            .fg(self.theme.text_secondary)
            .add_modifier(Modifier::ITALIC);
        let inner = width.saturating_sub(RULE_WIDTH).max(1);

        let content: Vec<Line<'static>> = self
            .props
            .content
            .split('\n')
            .map(|line| Line::from(Span::styled(line.to_string(), content_style)))
            .collect();
        for line in wrap_lines(content, inner) {
            let mut spans = vec![Span::styled(RULE, rule_style)];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl Widget for Disclosure<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines(area.width as usize);
        Paragraph::new(lines).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::markdown::lines_to_strings;

    fn props(expanded: bool) -> DisclosureProps {
        DisclosureProps {
            title: "Plan".to_string(),
            content: "step one\nstep two".to_string(),
            default_expanded: expanded,
        }
    }

    #[test]
    fn test_collapsed_shows_only_header() {
        let theme = Theme::default();
        let props = props(false);
        let lines = lines_to_strings(&Disclosure::new(&props, &theme).lines(40));
        assert_eq!(lines, vec!["▶ Plan"]);
    }

    #[test]
    fn test_expanded_shows_content_behind_rule() {
        let theme = Theme::default();
        let props = props(true);
        let lines = lines_to_strings(&Disclosure::new(&props, &theme).lines(40));
        assert_eq!(lines, vec!["▼ Plan", "│ step one", "│ step two"]);
    }

    #[test]
    fn test_content_is_not_markdown() {
        let theme = Theme::default();
        let props = DisclosureProps {
            title: "T".to_string(),
            content: "**raw**".to_string(),
            default_expanded: true,
        };
        let lines = lines_to_strings(&Disclosure::new(&props, &theme).lines(40));
        assert_eq!(lines[1], "│ **raw**");
    }

    #[test]
    fn test_state_toggle() {
        let mut state = DisclosureState::new(false);
        state.toggle();
        assert!(state.is_expanded());
        state.toggle();
        assert!(!state.is_expanded());
    }

    #[test]
    fn test_states_fall_back_to_default() {
        let id = Uuid::new_v4();
        let mut states = DisclosureStates::new();
        assert!(states.is_expanded((id, 0), true));
        assert!(!states.is_expanded((id, 0), false));

        assert!(states.toggle((id, 1), false));
        assert!(states.is_expanded((id, 1), false));
        assert_eq!(states.len(), 1);
    }

    #[test]
    fn test_remove_message_forgets_its_blocks() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut states = DisclosureStates::new();
        states.set((a, 0), true);
        states.set((a, 2), true);
        states.set((b, 0), true);

        states.remove_message(a);
        assert_eq!(states.len(), 1);
        assert!(!states.is_expanded((a, 0), false));
        assert!(states.is_expanded((b, 0), false));
    }
}
