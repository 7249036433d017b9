//! Rich content rendering
//!
//! Runs message text through the segment extractor and the content router,
//! then renders each block: markdown for text, a disclosure for reasoning.

use ratatui::text::Line;
use uuid::Uuid;

use super::disclosure::{Disclosure, DisclosureStates};
use super::markdown::render_markdown;
use crate::content::{ContentRouter, RenderBlock};
use crate::tui::theme::Theme;

/// Where a disclosure header landed in the rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureTarget {
    /// Index of the block among the routed blocks of the message
    pub block_index: usize,
    /// Line offset of the header within the rendered content
    pub line: usize,
    pub default_expanded: bool,
}

/// Rendered message content
#[derive(Debug, Clone, Default)]
pub struct RenderedContent {
    pub lines: Vec<Line<'static>>,
    pub disclosures: Vec<DisclosureTarget>,
}

/// Stateless renderer for message content
pub struct RichContent;

impl RichContent {
    /// Render `content` for the message `message_id` at `width` columns
    pub fn lines(
        content: &str,
        message_id: Uuid,
        states: &DisclosureStates,
        router: &ContentRouter,
        theme: &Theme,
        width: usize,
    ) -> RenderedContent {
        let mut rendered = RenderedContent::default();

        for (index, block) in router.route_content(content).iter().enumerate() {
            if !rendered.lines.is_empty() {
                rendered.lines.push(Line::from(""));
            }

            match block {
                RenderBlock::Markdown(source) => {
                    rendered
                        .lines
                        .extend(render_markdown(source, theme, width));
                }
                RenderBlock::Disclosure(props) => {
                    let state = states.get((message_id, index), props.default_expanded);
                    rendered.disclosures.push(DisclosureTarget {
                        block_index: index,
                        line: rendered.lines.len(),
                        default_expanded: props.default_expanded,
                    });
                    rendered
                        .lines
                        .extend(Disclosure::new(props, theme).state(state).lines(width));
                }
            }
        }

        rendered
    }

    /// Disclosure targets of `content` without laying out any lines
    pub fn disclosure_blocks(content: &str, router: &ContentRouter) -> Vec<(usize, bool)> {
        router
            .route_content(content)
            .iter()
            .enumerate()
            .filter_map(|(index, block)| match block {
                RenderBlock::Disclosure(props) => Some((index, props.default_expanded)),
                RenderBlock::Markdown(_) => None,
            })
            .collect()
    }
}
