//! Content routing
//!
//! Maps extracted segments to render blocks. Text always goes to the
//! markdown renderer; annotations go to whichever renderer is registered
//! for their tag name. Annotations without a renderer render nothing and
//! never disturb the text around them.

use std::collections::HashMap;
use std::fmt;

use super::segment::{extract, AnnotationSegment, Segment};

/// Tag name of the built-in reasoning annotation
pub const REASONING_TAG: &str = "reasoning";

/// Title used when a reasoning annotation has no (or an empty) `title`
pub const DEFAULT_REASONING_TITLE: &str = "Reasoning";

/// Props for a collapsible disclosure view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureProps {
    pub title: String,
    pub content: String,
    pub default_expanded: bool,
}

/// A unit of content ready for a concrete renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderBlock {
    /// Markdown source for the markdown renderer
    Markdown(String),
    /// Collapsible block
    Disclosure(DisclosureProps),
}

/// Renders one kind of annotation
pub trait AnnotationRenderer: Send + Sync {
    /// Produce a block for the annotation, or `None` to render nothing
    fn render(&self, annotation: &AnnotationSegment) -> Option<RenderBlock>;
}

/// Renders `<reasoning>` annotations as disclosures
#[derive(Debug, Clone)]
pub struct ReasoningRenderer {
    default_title: String,
}

impl ReasoningRenderer {
    pub fn new(default_title: impl Into<String>) -> Self {
        Self {
            default_title: default_title.into(),
        }
    }
}

impl Default for ReasoningRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_REASONING_TITLE)
    }
}

impl AnnotationRenderer for ReasoningRenderer {
    fn render(&self, annotation: &AnnotationSegment) -> Option<RenderBlock> {
        let title = annotation
            .attribute("title")
            .filter(|title| !title.is_empty())
            .unwrap_or(&self.default_title);

        Some(RenderBlock::Disclosure(DisclosureProps {
            title: title.to_string(),
            content: annotation.body.clone(),
            default_expanded: annotation.attribute("expanded") == Some("true"),
        }))
    }
}

/// Tag-keyed registry of annotation renderers
pub struct ContentRouter {
    renderers: HashMap<String, Box<dyn AnnotationRenderer>>,
}

impl ContentRouter {
    /// Router with no annotation renderers; every annotation is skipped
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Router with the built-in `reasoning` renderer
    pub fn new(default_reasoning_title: impl Into<String>) -> Self {
        let mut router = Self::empty();
        router.register(
            REASONING_TAG,
            ReasoningRenderer::new(default_reasoning_title),
        );
        router
    }

    /// Register (or replace) the renderer for a tag name
    pub fn register(
        &mut self,
        tag_name: impl Into<String>,
        renderer: impl AnnotationRenderer + 'static,
    ) {
        self.renderers.insert(tag_name.into(), Box::new(renderer));
    }

    /// Whether annotations with this tag name produce output
    pub fn handles(&self, tag_name: &str) -> bool {
        self.renderers.contains_key(tag_name)
    }

    /// Route a single segment
    pub fn route_segment(&self, segment: &Segment) -> Option<RenderBlock> {
        match segment {
            Segment::Text(text) => Some(RenderBlock::Markdown(text.content.clone())),
            Segment::Annotation(annotation) => match self.renderers.get(&annotation.tag_name) {
                Some(renderer) => renderer.render(annotation),
                None => {
                    tracing::debug!(
                        tag = %annotation.tag_name,
                        "skipping annotation without a renderer"
                    );
                    None
                }
            },
        }
    }

    /// Route segments in order, dropping the ones that render nothing
    pub fn route(&self, segments: &[Segment]) -> Vec<RenderBlock> {
        segments
            .iter()
            .filter_map(|segment| self.route_segment(segment))
            .collect()
    }

    /// Extract and route raw message content
    pub fn route_content(&self, content: &str) -> Vec<RenderBlock> {
        self.route(&extract(content))
    }
}

impl Default for ContentRouter {
    fn default() -> Self {
        Self::new(DEFAULT_REASONING_TITLE)
    }
}

impl fmt::Debug for ContentRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ContentRouter").field("tags", &tags).finish()
    }
}
