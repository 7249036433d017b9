//! Message content parsing and routing
//!
//! `segment` partitions raw message text into text and annotation segments;
//! `router` decides how each segment is rendered.

pub mod router;
pub mod segment;

pub use router::{
    AnnotationRenderer, ContentRouter, DisclosureProps, ReasoningRenderer, RenderBlock,
    DEFAULT_REASONING_TITLE, REASONING_TAG,
};
pub use segment::{extract, segments, AnnotationSegment, Segment, Segments, TextSegment};
