//! Segment extraction and routing through the public API
//!
//! Run: cargo test --test segment_tests

use chat_window::content::{
    extract, ContentRouter, DisclosureProps, RenderBlock, Segment, DEFAULT_REASONING_TITLE,
};

const SINGLE_ANNOTATION: &str = "intro line
<reasoning title=\"Step 1\" expanded=\"true\">
inner line 1
inner line 2
</reasoning>
outro line";

/// Rebuild the input from segments, re-inserting delimiter lines
fn reconstruct(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.content.clone(),
            Segment::Annotation(annotation) => {
                let attrs: String = annotation
                    .attributes
                    .iter()
                    .map(|(k, v)| format!(" {}=\"{}\"", k, v))
                    .collect();
                let mut block = format!("<{}{}>\n", annotation.tag_name, attrs);
                if !annotation.body.is_empty() {
                    block.push_str(&annotation.body);
                    block.push('\n');
                }
                block.push_str(&format!("</{}>", annotation.tag_name));
                block
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// EXTRACTION
// ============================================================================

#[test]
fn test_well_formed_single_annotation() {
    let segments = extract(SINGLE_ANNOTATION);
    assert_eq!(
        segments,
        vec![
            Segment::text("intro line"),
            Segment::annotation(
                "reasoning",
                [("title", "Step 1"), ("expanded", "true")],
                "inner line 1\ninner line 2",
            ),
            Segment::text("outro line"),
        ]
    );
}

#[test]
fn test_unterminated_tag_loses_nothing() {
    let segments = extract("<reasoning>\nhello");
    assert_eq!(segments, vec![Segment::text("<reasoning>\nhello")]);
}

#[test]
fn test_two_annotations_separated_by_blank_line() {
    let input = "<reasoning>\na\n</reasoning>\n   \n<reasoning>\nb\n</reasoning>";
    let segments = extract(input);
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| !s.is_text()));
    assert_eq!(segments[0].as_annotation().unwrap().body, "a");
    assert_eq!(segments[1].as_annotation().unwrap().body, "b");
}

#[test]
fn test_unknown_tag_parses_structurally() {
    let segments = extract("<custom>\nbody\n</custom>");
    assert_eq!(
        segments,
        vec![Segment::annotation(
            "custom",
            std::iter::empty::<(&str, &str)>(),
            "body"
        )]
    );
}

#[test]
fn test_duplicate_attribute_keys_last_wins() {
    let segments = extract("<reasoning title=\"first\" title='second'>\nx\n</reasoning>");
    let annotation = segments[0].as_annotation().unwrap();
    assert_eq!(annotation.attribute("title"), Some("second"));
    assert_eq!(annotation.attributes.len(), 1);
}

#[test]
fn test_extract_is_idempotent() {
    assert_eq!(extract(SINGLE_ANNOTATION), extract(SINGLE_ANNOTATION));
}

#[test]
fn test_segments_reconstruct_input() {
    let input = "intro line\n<reasoning expanded=\"true\" title=\"Step 1\">\ninner\n</reasoning>\noutro line";
    assert_eq!(reconstruct(&extract(input)), input);
}

#[test]
fn test_reconstruction_drops_only_blank_runs() {
    let input = "<reasoning>\na\n</reasoning>\n\n\n<note>\n</note>";
    assert_eq!(
        reconstruct(&extract(input)),
        "<reasoning>\na\n</reasoning>\n<note>\n</note>"
    );
}

// ============================================================================
// ROUTING
// ============================================================================

#[test]
fn test_missing_attributes_route_to_defaults() {
    let blocks = ContentRouter::default().route_content("<reasoning>\nthinking\n</reasoning>");
    assert_eq!(
        blocks,
        vec![RenderBlock::Disclosure(DisclosureProps {
            title: DEFAULT_REASONING_TITLE.to_string(),
            content: "thinking".to_string(),
            default_expanded: false,
        })]
    );
}

#[test]
fn test_unknown_tag_renders_nothing_and_keeps_neighbours() {
    let input = "before\n<custom>\nbody\n</custom>\nafter";
    let blocks = ContentRouter::default().route_content(input);
    assert_eq!(
        blocks,
        vec![
            RenderBlock::Markdown("before".to_string()),
            RenderBlock::Markdown("after".to_string()),
        ]
    );
}

#[test]
fn test_single_annotation_routes_in_order() {
    let blocks = ContentRouter::default().route_content(SINGLE_ANNOTATION);
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0], RenderBlock::Markdown("intro line".to_string()));
    match &blocks[1] {
        RenderBlock::Disclosure(props) => {
            assert_eq!(props.title, "Step 1");
            assert!(props.default_expanded);
            assert_eq!(props.content, "inner line 1\ninner line 2");
        }
        other => panic!("expected disclosure, got {:?}", other),
    }
    assert_eq!(blocks[2], RenderBlock::Markdown("outro line".to_string()));
}
