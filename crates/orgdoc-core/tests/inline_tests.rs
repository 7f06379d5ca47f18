//! Integration tests for the inline parser

use orgdoc_core::inline::{emphasis_kind, parse_inline};
use orgdoc_core::{Node, NodeKind};

fn wrap(kind: NodeKind, text: &str) -> Node {
    Node::with_children(kind, vec![Node::text(text)])
}

fn link(src: &str, label: Node) -> Node {
    Node::with_children(
        NodeKind::Link {
            src: src.to_string(),
        },
        vec![label],
    )
}

// ============================================================================
// Plain Text Tests
// ============================================================================

#[test]
fn test_plain_text_is_single_node() {
    assert_eq!(parse_inline("just words"), Node::text("just words"));
}

#[test]
fn test_empty_text() {
    assert_eq!(parse_inline(""), Node::text(""));
}

#[test]
fn test_marker_inside_word_is_literal() {
    assert_eq!(parse_inline("a*b*c"), Node::text("a*b*c"));
    assert_eq!(parse_inline("snake_case_name"), Node::text("snake_case_name"));
}

#[test]
fn test_body_cannot_start_with_space() {
    assert_eq!(parse_inline("x * y * z"), Node::text("x * y * z"));
}

// ============================================================================
// Emphasis Tests
// ============================================================================

#[test]
fn test_emphasis_markers() {
    assert_eq!(emphasis_kind('*'), Some(NodeKind::Bold));
    assert_eq!(emphasis_kind('/'), Some(NodeKind::Italic));
    assert_eq!(emphasis_kind('_'), Some(NodeKind::Underline));
    assert_eq!(emphasis_kind('='), Some(NodeKind::Code));
    assert_eq!(emphasis_kind('~'), Some(NodeKind::Code));
    assert_eq!(emphasis_kind('+'), Some(NodeKind::Dashed));
    assert_eq!(emphasis_kind('x'), None);
}

#[test]
fn test_whole_text_bold() {
    assert_eq!(parse_inline("*bold*"), wrap(NodeKind::Bold, "bold"));
}

#[test]
fn test_single_character_body() {
    assert_eq!(parse_inline("/a/"), wrap(NodeKind::Italic, "a"));
}

#[test]
fn test_emphasis_between_text() {
    let node = parse_inline("a *b* c");
    assert_eq!(node.kind, NodeKind::InlineContainer);
    assert_eq!(
        node.children(),
        &[
            Node::text("a "),
            wrap(NodeKind::Bold, "b"),
            Node::text(" c"),
        ]
    );
}

#[test]
fn test_adjacent_emphasis_share_border() {
    let node = parse_inline("*a* *b*");
    assert_eq!(
        node.children(),
        &[
            wrap(NodeKind::Bold, "a"),
            Node::text(" "),
            wrap(NodeKind::Bold, "b"),
        ]
    );
}

#[test]
fn test_every_emphasis_kind() {
    let node = parse_inline("/i/ _u_ =c= ~v~ +d+");
    let kinds: Vec<&str> = node
        .children()
        .iter()
        .filter(|child| child.value().is_none())
        .map(|child| child.type_name())
        .collect();
    assert_eq!(kinds, vec!["italic", "underline", "code", "code", "dashed"]);
}

#[test]
fn test_emphasis_before_punctuation() {
    let node = parse_inline("see *this*, then");
    assert_eq!(
        node.children(),
        &[
            Node::text("see "),
            wrap(NodeKind::Bold, "this"),
            Node::text(", then"),
        ]
    );
}

#[test]
fn test_emphasis_inside_parentheses() {
    let node = parse_inline("(*x*)");
    assert_eq!(
        node.children(),
        &[Node::text("("), wrap(NodeKind::Bold, "x"), Node::text(")")]
    );
}

#[test]
fn test_emphasis_body_with_spaces() {
    assert_eq!(
        parse_inline("*several words here*"),
        wrap(NodeKind::Bold, "several words here")
    );
}

#[test]
fn test_emphasis_body_is_not_rescanned() {
    assert_eq!(parse_inline("*a /b/ c*"), wrap(NodeKind::Bold, "a /b/ c"));
}

#[test]
fn test_emphasis_spans_lines() {
    let node = parse_inline("start *multi\nline* end");
    assert_eq!(node.children()[1], wrap(NodeKind::Bold, "multi\nline"));
}

#[test]
fn test_mismatched_markers_are_literal() {
    assert_eq!(parse_inline("*a/"), Node::text("*a/"));
}

// ============================================================================
// Link Tests
// ============================================================================

#[test]
fn test_link_without_title() {
    assert_eq!(
        parse_inline("[[http://example.com]]"),
        link("http://example.com", Node::text("http://example.com"))
    );
}

#[test]
fn test_link_with_title() {
    assert_eq!(
        parse_inline("[[http://example.com][Example]]"),
        link("http://example.com", Node::text("Example"))
    );
}

#[test]
fn test_link_title_gets_emphasis() {
    assert_eq!(
        parse_inline("[[x.html][*strong* title]]"),
        link(
            "x.html",
            Node::with_children(
                NodeKind::InlineContainer,
                vec![wrap(NodeKind::Bold, "strong"), Node::text(" title")]
            )
        )
    );
}

#[test]
fn test_link_between_text() {
    let node = parse_inline("go to [[a.html][A]] now");
    assert_eq!(
        node.children(),
        &[
            Node::text("go to "),
            link("a.html", Node::text("A")),
            Node::text(" now"),
        ]
    );
}

#[test]
fn test_links_and_emphasis_mixed() {
    let node = parse_inline("[[a][A]] and *b*");
    assert_eq!(
        node.children(),
        &[
            link("a", Node::text("A")),
            Node::text(" and "),
            wrap(NodeKind::Bold, "b"),
        ]
    );
}

#[test]
fn test_empty_title_falls_back_to_src() {
    assert_eq!(
        parse_inline("[[target][]]"),
        link("target", Node::text("target"))
    );
}

#[test]
fn test_single_brackets_are_text() {
    assert_eq!(parse_inline("[not a link]"), Node::text("[not a link]"));
}
