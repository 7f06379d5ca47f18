//! Inline parser: emphasis and `[[link][title]]` markup.
//!
//! Two passes over one logical text run. The emphasis pass finds marked
//! spans (`*bold*`, `/italic/`, ...) whose borders satisfy the pre/post
//! character rules; every stretch of text between them goes through the
//! link pass. Link titles re-enter the emphasis pass.
//!
//! Each scan keeps its own cursor, so the recursion for link titles cannot
//! disturb the outer scan.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Node, NodeKind};

/// Characters that may not start or end an emphasis body.
const BORDER_FORBIDDEN: &str = r#"[^ \t\r\n,"']"#;

/// Emphasis markers in the order of their body groups.
const MARKERS: [char; 6] = ['*', '/', '_', '=', '~', '+'];

/// `pre marker body marker post`, one alternative per marker since the
/// closing marker must equal the opening one.
///
/// Groups: 1 = pre, 2..=7 = body per marker, 8 = post.
static EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    let body = format!(
        "({b}|{b}(?s:.)*?{b})",
        b = BORDER_FORBIDDEN
    );
    let alternatives: Vec<String> = MARKERS
        .iter()
        .map(|m| {
            let m = regex::escape(&m.to_string());
            format!("{m}{body}{m}")
        })
        .collect();
    let pattern = format!(
        r#"(^|[ \t('"]|\r?\n)(?:{})([- \t.,:!?;'")]|$|\r?\n)"#,
        alternatives.join("|")
    );
    Regex::new(&pattern).expect("emphasis pattern must compile")
});

/// `[[src]]` or `[[src][title]]`.
static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^\]]*)\](?:\[([^\]]*)\])?\]").expect("link pattern must compile")
});

/// Parse a text run into an inline node.
///
/// Returns the single resulting node when there is exactly one, otherwise an
/// inline container. Empty input yields an empty text node.
pub fn parse_inline(text: &str) -> Node {
    let mut nodes = InlineScanner::new(text).parse_emphasis();
    match nodes.len() {
        0 => Node::text(""),
        1 => nodes.swap_remove(0),
        _ => Node::with_children(NodeKind::InlineContainer, nodes),
    }
}

/// Map an emphasis marker to its node kind.
pub fn emphasis_kind(marker: char) -> Option<NodeKind> {
    match marker {
        '*' => Some(NodeKind::Bold),
        '/' => Some(NodeKind::Italic),
        '_' => Some(NodeKind::Underline),
        '=' | '~' => Some(NodeKind::Code),
        '+' => Some(NodeKind::Dashed),
        _ => None,
    }
}

struct InlineScanner<'t> {
    text: &'t str,
    nodes: Vec<Node>,
}

impl<'t> InlineScanner<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            nodes: Vec::with_capacity(4),
        }
    }

    fn parse_emphasis(mut self) -> Vec<Node> {
        let text = self.text;
        let mut previous_last = 0;
        let mut search_from = 0;

        while let Some(caps) = EMPHASIS.captures_at(text, search_from) {
            let (Some(pre), Some(post)) = (caps.get(1), caps.get(8)) else {
                break;
            };
            let Some((index, body)) = (2..=7).find_map(|i| caps.get(i).map(|m| (i - 2, m))) else {
                break;
            };

            self.parse_link(&text[previous_last..pre.end()]);

            let kind = emphasis_kind(MARKERS[index]).unwrap_or(NodeKind::InlineContainer);
            self.nodes
                .push(Node::with_children(kind, vec![Node::text(body.as_str())]));

            // The post character stays available as the next match's pre character.
            previous_last = post.start();
            search_from = post.start();
        }

        self.parse_link(&text[previous_last..]);
        self.nodes
    }

    fn parse_link(&mut self, fragment: &str) {
        let mut previous_last = 0;

        for caps in LINK.captures_iter(fragment) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            self.push_text(&fragment[previous_last..whole.start()]);

            let src = caps.get(1).map_or("", |m| m.as_str());
            let label = match caps.get(2).map(|m| m.as_str()) {
                Some(title) if !title.is_empty() => parse_inline(title),
                _ => Node::text(src),
            };
            self.nodes.push(Node::with_children(
                NodeKind::Link {
                    src: src.to_string(),
                },
                vec![label],
            ));

            previous_last = whole.end();
        }

        self.push_text(&fragment[previous_last..]);
    }

    #[inline]
    fn push_text(&mut self, value: &str) {
        if !value.is_empty() {
            self.nodes.push(Node::text(value));
        }
    }
}
