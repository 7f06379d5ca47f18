//! Document tree types.
//!
//! The tree is a single [`Node`] type whose [`NodeKind`] is a closed set of
//! variants. Containers always own a (possibly empty) child list and leaves
//! never gain one, so `children` is `None` exactly for leaves.

use std::fmt;

/// A block directive or one-shot directive line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Directive {
    /// Lowercased name, e.g. `src`, `quote`, `title:`, `attr_html:`.
    pub name: String,
    /// Space-separated words of the value not starting with `-`.
    pub arguments: Vec<String>,
    /// Space-separated words of the value starting with `-`.
    pub options: Vec<String>,
    /// Everything after the name, untouched.
    pub raw_value: String,
}

impl Directive {
    /// First argument, if any (the language of a `src` block).
    pub fn first_argument(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// Whether the body of this directive is captured verbatim.
    pub fn is_verbatim(&self) -> bool {
        matches!(self.name.as_str(), "src" | "example" | "html")
    }
}

/// Node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum NodeKind {
    /// `* title`; children are the inline title.
    Header {
        level: usize,
        /// Dotted number, set by [`crate::Document::attach_section_numbers`].
        section_number: Option<String>,
    },
    OrderedList,
    UnorderedList,
    DefinitionList,
    /// List item; `term` is set for definition list items.
    ListElement { term: Option<Box<Node>> },
    Paragraph,
    Preformatted,
    Table,
    TableRow,
    TableCell { is_header: bool },
    HorizontalRule,
    Directive(Directive),
    /// Transparent group produced by the inline parser.
    InlineContainer,
    Bold,
    Italic,
    Underline,
    Code,
    Dashed,
    Link { src: String },
    Text { value: String },
}

impl NodeKind {
    /// Stable type name used by the tree dump and logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Header { .. } => "header",
            NodeKind::OrderedList => "orderedList",
            NodeKind::UnorderedList => "unorderedList",
            NodeKind::DefinitionList => "definitionList",
            NodeKind::ListElement { .. } => "listElement",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Preformatted => "preformatted",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell { .. } => "tableCell",
            NodeKind::HorizontalRule => "horizontalRule",
            NodeKind::Directive(_) => "directive",
            NodeKind::InlineContainer => "inlineContainer",
            NodeKind::Bold => "bold",
            NodeKind::Italic => "italic",
            NodeKind::Underline => "underline",
            NodeKind::Code => "code",
            NodeKind::Dashed => "dashed",
            NodeKind::Link { .. } => "link",
            NodeKind::Text { .. } => "text",
        }
    }

    /// Whether nodes of this kind are created without a child list.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Text { .. } | NodeKind::HorizontalRule)
    }
}

/// A document tree element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: NodeKind,
    /// `None` for leaves.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub children: Option<Vec<Node>>,
    /// 1-based source line the node started on.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub line: Option<u32>,
}

impl Node {
    /// Create a node of the given kind; containers start with no children.
    pub fn new(kind: NodeKind) -> Self {
        let children = if kind.is_leaf() {
            None
        } else {
            Some(Vec::new())
        };
        Self {
            kind,
            children,
            line: None,
        }
    }

    /// Create a node without a child list, whatever its kind.
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            children: None,
            line: None,
        }
    }

    /// Create a container node with the given children.
    ///
    /// Leaf kinds ignore `children`.
    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        let mut node = Self::new(kind);
        if let Some(slot) = node.children.as_mut() {
            *slot = children;
        }
        node
    }

    /// Create a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    /// Attach the originating source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Type name, see [`NodeKind::name`].
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children, empty for leaves.
    #[inline]
    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Append a child. Returns `false` and drops `child` when `self` is a leaf.
    pub fn append_child(&mut self, child: Node) -> bool {
        match self.children.as_mut() {
            Some(children) => {
                children.push(child);
                true
            }
            None => false,
        }
    }

    /// Text value for text leaves.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    /// Directive payload for directive nodes.
    pub fn directive(&self) -> Option<&Directive> {
        match &self.kind {
            NodeKind::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    /// Concatenated values of every text leaf below this node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { value } => out.push_str(value),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize, index: Option<usize>) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match index {
            Some(i) => write!(f, "{}#{} <{}>", indent, i, self.type_name())?,
            None => write!(f, "{}<{}>", indent, self.type_name())?,
        }
        match &self.kind {
            NodeKind::Header {
                level,
                section_number,
            } => {
                write!(f, " level={}", level)?;
                if let Some(number) = section_number {
                    write!(f, " section={}", number)?;
                }
            }
            NodeKind::TableCell { is_header: true } => write!(f, " header")?,
            NodeKind::Directive(directive) => {
                write!(f, " {}", directive.name)?;
                if !directive.raw_value.is_empty() {
                    write!(f, " {:?}", directive.raw_value)?;
                }
            }
            NodeKind::Link { src } => write!(f, " {:?}", src)?,
            NodeKind::Text { value } => write!(f, " {:?}", value)?,
            _ => {}
        }
        if let Some(line) = self.line {
            write!(f, " @{}", line)?;
        }
        writeln!(f)?;

        if let NodeKind::ListElement { term: Some(term) } = &self.kind {
            writeln!(f, "{}  term:", indent)?;
            term.fmt_tree(f, depth + 2, None)?;
        }
        for (i, child) in self.children().iter().enumerate() {
            child.fmt_tree(f, depth + 1, Some(i))?;
        }
        Ok(())
    }
}

/// Indented tree dump, one node per line.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0, None)
    }
}
