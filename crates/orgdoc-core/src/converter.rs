//! Tree-walking converter framework.
//!
//! A [`Converter`] supplies one render hook per node type plus three
//! target-specific primitives (escaping, bare-URL links, subscripts). The
//! walk itself lives here: it renders children before parents, numbers
//! headers, resolves auxiliary attributes from preceding directive siblings,
//! builds the table of contents and assembles a [`RenderResult`].
//!
//! All per-conversion state lives in a session created by [`convert`], so
//! one converter value can serve any number of conversions, concurrently.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::ast::{Directive, Node, NodeKind};
use crate::document::{nest_by_level, Document, Outline, SectionCounter};
use crate::options::{ExportOptions, SubscriptMode, TocSetting};

pub mod html;
pub mod wiki;

pub use html::HtmlConverter;
pub use wiki::WikiConverter;

/// Title used when the document has none.
pub const UNTITLED: &str = "Untitled";

/// `name_{sub}`
static SUBSCRIPT_BRACES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([^_ \t]*)_\{([^}]*)\}").expect("subscript pattern must compile")
});

/// `name_sub`
static SUBSCRIPT_GREEDY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([^_ \t]*)_([^_]*)\b").expect("subscript pattern must compile")
});

/// Bare URLs: scheme, `www.` prefix, or `domain.tld/`.
static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:https?://|www[0-9]{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)",
        r"(?:[^\s()<>]+|\(([^\s()<>]+|(\([^\s()<>]+\)))*\))+",
        r#"(?:\(([^\s()<>]+|(\([^\s()<>]+\)))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’])"#,
    ))
    .expect("url pattern must compile")
});

/// Image link targets, matched after stripping any query string.
static IMAGE_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(bmp|png|jpeg|jpg|gif|tiff|tif|xbm|xpm|pbm|pgm|ppm)$")
        .expect("image pattern must compile")
});

/// Whether a link target points at an image.
pub fn is_image_url(src: &str) -> bool {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    IMAGE_EXTENSION.is_match(path)
}

/// Task marker at the start of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Todo,
    Done,
}

impl TaskStatus {
    /// Detect a leading `TODO ` or `DONE `.
    pub fn detect(text: &str) -> Option<Self> {
        if text.starts_with("TODO ") {
            Some(TaskStatus::Todo)
        } else if text.starts_with("DONE ") {
            Some(TaskStatus::Done)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
        }
    }
}

/// Conversion-wide settings and the position-dependent flags of the walk.
#[derive(Clone, Copy)]
pub struct RenderContext<'r> {
    pub document: &'r Document,
    pub export: &'r ExportOptions,
    /// Resolved header offset.
    pub header_offset: usize,
    /// Inside a code span, preformatted block or verbatim directive.
    pub inside_code: bool,
    /// Inside a link label.
    pub inside_link: bool,
    /// Number of enclosing lists.
    pub list_depth: usize,
    /// Whether the innermost enclosing list is ordered.
    pub in_ordered_list: bool,
}

/// What a render hook gets to see of a node.
pub struct NodeView<'r> {
    pub node: &'r Node,
    /// Children, already rendered and concatenated.
    pub child_text: String,
    /// Auxiliary attribute text from preceding directive lines, may be empty.
    pub aux: String,
    pub ctx: RenderContext<'r>,
}

/// One entry of a rendered table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TocItem {
    pub level: usize,
    pub section_number: String,
    /// Escaped plain text of the header.
    pub text: String,
    pub children: Vec<TocItem>,
}

impl Outline for TocItem {
    fn level(&self) -> usize {
        self.level
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

/// Output of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered title text.
    pub title: String,
    /// Title wrapped in target markup.
    pub title_markup: String,
    /// Rendered document body.
    pub content: String,
    pub toc: Vec<TocItem>,
    pub toc_markup: String,
    combined: String,
}

impl RenderResult {
    /// Title, table of contents and body laid out by the converter.
    pub fn combined(&self) -> &str {
        &self.combined
    }
}

impl fmt::Display for RenderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.combined)
    }
}

/// A rendering target.
///
/// Required methods are the ones with no meaningful target-independent
/// behaviour. Hooks receive the node with its children already rendered.
pub trait Converter: Send + Sync {
    /// Short name, e.g. `html`.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    /// Output file extensions, without the dot.
    fn file_extensions(&self) -> &'static [&'static str];

    /// Header offset when the export options leave it unset.
    fn default_header_offset(&self) -> usize;

    /// Name of the one-shot directive (e.g. `attr_html:`) whose values
    /// become auxiliary attributes of the following sibling.
    fn aux_attribute_directive(&self) -> Option<&'static str> {
        None
    }

    // ========================================================================
    // Target primitives
    // ========================================================================

    fn escape_special_chars(&self, text: &str, ctx: &RenderContext<'_>) -> String;

    /// Render a bare URL found in text.
    fn make_link(&self, url: &str) -> String;

    fn make_subscript(&self, body: &str, subscript: &str) -> String;

    // ========================================================================
    // Node hooks
    // ========================================================================

    fn convert_header(
        &self,
        view: &NodeView<'_>,
        level: usize,
        task_status: Option<TaskStatus>,
        section_number: Option<&str>,
    ) -> String;

    fn convert_ordered_list(&self, view: &NodeView<'_>) -> String;

    fn convert_unordered_list(&self, view: &NodeView<'_>) -> String;

    fn convert_definition_list(&self, view: &NodeView<'_>) -> String;

    /// `term` is rendered; the definition is `view.child_text`.
    fn convert_definition_item(&self, view: &NodeView<'_>, term: &str) -> String;

    fn convert_list_item(&self, view: &NodeView<'_>) -> String;

    fn convert_paragraph(&self, view: &NodeView<'_>) -> String;

    fn convert_preformatted(&self, view: &NodeView<'_>) -> String;

    fn convert_table(&self, view: &NodeView<'_>) -> String;

    fn convert_table_row(&self, view: &NodeView<'_>) -> String;

    fn convert_table_header(&self, view: &NodeView<'_>) -> String;

    fn convert_table_cell(&self, view: &NodeView<'_>) -> String;

    fn convert_horizontal_rule(&self, view: &NodeView<'_>) -> String;

    fn convert_inline_container(&self, view: &NodeView<'_>) -> String {
        view.child_text.clone()
    }

    fn convert_bold(&self, view: &NodeView<'_>) -> String;

    fn convert_italic(&self, view: &NodeView<'_>) -> String;

    fn convert_underline(&self, view: &NodeView<'_>) -> String;

    fn convert_code(&self, view: &NodeView<'_>) -> String;

    fn convert_dashed(&self, view: &NodeView<'_>) -> String;

    fn convert_link(&self, view: &NodeView<'_>, src: &str) -> String;

    fn convert_quote(&self, view: &NodeView<'_>, directive: &Directive) -> String;

    fn convert_example(&self, view: &NodeView<'_>, directive: &Directive) -> String;

    fn convert_src(&self, view: &NodeView<'_>, directive: &Directive) -> String;

    /// `#+HTML:` lines and `#+begin_html` blocks.
    fn convert_html(&self, view: &NodeView<'_>, directive: &Directive) -> String {
        if directive.name == "html:" {
            directive.raw_value.clone()
        } else {
            raw_text_children(view.node)
        }
    }

    /// Wrap the output of any node; the default returns it unchanged.
    fn post_process(&self, _view: &NodeView<'_>, text: String) -> String {
        text
    }

    // ========================================================================
    // Document layout
    // ========================================================================

    fn convert_title(&self, title: &str, ctx: &RenderContext<'_>) -> String;

    /// Render the table of contents; called only when the document asks for one.
    fn convert_toc(&self, toc: &[TocItem], ctx: &RenderContext<'_>) -> String;

    /// Combine the rendered parts into the full output.
    fn assemble(&self, title_markup: &str, toc_markup: &str, content: &str) -> String;

    // ========================================================================
    // Shared helpers
    // ========================================================================

    /// Escaped concatenation of the text leaves under `node`.
    fn node_text_content(&self, node: &Node, ctx: &RenderContext<'_>) -> String {
        match &node.kind {
            NodeKind::Text { value } => self.escape_special_chars(value, ctx),
            _ => node
                .children()
                .iter()
                .map(|child| self.node_text_content(child, ctx))
                .collect(),
        }
    }

    /// Escape, then rewrite subscripts and bare URLs as the options allow.
    fn convert_text(&self, text: &str, ctx: &RenderContext<'_>) -> String {
        let mut out = self.escape_special_chars(text, ctx);
        if ctx.inside_code {
            return out;
        }
        if !ctx.export.suppress_sub_script_handling {
            out = make_subscripts(self, &out, ctx.document.options.subscript_mode());
        }
        if !ctx.export.suppress_auto_link && !ctx.inside_link {
            out = link_urls(self, &out);
        }
        out
    }
}

/// Raw values of the text children, newline-joined.
pub fn raw_text_children(node: &Node) -> String {
    node.children()
        .iter()
        .filter_map(Node::value)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite subscript patterns with the converter's subscript markup.
pub fn make_subscripts<C: Converter + ?Sized>(converter: &C, text: &str, mode: SubscriptMode) -> String {
    let pattern = match mode {
        SubscriptMode::Disabled => return text.to_string(),
        SubscriptMode::Braces => &*SUBSCRIPT_BRACES,
        SubscriptMode::Greedy => &*SUBSCRIPT_GREEDY,
    };
    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let body = caps.get(1).map_or("", |m| m.as_str());
            let subscript = caps.get(2).map_or("", |m| m.as_str());
            converter.make_subscript(body, subscript)
        })
        .into_owned()
}

/// Rewrite bare URLs with the converter's link markup.
pub fn link_urls<C: Converter + ?Sized>(converter: &C, text: &str) -> String {
    URL.replace_all(text, |caps: &Captures<'_>| {
        let matched = caps.get(0).map_or("", |m| m.as_str());
        if matched.contains("://") {
            converter.make_link(matched)
        } else {
            converter.make_link(&format!("http://{}", matched))
        }
    })
    .into_owned()
}

/// Convert a document with the given converter.
pub fn convert<C: Converter + ?Sized>(
    converter: &C,
    document: &Document,
    export: &ExportOptions,
) -> RenderResult {
    log::debug!(
        "converting document to {}: {} top-level nodes",
        converter.name(),
        document.nodes.len()
    );
    Session::new(converter, document, export).run()
}

impl Document {
    /// Convert this document, see [`convert`].
    pub fn convert<C: Converter + ?Sized>(
        &self,
        converter: &C,
        export: &ExportOptions,
    ) -> RenderResult {
        convert(converter, self, export)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    inside_code: bool,
    inside_link: bool,
    list_depth: usize,
    in_ordered_list: bool,
}

struct Session<'r, C: ?Sized> {
    converter: &'r C,
    document: &'r Document,
    export: &'r ExportOptions,
    header_offset: usize,
    sections: SectionCounter,
    headers: Vec<TocItem>,
}

impl<'r, C: Converter + ?Sized> Session<'r, C> {
    fn new(converter: &'r C, document: &'r Document, export: &'r ExportOptions) -> Self {
        Self {
            converter,
            document,
            export,
            header_offset: export
                .header_offset
                .unwrap_or_else(|| converter.default_header_offset()),
            sections: SectionCounter::new(),
            headers: Vec::new(),
        }
    }

    fn context(&self, flags: Flags) -> RenderContext<'r> {
        RenderContext {
            document: self.document,
            export: self.export,
            header_offset: self.header_offset,
            inside_code: flags.inside_code,
            inside_link: flags.inside_link,
            list_depth: flags.list_depth,
            in_ordered_list: flags.in_ordered_list,
        }
    }

    fn run(mut self) -> RenderResult {
        let document = self.document;
        let ctx = self.context(Flags::default());

        let title = match &document.title {
            Some(title) => self.convert_node(title, String::new(), Flags::default(), false),
            None => UNTITLED.to_string(),
        };
        let title_markup = self.converter.convert_title(&title, &ctx);

        let content = self.convert_sequence(&document.nodes, None, Flags::default(), true);

        let toc = match document.options.toc() {
            TocSetting::Disabled => Vec::new(),
            TocSetting::Unlimited => nest_by_level(std::mem::take(&mut self.headers)),
            TocSetting::MaxLevel(max) => nest_by_level(
                std::mem::take(&mut self.headers)
                    .into_iter()
                    .filter(|header| header.level <= max),
            ),
        };
        let toc_markup = match document.options.toc() {
            TocSetting::Disabled => String::new(),
            _ => self.converter.convert_toc(&toc, &ctx),
        };

        let combined = self.converter.assemble(&title_markup, &toc_markup, &content);
        RenderResult {
            title,
            title_markup,
            content,
            toc,
            toc_markup,
            combined,
        }
    }

    /// Render siblings in order. Children of an inline container share the
    /// container's auxiliary attributes.
    fn convert_sequence(
        &mut self,
        nodes: &[Node],
        shared_aux: Option<&str>,
        flags: Flags,
        record_headers: bool,
    ) -> String {
        let mut out = String::new();
        for (i, node) in nodes.iter().enumerate() {
            let aux = match shared_aux {
                Some(aux) => aux.to_string(),
                None => self.aux_attributes(&nodes[..i]),
            };
            out.push_str(&self.convert_node(node, aux, flags, record_headers));
        }
        out
    }

    /// Values of the matching directives directly before a node, nearest first.
    fn aux_attributes(&self, preceding: &[Node]) -> String {
        let Some(name) = self.converter.aux_attribute_directive() else {
            return String::new();
        };
        let mut aux = String::new();
        for directive in preceding
            .iter()
            .rev()
            .map_while(|node| node.directive().filter(|d| d.name == name))
        {
            aux.push_str(&directive.raw_value);
            aux.push(' ');
        }
        aux
    }

    fn convert_node(&mut self, node: &Node, aux: String, flags: Flags, record_headers: bool) -> String {
        let is_list = matches!(
            node.kind,
            NodeKind::OrderedList | NodeKind::UnorderedList | NodeKind::DefinitionList
        );
        let child_flags = Flags {
            inside_code: flags.inside_code
                || matches!(node.kind, NodeKind::Code | NodeKind::Preformatted)
                || node.directive().is_some_and(Directive::is_verbatim),
            inside_link: flags.inside_link || matches!(node.kind, NodeKind::Link { .. }),
            list_depth: flags.list_depth + usize::from(is_list),
            in_ordered_list: if is_list {
                node.kind == NodeKind::OrderedList
            } else {
                flags.in_ordered_list
            },
        };
        let shared_aux = matches!(node.kind, NodeKind::InlineContainer).then_some(aux.as_str());
        let child_text =
            self.convert_sequence(node.children(), shared_aux, child_flags, record_headers);

        let view = NodeView {
            node,
            child_text,
            aux,
            ctx: self.context(flags),
        };
        let converter = self.converter;

        let text = match &node.kind {
            NodeKind::Header { level, .. } => {
                let task_status = TaskStatus::detect(&view.child_text);
                let section_number = record_headers.then(|| self.sections.advance(*level));
                let text = converter.convert_header(
                    &view,
                    *level,
                    task_status,
                    section_number.as_deref(),
                );
                if let Some(section_number) = section_number {
                    self.headers.push(TocItem {
                        level: *level,
                        section_number,
                        text: converter.node_text_content(node, &view.ctx),
                        children: Vec::new(),
                    });
                }
                text
            }
            NodeKind::OrderedList => converter.convert_ordered_list(&view),
            NodeKind::UnorderedList => converter.convert_unordered_list(&view),
            NodeKind::DefinitionList => converter.convert_definition_list(&view),
            NodeKind::ListElement { term: Some(term) } => {
                let term_text = self.convert_node(term, String::new(), flags, record_headers);
                converter.convert_definition_item(&view, &term_text)
            }
            NodeKind::ListElement { term: None } => converter.convert_list_item(&view),
            NodeKind::Paragraph => converter.convert_paragraph(&view),
            NodeKind::Preformatted => converter.convert_preformatted(&view),
            NodeKind::Table => converter.convert_table(&view),
            NodeKind::TableRow => converter.convert_table_row(&view),
            NodeKind::TableCell { is_header: true } => converter.convert_table_header(&view),
            NodeKind::TableCell { is_header: false } => converter.convert_table_cell(&view),
            NodeKind::HorizontalRule => converter.convert_horizontal_rule(&view),
            NodeKind::InlineContainer => converter.convert_inline_container(&view),
            NodeKind::Bold => converter.convert_bold(&view),
            NodeKind::Italic => converter.convert_italic(&view),
            NodeKind::Underline => converter.convert_underline(&view),
            NodeKind::Code => converter.convert_code(&view),
            NodeKind::Dashed => converter.convert_dashed(&view),
            NodeKind::Link { src } => converter.convert_link(&view, src),
            NodeKind::Directive(directive) => self.convert_directive(&view, directive),
            NodeKind::Text { value } => converter.convert_text(value, &view.ctx),
        };

        converter.post_process(&view, text)
    }

    fn convert_directive(&self, view: &NodeView<'_>, directive: &Directive) -> String {
        let converter = self.converter;
        match directive.name.as_str() {
            "quote" => converter.convert_quote(view, directive),
            "example" => converter.convert_example(view, directive),
            "src" => converter.convert_src(view, directive),
            "html" | "html:" => converter.convert_html(view, directive),
            name => match self.export.custom_directive_handlers.get(name) {
                Some(handler) => handler(directive, &view.child_text),
                None => view.child_text.clone(),
            },
        }
    }
}

/// Converters looked up by name or output extension.
pub struct ConverterRegistry {
    converters: HashMap<&'static str, Box<dyn Converter>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter, replacing any with the same name.
    pub fn register<C: Converter + 'static>(&mut self, converter: C) {
        self.converters.insert(converter.name(), Box::new(converter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Converter> {
        self.converters.get(name).map(|c| c.as_ref())
    }

    /// Find the converter producing files with the given extension.
    pub fn for_extension(&self, extension: &str) -> Option<&dyn Converter> {
        let extension = extension.trim_start_matches('.');
        self.converters
            .values()
            .find(|c| {
                c.file_extensions()
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .map(|c| c.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.converters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Registry with the HTML and wiki converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HtmlConverter);
        registry.register(WikiConverter);
        registry
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
