//! Parsed document and table of contents.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use crate::ast::{Node, NodeKind};
use crate::options::Options;

/// Something that nests by header level.
pub trait Outline: Sized {
    fn level(&self) -> usize;
    fn children_mut(&mut self) -> &mut Vec<Self>;
}

/// Nest a flat, level-tagged sequence into a forest.
///
/// Each item becomes a child of the nearest preceding item with a strictly
/// smaller level, or a root if there is none. Sibling order is preserved.
pub fn nest_by_level<T: Outline>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut roots = Vec::new();
    let mut open: Vec<T> = Vec::new();

    for item in items {
        while open.last().is_some_and(|top| top.level() >= item.level()) {
            close_top(&mut open, &mut roots);
        }
        open.push(item);
    }
    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }
    roots
}

fn close_top<T: Outline>(open: &mut Vec<T>, roots: &mut Vec<T>) {
    if let Some(done) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children_mut().push(done),
            None => roots.push(done),
        }
    }
}

/// Running dotted section counter.
///
/// Produces the same numbers as walking the [`nest_by_level`] forest, one
/// header at a time.
#[derive(Debug, Clone, Default)]
pub struct SectionCounter {
    /// Open depths as `(level, count)`, shallowest first.
    open: Vec<(usize, usize)>,
}

impl SectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance for a header at `level` and return its number.
    pub fn advance(&mut self, level: usize) -> String {
        let mut closed_sibling = None;
        while let Some(&(top_level, count)) = self.open.last() {
            if top_level <= level {
                break;
            }
            closed_sibling = Some(count);
            self.open.pop();
        }

        match self.open.last_mut() {
            Some(top) if top.0 == level => top.1 += 1,
            _ => {
                let count = closed_sibling.map_or(1, |count| count + 1);
                self.open.push((level, count));
            }
        }

        let parts: Vec<String> = self.open.iter().map(|(_, n)| n.to_string()).collect();
        parts.join(".")
    }
}

/// One entry of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TocEntry {
    pub level: usize,
    /// Child indices from [`Document::nodes`] down to the header node.
    pub path: Vec<usize>,
    /// Dotted section number, e.g. `2.1`.
    pub section_number: String,
    pub children: Vec<TocEntry>,
}

impl Outline for TocEntry {
    fn level(&self) -> usize {
        self.level
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

impl TocEntry {
    /// The header node this entry points at.
    pub fn header<'d>(&self, document: &'d Document) -> Option<&'d Node> {
        document.node_at(&self.path)
    }

    fn number(&mut self, prefix: &str, index: usize) {
        self.section_number = if prefix.is_empty() {
            index.to_string()
        } else {
            format!("{}.{}", prefix, index)
        };
        let prefix = self.section_number.clone();
        for (i, child) in self.children.iter_mut().enumerate() {
            child.number(&prefix, i + 1);
        }
    }

    fn prune(&mut self, max_level: usize) {
        self.children.retain(|child| child.level <= max_level);
        for child in &mut self.children {
            child.prune(max_level);
        }
    }
}

type TocCache = HashMap<Option<usize>, Arc<Vec<TocEntry>>>;

/// The result of a parse.
#[derive(Debug)]
pub struct Document {
    /// First plain line of the input or the `#+TITLE:` value.
    pub title: Option<Node>,
    /// Top-level nodes in source order.
    pub nodes: Vec<Node>,
    pub options: Options,
    pub author: Option<String>,
    pub email: Option<String>,
    /// Values of other one-shot directives, keyed by lowercased name (`"date:"`).
    pub directive_values: BTreeMap<String, String>,
    toc_cache: Mutex<TocCache>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            nodes: self.nodes.clone(),
            options: self.options.clone(),
            author: self.author.clone(),
            email: self.email.clone(),
            directive_values: self.directive_values.clone(),
            toc_cache: Mutex::new(HashMap::new()),
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.nodes == other.nodes
            && self.options == other.options
            && self.author == other.author
            && self.email == other.email
            && self.directive_values == other.directive_values
    }
}

impl Document {
    /// Create an empty document with the given options.
    pub fn new(options: Options) -> Self {
        Self {
            title: None,
            nodes: Vec::new(),
            options,
            author: None,
            email: None,
            directive_values: BTreeMap::new(),
            toc_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Append a top-level node, dropping cached tables of contents.
    pub fn append_node(&mut self, node: Node) {
        self.nodes.push(node);
        self.toc_cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Node reached by following child indices from the top level.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.nodes.get(*first)?;
        for &index in rest {
            node = node.children().get(index)?;
        }
        Some(node)
    }

    /// Visit every node depth-first, in document order, with its path.
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&[usize], &Node),
    {
        let mut path = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            path.push(i);
            visit_node(node, &mut path, &mut visitor);
            path.pop();
        }
    }

    /// Every node whose type name equals `type_name`, in document order.
    pub fn collect_nodes_by_type(&self, type_name: &str) -> Vec<&Node> {
        let mut paths = Vec::new();
        self.visit(|path, node| {
            if node.type_name() == type_name {
                paths.push(path.to_vec());
            }
        });
        paths.iter().filter_map(|path| self.node_at(path)).collect()
    }

    /// Table of contents for all headers.
    pub fn table_of_contents(&self) -> Arc<Vec<TocEntry>> {
        self.compute_table_of_contents(None)
    }

    /// Table of contents restricted to headers with `level <= max_level`.
    ///
    /// Section numbers are computed over all headers, so a restricted table
    /// numbers its entries exactly like the full one. Results are cached per
    /// `max_level` until the next [`Document::append_node`].
    pub fn compute_table_of_contents(&self, max_level: Option<usize>) -> Arc<Vec<TocEntry>> {
        let mut cache = self.toc_cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(toc) = cache.get(&max_level) {
            return Arc::clone(toc);
        }

        let mut headers = Vec::new();
        self.visit(|path, node| {
            if let NodeKind::Header { level, .. } = node.kind {
                headers.push(TocEntry {
                    level,
                    path: path.to_vec(),
                    section_number: String::new(),
                    children: Vec::new(),
                });
            }
        });

        let mut forest = nest_by_level(headers);
        for (i, entry) in forest.iter_mut().enumerate() {
            entry.number("", i + 1);
        }
        if let Some(max) = max_level {
            forest.retain(|entry| entry.level <= max);
            for entry in &mut forest {
                entry.prune(max);
            }
        }

        log::trace!(
            "computed table of contents: {} root entries (max level {:?})",
            forest.len(),
            max_level
        );
        let toc = Arc::new(forest);
        cache.insert(max_level, Arc::clone(&toc));
        toc
    }

    /// Write dotted section numbers onto every header node.
    pub fn attach_section_numbers(&mut self) {
        let toc = self.table_of_contents();
        let mut stack: Vec<&TocEntry> = toc.iter().rev().collect();
        while let Some(entry) = stack.pop() {
            if let Some(node) = node_at_mut(&mut self.nodes, &entry.path) {
                if let NodeKind::Header { section_number, .. } = &mut node.kind {
                    *section_number = Some(entry.section_number.clone());
                }
            }
            stack.extend(entry.children.iter().rev());
        }
    }
}

fn visit_node<F>(node: &Node, path: &mut Vec<usize>, visitor: &mut F)
where
    F: FnMut(&[usize], &Node),
{
    visitor(path, node);
    for (i, child) in node.children().iter().enumerate() {
        path.push(i);
        visit_node(child, path, visitor);
        path.pop();
    }
}

fn node_at_mut<'n>(nodes: &'n mut [Node], path: &[usize]) -> Option<&'n mut Node> {
    let (first, rest) = path.split_first()?;
    let mut node = nodes.get_mut(*first)?;
    for &index in rest {
        node = node.children.as_mut()?.get_mut(index)?;
    }
    Some(node)
}
