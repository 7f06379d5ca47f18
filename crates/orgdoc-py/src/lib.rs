//! Python bindings for the orgdoc parser and converters.

use std::collections::HashMap;

use orgdoc_core::{
    Converter, Document, ExportOptions, HtmlConverter, Node, NodeKind, OptionValue, Options,
    ParseError as CoreParseError, Parser as CoreParser, TocEntry, WikiConverter,
};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict};

fn value_error(e: CoreParseError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ============================================================================
// Options
// ============================================================================

fn option_value(value: &Bound<'_, PyAny>) -> PyResult<OptionValue> {
    if value.is_instance_of::<PyBool>() {
        return Ok(OptionValue::Bool(value.extract()?));
    }
    if let Ok(n) = value.extract::<i64>() {
        return Ok(OptionValue::Int(n));
    }
    if let Ok(s) = value.extract::<String>() {
        return Ok(OptionValue::Str(s));
    }
    Err(PyTypeError::new_err(format!(
        "option values must be bool, int or str, not {}",
        value.get_type().name()?
    )))
}

fn parse_options(options: Option<&Bound<'_, PyDict>>) -> PyResult<Options> {
    let mut overrides = Options::empty();
    if let Some(options) = options {
        for (key, value) in options.iter() {
            overrides.set(key.extract::<String>()?, option_value(&value)?);
        }
    }
    Ok(overrides)
}

fn options_dict<'py>(py: Python<'py>, options: &Options) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (key, value) in options.iter() {
        match value {
            OptionValue::Bool(b) => dict.set_item(key, *b)?,
            OptionValue::Int(n) => dict.set_item(key, *n)?,
            OptionValue::Str(s) => dict.set_item(key, s)?,
        }
    }
    Ok(dict)
}

fn export_options(export: Option<&Bound<'_, PyDict>>) -> PyResult<ExportOptions> {
    let mut options = ExportOptions::new();
    let Some(export) = export else {
        return Ok(options);
    };
    for (key, value) in export.iter() {
        let key: String = key.extract()?;
        match key.as_str() {
            "header_offset" => options.header_offset = value.extract()?,
            "export_from_line_number" => options.export_from_line_number = value.extract()?,
            "suppress_sub_script_handling" => {
                options.suppress_sub_script_handling = value.extract()?
            }
            "suppress_auto_link" => options.suppress_auto_link = value.extract()?,
            "translate_symbol_arrow" => options.translate_symbol_arrow = value.extract()?,
            "suppress_checkbox_handling" => {
                options.suppress_checkbox_handling = value.extract()?
            }
            "html_class_prefix" => options.html_class_prefix = value.extract()?,
            "html_id_prefix" => options.html_id_prefix = value.extract()?,
            other => {
                return Err(PyTypeError::new_err(format!(
                    "unknown export option '{}'",
                    other
                )))
            }
        }
    }
    Ok(options)
}

// ============================================================================
// Node
// ============================================================================

/// A node of the parsed tree.
#[pyclass(frozen, name = "Node")]
#[derive(Clone)]
pub struct PyNode {
    #[pyo3(get, name = "type")]
    pub type_name: String,
    /// Text of a text leaf.
    #[pyo3(get)]
    pub value: Option<String>,
    /// 1-based source line.
    #[pyo3(get)]
    pub line: Option<u32>,
    /// Kind-specific fields, e.g. `level` or `src`.
    #[pyo3(get)]
    pub attributes: HashMap<String, String>,
    #[pyo3(get)]
    pub children: Vec<PyNode>,
}

#[pymethods]
impl PyNode {
    fn __repr__(&self) -> String {
        match &self.value {
            Some(value) => format!("Node({}, {:?})", self.type_name, value),
            None => format!("Node({}, children={})", self.type_name, self.children.len()),
        }
    }

    fn __len__(&self) -> usize {
        self.children.len()
    }
}

impl From<&Node> for PyNode {
    fn from(node: &Node) -> Self {
        let mut attributes = HashMap::new();
        match &node.kind {
            NodeKind::Header {
                level,
                section_number,
            } => {
                attributes.insert("level".to_string(), level.to_string());
                if let Some(number) = section_number {
                    attributes.insert("section_number".to_string(), number.clone());
                }
            }
            NodeKind::ListElement { term: Some(term) } => {
                attributes.insert("term".to_string(), term.text_content());
            }
            NodeKind::TableCell { is_header } => {
                attributes.insert("header".to_string(), is_header.to_string());
            }
            NodeKind::Link { src } => {
                attributes.insert("src".to_string(), src.clone());
            }
            NodeKind::Directive(directive) => {
                attributes.insert("name".to_string(), directive.name.clone());
                attributes.insert("value".to_string(), directive.raw_value.clone());
            }
            _ => {}
        }

        PyNode {
            type_name: node.type_name().to_string(),
            value: node.value().map(str::to_string),
            line: node.line,
            attributes,
            children: node.children().iter().map(PyNode::from).collect(),
        }
    }
}

// ============================================================================
// Table of contents
// ============================================================================

/// One table of contents entry.
#[pyclass(frozen, get_all, name = "TocEntry")]
#[derive(Clone)]
pub struct PyTocEntry {
    pub level: usize,
    pub section_number: String,
    pub title: String,
    pub children: Vec<PyTocEntry>,
}

#[pymethods]
impl PyTocEntry {
    fn __repr__(&self) -> String {
        format!("TocEntry({}, {:?})", self.section_number, self.title)
    }
}

fn toc_entry(doc: &Document, entry: &TocEntry) -> PyTocEntry {
    PyTocEntry {
        level: entry.level,
        section_number: entry.section_number.clone(),
        title: entry
            .header(doc)
            .map(Node::text_content)
            .unwrap_or_default(),
        children: entry
            .children
            .iter()
            .map(|child| toc_entry(doc, child))
            .collect(),
    }
}

// ============================================================================
// Document
// ============================================================================

/// A parsed document.
#[pyclass(frozen, name = "Document")]
pub struct PyDocument {
    inner: Document,
    #[pyo3(get)]
    pub title: Option<String>,
    #[pyo3(get)]
    pub author: Option<String>,
    #[pyo3(get)]
    pub email: Option<String>,
}

impl PyDocument {
    fn render<C: Converter>(
        &self,
        converter: &C,
        export: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<String> {
        let export = export_options(export)?;
        Ok(self.inner.convert(converter, &export).to_string())
    }
}

#[pymethods]
impl PyDocument {
    /// Effective document options.
    #[getter]
    fn options<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        options_dict(py, &self.inner.options)
    }

    /// Top-level nodes.
    #[getter]
    fn nodes(&self) -> Vec<PyNode> {
        self.inner.nodes.iter().map(PyNode::from).collect()
    }

    /// Render as HTML. Keyword arguments are export options.
    #[pyo3(signature = (**export))]
    fn to_html(&self, export: Option<&Bound<'_, PyDict>>) -> PyResult<String> {
        self.render(&HtmlConverter, export)
    }

    /// Render as Redmine wiki markup. Keyword arguments are export options.
    #[pyo3(signature = (**export))]
    fn to_wiki(&self, export: Option<&Bound<'_, PyDict>>) -> PyResult<String> {
        self.render(&WikiConverter, export)
    }

    /// Table of contents over every header, ignoring the `toc` option.
    fn toc(&self) -> Vec<PyTocEntry> {
        self.inner
            .table_of_contents()
            .iter()
            .map(|entry| toc_entry(&self.inner, entry))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "Document(title={:?}, nodes={})",
            self.title,
            self.inner.nodes.len()
        )
    }

    fn __len__(&self) -> usize {
        self.inner.nodes.len()
    }
}

impl From<Document> for PyDocument {
    fn from(doc: Document) -> Self {
        PyDocument {
            title: doc.title.as_ref().map(Node::text_content),
            author: doc.author.clone(),
            email: doc.email.clone(),
            inner: doc,
        }
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Parse an org-style outline.
///
/// Args:
///     input: Document text
///     options: Document option overrides, e.g. {"toc": 2, "num": False}
///
/// Returns:
///     Document: Parsed document
///
/// Raises:
///     ValueError: On parse error
#[pyfunction]
#[pyo3(signature = (input, options=None), text_signature = "(input, options=None)")]
fn parse(input: &str, options: Option<&Bound<'_, PyDict>>) -> PyResult<PyDocument> {
    let overrides = parse_options(options)?;
    let doc = CoreParser::new()
        .with_options(&overrides)
        .parse(input)
        .map_err(value_error)?;
    Ok(doc.into())
}

/// Parse and render as HTML in one step.
#[pyfunction]
#[pyo3(signature = (input, **export), text_signature = "(input, **export)")]
fn to_html(input: &str, export: Option<&Bound<'_, PyDict>>) -> PyResult<String> {
    let doc: PyDocument = CoreParser::new().parse(input).map_err(value_error)?.into();
    doc.render(&HtmlConverter, export)
}

/// Parse and render as Redmine wiki markup in one step.
#[pyfunction]
#[pyo3(signature = (input, **export), text_signature = "(input, **export)")]
fn to_wiki(input: &str, export: Option<&Bound<'_, PyDict>>) -> PyResult<String> {
    let doc: PyDocument = CoreParser::new().parse(input).map_err(value_error)?.into();
    doc.render(&WikiConverter, export)
}

// ============================================================================
// Module
// ============================================================================

/// orgdoc - Org-style outline parser with HTML and wiki converters.
#[pymodule]
fn pyorg(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDocument>()?;
    m.add_class::<PyNode>()?;
    m.add_class::<PyTocEntry>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(to_html, m)?)?;
    m.add_function(wrap_pyfunction!(to_wiki, m)?)?;
    Ok(())
}
