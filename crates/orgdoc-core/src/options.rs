//! Parse-time document options and export-time converter options.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::ast::Directive;

/// A document option value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    /// Coerce a Lisp-style literal: `t`, `nil`, digits, or anything else as a string.
    pub fn from_lispy(value: &str) -> Self {
        match value {
            "t" => OptionValue::Bool(true),
            "nil" => OptionValue::Bool(false),
            _ if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => value
                .parse()
                .map(OptionValue::Int)
                .unwrap_or_else(|_| OptionValue::Str(value.to_string())),
            _ => OptionValue::Str(value.to_string()),
        }
    }

    /// Truthiness: `false`, `0` and the empty string are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(n) => *n != 0,
            OptionValue::Str(s) => !s.is_empty(),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("t"),
            OptionValue::Bool(false) => f.write_str("nil"),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

/// Table of contents depth requested by the `toc` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocSetting {
    Disabled,
    Unlimited,
    /// Only headers with `level <= n`.
    MaxLevel(usize),
}

impl TocSetting {
    /// Depth limit to pass to the TOC computation, `None` when disabled.
    pub fn max_level(self) -> Option<Option<usize>> {
        match self {
            TocSetting::Disabled => None,
            TocSetting::Unlimited => Some(None),
            TocSetting::MaxLevel(n) => Some(Some(n)),
        }
    }
}

/// How `_` in text is rendered, from the `^` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptMode {
    /// Underscores are literal.
    Disabled,
    /// `a_b` makes `b` a subscript.
    Greedy,
    /// Only `a_{b}` makes a subscript.
    Braces,
}

/// Document options: defaults, caller overrides and `#+OPTIONS:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Default for Options {
    fn default() -> Self {
        let mut values = BTreeMap::new();
        values.insert("toc".to_string(), OptionValue::Bool(true));
        values.insert("num".to_string(), OptionValue::Bool(true));
        values.insert("^".to_string(), OptionValue::Str("{}".to_string()));
        values.insert("multilineCell".to_string(), OptionValue::Bool(false));
        Self { values }
    }
}

impl Options {
    /// Options with nothing set, not even the defaults.
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Overlay every entry of `other` onto `self`.
    pub fn merge(&mut self, other: &Options) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge an `#+OPTIONS:` argument list, e.g. `toc:2 num:nil ^:t`.
    ///
    /// Each word is split at its first `:`; a word without one sets the key
    /// to the empty string.
    pub fn merge_lispy<'s>(&mut self, pairs: impl IntoIterator<Item = &'s str>) {
        for pair in pairs {
            let (key, value) = pair.split_once(':').unwrap_or((pair, ""));
            self.values
                .insert(key.to_string(), OptionValue::from_lispy(value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `toc` option.
    pub fn toc(&self) -> TocSetting {
        match self.values.get("toc") {
            None | Some(OptionValue::Bool(false)) => TocSetting::Disabled,
            Some(OptionValue::Int(n)) => TocSetting::MaxLevel((*n).max(0) as usize),
            Some(OptionValue::Bool(true)) | Some(OptionValue::Str(_)) => TocSetting::Unlimited,
        }
    }

    /// The `num` option.
    pub fn numbering(&self) -> bool {
        self.values.get("num").is_some_and(OptionValue::is_truthy)
    }

    /// The `^` option.
    pub fn subscript_mode(&self) -> SubscriptMode {
        match self.values.get("^") {
            Some(OptionValue::Str(s)) if s == "{}" => SubscriptMode::Braces,
            Some(value) if value.is_truthy() => SubscriptMode::Greedy,
            _ => SubscriptMode::Disabled,
        }
    }

    /// The `multilineCell` option.
    pub fn multiline_cell(&self) -> bool {
        self.values
            .get("multilineCell")
            .is_some_and(OptionValue::is_truthy)
    }
}

/// Caller overrides applied over the document defaults before parsing.
pub type ParseOptions = Options;

/// Renders an unknown directive: receives the directive and its rendered children.
pub type DirectiveHandler = Arc<dyn Fn(&Directive, &str) -> String + Send + Sync>;

/// Converter settings for one conversion.
#[derive(Clone, Default)]
pub struct ExportOptions {
    /// Added to header levels; `None` uses the converter's default.
    pub header_offset: Option<usize>,
    /// Wrap nodes in line-number markers.
    pub export_from_line_number: bool,
    pub suppress_sub_script_handling: bool,
    pub suppress_auto_link: bool,
    /// Render `->` as an arrow glyph outside code.
    pub translate_symbol_arrow: bool,
    pub suppress_checkbox_handling: bool,
    /// Renderers for directives the converter does not know, keyed by name.
    pub custom_directive_handlers: HashMap<String, DirectiveHandler>,
    pub html_class_prefix: Option<String>,
    pub html_id_prefix: Option<String>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_offset(mut self, offset: usize) -> Self {
        self.header_offset = Some(offset);
        self
    }

    pub fn with_export_from_line_number(mut self, enabled: bool) -> Self {
        self.export_from_line_number = enabled;
        self
    }

    pub fn with_suppress_sub_script_handling(mut self, suppress: bool) -> Self {
        self.suppress_sub_script_handling = suppress;
        self
    }

    pub fn with_suppress_auto_link(mut self, suppress: bool) -> Self {
        self.suppress_auto_link = suppress;
        self
    }

    pub fn with_translate_symbol_arrow(mut self, enabled: bool) -> Self {
        self.translate_symbol_arrow = enabled;
        self
    }

    pub fn with_suppress_checkbox_handling(mut self, suppress: bool) -> Self {
        self.suppress_checkbox_handling = suppress;
        self
    }

    /// Register a renderer for directives named `name` (lowercase, e.g. `note`).
    pub fn with_directive_handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Directive, &str) -> String + Send + Sync + 'static,
    {
        self.custom_directive_handlers
            .insert(name.into(), Arc::new(handler));
        self
    }

    pub fn with_html_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.html_class_prefix = Some(prefix.into());
        self
    }

    pub fn with_html_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.html_id_prefix = Some(prefix.into());
        self
    }
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&str> = self
            .custom_directive_handlers
            .keys()
            .map(String::as_str)
            .collect();
        handlers.sort_unstable();
        f.debug_struct("ExportOptions")
            .field("header_offset", &self.header_offset)
            .field("export_from_line_number", &self.export_from_line_number)
            .field(
                "suppress_sub_script_handling",
                &self.suppress_sub_script_handling,
            )
            .field("suppress_auto_link", &self.suppress_auto_link)
            .field("translate_symbol_arrow", &self.translate_symbol_arrow)
            .field(
                "suppress_checkbox_handling",
                &self.suppress_checkbox_handling,
            )
            .field("custom_directive_handlers", &handlers)
            .field("html_class_prefix", &self.html_class_prefix)
            .field("html_id_prefix", &self.html_id_prefix)
            .finish()
    }
}
