//! # orgdoc Core
//!
//! Parser for org-style outlines (headers, lists, tables, `#+` directives,
//! inline emphasis and links) and a converter framework that renders the
//! resulting tree as HTML or Redmine wiki text.
//!
//! The pipeline is line stream → lexer → block parser (with the inline
//! parser for textual content) → [`Document`] → [`Converter`].
//!
//! ## Quick Start
//!
//! ```rust
//! use orgdoc_core::{ExportOptions, HtmlConverter, Parser};
//!
//! let input = "Notes\n* Intro\nSome *bold* text.\n";
//! let doc = Parser::new().parse(input).unwrap();
//! let result = doc.convert(&HtmlConverter, &ExportOptions::default());
//!
//! assert_eq!(result.title, "Notes");
//! assert!(result.content.contains("<b>bold</b>"));
//! ```
//!
//! ## Options
//!
//! Document options come from defaults, parser overrides and `#+OPTIONS:`
//! lines, in that order:
//!
//! ```rust
//! use orgdoc_core::Parser;
//! use orgdoc_core::options::TocSetting;
//!
//! let doc = Parser::new()
//!     .with_option("toc", false)
//!     .parse("#+OPTIONS: toc:2\n* A\n")
//!     .unwrap();
//! assert_eq!(doc.options.toc(), TocSetting::MaxLevel(2));
//! ```
//!
//! ## Errors
//!
//! Parsing stops at the first error; there is no partial document.
//!
//! ```rust
//! use orgdoc_core::{parse, ParseErrorKind};
//!
//! let err = parse("#+begin_quote\ntext\n").unwrap_err();
//! assert_eq!(err.kind, ParseErrorKind::UnclosedDirective);
//! ```

pub mod ast;
pub mod converter;
pub mod document;
pub mod error;
pub mod inline;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod stream;

pub use ast::{Directive, Node, NodeKind};
pub use converter::{
    convert, Converter, ConverterRegistry, HtmlConverter, RenderResult, WikiConverter,
};
pub use document::{Document, TocEntry};
pub use error::{ParseError, ParseErrorKind};
pub use options::{ExportOptions, OptionValue, Options, ParseOptions};
pub use parser::Parser;

/// Parse with default options.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    Parser::new().parse(input)
}
