//! Recursive-descent block parser.
//!
//! Pulls tokens from the [`Lexer`] and builds the document tree. Textual
//! content (headers, paragraphs, list items, cells) goes through the inline
//! parser; preformatted and verbatim directive bodies never do.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Directive, Node, NodeKind};
use crate::document::Document;
use crate::error::ParseError;
use crate::inline::parse_inline;
use crate::lexer::{DirectiveKind, Lexer, Token, TokenKind};
use crate::options::{OptionValue, Options, ParseOptions};
use crate::stream::LineStream;

/// `TERM :: DEFINITION`
static DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?) :: *(.*)$").expect("definition pattern must compile"));

/// Term used for definition items without a `::` separator.
const UNKNOWN_DEFINITION_TERM: &str = "???";

/// Document parser.
///
/// Holds caller overrides that are merged over the document defaults on
/// every parse. A parser can be reused; each parse is independent.
#[derive(Debug, Clone)]
pub struct Parser {
    overrides: ParseOptions,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser with no overrides.
    #[inline]
    pub fn new() -> Self {
        Self {
            overrides: Options::empty(),
        }
    }

    /// Override one document option, e.g. `("toc", 2)` or `("^", true)`.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.overrides.set(key, value);
        self
    }

    /// Override every option set in `options`.
    pub fn with_options(mut self, options: &ParseOptions) -> Self {
        self.overrides.merge(options);
        self
    }

    /// Parse a whole document.
    pub fn parse(&self, input: &str) -> Result<Document, ParseError> {
        self.parse_stream(LineStream::new(input))
    }

    /// Parse a whole document from an existing stream.
    pub fn parse_stream(&self, stream: LineStream<'_>) -> Result<Document, ParseError> {
        let mut options = Options::default();
        options.merge(&self.overrides);

        let mut state = ParseState::new(stream, options, 0);
        state.parse_title()?;
        state.parse_nodes()?;

        log::debug!(
            "parsed document: {} top-level nodes, {} lines",
            state.document.nodes.len(),
            state.lexer.line_number()
        );
        Ok(state.document)
    }
}

/// Split a directive line's content into its lowercased name and raw value.
pub fn split_directive(content: &str) -> (String, &str) {
    let content = content.trim_start_matches(' ');
    let (name, rest) = content.split_once(' ').unwrap_or((content, ""));
    (name.to_lowercase(), rest.trim_start_matches(' '))
}

/// Build a directive from a directive line's content.
pub fn directive_from_content(content: &str) -> Directive {
    let (name, raw_value) = split_directive(content);
    let words = raw_value.split(' ').filter(|word| !word.is_empty());
    let (options, arguments): (Vec<&str>, Vec<&str>) =
        words.partition(|word| word.starts_with('-'));
    Directive {
        name,
        arguments: arguments.into_iter().map(str::to_string).collect(),
        options: options.into_iter().map(str::to_string).collect(),
        raw_value: raw_value.to_string(),
    }
}

struct ParseState<'a> {
    lexer: Lexer<'a>,
    document: Document,
    /// Names of the block directives currently being parsed, innermost last.
    open_directives: Vec<String>,
    /// Added to stream line numbers when parsing a table cell.
    line_offset: u32,
}

impl<'a> ParseState<'a> {
    fn new(stream: LineStream<'a>, options: Options, line_offset: u32) -> Self {
        Self {
            lexer: Lexer::new(stream),
            document: Document::new(options),
            open_directives: Vec::new(),
            line_offset,
        }
    }

    #[inline]
    fn line_of(&self, token: &Token<'_>) -> u32 {
        token.line + self.line_offset
    }

    #[inline]
    fn current_line(&self) -> u32 {
        self.lexer.line_number() + self.line_offset
    }

    fn peek(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        self.lexer.peek_token().map_err(|e| self.relocate(e))
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        self.lexer.next_token().map_err(|e| self.relocate(e))
    }

    fn relocate(&self, mut error: ParseError) -> ParseError {
        error.line = error.line.map(|line| line + self.line_offset);
        error
    }

    fn skip_blank(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        let mut blank = None;
        while let Some(token) = self.peek()? {
            if token.kind != TokenKind::Blank {
                break;
            }
            blank = self.next_token()?;
        }
        Ok(blank)
    }

    // ========================================================================
    // Document
    // ========================================================================

    fn parse_title(&mut self) -> Result<(), ParseError> {
        self.skip_blank()?;

        if let Some(token) = self.peek()? {
            if token.kind == TokenKind::Line {
                self.next_token()?;
                self.document.title = Some(parse_inline(token.content));
            }
        }

        self.lexer.push_dummy_blank();
        Ok(())
    }

    fn parse_nodes(&mut self) -> Result<(), ParseError> {
        while self.lexer.has_next() {
            if let Some(element) = self.parse_element()? {
                self.document.append_node(element);
            }
        }
        Ok(())
    }

    fn parse_element(&mut self) -> Result<Option<Node>, ParseError> {
        let Some(token) = self.peek()? else {
            return Ok(None);
        };
        log::trace!(
            "element {} at line {}",
            token.kind.name(),
            self.line_of(&token)
        );

        match token.kind {
            TokenKind::Header { .. } => self.parse_header().map(Some),
            TokenKind::Preformatted => self.parse_preformatted().map(Some),
            TokenKind::OrderedListElement { .. } | TokenKind::UnorderedListElement => {
                self.parse_list().map(Some)
            }
            TokenKind::Line => self.parse_text().map(Some),
            TokenKind::TableRow | TokenKind::TableSeparator => self.parse_table().map(Some),
            TokenKind::Blank => {
                self.skip_blank()?;
                match self.peek()? {
                    None => Ok(None),
                    Some(next) if next.kind == TokenKind::Line => self.parse_paragraph().map(Some),
                    Some(_) => self.parse_element(),
                }
            }
            TokenKind::HorizontalRule => {
                self.next_token()?;
                Ok(Some(Node::new(NodeKind::HorizontalRule)))
            }
            TokenKind::Directive(DirectiveKind::End) => {
                let (name, _) = split_directive(token.content);
                if self.open_directives.contains(&name) {
                    // Left for the enclosing block to close.
                    return Ok(None);
                }
                self.next_token()?;
                Err(ParseError::unmatched_end(&name, self.line_of(&token)))
            }
            TokenKind::Directive(_) => self.parse_directive().map(Some),
            TokenKind::Comment => {
                self.next_token()?;
                Ok(None)
            }
        }
    }

    // ========================================================================
    // Single-token elements
    // ========================================================================

    fn parse_header(&mut self) -> Result<Node, ParseError> {
        let token = self.expect_token()?;
        let level = match token.kind {
            TokenKind::Header { level } => level,
            _ => 1,
        };
        Ok(Node::with_children(
            NodeKind::Header {
                level,
                section_number: None,
            },
            vec![parse_inline(token.content)],
        )
        .at_line(self.line_of(&token)))
    }

    fn parse_text(&mut self) -> Result<Node, ParseError> {
        let token = self.expect_token()?;
        Ok(parse_inline(token.content))
    }

    fn expect_token(&mut self) -> Result<Token<'a>, ParseError> {
        match self.next_token()? {
            Some(token) => Ok(token),
            // Callers only consume after a successful peek.
            None => Err(ParseError::unknown_line("", self.current_line())),
        }
    }

    // ========================================================================
    // Runs of lines
    // ========================================================================

    fn parse_preformatted(&mut self) -> Result<Node, ParseError> {
        let first = self.expect_token()?;
        let mut lines = vec![first.content];

        while let Some(token) = self.peek()? {
            if token.kind != TokenKind::Preformatted || token.indentation < first.indentation {
                break;
            }
            self.next_token()?;
            lines.push(token.content);
        }

        Ok(
            Node::with_children(NodeKind::Preformatted, vec![Node::text(lines.join("\n"))])
                .at_line(self.line_of(&first)),
        )
    }

    fn parse_paragraph(&mut self) -> Result<Node, ParseError> {
        let first = self.expect_token()?;
        let mut lines = vec![first.content];

        while let Some(token) = self.peek()? {
            if token.kind != TokenKind::Line || token.indentation < first.indentation {
                break;
            }
            self.next_token()?;
            lines.push(token.content);
        }

        Ok(
            Node::with_children(NodeKind::Paragraph, vec![parse_inline(&lines.join("\n"))])
                .at_line(self.line_of(&first)),
        )
    }

    // ========================================================================
    // Lists
    // ========================================================================

    fn parse_list(&mut self) -> Result<Node, ParseError> {
        let Some(root) = self.peek()? else {
            return Err(ParseError::unknown_line("", self.current_line()));
        };
        let is_definition_list = DEFINITION.is_match(root.content);
        let kind = if is_definition_list {
            NodeKind::DefinitionList
        } else if root.kind == TokenKind::UnorderedListElement {
            NodeKind::UnorderedList
        } else {
            NodeKind::OrderedList
        };
        let mut list = Node::new(kind).at_line(self.line_of(&root));

        while let Some(next) = self.peek()? {
            if !next.is_list_element() || next.indentation != root.indentation {
                break;
            }
            let item = self.parse_list_element(root.indentation, is_definition_list)?;
            list.append_child(item);
        }

        Ok(list)
    }

    fn parse_list_element(
        &mut self,
        root_indentation: usize,
        is_definition_list: bool,
    ) -> Result<Node, ParseError> {
        let token = self.expect_token()?;

        let (term, body) = if is_definition_list {
            let (term, body) = match DEFINITION.captures(token.content) {
                Some(caps) => {
                    let term = caps.get(1).map_or("", |m| m.as_str());
                    let body = caps.get(2).map_or("", |m| m.as_str());
                    (term, body)
                }
                None => ("", token.content),
            };
            let term = if term.is_empty() {
                UNKNOWN_DEFINITION_TERM
            } else {
                term
            };
            (Some(Box::new(parse_inline(term))), body)
        } else {
            (None, token.content)
        };

        let mut item = Node::with_children(NodeKind::ListElement { term }, vec![parse_inline(body)])
            .at_line(self.line_of(&token));

        while self.lexer.has_next() {
            let blank = self.skip_blank()?;
            let Some(next) = self.peek()? else {
                break;
            };

            // A blank line between two items is dropped; before anything else
            // it is kept so a paragraph can follow.
            if let Some(blank) = blank {
                if !next.is_list_element() {
                    self.lexer.push_token(blank);
                }
            }
            if next.is_end_directive() || next.indentation <= root_indentation {
                break;
            }

            if let Some(element) = self.parse_element()? {
                item.append_child(element);
            }
        }

        Ok(item)
    }

    // ========================================================================
    // Tables
    // ========================================================================

    fn parse_table(&mut self) -> Result<Node, ParseError> {
        let Some(first) = self.peek()? else {
            return Err(ParseError::expected_table_row(self.current_line()));
        };
        let allow_multiline_cell =
            first.kind == TokenKind::TableSeparator && self.document.options.multiline_cell();
        let mut table = Node::new(NodeKind::Table).at_line(self.line_of(&first));
        let mut saw_separator = false;

        while let Some(next) = self.peek()? {
            match next.kind {
                TokenKind::TableRow => {
                    let row = self.parse_table_row(allow_multiline_cell)?;
                    table.append_child(row);
                }
                TokenKind::TableSeparator => {
                    saw_separator = true;
                    self.next_token()?;
                }
                _ => break,
            }
        }

        if saw_separator {
            let first_row = table
                .children
                .as_mut()
                .and_then(|rows| rows.first_mut())
                .and_then(|row| row.children.as_mut());
            for cell in first_row.into_iter().flatten() {
                cell.kind = NodeKind::TableCell { is_header: true };
            }
        }

        Ok(table)
    }

    fn parse_table_row(&mut self, allow_multiline_cell: bool) -> Result<Node, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.peek()? {
            if token.kind != TokenKind::TableRow {
                break;
            }
            self.next_token()?;
            tokens.push(token);
            if !allow_multiline_cell {
                break;
            }
        }

        let Some((first, rest)) = tokens.split_first() else {
            return Err(ParseError::expected_table_row(self.current_line()));
        };

        let mut cell_texts: Vec<String> = first.content.split('|').map(str::to_string).collect();
        for token in rest {
            for (index, text) in token.content.split('|').enumerate() {
                match cell_texts.get_mut(index) {
                    Some(cell) => {
                        cell.push('\n');
                        cell.push_str(text);
                    }
                    None => cell_texts.push(format!("\n{}", text)),
                }
            }
        }

        let first_line = self.line_of(first);
        let cells = cell_texts
            .iter()
            .map(|text| {
                let content = self.parse_fragment(text, first_line)?;
                Ok(Node::with_children(
                    NodeKind::TableCell { is_header: false },
                    content,
                ))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(Node::with_children(NodeKind::TableRow, cells).at_line(first_line))
    }

    /// Parse cell text as a document of its own, without a title.
    fn parse_fragment(&self, text: &str, first_line: u32) -> Result<Vec<Node>, ParseError> {
        let mut state = ParseState::new(
            LineStream::new(text),
            Options::default(),
            first_line.saturating_sub(1),
        );
        state.parse_nodes()?;
        Ok(state.document.nodes)
    }

    // ========================================================================
    // Directives
    // ========================================================================

    fn parse_directive(&mut self) -> Result<Node, ParseError> {
        let token = self.expect_token()?;
        let directive = directive_from_content(token.content);
        let line = self.line_of(&token);

        match token.kind {
            TokenKind::Directive(DirectiveKind::Begin) => {
                if directive.is_verbatim() {
                    self.parse_directive_block_verbatim(directive, line)
                } else {
                    self.parse_directive_block(directive, line)
                }
            }
            TokenKind::Directive(DirectiveKind::End) => {
                Err(ParseError::unmatched_end(&directive.name, line))
            }
            _ => {
                self.interpret_directive(&directive, line);
                Ok(Node::leaf(NodeKind::Directive(directive)).at_line(line))
            }
        }
    }

    fn interpret_directive(&mut self, directive: &Directive, line: u32) {
        log::debug!("directive {} at line {}", directive.name, line);
        match directive.name.as_str() {
            "options:" => self
                .document
                .options
                .merge_lispy(directive.arguments.iter().map(String::as_str)),
            "title:" => self.document.title = Some(Node::text(directive.raw_value.as_str())),
            "author:" => self.document.author = Some(directive.raw_value.clone()),
            "email:" => self.document.email = Some(directive.raw_value.clone()),
            _ => {
                self.document
                    .directive_values
                    .insert(directive.name.clone(), directive.raw_value.clone());
            }
        }
    }

    fn parse_directive_block(&mut self, directive: Directive, line: u32) -> Result<Node, ParseError> {
        let name = directive.name.clone();
        let mut node = Node::new(NodeKind::Directive(directive)).at_line(line);

        self.lexer.push_dummy_blank();
        self.open_directives.push(name.clone());

        while let Some(next) = self.peek()? {
            if next.is_end_directive() {
                let (end_name, _) = split_directive(next.content);
                let end_line = self.line_of(&next);
                if end_name == name {
                    self.next_token()?;
                    self.open_directives.pop();
                    return Ok(node);
                }
                if self.open_directives.contains(&end_name) {
                    return Err(ParseError::unclosed_directive(&name, end_line));
                }
                self.next_token()?;
                return Err(ParseError::unmatched_end(&end_name, end_line));
            }

            if let Some(element) = self.parse_element()? {
                node.append_child(element);
            }
        }

        Err(ParseError::unclosed_directive(&name, self.current_line()))
    }

    fn parse_directive_block_verbatim(
        &mut self,
        directive: Directive,
        line: u32,
    ) -> Result<Node, ParseError> {
        let mut lines: Vec<&str> = Vec::new();

        while let Some(next) = self.peek()? {
            if next.is_end_directive() && split_directive(next.content).0 == directive.name {
                self.next_token()?;
                let body = Node::text(lines.join("\n"));
                return Ok(
                    Node::with_children(NodeKind::Directive(directive), vec![body]).at_line(line)
                );
            }
            match self.lexer.next_raw_line() {
                Some(raw) => lines.push(raw),
                None => break,
            }
        }

        Err(ParseError::unclosed_directive(
            &directive.name,
            self.current_line(),
        ))
    }
}
