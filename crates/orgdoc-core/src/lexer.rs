//! Line classifier for the block parser.
//!
//! Each source line becomes exactly one [`Token`]. Classification walks an
//! ordered rule table and takes the first rule whose pattern matches, so the
//! order of [`RULES`] is part of the grammar: a `*` bullet is only a list item
//! once the header rule has rejected it, a `|---|` line is a separator before
//! it can be a row, and the plain-line rule catches everything else.
//!
//! Tokens are produced on demand. The parser may push tokens back (LIFO) to
//! "unsee" them, which is how blank lines are recovered inside list items.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ParseError;
use crate::stream::LineStream;

/// Which part of a `#+` directive a line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `#+begin_NAME`
    Begin,
    /// `#+end_NAME`
    End,
    /// Any other `#+NAME` line
    Oneshot,
}

/// Line classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `*** title`, level is the asterisk count
    Header { level: usize },
    /// `: text`
    Preformatted,
    /// `- item`, `+ item` or ` * item`
    UnorderedListElement,
    /// `1. item` or `1) item`
    OrderedListElement { number: &'a str },
    /// `|---+---|`
    TableSeparator,
    /// `| a | b |`
    TableRow,
    /// Empty line
    Blank,
    /// `-----`
    HorizontalRule,
    /// `#+...`
    Directive(DirectiveKind),
    /// `# ...`
    Comment,
    /// Anything else
    Line,
}

impl TokenKind<'_> {
    /// Stable name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Header { .. } => "header",
            TokenKind::Preformatted => "preformatted",
            TokenKind::UnorderedListElement => "unorderedListElement",
            TokenKind::OrderedListElement { .. } => "orderedListElement",
            TokenKind::TableSeparator => "tableSeparator",
            TokenKind::TableRow => "tableRow",
            TokenKind::Blank => "blank",
            TokenKind::HorizontalRule => "horizontalRule",
            TokenKind::Directive(_) => "directive",
            TokenKind::Comment => "comment",
            TokenKind::Line => "line",
        }
    }
}

/// A classified source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Classification.
    pub kind: TokenKind<'a>,
    /// Count of leading whitespace characters.
    pub indentation: usize,
    /// Text after the syntax markers.
    pub content: &'a str,
    /// The whole source line.
    pub raw: &'a str,
    /// 1-based source line number.
    pub line: u32,
}

impl<'a> Token<'a> {
    /// Whether this is an ordered or unordered list item.
    #[inline]
    pub fn is_list_element(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::OrderedListElement { .. } | TokenKind::UnorderedListElement
        )
    }

    /// Whether this is a table row or separator.
    #[inline]
    pub fn is_table_element(&self) -> bool {
        matches!(self.kind, TokenKind::TableRow | TokenKind::TableSeparator)
    }

    /// Whether this is a `#+end_` directive.
    #[inline]
    pub fn is_end_directive(&self) -> bool {
        self.kind == TokenKind::Directive(DirectiveKind::End)
    }

    fn blank(line: u32) -> Self {
        Self {
            kind: TokenKind::Blank,
            indentation: 0,
            content: "",
            raw: "",
            line,
        }
    }
}

/// Output of a rule: kind, indentation and content.
type Classified<'a> = (TokenKind<'a>, usize, &'a str);

type Classify = for<'a> fn(&Captures<'a>) -> Classified<'a>;

struct Rule {
    pattern: Regex,
    classify: Classify,
}

impl Rule {
    fn new(pattern: &str, classify: Classify) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("lexer rule must compile"),
            classify,
        }
    }
}

/// Lexer rules in match priority order.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(r"^(\*+)\s+(.*)$", header),
        Rule::new(r"^(\s*):(?: (.*)$|$)", preformatted),
        Rule::new(r"^(\s*)(?:-|\+|\s+\*)\s+(.*)$", unordered_list_element),
        Rule::new(r"^(\s*)([0-9]+)(?:\.|\))\s+(.*)$", ordered_list_element),
        Rule::new(r"^(\s*)\|((?:\+|-)*?)\|?$", table_separator),
        Rule::new(r"^(\s*)\|(.*?)\|?$", table_row),
        Rule::new(r"^$", blank),
        Rule::new(r"^(\s*)-{5,}$", horizontal_rule),
        Rule::new(r"(?i)^(\s*)#\+(?:(begin|end)_)?(.*)$", directive),
        Rule::new(r"^(\s*)#(.*)$", comment),
        Rule::new(r"^(\s*)(.*)$", line),
    ]
});

#[inline(always)]
fn group<'a>(caps: &Captures<'a>, index: usize) -> &'a str {
    caps.get(index).map_or("", |m| m.as_str())
}

#[inline(always)]
fn width(caps: &Captures<'_>) -> usize {
    group(caps, 1).chars().count()
}

fn header<'a>(caps: &Captures<'a>) -> Classified<'a> {
    let level = group(caps, 1).len();
    (TokenKind::Header { level }, 0, group(caps, 2))
}

fn preformatted<'a>(caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::Preformatted, width(caps), group(caps, 2))
}

fn unordered_list_element<'a>(caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::UnorderedListElement, width(caps), group(caps, 2))
}

fn ordered_list_element<'a>(caps: &Captures<'a>) -> Classified<'a> {
    let number = group(caps, 2);
    (
        TokenKind::OrderedListElement { number },
        width(caps),
        group(caps, 3),
    )
}

fn table_separator<'a>(caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::TableSeparator, width(caps), group(caps, 2))
}

fn table_row<'a>(caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::TableRow, width(caps), group(caps, 2))
}

fn blank<'a>(_caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::Blank, 0, "")
}

fn horizontal_rule<'a>(caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::HorizontalRule, width(caps), "")
}

fn directive<'a>(caps: &Captures<'a>) -> Classified<'a> {
    let kind = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(prefix) if prefix == "begin" => DirectiveKind::Begin,
        Some(_) => DirectiveKind::End,
        None => DirectiveKind::Oneshot,
    };
    (TokenKind::Directive(kind), width(caps), group(caps, 3))
}

fn comment<'a>(caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::Comment, width(caps), group(caps, 2))
}

fn line<'a>(caps: &Captures<'a>) -> Classified<'a> {
    (TokenKind::Line, width(caps), group(caps, 2))
}

/// Pull-based tokenizer over a [`LineStream`].
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    stream: LineStream<'a>,
    /// Tokens pushed back by the parser, most recent last.
    token_stack: Vec<Token<'a>>,
    /// The next stream line, already read and classified.
    lookahead: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer reading from the given stream.
    pub fn new(stream: LineStream<'a>) -> Self {
        Self {
            stream,
            token_stack: Vec::new(),
            lookahead: None,
        }
    }

    /// Classify a single line.
    ///
    /// Fails only when no rule matches, which the catch-all rule makes
    /// impossible for text without embedded newlines.
    pub fn tokenize(text: &'a str, line: u32) -> Result<Token<'a>, ParseError> {
        for rule in RULES.iter() {
            if let Some(caps) = rule.pattern.captures(text) {
                let (kind, indentation, content) = (rule.classify)(&caps);
                return Ok(Token {
                    kind,
                    indentation,
                    content,
                    raw: text,
                    line,
                });
            }
        }
        Err(ParseError::unknown_line(text, line))
    }

    /// Whether any token remains, counting pushed-back tokens.
    #[inline]
    pub fn has_next(&self) -> bool {
        !self.token_stack.is_empty() || self.lookahead.is_some() || self.stream.has_next()
    }

    /// Return the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if let Some(token) = self.token_stack.last() {
            return Ok(Some(*token));
        }
        self.fill_lookahead()?;
        Ok(self.lookahead)
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        if let Some(token) = self.token_stack.pop() {
            return Ok(Some(token));
        }
        self.fill_lookahead()?;
        Ok(self.lookahead.take())
    }

    /// Push a token back so the next read returns it again.
    #[inline]
    pub fn push_token(&mut self, token: Token<'a>) {
        self.token_stack.push(token);
    }

    /// Push a synthetic blank token.
    #[inline]
    pub fn push_dummy_blank(&mut self) {
        let line = self.line_number();
        self.token_stack.push(Token::blank(line));
    }

    /// Consume the next line verbatim, bypassing classification.
    pub fn next_raw_line(&mut self) -> Option<&'a str> {
        if let Some(token) = self.token_stack.pop() {
            return Some(token.raw);
        }
        if let Some(token) = self.lookahead.take() {
            return Some(token.raw);
        }
        self.stream.next_line()
    }

    /// 1-based number of the last line handed to the parser.
    pub fn line_number(&self) -> u32 {
        match self.lookahead {
            Some(token) => token.line.saturating_sub(1),
            None => self.stream.line_number(),
        }
    }

    fn fill_lookahead(&mut self) -> Result<(), ParseError> {
        if self.lookahead.is_none() {
            if let Some(text) = self.stream.next_line() {
                self.lookahead = Some(Self::tokenize(text, self.stream.line_number())?);
            }
        }
        Ok(())
    }
}
