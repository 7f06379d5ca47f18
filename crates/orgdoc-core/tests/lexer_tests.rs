//! Integration tests for the line stream and lexer

use orgdoc_core::lexer::{DirectiveKind, Lexer, TokenKind};
use orgdoc_core::stream::LineStream;

fn kind_of(line: &str) -> TokenKind<'_> {
    Lexer::tokenize(line, 1).unwrap().kind
}

// ============================================================================
// Line Stream Tests
// ============================================================================

#[test]
fn test_stream_splits_lines() {
    let mut stream = LineStream::new("one\ntwo\nthree");
    assert_eq!(stream.next_line(), Some("one"));
    assert_eq!(stream.next_line(), Some("two"));
    assert_eq!(stream.next_line(), Some("three"));
    assert_eq!(stream.next_line(), None);
    assert!(!stream.has_next());
}

#[test]
fn test_stream_strips_carriage_return() {
    let mut stream = LineStream::new("one\r\ntwo\r\n");
    assert_eq!(stream.next_line(), Some("one"));
    assert_eq!(stream.next_line(), Some("two"));
    assert_eq!(stream.next_line(), None);
}

#[test]
fn test_stream_trailing_newline_adds_no_line() {
    let mut stream = LineStream::new("only\n");
    assert_eq!(stream.next_line(), Some("only"));
    assert!(!stream.has_next());
    assert_eq!(stream.line_number(), 1);
}

#[test]
fn test_stream_keeps_inner_empty_lines() {
    let mut stream = LineStream::new("a\n\nb");
    assert_eq!(stream.next_line(), Some("a"));
    assert_eq!(stream.next_line(), Some(""));
    assert_eq!(stream.next_line(), Some("b"));
}

#[test]
fn test_stream_peek_does_not_advance() {
    let mut stream = LineStream::new("a\nb");
    assert_eq!(stream.peek_line(), Some("a"));
    assert_eq!(stream.peek_line(), Some("a"));
    assert_eq!(stream.line_number(), 0);
    assert_eq!(stream.next_line(), Some("a"));
    assert_eq!(stream.line_number(), 1);
    assert_eq!(stream.peek_line(), Some("b"));
}

#[test]
fn test_stream_empty_input() {
    let stream = LineStream::new("");
    assert!(!stream.has_next());
    assert_eq!(stream.peek_line(), None);
}

// ============================================================================
// Classification Tests
// ============================================================================

#[test]
fn test_tokenize_header() {
    let token = Lexer::tokenize("** Section title", 3).unwrap();
    assert_eq!(token.kind, TokenKind::Header { level: 2 });
    assert_eq!(token.content, "Section title");
    assert_eq!(token.line, 3);
}

#[test]
fn test_tokenize_bold_line_is_not_header() {
    assert_eq!(kind_of("*bold* start"), TokenKind::Line);
}

#[test]
fn test_tokenize_preformatted() {
    let token = Lexer::tokenize("  : some code", 1).unwrap();
    assert_eq!(token.kind, TokenKind::Preformatted);
    assert_eq!(token.indentation, 2);
    assert_eq!(token.content, "some code");
}

#[test]
fn test_tokenize_empty_preformatted() {
    let token = Lexer::tokenize(":", 1).unwrap();
    assert_eq!(token.kind, TokenKind::Preformatted);
    assert_eq!(token.content, "");
}

#[test]
fn test_tokenize_unordered_list_markers() {
    assert_eq!(kind_of("- dash"), TokenKind::UnorderedListElement);
    assert_eq!(kind_of("+ plus"), TokenKind::UnorderedListElement);
    assert_eq!(kind_of("  * star"), TokenKind::UnorderedListElement);
}

#[test]
fn test_tokenize_list_indentation_and_content() {
    let token = Lexer::tokenize("    - nested", 1).unwrap();
    assert_eq!(token.indentation, 4);
    assert_eq!(token.content, "nested");
    assert!(token.is_list_element());
}

#[test]
fn test_tokenize_ordered_list() {
    let token = Lexer::tokenize("12. twelfth", 1).unwrap();
    assert_eq!(token.kind, TokenKind::OrderedListElement { number: "12" });
    assert_eq!(token.content, "twelfth");

    let token = Lexer::tokenize("3) third", 1).unwrap();
    assert_eq!(token.kind, TokenKind::OrderedListElement { number: "3" });
}

#[test]
fn test_tokenize_table_separator_before_row() {
    let token = Lexer::tokenize("|---+---|", 1).unwrap();
    assert_eq!(token.kind, TokenKind::TableSeparator);
    assert!(token.is_table_element());
}

#[test]
fn test_tokenize_table_row() {
    let token = Lexer::tokenize("| a | b |", 1).unwrap();
    assert_eq!(token.kind, TokenKind::TableRow);
    assert_eq!(token.content, " a | b ");
    assert!(token.is_table_element());
}

#[test]
fn test_tokenize_blank() {
    assert_eq!(kind_of(""), TokenKind::Blank);
}

#[test]
fn test_tokenize_horizontal_rule() {
    assert_eq!(kind_of("-----"), TokenKind::HorizontalRule);
    assert_eq!(kind_of("----------"), TokenKind::HorizontalRule);
    assert_eq!(kind_of("----"), TokenKind::Line);
}

#[test]
fn test_tokenize_directives() {
    let begin = Lexer::tokenize("#+BEGIN_SRC js", 1).unwrap();
    assert_eq!(begin.kind, TokenKind::Directive(DirectiveKind::Begin));
    assert_eq!(begin.content, "SRC js");

    let end = Lexer::tokenize("#+end_src", 2).unwrap();
    assert_eq!(end.kind, TokenKind::Directive(DirectiveKind::End));
    assert_eq!(end.content, "src");
    assert!(end.is_end_directive());

    let oneshot = Lexer::tokenize("#+TITLE: Hello", 3).unwrap();
    assert_eq!(oneshot.kind, TokenKind::Directive(DirectiveKind::Oneshot));
    assert_eq!(oneshot.content, "TITLE: Hello");
}

#[test]
fn test_tokenize_comment() {
    let token = Lexer::tokenize("# note to self", 1).unwrap();
    assert_eq!(token.kind, TokenKind::Comment);
    assert_eq!(token.content, " note to self");
}

#[test]
fn test_tokenize_plain_line() {
    let token = Lexer::tokenize("   just text", 1).unwrap();
    assert_eq!(token.kind, TokenKind::Line);
    assert_eq!(token.indentation, 3);
    assert_eq!(token.content, "just text");
    assert_eq!(token.raw, "   just text");
}

#[test]
fn test_token_kind_names() {
    assert_eq!(kind_of("* h").name(), "header");
    assert_eq!(kind_of("1. x").name(), "orderedListElement");
    assert_eq!(kind_of("text").name(), "line");
}

// ============================================================================
// Lexer Cursor Tests
// ============================================================================

#[test]
fn test_lexer_peek_then_next() {
    let mut lexer = Lexer::new(LineStream::new("* a\ntext"));
    let peeked = lexer.peek_token().unwrap().unwrap();
    let taken = lexer.next_token().unwrap().unwrap();
    assert_eq!(peeked, taken);
    assert_eq!(taken.line, 1);

    let second = lexer.next_token().unwrap().unwrap();
    assert_eq!(second.kind, TokenKind::Line);
    assert_eq!(second.line, 2);
    assert!(lexer.next_token().unwrap().is_none());
    assert!(!lexer.has_next());
}

#[test]
fn test_lexer_push_back_is_lifo() {
    let mut lexer = Lexer::new(LineStream::new("a\nb"));
    let a = lexer.next_token().unwrap().unwrap();
    let b = lexer.next_token().unwrap().unwrap();
    lexer.push_token(a);
    lexer.push_token(b);
    assert!(lexer.has_next());
    assert_eq!(lexer.next_token().unwrap().unwrap().content, "b");
    assert_eq!(lexer.next_token().unwrap().unwrap().content, "a");
    assert!(!lexer.has_next());
}

#[test]
fn test_lexer_dummy_blank() {
    let mut lexer = Lexer::new(LineStream::new("text"));
    lexer.push_dummy_blank();
    assert_eq!(lexer.peek_token().unwrap().unwrap().kind, TokenKind::Blank);
    lexer.next_token().unwrap();
    assert_eq!(lexer.next_token().unwrap().unwrap().kind, TokenKind::Line);
}

#[test]
fn test_lexer_line_number_ignores_lookahead() {
    let mut lexer = Lexer::new(LineStream::new("a\nb\nc"));
    lexer.next_token().unwrap();
    lexer.peek_token().unwrap();
    assert_eq!(lexer.line_number(), 1);
    lexer.next_token().unwrap();
    assert_eq!(lexer.line_number(), 2);
}

#[test]
fn test_lexer_raw_line_bypasses_classification() {
    let mut lexer = Lexer::new(LineStream::new("* not a header\n  - raw"));
    lexer.peek_token().unwrap();
    assert_eq!(lexer.next_raw_line(), Some("* not a header"));
    assert_eq!(lexer.next_raw_line(), Some("  - raw"));
    assert_eq!(lexer.next_raw_line(), None);
}
