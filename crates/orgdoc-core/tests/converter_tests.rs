//! Integration tests for the HTML and wiki converters

use orgdoc_core::converter::is_image_url;
use orgdoc_core::{
    convert, parse, Converter, ConverterRegistry, Directive, ExportOptions, HtmlConverter,
    Parser, WikiConverter,
};

fn html_with(input: &str, export: &ExportOptions) -> String {
    parse(input).unwrap().convert(&HtmlConverter, export).content
}

fn html(input: &str) -> String {
    html_with(input, &ExportOptions::default())
}

fn wiki_with(input: &str, export: &ExportOptions) -> String {
    parse(input).unwrap().convert(&WikiConverter, export).content
}

fn wiki(input: &str) -> String {
    wiki_with(input, &ExportOptions::default())
}

// ============================================================================
// HTML Document Tests
// ============================================================================

#[test]
fn test_html_full_document() {
    let input = "Sample\n* Intro\nSome *bold* text.\n** Details\n- [X] done\n- [ ] open\n";
    let result = parse(input)
        .unwrap()
        .convert(&HtmlConverter, &ExportOptions::default());

    let expected = concat!(
        "<h1>Sample</h1>\n",
        "<ul><li><a href=\"#header-1\"><span class=\"section-number\">1</span>Intro</a>",
        "<ul><li><a href=\"#header-1-1\"><span class=\"section-number\">1.1</span>Details</a></li>\n",
        "</ul>\n",
        "</li>\n",
        "</ul>\n",
        "\n",
        "<h2 id=\"header-1\"><span class=\"section-number\">1</span>Intro</h2>\n",
        "Some <b>bold</b> text.",
        "<h3 id=\"header-1-1\"><span class=\"section-number\">1.1</span>Details</h3>\n",
        "<ul><li data-checkbox-status=\"done\"><input type=\"checkbox\" checked=\"true\"/> done</li>\n",
        "<li data-checkbox-status=\"undone\"><input type=\"checkbox\"/> open</li>\n",
        "</ul>\n",
    );
    assert_eq!(result.combined(), expected);
    assert_eq!(result.to_string(), expected);
    assert_eq!(result.title, "Sample");
    assert_eq!(result.toc.len(), 1);
    assert_eq!(result.toc[0].children[0].section_number, "1.1");
}

#[test]
fn test_html_untitled() {
    let result = parse("* A\n")
        .unwrap()
        .convert(&HtmlConverter, &ExportOptions::default());
    assert_eq!(result.title, "Untitled");
    assert_eq!(result.title_markup, "<h1>Untitled</h1>\n");
}

#[test]
fn test_html_title_inline_markup() {
    let result = parse("The *Big* Title\n")
        .unwrap()
        .convert(&HtmlConverter, &ExportOptions::default());
    assert_eq!(result.title, "The <b>Big</b> Title");
}

#[test]
fn test_html_header_offset() {
    let export = ExportOptions::new().with_header_offset(2);
    let result = parse("* A\n").unwrap().convert(&HtmlConverter, &export);
    assert_eq!(result.title_markup, "<h2>Untitled</h2>\n");
    assert!(result.content.starts_with("<h3 id=\"header-1\">"));
}

#[test]
fn test_html_zero_offset_keeps_h1_title() {
    let export = ExportOptions::new().with_header_offset(0);
    let result = parse("* A\n").unwrap().convert(&HtmlConverter, &export);
    assert_eq!(result.title_markup, "<h1>Untitled</h1>\n");
    assert!(result.content.starts_with("<h1 id=\"header-1\">"));
}

#[test]
fn test_html_numbering_disabled() {
    let result = parse("#+OPTIONS: num:nil\n* A\n")
        .unwrap()
        .convert(&HtmlConverter, &ExportOptions::default());
    assert_eq!(result.content, "<h2 id=\"header-1\">A</h2>\n");
    assert_eq!(
        result.toc_markup,
        "<ul><li><a href=\"#header-1\">A</a></li>\n</ul>\n"
    );
}

#[test]
fn test_html_toc_disabled() {
    let result = parse("#+OPTIONS: toc:nil\n* A\n")
        .unwrap()
        .convert(&HtmlConverter, &ExportOptions::default());
    assert!(result.toc.is_empty());
    assert_eq!(result.toc_markup, "");
    assert_eq!(
        result.combined(),
        format!("{}\n{}", result.title_markup, result.content)
    );
}

#[test]
fn test_html_toc_max_level() {
    let result = parse("#+OPTIONS: toc:1\n* A\n** B\n")
        .unwrap()
        .convert(&HtmlConverter, &ExportOptions::default());
    assert_eq!(result.toc.len(), 1);
    assert!(result.toc[0].children.is_empty());
    assert!(!result.toc_markup.contains("header-1-1"));
    assert!(result.content.contains("id=\"header-1-1\""));
}

#[test]
fn test_html_no_headers_no_toc_markup() {
    let result = parse("Title\n\ntext\n")
        .unwrap()
        .convert(&HtmlConverter, &ExportOptions::default());
    assert_eq!(result.toc_markup, "");
}

// ============================================================================
// HTML Header Tests
// ============================================================================

#[test]
fn test_html_task_status() {
    assert_eq!(
        html("* TODO Write tests\n"),
        "<h2 id=\"header-1\" class=\"task-status todo\"><span class=\"section-number\">1</span><span class=\"task-status todo\">TODO</span>Write tests</h2>\n"
    );
}

#[test]
fn test_html_done_status() {
    assert!(html("* DONE Ship it\n").contains("<span class=\"task-status done\">DONE</span>Ship it"));
}

#[test]
fn test_html_id_and_class_prefixes() {
    let export = ExportOptions::new()
        .with_html_class_prefix("org-")
        .with_html_id_prefix("doc-");
    let result = parse("* TODO Ship\n").unwrap().convert(&HtmlConverter, &export);
    assert_eq!(
        result.content,
        "<h2 id=\"doc-header-1\" class=\"org-task-status todo\"><span class=\"org-section-number\">1</span><span class=\"org-task-status todo\">TODO</span>Ship</h2>\n"
    );
    assert!(result.toc_markup.contains("href=\"#doc-header-1\""));
}

// ============================================================================
// HTML Block Tests
// ============================================================================

#[test]
fn test_html_escapes_special_characters() {
    insta::assert_snapshot!(
        html("T\n\na < b & \"c\" 'd'\n").trim_end(),
        @"<p>a &#60; b &#38; &#34;c&#34; &#39;d&#39;</p>"
    );
}

#[test]
fn test_html_symbol_arrow() {
    let export = ExportOptions::new().with_translate_symbol_arrow(true);
    assert_eq!(html_with("T\n\na -> b\n", &export), "<p>a &#10132; b</p>\n");
    assert_eq!(html("T\n\na -> b\n"), "<p>a -&#62; b</p>\n");
}

#[test]
fn test_html_symbol_arrow_not_in_code() {
    let export = ExportOptions::new().with_translate_symbol_arrow(true);
    assert_eq!(
        html_with("T\n\n=a -> b=\n", &export),
        "<p><code>a -&#62; b</code></p>\n"
    );
}

#[test]
fn test_html_lists() {
    assert_eq!(
        html("1. a\n2. b\n"),
        "<ol><li>a</li>\n<li>b</li>\n</ol>\n"
    );
    assert_eq!(html("- T :: D\n"), "<dl><dt>T</dt>\n<dd>D</dd>\n</dl>\n");
    assert_eq!(
        html("- a\n  - b\n"),
        "<ul><li>a<ul><li>b</li>\n</ul>\n</li>\n</ul>\n"
    );
}

#[test]
fn test_html_intermediate_checkbox() {
    assert_eq!(
        html("- [-] half\n"),
        "<ul><li data-checkbox-status=\"intermediate\"><input type=\"checkbox\"/> half</li>\n</ul>\n"
    );
}

#[test]
fn test_html_checkbox_suppressed() {
    let export = ExportOptions::new().with_suppress_checkbox_handling(true);
    assert_eq!(
        html_with("- [X] done\n", &export),
        "<ul><li>[X] done</li>\n</ul>\n"
    );
}

#[test]
fn test_html_preformatted_and_rule() {
    assert_eq!(html("T\n: x < y\n"), "<pre>x &#60; y</pre>\n");
    assert_eq!(html("T\n-----\n"), "<hr/>\n");
}

#[test]
fn test_html_table_with_header() {
    insta::assert_snapshot!(
        html("T\n|h|\n|---|\n|c|\n").replace('\n', "~"),
        @"<table><tbody><tr><th>h</th>~</tr>~<tr><td>c</td>~</tr>~</tbody>~</table>~"
    );
}

#[test]
fn test_html_aux_attributes() {
    assert_eq!(
        html("#+ATTR_HTML: class=\"wide\"\n|a|\n"),
        "<table class=\"wide\" ><tbody><tr><td>a</td>\n</tr>\n</tbody>\n</table>\n"
    );
}

#[test]
fn test_html_aux_attributes_nearest_first() {
    assert_eq!(
        html("#+ATTR_HTML: a=\"1\"\n#+ATTR_HTML: b=\"2\"\n-----\n"),
        "<hr b=\"2\" a=\"1\" />\n"
    );
}

// ============================================================================
// HTML Inline Tests
// ============================================================================

#[test]
fn test_html_emphasis() {
    assert_eq!(
        html("T\n\n*b* /i/ _u_ =c= +d+\n"),
        "<p><b>b</b> <i>i</i> <span style=\"text-decoration:underline;\">u</span> <code>c</code> <del>d</del></p>\n"
    );
}

#[test]
fn test_html_links() {
    assert_eq!(
        html("T\n\n[[http://example.com][Example]]\n"),
        "<p><a href=\"http://example.com\">Example</a></p>\n"
    );
    assert_eq!(
        html("T\n\n[[img/cat.png][A cat]]\n"),
        "<p><img src=\"img/cat.png\" alt=\"A cat\" title=\"A cat\"/></p>\n"
    );
}

#[test]
fn test_html_auto_link() {
    assert_eq!(
        html("T\n\nsee http://example.com now\n"),
        "<p>see <a href=\"http://example.com\">http://example.com</a> now</p>\n"
    );
    assert_eq!(
        html("T\n\nvisit www.example.org today\n"),
        "<p>visit <a href=\"http://www.example.org\">http://www.example.org</a> today</p>\n"
    );
}

#[test]
fn test_html_auto_link_suppressed() {
    let export = ExportOptions::new().with_suppress_auto_link(true);
    assert_eq!(
        html_with("T\n\nsee http://example.com\n", &export),
        "<p>see http://example.com</p>\n"
    );
}

#[test]
fn test_html_no_auto_link_inside_link_label() {
    assert_eq!(
        html("T\n\n[[http://a.com][http://b.com]]\n"),
        "<p><a href=\"http://a.com\">http://b.com</a></p>\n"
    );
}

#[test]
fn test_html_subscripts() {
    let sub = "<span class=\"org-subscript-parent\">H</span><span class=\"org-subscript-child\">2</span>";
    assert_eq!(html("T\n\nH_{2}O\n"), format!("<p>{}O</p>\n", sub));

    let export = ExportOptions::new().with_suppress_sub_script_handling(true);
    assert_eq!(html_with("T\n\nH_{2}O\n", &export), "<p>H_{2}O</p>\n");
}

#[test]
fn test_html_greedy_subscripts() {
    assert_eq!(
        html("#+OPTIONS: ^:t\n\na_b\n"),
        "<p><span class=\"org-subscript-parent\">a</span><span class=\"org-subscript-child\">b</span></p>\n"
    );
}

#[test]
fn test_html_subscripts_disabled_by_option() {
    assert_eq!(html("#+OPTIONS: ^:nil\n\na_{b}\n"), "<p>a_{b}</p>\n");
}

#[test]
fn test_html_no_subscripts_in_code() {
    assert_eq!(html("T\n\n=H_{2}O=\n"), "<p><code>H_{2}O</code></p>\n");
}

// ============================================================================
// HTML Directive Tests
// ============================================================================

#[test]
fn test_html_src_block() {
    assert_eq!(
        html("#+begin_src js\nif (a < b) {}\n#+end_src\n"),
        "<pre class=\"prettyprint\"><code class=\"language-js\">if (a &#60; b) {}</code>\n</pre>\n"
    );
    assert!(html("#+begin_src\nx\n#+end_src\n").contains("language-unknown"));
}

#[test]
fn test_html_example_and_quote() {
    assert_eq!(
        html("#+begin_example\na < b\n#+end_example\n"),
        "<pre>a &#60; b</pre>\n"
    );
    assert_eq!(
        html("#+begin_quote\nwise words\n#+end_quote\n"),
        "<blockquote><p>wise words</p>\n</blockquote>\n"
    );
}

#[test]
fn test_html_raw_html() {
    assert_eq!(html("#+HTML: <b>raw</b>\n"), "<b>raw</b>");
    assert_eq!(html("#+begin_html\n<div>x</div>\n#+end_html\n"), "<div>x</div>");
}

#[test]
fn test_html_custom_directive_handler() {
    let export = ExportOptions::new().with_directive_handler("note", |_directive, body| {
        format!("<aside>{}</aside>", body)
    });
    assert_eq!(
        html_with("#+begin_note\nhi\n#+end_note\n", &export),
        "<aside><p>hi</p>\n</aside>"
    );
}

#[test]
fn test_html_custom_handler_sees_directive() {
    let export = ExportOptions::new().with_directive_handler("note", |directive: &Directive, _body: &str| {
        directive.arguments.join(",")
    });
    assert_eq!(
        html_with("#+begin_note warn loud\nhi\n#+end_note\n", &export),
        "warn,loud"
    );
}

#[test]
fn test_html_unknown_block_passes_children_through() {
    assert_eq!(html("#+begin_center\nhi\n#+end_center\n"), "<p>hi</p>\n");
}

#[test]
fn test_html_line_numbers() {
    let export = ExportOptions::new().with_export_from_line_number(true);
    assert_eq!(
        html_with("T\n\npara\n", &export),
        "<div data-line-number=\"3\"><p>para</p>\n</div>"
    );
    assert_eq!(
        html_with("* A\n", &export),
        "<div data-line-number=\"1\"><h2 id=\"header-1\"><span class=\"section-number\">1</span>A</h2>\n</div>"
    );
}

// ============================================================================
// Wiki Tests
// ============================================================================

#[test]
fn test_wiki_full_document() {
    let input = "Sample\n* Intro\nSome *bold* text.\n** Details\n- one\n- two\n";
    let result = parse(input)
        .unwrap()
        .convert(&WikiConverter, &ExportOptions::default());
    assert_eq!(
        result.combined(),
        "h1. Sample\n\n{{toc}}\n\n\nh1. Intro\nSome *bold* text.\nh2. Details\n\n* one\n* two\n"
    );
}

#[test]
fn test_wiki_untitled_without_toc() {
    let result = parse("Title\n\ntext\n")
        .unwrap()
        .convert(&WikiConverter, &ExportOptions::default());
    assert_eq!(result.combined(), "h1. Title\n\n\ntext\n");

    let result = parse("- a\n")
        .unwrap()
        .convert(&WikiConverter, &ExportOptions::default());
    assert!(result.combined().starts_with("h1. Untitled\n\n"));
}

#[test]
fn test_wiki_header_offset() {
    let export = ExportOptions::new().with_header_offset(1);
    assert_eq!(wiki_with("* A\n", &export), "\nh2. A\n");
}

#[test]
fn test_wiki_lists() {
    assert_eq!(wiki("T\n1. x\n2. y\n"), "\n# x\n# y\n");
    assert_eq!(wiki("T\n- k :: v\n"), "\n* *k*: v\n");
    assert_eq!(wiki("T\n- a\n  1. b\n- c\n"), "\n* a\n## b\n* c\n");
}

#[test]
fn test_wiki_inline() {
    assert_eq!(
        wiki("T\n\n*b* /i/ _u_ =c= +d+\n"),
        "\n*b* _i_ +u+ @c@ -d-\n"
    );
    assert_eq!(
        wiki("T\n\n[[http://x.org][X]] [[pic.png]]\n"),
        "\n\"X\":http://x.org !pic.png!\n"
    );
}

#[test]
fn test_wiki_text_is_not_escaped() {
    assert_eq!(wiki("T\n\na < b\n"), "\na < b\n");
}

#[test]
fn test_wiki_subscript() {
    assert_eq!(wiki("T\n\nH_{2}O\n"), "\nH~2~O\n");
}

#[test]
fn test_wiki_table_and_rule() {
    assert_eq!(wiki("T\n|h|\n|---|\n|c|\n"), "\n|_. h|\n|c|\n");
    assert_eq!(wiki("T\n-----\n"), "\n----\n");
}

#[test]
fn test_wiki_blocks() {
    assert_eq!(wiki("#+begin_quote\nwise\n#+end_quote\n"), "\n> wise\n");
    assert_eq!(
        wiki("#+begin_src js\nx\n#+end_src\n"),
        "<pre><code class=\"js\">x</code></pre>\n"
    );
    assert_eq!(
        wiki("#+begin_example\nx\n#+end_example\n"),
        "<pre>x</pre>\n"
    );
    assert_eq!(wiki("T\n: code\n"), "<pre>code</pre>\n");
}

// ============================================================================
// Framework Tests
// ============================================================================

#[test]
fn test_image_urls() {
    assert!(is_image_url("cat.png"));
    assert!(is_image_url("http://x.org/a/cat.jpeg?size=2"));
    assert!(!is_image_url("page.html"));
    assert!(!is_image_url("png"));
}

#[test]
fn test_registry_lookup() {
    let registry = ConverterRegistry::with_defaults();
    assert_eq!(registry.names(), vec!["html", "wiki"]);
    assert_eq!(registry.get("wiki").map(|c| c.name()), Some("wiki"));
    assert!(registry.get("pdf").is_none());
    assert_eq!(registry.for_extension(".htm").map(|c| c.name()), Some("html"));
    assert_eq!(registry.for_extension("textile").map(|c| c.name()), Some("wiki"));
}

#[test]
fn test_registry_converter_renders() {
    let registry = ConverterRegistry::default();
    let doc = parse("* A\n").unwrap();
    let converter = registry.get("html").unwrap();
    let result = convert(converter, &doc, &ExportOptions::default());
    assert!(result.content.starts_with("<h2"));
}

#[test]
fn test_conversion_is_repeatable() {
    let doc = Parser::new().parse("Title\n* A\n** B\n* C\n- x\n").unwrap();
    let export = ExportOptions::default();
    let first = doc.convert(&HtmlConverter, &export);
    let second = doc.convert(&HtmlConverter, &export);
    assert_eq!(first, second);
    assert!(second.content.contains("id=\"header-2\""));
}

#[test]
fn test_concurrent_conversions() {
    let doc = parse("Title\n* A\n** B\ntext *x*\n").unwrap();
    let export = ExportOptions::default();
    let converter = HtmlConverter;
    let expected = doc.convert(&converter, &export);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| doc.convert(&converter, &export)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
