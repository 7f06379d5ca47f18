//! HTML converter.

use std::borrow::Cow;
use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{is_image_url, Converter, NodeView, RenderContext, TaskStatus, TocItem};
use crate::ast::Directive;
use crate::options::ExportOptions;

/// `[X]`, `[ ]` or `[-]` at the start of a list item.
static CHECKBOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*\[(X| |-)\](.*)").expect("checkbox pattern must compile")
});

/// Renders documents as HTML fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlConverter;

/// Attribute list in output order.
type Attrs<'a> = [(&'a str, Cow<'a, str>)];

/// `<name aux attrs>inner</name>`, or `<name aux attrs/>` without inner text.
fn inline_tag(
    export: &ExportOptions,
    name: &str,
    inner: Option<&str>,
    attrs: &Attrs<'_>,
    aux: &str,
) -> String {
    let mut html = String::with_capacity(inner.map_or(0, str::len) + 16);
    html.push('<');
    html.push_str(name);
    if !aux.is_empty() {
        html.push(' ');
        html.push_str(aux);
    }
    for (attr, value) in attrs {
        let prefix = match *attr {
            "class" => export.html_class_prefix.as_deref(),
            "id" => export.html_id_prefix.as_deref(),
            _ => None,
        };
        let _ = write!(html, " {}=\"{}{}\"", attr, prefix.unwrap_or(""), value);
    }
    match inner {
        Some(inner) => {
            let _ = write!(html, ">{}</{}>", inner, name);
        }
        None => html.push_str("/>"),
    }
    html
}

/// Block-level variant of [`inline_tag`]: same markup plus a newline.
fn tag(export: &ExportOptions, name: &str, inner: Option<&str>, attrs: &Attrs<'_>, aux: &str) -> String {
    let mut html = inline_tag(export, name, inner, attrs, aux);
    html.push('\n');
    html
}

fn section_number_span(export: &ExportOptions, number: &str) -> String {
    inline_tag(
        export,
        "span",
        Some(number),
        &[("class", "section-number".into())],
        "",
    )
}

fn header_id(number: &str) -> String {
    format!("header-{}", number.replace('.', "-"))
}

impl HtmlConverter {
    fn block(&self, view: &NodeView<'_>, name: &str) -> String {
        tag(view.ctx.export, name, Some(&view.child_text), &[], &view.aux)
    }

    fn inline(&self, view: &NodeView<'_>, name: &str, attrs: &Attrs<'_>) -> String {
        inline_tag(view.ctx.export, name, Some(&view.child_text), attrs, &view.aux)
    }

    fn toc_list(&self, items: &[TocItem], ctx: &RenderContext<'_>) -> String {
        let export = ctx.export;
        let numbering = ctx.document.options.numbering();
        let mut list = String::new();
        for item in items {
            let mut label = String::new();
            if numbering {
                label.push_str(&section_number_span(export, &item.section_number));
            }
            label.push_str(&item.text);
            let href = format!(
                "#{}{}",
                export.html_id_prefix.as_deref().unwrap_or(""),
                header_id(&item.section_number)
            );
            let mut entry = inline_tag(export, "a", Some(&label), &[("href", href.into())], "");
            if !item.children.is_empty() {
                entry.push_str(&self.toc_list(&item.children, ctx));
            }
            list.push_str(&tag(export, "li", Some(&entry), &[], ""));
        }
        tag(export, "ul", Some(&list), &[], "")
    }
}

impl Converter for HtmlConverter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn description(&self) -> &'static str {
        "HTML fragment with heading ids, section numbers and a table of contents"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["html", "htm"]
    }

    fn default_header_offset(&self) -> usize {
        1
    }

    fn aux_attribute_directive(&self) -> Option<&'static str> {
        Some("attr_html:")
    }

    fn escape_special_chars(&self, text: &str, ctx: &RenderContext<'_>) -> String {
        let arrows = ctx.export.translate_symbol_arrow && !ctx.inside_code;
        let mut out = String::with_capacity(text.len() + text.len() / 8);
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '&' => out.push_str("&#38;"),
                '<' => out.push_str("&#60;"),
                '>' => out.push_str("&#62;"),
                '"' => out.push_str("&#34;"),
                '\'' => out.push_str("&#39;"),
                '-' if arrows && chars.peek() == Some(&'>') => {
                    chars.next();
                    out.push_str("&#10132;");
                }
                _ => out.push(c),
            }
        }
        out
    }

    fn make_link(&self, url: &str) -> String {
        format!("<a href=\"{}\">{}</a>", url, url)
    }

    fn make_subscript(&self, body: &str, subscript: &str) -> String {
        format!(
            "<span class=\"org-subscript-parent\">{}</span><span class=\"org-subscript-child\">{}</span>",
            body, subscript
        )
    }

    fn convert_header(
        &self,
        view: &NodeView<'_>,
        level: usize,
        task_status: Option<TaskStatus>,
        section_number: Option<&str>,
    ) -> String {
        let export = view.ctx.export;
        let mut attrs: Vec<(&str, Cow<'_, str>)> = Vec::new();
        let mut text = String::new();

        if let Some(number) = section_number {
            attrs.push(("id", header_id(number).into()));
            if view.ctx.document.options.numbering() {
                text.push_str(&section_number_span(export, number));
            }
        }

        match task_status {
            Some(status) => {
                let class = format!("task-status {}", status.as_str());
                // "TODO " and "DONE " are ASCII, so byte offsets are char boundaries.
                text.push_str(&inline_tag(
                    export,
                    "span",
                    Some(&view.child_text[..4]),
                    &[("class", class.clone().into())],
                    "",
                ));
                text.push_str(&view.child_text[5..]);
                attrs.push(("class", class.into()));
            }
            None => text.push_str(&view.child_text),
        }

        let name = format!("h{}", view.ctx.header_offset + level);
        tag(export, &name, Some(&text), &attrs, &view.aux)
    }

    fn convert_ordered_list(&self, view: &NodeView<'_>) -> String {
        self.block(view, "ol")
    }

    fn convert_unordered_list(&self, view: &NodeView<'_>) -> String {
        self.block(view, "ul")
    }

    fn convert_definition_list(&self, view: &NodeView<'_>) -> String {
        self.block(view, "dl")
    }

    fn convert_definition_item(&self, view: &NodeView<'_>, term: &str) -> String {
        let export = view.ctx.export;
        let mut html = tag(export, "dt", Some(term), &[], "");
        html.push_str(&tag(export, "dd", Some(&view.child_text), &[], ""));
        html
    }

    fn convert_list_item(&self, view: &NodeView<'_>) -> String {
        let export = view.ctx.export;
        if export.suppress_checkbox_handling {
            return self.block(view, "li");
        }
        let Some(caps) = CHECKBOX.captures(&view.child_text) else {
            return self.block(view, "li");
        };

        let mark = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());
        let status = match mark {
            "X" => "done",
            "-" => "intermediate",
            _ => "undone",
        };
        let mut input_attrs: Vec<(&str, Cow<'_, str>)> = vec![("type", "checkbox".into())];
        if mark == "X" {
            input_attrs.push(("checked", "true".into()));
        }
        let mut text = inline_tag(export, "input", None, &input_attrs, "");
        text.push_str(rest);
        tag(
            export,
            "li",
            Some(&text),
            &[("data-checkbox-status", status.into())],
            &view.aux,
        )
    }

    fn convert_paragraph(&self, view: &NodeView<'_>) -> String {
        self.block(view, "p")
    }

    fn convert_preformatted(&self, view: &NodeView<'_>) -> String {
        self.block(view, "pre")
    }

    fn convert_table(&self, view: &NodeView<'_>) -> String {
        let export = view.ctx.export;
        let body = tag(export, "tbody", Some(&view.child_text), &[], "");
        tag(export, "table", Some(&body), &[], &view.aux)
    }

    fn convert_table_row(&self, view: &NodeView<'_>) -> String {
        self.block(view, "tr")
    }

    fn convert_table_header(&self, view: &NodeView<'_>) -> String {
        self.block(view, "th")
    }

    fn convert_table_cell(&self, view: &NodeView<'_>) -> String {
        self.block(view, "td")
    }

    fn convert_horizontal_rule(&self, view: &NodeView<'_>) -> String {
        tag(view.ctx.export, "hr", None, &[], &view.aux)
    }

    fn convert_bold(&self, view: &NodeView<'_>) -> String {
        self.inline(view, "b", &[])
    }

    fn convert_italic(&self, view: &NodeView<'_>) -> String {
        self.inline(view, "i", &[])
    }

    fn convert_underline(&self, view: &NodeView<'_>) -> String {
        self.inline(view, "span", &[("style", "text-decoration:underline;".into())])
    }

    fn convert_code(&self, view: &NodeView<'_>) -> String {
        self.inline(view, "code", &[])
    }

    fn convert_dashed(&self, view: &NodeView<'_>) -> String {
        self.inline(view, "del", &[])
    }

    fn convert_link(&self, view: &NodeView<'_>, src: &str) -> String {
        if is_image_url(src) {
            let alt = self.node_text_content(view.node, &view.ctx);
            inline_tag(
                view.ctx.export,
                "img",
                None,
                &[
                    ("src", src.into()),
                    ("alt", alt.as_str().into()),
                    ("title", alt.as_str().into()),
                ],
                &view.aux,
            )
        } else {
            self.inline(view, "a", &[("href", src.into())])
        }
    }

    fn convert_quote(&self, view: &NodeView<'_>, _directive: &Directive) -> String {
        self.block(view, "blockquote")
    }

    fn convert_example(&self, view: &NodeView<'_>, _directive: &Directive) -> String {
        self.block(view, "pre")
    }

    fn convert_src(&self, view: &NodeView<'_>, directive: &Directive) -> String {
        let export = view.ctx.export;
        let language = directive.first_argument().unwrap_or("unknown");
        let code = tag(
            export,
            "code",
            Some(&view.child_text),
            &[("class", format!("language-{}", language).into())],
            &view.aux,
        );
        tag(export, "pre", Some(&code), &[("class", "prettyprint".into())], "")
    }

    fn post_process(&self, view: &NodeView<'_>, text: String) -> String {
        match view.node.line {
            Some(line) if view.ctx.export.export_from_line_number => inline_tag(
                view.ctx.export,
                "div",
                Some(&text),
                &[("data-line-number", line.to_string().into())],
                "",
            ),
            _ => text,
        }
    }

    fn convert_title(&self, title: &str, ctx: &RenderContext<'_>) -> String {
        let name = format!("h{}", ctx.header_offset.max(1));
        tag(ctx.export, &name, Some(title), &[], "")
    }

    fn convert_toc(&self, toc: &[TocItem], ctx: &RenderContext<'_>) -> String {
        if toc.is_empty() {
            return String::new();
        }
        self.toc_list(toc, ctx)
    }

    fn assemble(&self, title_markup: &str, toc_markup: &str, content: &str) -> String {
        format!("{}{}\n{}", title_markup, toc_markup, content)
    }
}
