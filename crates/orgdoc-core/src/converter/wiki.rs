//! Redmine/Textile wiki converter.
//!
//! Text passes through unescaped; Redmine escapes HTML itself when it renders
//! the page. List markers repeat per nesting depth (`**`, `##`), which is why
//! nested lists render as a continuation of their parent item.

use super::{is_image_url, Converter, NodeView, RenderContext, TaskStatus, TocItem};
use crate::ast::Directive;

/// Renders documents as Redmine wiki text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiConverter;

impl WikiConverter {
    fn list(&self, view: &NodeView<'_>) -> String {
        if view.ctx.list_depth == 0 {
            format!("\n{}", view.child_text)
        } else {
            // Nested: continue the parent item on the next line.
            format!("\n{}", view.child_text.trim_end_matches('\n'))
        }
    }

    fn marker(&self, ctx: &RenderContext<'_>) -> String {
        let symbol = if ctx.in_ordered_list { "#" } else { "*" };
        symbol.repeat(ctx.list_depth.max(1))
    }

    fn cell(&self, view: &NodeView<'_>, prefix: &str) -> String {
        let text = view.child_text.trim().replace('\n', " ");
        format!("|{}{}", prefix, text)
    }

    fn quoted(text: &str) -> String {
        let lines: Vec<String> = text
            .trim_matches('\n')
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n{}\n", lines.join("\n"))
    }
}

impl Converter for WikiConverter {
    fn name(&self) -> &'static str {
        "wiki"
    }

    fn description(&self) -> &'static str {
        "Redmine wiki (Textile) markup"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["textile", "redmine"]
    }

    fn default_header_offset(&self) -> usize {
        0
    }

    fn escape_special_chars(&self, text: &str, ctx: &RenderContext<'_>) -> String {
        if ctx.export.translate_symbol_arrow && !ctx.inside_code {
            text.replace("->", "&#10132;")
        } else {
            text.to_string()
        }
    }

    fn make_link(&self, url: &str) -> String {
        url.to_string()
    }

    fn make_subscript(&self, body: &str, subscript: &str) -> String {
        format!("{}~{}~", body, subscript)
    }

    fn convert_header(
        &self,
        view: &NodeView<'_>,
        level: usize,
        _task_status: Option<TaskStatus>,
        _section_number: Option<&str>,
    ) -> String {
        format!("\nh{}. {}\n", view.ctx.header_offset + level, view.child_text)
    }

    fn convert_ordered_list(&self, view: &NodeView<'_>) -> String {
        self.list(view)
    }

    fn convert_unordered_list(&self, view: &NodeView<'_>) -> String {
        self.list(view)
    }

    fn convert_definition_list(&self, view: &NodeView<'_>) -> String {
        self.list(view)
    }

    fn convert_definition_item(&self, view: &NodeView<'_>, term: &str) -> String {
        format!("{} *{}*: {}\n", self.marker(&view.ctx), term, view.child_text)
    }

    fn convert_list_item(&self, view: &NodeView<'_>) -> String {
        format!("{} {}\n", self.marker(&view.ctx), view.child_text)
    }

    fn convert_paragraph(&self, view: &NodeView<'_>) -> String {
        format!("\n{}\n", view.child_text)
    }

    fn convert_preformatted(&self, view: &NodeView<'_>) -> String {
        format!("<pre>{}</pre>\n", view.child_text)
    }

    fn convert_table(&self, view: &NodeView<'_>) -> String {
        format!("\n{}", view.child_text)
    }

    fn convert_table_row(&self, view: &NodeView<'_>) -> String {
        format!("{}|\n", view.child_text)
    }

    fn convert_table_header(&self, view: &NodeView<'_>) -> String {
        self.cell(view, "_. ")
    }

    fn convert_table_cell(&self, view: &NodeView<'_>) -> String {
        self.cell(view, "")
    }

    fn convert_horizontal_rule(&self, _view: &NodeView<'_>) -> String {
        "\n----\n".to_string()
    }

    fn convert_bold(&self, view: &NodeView<'_>) -> String {
        format!("*{}*", view.child_text)
    }

    fn convert_italic(&self, view: &NodeView<'_>) -> String {
        format!("_{}_", view.child_text)
    }

    fn convert_underline(&self, view: &NodeView<'_>) -> String {
        format!("+{}+", view.child_text)
    }

    fn convert_code(&self, view: &NodeView<'_>) -> String {
        format!("@{}@", view.child_text)
    }

    fn convert_dashed(&self, view: &NodeView<'_>) -> String {
        format!("-{}-", view.child_text)
    }

    fn convert_link(&self, view: &NodeView<'_>, src: &str) -> String {
        if is_image_url(src) {
            format!("!{}!", src)
        } else {
            format!("\"{}\":{}", view.child_text, src)
        }
    }

    fn convert_quote(&self, view: &NodeView<'_>, _directive: &Directive) -> String {
        Self::quoted(&view.child_text)
    }

    fn convert_example(&self, view: &NodeView<'_>, _directive: &Directive) -> String {
        format!("<pre>{}</pre>\n", view.child_text)
    }

    fn convert_src(&self, view: &NodeView<'_>, directive: &Directive) -> String {
        let language = directive.first_argument().unwrap_or("unknown");
        format!(
            "<pre><code class=\"{}\">{}</code></pre>\n",
            language, view.child_text
        )
    }

    fn convert_title(&self, title: &str, _ctx: &RenderContext<'_>) -> String {
        format!("h1. {}\n\n", title)
    }

    /// Redmine builds the table itself from the page headings.
    fn convert_toc(&self, toc: &[TocItem], _ctx: &RenderContext<'_>) -> String {
        if toc.is_empty() {
            String::new()
        } else {
            "{{toc}}\n\n".to_string()
        }
    }

    fn assemble(&self, title_markup: &str, toc_markup: &str, content: &str) -> String {
        format!("{}{}{}", title_markup, toc_markup, content)
    }
}
