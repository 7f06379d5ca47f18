use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use orgdoc_core::ExportOptions;

#[derive(Parser)]
#[command(name = "odcli")]
#[command(author, version)]
#[command(about = "Convert org-style outlines to HTML or Redmine wiki markup")]
#[command(after_help = "\
EXAMPLES:

    # Convert a file to HTML
    odcli html notes.org

    # Convert standard input to wiki markup
    cat notes.org | odcli wiki

    # Force a shallow table of contents
    odcli html -o toc:2 notes.org

    # Inspect the parsed tree as JSON
    odcli tree --json notes.org

    # Check a document for errors
    odcli validate notes.org")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log parser and converter activity at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a document to an HTML fragment
    Html {
        /// Input file; reads standard input when omitted or `-`
        file: Option<PathBuf>,

        #[command(flatten)]
        parse: ParseArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Convert a document to Redmine wiki (Textile) markup
    Wiki {
        /// Input file; reads standard input when omitted or `-`
        file: Option<PathBuf>,

        #[command(flatten)]
        parse: ParseArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Print the parsed node tree
    Tree {
        /// Input file; reads standard input when omitted or `-`
        file: Option<PathBuf>,

        #[command(flatten)]
        parse: ParseArgs,

        /// Print the tree as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check a document for parse errors
    Validate {
        /// Input file; reads standard input when omitted or `-`
        file: Option<PathBuf>,

        /// Report the result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show document statistics
    Stats {
        /// Input file; reads standard input when omitted or `-`
        file: Option<PathBuf>,
    },
}

/// Document option overrides.
#[derive(Args, Debug, Default)]
pub struct ParseArgs {
    /// Override a document option, as in `#+OPTIONS:` (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY:VALUE")]
    pub options: Vec<String>,
}

/// Converter switches.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Added to every header level (HTML default 1, wiki default 0)
    #[arg(long, value_name = "N")]
    pub header_offset: Option<usize>,

    /// Wrap nodes in elements carrying their source line
    #[arg(long)]
    pub line_numbers: bool,

    /// Leave `a_{b}` subscript syntax as text
    #[arg(long)]
    pub no_subscripts: bool,

    /// Do not turn bare URLs into links
    #[arg(long)]
    pub no_auto_link: bool,

    /// Render `->` as an arrow outside code
    #[arg(long)]
    pub translate_arrow: bool,

    /// Leave `[X]` list item markers as text
    #[arg(long)]
    pub no_checkboxes: bool,

    /// Prefix for generated HTML class names
    #[arg(long, value_name = "PREFIX")]
    pub class_prefix: Option<String>,

    /// Prefix for generated HTML ids
    #[arg(long, value_name = "PREFIX")]
    pub id_prefix: Option<String>,
}

impl ExportArgs {
    pub fn to_export_options(&self) -> ExportOptions {
        let mut export = ExportOptions::new()
            .with_export_from_line_number(self.line_numbers)
            .with_suppress_sub_script_handling(self.no_subscripts)
            .with_suppress_auto_link(self.no_auto_link)
            .with_translate_symbol_arrow(self.translate_arrow)
            .with_suppress_checkbox_handling(self.no_checkboxes);
        if let Some(offset) = self.header_offset {
            export = export.with_header_offset(offset);
        }
        if let Some(prefix) = &self.class_prefix {
            export = export.with_html_class_prefix(prefix.as_str());
        }
        if let Some(prefix) = &self.id_prefix {
            export = export.with_html_id_prefix(prefix.as_str());
        }
        export
    }
}
