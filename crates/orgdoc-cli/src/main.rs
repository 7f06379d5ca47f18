//! orgdoc CLI - Convert, inspect and validate org-style outlines
//!
//! Usage:
//!   odcli [OPTIONS] <COMMAND> [FILE]
//!
//! Commands:
//!   html      Convert to an HTML fragment
//!   wiki      Convert to Redmine wiki markup
//!   tree      Print the parsed node tree
//!   validate  Check document for errors
//!   stats     Show document statistics

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser as _;
use orgdoc_core::{
    Converter, Document, HtmlConverter, Node, NodeKind, Options, Parser, WikiConverter,
};
use serde::Serialize;

mod cli;
use cli::{Cli, Commands, ExportArgs, ParseArgs};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Html {
            file,
            parse,
            export,
        } => cmd_convert(&HtmlConverter, file.as_deref(), &parse, &export),
        Commands::Wiki {
            file,
            parse,
            export,
        } => cmd_convert(&WikiConverter, file.as_deref(), &parse, &export),
        Commands::Tree { file, parse, json } => cmd_tree(file.as_deref(), &parse, json),
        Commands::Validate { file, json } => cmd_validate(file.as_deref(), json),
        Commands::Stats { file } => cmd_stats(file.as_deref()),
    }
}

/// Read the named file, or standard input for `None` and `-`.
fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(p) if p != Path::new("-") => fs::read_to_string(p)
            .map_err(|e| format!("failed to read '{}': {}", p.display(), e)),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read standard input: {}", e))?;
            Ok(buf)
        }
    }
}

fn build_parser(args: &ParseArgs) -> Parser {
    let mut overrides = Options::empty();
    overrides.merge_lispy(args.options.iter().map(String::as_str));
    Parser::new().with_options(&overrides)
}

fn load(path: Option<&Path>, args: &ParseArgs) -> Result<Document, String> {
    let input = read_input(path)?;
    log::debug!(
        "read {} bytes from {}",
        input.len(),
        path.map_or_else(|| PathBuf::from("-"), Path::to_path_buf).display()
    );
    build_parser(args).parse(&input).map_err(|e| e.to_string())
}

// =============================================================================
// Convert Commands
// =============================================================================

fn cmd_convert<C: Converter>(
    converter: &C,
    path: Option<&Path>,
    parse: &ParseArgs,
    export: &ExportArgs,
) -> Result<(), String> {
    let doc = load(path, parse)?;
    let result = doc.convert(converter, &export.to_export_options());
    print!("{}", result.combined());
    Ok(())
}

// =============================================================================
// Tree Command
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: Option<String>,
    author: Option<&'a str>,
    email: Option<&'a str>,
    options: &'a Options,
    nodes: &'a [Node],
}

fn cmd_tree(path: Option<&Path>, parse: &ParseArgs, json: bool) -> Result<(), String> {
    let doc = load(path, parse)?;
    let title = doc.title.as_ref().map(Node::text_content);

    if json {
        let json_doc = JsonDocument {
            title,
            author: doc.author.as_deref(),
            email: doc.email.as_deref(),
            options: &doc.options,
            nodes: &doc.nodes,
        };
        let text = serde_json::to_string_pretty(&json_doc).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    if let Some(title) = title {
        println!("title: {}", title);
    }
    for node in &doc.nodes {
        print!("{}", node);
    }
    Ok(())
}

// =============================================================================
// Validate Command
// =============================================================================

fn cmd_validate(path: Option<&Path>, json: bool) -> Result<(), String> {
    let input = read_input(path)?;

    match Parser::new().parse(&input) {
        Ok(_) => {
            if json {
                println!(r#"{{"valid": true, "errors": []}}"#);
            } else {
                println!("Valid: no errors found");
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let error = serde_json::json!({
                    "message": e.message,
                    "line": e.line,
                    "kind": format!("{:?}", e.kind),
                });
                println!("{}", serde_json::json!({"valid": false, "errors": [error]}));
            }
            Err(format!("invalid document: {}", e))
        }
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(path: Option<&Path>) -> Result<(), String> {
    let input = read_input(path)?;
    let doc = Parser::new().parse(&input).map_err(|e| e.to_string())?;
    let stats = DocumentStats::from_document(&doc, &input);

    println!("Document Statistics");
    println!("-------------------");
    println!(
        "Title:        {}",
        doc.title
            .as_ref()
            .map_or_else(|| "(none)".to_string(), Node::text_content)
    );
    println!("TOC entries:  {}", doc.table_of_contents().len());
    println!();
    println!("Content:");
    println!("  Total nodes:    {}", stats.total_nodes);
    println!("  Headers:        {}", stats.headers);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Lists:          {}", stats.lists);
    println!("  List items:     {}", stats.list_items);
    println!("  Tables:         {}", stats.tables);
    println!("  Directives:     {}", stats.directives);
    println!("  Links:          {}", stats.links);
    println!();
    println!("Size:");
    println!("  Characters:     {}", stats.chars);
    println!("  Words (est.):   {}", stats.words);
    println!("  Lines:          {}", stats.lines);

    Ok(())
}

#[derive(Debug, Default)]
struct DocumentStats {
    total_nodes: usize,
    headers: usize,
    paragraphs: usize,
    lists: usize,
    list_items: usize,
    tables: usize,
    directives: usize,
    links: usize,
    chars: usize,
    words: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_document(doc: &Document, input: &str) -> Self {
        let mut stats = Self {
            chars: input.chars().count(),
            words: input.split_whitespace().count(),
            lines: input.lines().count(),
            ..Self::default()
        };

        doc.visit(|_, node| stats.count(node));
        stats
    }

    fn count(&mut self, node: &Node) {
        self.total_nodes += 1;
        match node.kind {
            NodeKind::Header { .. } => self.headers += 1,
            NodeKind::Paragraph => self.paragraphs += 1,
            NodeKind::OrderedList | NodeKind::UnorderedList | NodeKind::DefinitionList => {
                self.lists += 1
            }
            NodeKind::ListElement { .. } => self.list_items += 1,
            NodeKind::Table => self.tables += 1,
            NodeKind::Directive(_) => self.directives += 1,
            NodeKind::Link { .. } => self.links += 1,
            _ => {}
        }
    }
}
