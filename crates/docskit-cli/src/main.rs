//! DocsKit CLI - Fetch and search documentation sites from the command line

use clap::{Parser, Subcommand, ValueEnum};
use docskit::{
    DocsetType, DocumentationRequest, ResolvedDocument, SearchRequest, SearchResult, Tool,
    TOOL_LLMTXT,
};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Output format for fetch and search subcommands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// DocsKit - documentation pages as Markdown
#[derive(Parser, Debug)]
#[command(name = "docskit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a documentation page and output it as markdown
    Fetch {
        /// Documentation page or site URL
        base_url: String,

        /// Page path relative to the base directory
        #[arg(long)]
        path: Option<String>,

        /// Docset type, skips detection
        #[arg(long = "type", value_parser = parse_docset_type)]
        docset_type: Option<DocsetType>,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Search a documentation site through its search index
    Search {
        /// Any page on the documentation site
        base_url: String,

        /// Text to search for
        query: String,

        /// Restrict index formats (mkdocs or sphinx)
        #[arg(long = "type", value_parser = parse_docset_type)]
        docset_type: Option<DocsetType>,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,
    },
}

fn parse_docset_type(s: &str) -> Result<DocsetType, String> {
    s.parse()
}

/// Log to stderr so stdout stays clean; `RUST_LOG` overrides the level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    init_logging();

    match cli.command {
        Some(Commands::Fetch {
            base_url,
            path,
            docset_type,
            output,
            user_agent,
        }) => {
            let mut request = DocumentationRequest::new(base_url);
            request.path = path;
            request.docset_type = docset_type;
            run_fetch(request, output, user_agent).await;
        }
        Some(Commands::Search {
            base_url,
            query,
            docset_type,
            output,
            user_agent,
        }) => {
            let request = SearchRequest {
                base_url,
                query,
                docset_type,
            };
            run_search(request, output, user_agent).await;
        }
        None => {
            eprintln!("Usage: docskit fetch <BASE_URL>");
            eprintln!("   or: docskit search <BASE_URL> <QUERY>");
            eprintln!("   or: docskit --help");
            std::process::exit(1);
        }
    }
}

fn build_tool(user_agent: Option<String>) -> Tool {
    let mut builder = Tool::builder();

    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }

    builder.build().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

async fn run_fetch(request: DocumentationRequest, output: OutputFormat, user_agent: Option<String>) {
    let tool = build_tool(user_agent);

    match tool.resolve(request).await {
        Ok(document) => match output {
            OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(&document)),
            OutputFormat::Json => print_json(&document),
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_search(request: SearchRequest, output: OutputFormat, user_agent: Option<String>) {
    let tool = build_tool(user_agent);

    match tool.search(request).await {
        Ok(results) => match output {
            OutputFormat::Md => writeln_safe(&format_search_results(&results)),
            OutputFormat::Json => print_json(&results),
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    });
    writeln_safe(&json);
}

/// Format document as markdown with YAML frontmatter
fn format_md_with_frontmatter(document: &ResolvedDocument) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", document.url));
    output.push_str(&format!("docset_type: {}\n", document.docset_type));
    output.push_str("---\n");
    output.push_str(&document.markdown);

    output
}

/// One markdown bullet per result, snippet indented below when present
fn format_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results".to_string();
    }

    results
        .iter()
        .map(|r| {
            let mut line = format!("- [{}]({}) ({})", r.title, r.url, r.source);
            let snippet = r.snippet.split_whitespace().collect::<Vec<_>>().join(" ");
            if !snippet.is_empty() {
                line.push_str(&format!("\n  {}", snippet));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
