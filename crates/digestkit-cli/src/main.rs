//! DigestKit CLI - summarize a web page or video from the command line

use clap::{Parser, ValueEnum};
use digestkit::{Digest, SummarizeRequest, Summarizer, LLMTXT};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Model used when `--model` is not given
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Output format
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// DigestKit - summarize a web page or YouTube video with one LLM call
#[derive(Parser, Debug)]
#[command(name = "digestkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL to summarize (http or https)
    url: Option<String>,

    /// Model to call
    #[arg(long, short, default_value = DEFAULT_MODEL)]
    model: String,

    /// API key for the completion endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Verify TLS certificates when fetching web pages
    #[arg(long)]
    verify_certificates: bool,

    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Chat completions base URL
    #[arg(long, env = "DIGESTKIT_LLM_BASE_URL")]
    base_url: Option<String>,

    /// Preferred transcript language (repeatable, most preferred first)
    #[arg(long = "language", value_name = "CODE")]
    languages: Vec<String>,

    /// Output format
    #[arg(long, short, default_value = "md")]
    output: OutputFormat,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if cli.llmtxt {
        writeln_safe(LLMTXT);
        std::process::exit(0);
    }

    let Some(url) = cli.url.clone() else {
        eprintln!("Usage: digestkit <URL> [--model <MODEL>]");
        eprintln!("   or: digestkit --help");
        std::process::exit(1);
    };

    run_summarize(&url, cli).await;
}

async fn run_summarize(url: &str, cli: Cli) {
    let mut builder = Summarizer::builder().verify_certificates(cli.verify_certificates);
    if let Some(ua) = cli.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(base_url) = cli.base_url {
        builder = builder.llm_base_url(base_url);
    }
    for language in cli.languages {
        builder = builder.transcript_language(language);
    }
    let summarizer = builder.build();

    // A missing key is reported by the pipeline like any other empty credential
    let credential = cli.api_key.unwrap_or_default();
    let request = SummarizeRequest::new(url, credential, cli.model.as_str());

    match summarizer.digest(&request).await {
        Ok(digest) => match cli.output {
            OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(url, &cli.model, &digest)),
            OutputFormat::Json => {
                let json = format_json(url, &cli.model, &digest).unwrap_or_else(|e| {
                    eprintln!("Error serializing response: {}", e);
                    std::process::exit(1);
                });
                writeln_safe(&json);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format a digest as markdown with YAML frontmatter
fn format_md_with_frontmatter(url: &str, model: &str, digest: &Digest) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", url.trim()));
    output.push_str(&format!("strategy: {}\n", digest.strategy.name()));
    output.push_str(&format!("model: {}\n", model));
    for (key, value) in &digest.source_metadata {
        // Frontmatter values stay on one line
        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        output.push_str(&format!("{}: {}\n", key, value));
    }
    output.push_str("---\n");

    output.push_str(&digest.summary.text);
    output
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    url: &'a str,
    model: &'a str,
    summary: &'a str,
    metadata: &'a BTreeMap<String, String>,
}

fn format_json(url: &str, model: &str, digest: &Digest) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput {
        url: url.trim(),
        model,
        summary: &digest.summary.text,
        metadata: &digest.source_metadata,
    })
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
