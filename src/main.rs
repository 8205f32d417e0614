use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_processor::{Config, Extractor, Format};

/// Extract readable content and listing metadata from EPUB and comic archives
#[derive(Parser, Debug)]
#[command(name = "book-processor", version, about)]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the book's chapters, paragraphs and typography as JSON
    Content {
        /// Path to the book
        path: PathBuf,

        /// Format tag (EPUB, CBZ, CBR, PDF). Inferred from the extension when omitted.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Print the book's title, author and cover as JSON
    Metadata {
        /// Path to the book
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout carries the JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_processor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let extractor = Extractor::new(Config::from_env());
    tracing::debug!("Using {:?}", extractor.config());

    match cli.command {
        Command::Content { path, format } => {
            let tag = format.unwrap_or_else(|| Format::from_path(&path).to_string());
            let content = extractor.extract_content(&path, &tag);
            print_json(&content, cli.pretty)
        }
        Command::Metadata { path } => {
            let metadata = extractor.extract_metadata(&path);
            print_json(&metadata, cli.pretty)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json).context("Failed to write output")?;
    Ok(())
}
