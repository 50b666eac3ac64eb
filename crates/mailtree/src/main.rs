//! `mailtree` - inspect IMAP BODYSTRUCTURE and ENVELOPE responses.
//!
//! Reads one server response from a file or stdin and prints the decoded
//! part tree, envelope, or the part at a given path.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod render;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as _;
use mailtree_imap::{Parser, ParserConfig, PathNumbering};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Decode an IMAP BODYSTRUCTURE, ENVELOPE or FETCH response.
#[derive(Debug, clap::Parser)]
#[command(name = "mailtree", version)]
struct Args {
    /// File holding the response; stdin when omitted.
    input: Option<PathBuf>,

    /// Treat the input as an ENVELOPE response.
    #[arg(long, conflicts_with = "fetch")]
    envelope: bool,

    /// Treat the input as a complete `* n FETCH (...)` line.
    #[arg(long)]
    fetch: bool,

    /// Maximum multipart / embedded-message nesting.
    #[arg(long, default_value_t = mailtree_imap::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Reject inputs longer than this many bytes.
    #[arg(long)]
    max_input_len: Option<usize>,

    /// Label top-level parts with IMAP section numbers (1, 2, ...).
    #[arg(long)]
    sections: bool,

    /// Print only the part at this dotted path.
    #[arg(long, value_name = "PATH", conflicts_with = "envelope")]
    resolve: Option<String>,

    /// Print JSON instead of the indented tree.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> ParserConfig {
        let mut builder = ParserConfig::builder()
            .max_depth(self.max_depth)
            .numbering(if self.sections {
                PathNumbering::Sections
            } else {
                PathNumbering::Nested
            });
        if let Some(len) = self.max_input_len {
            builder = builder.max_input_len(len);
        }
        builder.build()
    }

    fn read_input(&self) -> Result<Vec<u8>> {
        match &self.input {
            Some(path) => std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            None => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .context("Failed to read stdin")?;
                Ok(buf)
            }
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailtree=info,mailtree_imap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let input = args.read_input()?;
    info!(bytes = input.len(), "Read response");

    let parser = Parser::new(args.config());
    let mut out = std::io::stdout().lock();

    if args.envelope {
        let envelope = parser
            .envelope(&input)
            .context("Failed to parse ENVELOPE")?;
        return render::envelope(&mut out, &envelope, args.json);
    }

    let (root, envelope) = if args.fetch {
        let response = parser
            .fetch(&input)
            .context("Failed to parse FETCH response")?;
        info!(seq = response.seq, uid = ?response.uid, "Parsed FETCH response");
        let root = response
            .body_structure
            .context("FETCH response carries no BODYSTRUCTURE")?;
        (root, response.envelope)
    } else {
        let root = parser
            .bodystructure(&input)
            .context("Failed to parse BODYSTRUCTURE")?;
        (root, None)
    };

    if let Some(path) = &args.resolve {
        let part = root
            .resolve(path)
            .with_context(|| format!("Failed to resolve {path}"))?;
        return render::tree(&mut out, part, args.json);
    }

    if let Some(envelope) = &envelope {
        render::envelope(&mut out, envelope, args.json)?;
    }
    render::tree(&mut out, &root, args.json)
}
