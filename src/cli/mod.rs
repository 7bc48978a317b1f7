//! Command-line interface for citemark.
//!
//! Provides commands for resolving annotated text, listing an evidence
//! array as a numbered source table, appending source annotations, and
//! resolving JSONL batches.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::citation::{append_sources, build_table, resolve, EvidenceRecord, EvidenceTable, Resolution};
use crate::config::{self, OutputFormat, ResolvedConfig};
use crate::limits::InputLimits;

pub mod batch;

/// citemark - resolve (出處：...) citation marks into numbered evidence
#[derive(Parser, Debug)]
#[command(name = "citemark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace citation groups with [n] markers
    Resolve {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Evidence JSON array (treated as empty if not provided)
        #[arg(short, long)]
        evidence: Option<PathBuf>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Number an evidence array 1..N as a full source list
    Table {
        /// Evidence JSON array
        #[arg(short, long)]
        evidence: PathBuf,
    },

    /// Append a (出處：...) annotation built from evidence to the input text
    Annotate {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Evidence JSON array
        #[arg(short, long)]
        evidence: PathBuf,
    },

    /// Resolve a JSONL file of {"text", "citations"} objects
    Batch {
        /// JSONL input file
        #[arg(short, long)]
        input: PathBuf,

        /// Add a `formatted_text` annotation to each requirement object
        /// instead of resolving
        #[arg(short, long)]
        annotate: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;

        match self.command {
            Commands::Resolve {
                input,
                evidence,
                format,
            } => {
                let format = format.unwrap_or(cfg.output_format);
                resolve_text(input.as_deref(), evidence.as_deref(), format, cfg).await
            }
            Commands::Table { evidence } => show_table(&evidence, cfg).await,
            Commands::Annotate { input, evidence } => {
                annotate_text(input.as_deref(), &evidence, cfg).await
            }
            Commands::Batch { input, annotate } => {
                batch::execute_batch(&input, annotate, cfg).await
            }
            Commands::Config => show_config(cfg),
        }
    }
}

/// Read text from a file, or from stdin when it is piped
async fn read_input(path: Option<&Path>, limits: &InputLimits) -> Result<String> {
    let input = if let Some(path) = path {
        limits.validate_path(path)?;
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    limits.validate_input(&input, path)?;
    Ok(input)
}

/// Load an evidence JSON array; no path means an empty list
pub async fn load_evidence(path: Option<&Path>, limits: &InputLimits) -> Result<Vec<EvidenceRecord>> {
    let Some(path) = path else {
        debug!("No evidence file given, resolving against an empty list");
        return Ok(Vec::new());
    };

    limits.validate_path(path)?;
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read evidence file: {}", path.display()))?;
    limits.validate_input(&content, Some(path))?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    // Upstream stores citations as nullable JSONB; `null` means no list.
    let records: Option<Vec<EvidenceRecord>> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse evidence file: {}", path.display()))?;
    Ok(records.unwrap_or_default())
}

/// Render a resolution as plain text followed by a numbered source list
pub fn render_text(resolution: &Resolution) -> String {
    let mut out = resolution.text.clone();
    if !resolution.evidences.is_empty() {
        out.push_str("\n\n");
        out.push_str(&render_sources(&resolution.evidences));
    }
    out
}

fn render_sources(table: &EvidenceTable) -> String {
    table
        .values()
        .map(|e| format!("[{}] {} P.{} ({})", e.marker, e.source_title, e.page, e.source_id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Execute the `resolve` command
async fn resolve_text(
    input: Option<&Path>,
    evidence: Option<&Path>,
    format: OutputFormat,
    cfg: &ResolvedConfig,
) -> Result<()> {
    let text = read_input(input, &cfg.limits).await?;
    let records = load_evidence(evidence, &cfg.limits).await?;

    let resolution = resolve(&text, &records);

    let rendered = match format {
        OutputFormat::Text => render_text(&resolution),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&resolution).context("Failed to serialize resolution")?
        }
    };
    cfg.limits.validate_output(&rendered)?;
    println!("{}", rendered);

    Ok(())
}

/// Execute the `table` command
async fn show_table(evidence: &Path, cfg: &ResolvedConfig) -> Result<()> {
    let records = load_evidence(Some(evidence), &cfg.limits).await?;
    let table = build_table(&records);

    if table.is_empty() {
        println!("No evidence found");
        return Ok(());
    }

    let rendered = render_sources(&table);
    cfg.limits.validate_output(&rendered)?;
    println!("{}", rendered);

    Ok(())
}

/// Execute the `annotate` command
async fn annotate_text(input: Option<&Path>, evidence: &Path, cfg: &ResolvedConfig) -> Result<()> {
    let text = read_input(input, &cfg.limits).await?;
    let records = load_evidence(Some(evidence), &cfg.limits).await?;

    let annotated = append_sources(&text, &records);
    cfg.limits.validate_output(&annotated)?;
    println!("{}", annotated);

    Ok(())
}

/// Execute the `config` command
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("citemark configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Limits:");
    println!("  Max input size:  {} bytes", cfg.limits.max_input_bytes);
    println!("  Max output size: {} bytes", cfg.limits.max_output_bytes);
    println!("  Denylist:");
    for pattern in &cfg.limits.denylist_patterns {
        println!("    {}", pattern);
    }
    println!();
    println!("Batch:");
    println!("  Max concurrency: {}", cfg.batch.max_concurrency);
    println!();
    println!("Output format: {:?}", cfg.output_format);

    Ok(())
}
