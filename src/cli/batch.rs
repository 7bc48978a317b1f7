//! Batch resolution of many independent texts.
//!
//! Input is JSONL, one `{"text": ..., "citations": [...]}` object per line.
//! Each line is resolved on the blocking pool with its own numbering; the
//! number of lines in flight is capped by a semaphore. Output preserves
//! input order.
//!
//! In annotate mode each line is an arbitrary requirement object instead.
//! It is echoed back with a `formatted_text` field holding its text plus a
//! `(出處：...)` annotation built from its citations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tracing::info;

use crate::citation::{append_sources_all, resolve, EvidenceRecord, Resolution};
use crate::config::ResolvedConfig;

/// One line of batch input
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    /// Annotated text to resolve
    pub text: String,
    /// Evidence for this text; missing or null means empty
    #[serde(
        default,
        alias = "evidence",
        deserialize_with = "crate::citation::types::null_as_default"
    )]
    pub citations: Vec<EvidenceRecord>,
}

/// Parse JSONL batch input, skipping blank lines
pub fn parse_batch(content: &str) -> Result<Vec<BatchItem>> {
    let mut items = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let item: BatchItem = serde_json::from_str(line)
            .with_context(|| format!("Failed to parse batch line {}", idx + 1))?;
        items.push(item);
    }

    Ok(items)
}

/// Field annotate mode writes the annotated text to
pub const FORMATTED_TEXT_FIELD: &str = "formatted_text";

/// A requirement object plus the fields annotate mode reads from it
struct RequirementLine {
    fields: Map<String, Value>,
    text: String,
    citations: Vec<EvidenceRecord>,
}

fn parse_requirement(fields: Map<String, Value>) -> Result<RequirementLine> {
    let text = ["requirement_text", "text"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .context("Missing string field `requirement_text` or `text`")?
        .to_string();

    let citations = match fields.get("citations").or_else(|| fields.get("evidence")) {
        Some(value) => serde_json::from_value::<Option<Vec<EvidenceRecord>>>(value.clone())
            .context("Invalid citations")?
            .unwrap_or_default(),
        None => Vec::new(),
    };

    Ok(RequirementLine {
        fields,
        text,
        citations,
    })
}

/// Add `formatted_text` to every JSONL requirement object
///
/// All other fields are kept as-is. Lines with no citations get their text
/// unchanged.
pub fn annotate_batch(content: &str) -> Result<Vec<Map<String, Value>>> {
    let mut lines = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Map<String, Value> = serde_json::from_str(line)
            .with_context(|| format!("Failed to parse batch line {}", idx + 1))?;
        let requirement = parse_requirement(fields)
            .with_context(|| format!("Invalid requirement on batch line {}", idx + 1))?;
        lines.push(requirement);
    }

    let formatted = append_sources_all(
        lines
            .iter()
            .map(|line| (line.text.as_str(), line.citations.as_slice())),
    );

    Ok(lines
        .into_iter()
        .zip(formatted)
        .map(|(line, text)| {
            let mut fields = line.fields;
            fields.insert(FORMATTED_TEXT_FIELD.to_string(), Value::String(text));
            fields
        })
        .collect())
}

/// Resolve every item, at most `max_concurrency` at a time
pub async fn resolve_batch(items: Vec<BatchItem>, max_concurrency: usize) -> Result<Vec<Resolution>> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(items.len());

    for item in items {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Batch semaphore closed")?;

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            resolve(&item.text, &item.citations)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("Resolution task failed")?);
    }

    Ok(results)
}

/// Execute the `batch` command
pub async fn execute_batch(input: &Path, annotate: bool, cfg: &ResolvedConfig) -> Result<()> {
    cfg.limits.validate_path(input)?;

    let content = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read batch file: {}", input.display()))?;
    cfg.limits.validate_input(&content, Some(input))?;

    if annotate {
        let annotated = annotate_batch(&content)?;
        info!(items = annotated.len(), "Annotating batch");
        for fields in &annotated {
            let line = serde_json::to_string(fields).context("Failed to serialize requirement")?;
            cfg.limits.validate_output(&line)?;
            println!("{}", line);
        }
        return Ok(());
    }

    let items = parse_batch(&content)?;
    info!(items = items.len(), concurrency = cfg.batch.max_concurrency, "Resolving batch");

    let results = resolve_batch(items, cfg.batch.max_concurrency).await?;
    for resolution in &results {
        let line = serde_json::to_string(resolution).context("Failed to serialize resolution")?;
        cfg.limits.validate_output(&line)?;
        println!("{}", line);
    }

    Ok(())
}
