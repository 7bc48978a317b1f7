//! Configuration for the citemark command-line tool.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CITEMARK_MAX_INPUT_BYTES, CITEMARK_MAX_CONCURRENCY)
//! 2. Config file (.citemark/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .citemark/config.yaml
//! - Falls back to the user config directory (e.g. ~/.config/citemark/config.yaml)
//!
//! The resolver itself takes no configuration; everything here shapes how
//! the CLI reads input and writes results.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::limits::InputLimits;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_MAX_INPUT_BYTES: &str = "CITEMARK_MAX_INPUT_BYTES";
pub const ENV_MAX_CONCURRENCY: &str = "CITEMARK_MAX_CONCURRENCY";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub limits: Option<InputLimits>,
    #[serde(default)]
    pub batch: Option<BatchConfig>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

/// How resolved results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Resolved text, then a numbered source list
    #[default]
    Text,
    /// `{"text": ..., "evidences": {...}}`
    Json,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Input/output limits
    pub limits: InputLimits,
    /// Batch settings
    pub batch: BatchSettings,
    /// Default output format
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    /// Maximum texts resolved at the same time
    pub max_concurrency: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".citemark").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("citemark").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a numeric environment override
fn env_number<T: std::str::FromStr>(
    env: &dyn Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", name, raw))
        })
        .transpose()
}

/// Merge file settings, environment overrides and defaults
fn build_config(
    config_file: Option<PathBuf>,
    file: Option<ConfigFile>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let (mut limits, mut batch, output_format) = match file {
        Some(config) => {
            let limits = config.limits.unwrap_or_default();
            let mut batch = BatchSettings::default();
            if let Some(n) = config.batch.and_then(|b| b.max_concurrency) {
                batch.max_concurrency = n;
            }
            let output_format = config
                .output
                .and_then(|o| o.format)
                .unwrap_or_default();
            (limits, batch, output_format)
        }
        None => (
            InputLimits::default(),
            BatchSettings::default(),
            OutputFormat::default(),
        ),
    };

    if let Some(bytes) = env_number::<u64>(env, ENV_MAX_INPUT_BYTES)? {
        limits.max_input_bytes = bytes;
    }
    if let Some(n) = env_number::<usize>(env, ENV_MAX_CONCURRENCY)? {
        batch.max_concurrency = n;
    }

    // A semaphore with zero permits would stall the batch forever.
    batch.max_concurrency = batch.max_concurrency.max(1);

    Ok(ResolvedConfig {
        config_file,
        limits,
        batch,
        output_format,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let file = config_file.as_deref().map(load_config_file).transpose()?;
    build_config(config_file, file, &|name| std::env::var(name).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
