//! Input limits for the command-line front end.
//!
//! The CLI reads two kinds of file: drafted text carrying `(出處：...)`
//! annotations, and evidence/batch JSON describing the cited documents.
//! Both are plain UTF-8. The cited documents themselves (`.docx`, `.pdf`,
//! spreadsheets) are a common wrong argument, so they are refused by path
//! before being opened, along with files that usually hold credentials.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIB: u64 = 1024 * 1024;

/// Cited source documents; citations point at these, the CLI never reads them
const SOURCE_DOCUMENT_PATTERNS: &[&str] = &[
    "**/*.docx",
    "**/*.doc",
    "**/*.pdf",
    "**/*.xlsx",
    "**/*.xls",
    "**/*.pptx",
];

/// Files that must never end up inside an evidence table
const CREDENTIAL_PATTERNS: &[&str] = &["**/.env*", "**/*.pem", "**/*.key"];

/// Limits applied to CLI inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimits {
    /// Largest draft, evidence or batch file accepted, in bytes
    #[serde(default = "default_max_bytes")]
    pub max_input_bytes: u64,

    /// Largest rendered result printed, in bytes
    #[serde(default = "default_max_bytes")]
    pub max_output_bytes: u64,

    /// Glob patterns for paths the CLI refuses to open
    #[serde(default = "default_denylist")]
    pub denylist_patterns: Vec<String>,
}

fn default_max_bytes() -> u64 {
    10 * MIB
}

fn default_denylist() -> Vec<String> {
    SOURCE_DOCUMENT_PATTERNS
        .iter()
        .chain(CREDENTIAL_PATTERNS)
        .map(|p| p.to_string())
        .collect()
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_bytes(),
            max_output_bytes: default_max_bytes(),
            denylist_patterns: default_denylist(),
        }
    }
}

impl InputLimits {
    /// First denylist pattern matching `path`, if any
    ///
    /// Matching ignores ASCII case so `REPORT.PDF` is caught too. Patterns
    /// that fail to compile are skipped.
    pub fn denied_by(&self, path: &str) -> Option<&str> {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        self.denylist_patterns
            .iter()
            .find(|raw| {
                Pattern::new(raw)
                    .map(|pattern| pattern.matches_with(path, options))
                    .unwrap_or(false)
            })
            .map(String::as_str)
    }

    pub fn is_denylisted(&self, path: &str) -> bool {
        self.denied_by(path).is_some()
    }

    /// Reject denylisted paths before they are opened
    pub fn validate_path(&self, path: &Path) -> Result<(), LimitViolation> {
        let path_str = path.to_string_lossy();
        match self.denied_by(&path_str) {
            Some(pattern) => Err(LimitViolation::DenylistMatch {
                path: path_str.into_owned(),
                pattern: pattern.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Check content that has been read, and the path it came from
    pub fn validate_input(&self, input: &str, source_path: Option<&Path>) -> Result<(), LimitViolation> {
        if let Some(path) = source_path {
            self.validate_path(path)?;
        }

        check_size(input, self.max_input_bytes).map_err(|actual| LimitViolation::MaxInputBytes {
            actual,
            limit: self.max_input_bytes,
        })
    }

    /// Check rendered output before it is printed
    pub fn validate_output(&self, output: &str) -> Result<(), LimitViolation> {
        check_size(output, self.max_output_bytes).map_err(|actual| LimitViolation::MaxOutputBytes {
            actual,
            limit: self.max_output_bytes,
        })
    }
}

/// UTF-8 byte length, or the length as the error when it is over `limit`
fn check_size(content: &str, limit: u64) -> Result<(), u64> {
    let size = content.len() as u64;
    if size > limit {
        Err(size)
    } else {
        Ok(())
    }
}

/// Limit violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("Input too large: {actual} bytes exceeds the {limit} byte limit")]
    MaxInputBytes { actual: u64, limit: u64 },

    #[error("Output too large: {actual} bytes exceeds the {limit} byte limit")]
    MaxOutputBytes { actual: u64, limit: u64 },

    #[error("Refusing to read {path}: matches denylist pattern `{pattern}`")]
    DenylistMatch { path: String, pattern: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = InputLimits::default();
        assert_eq!(limits.max_input_bytes, 10 * MIB);
        assert_eq!(
            limits.denylist_patterns.len(),
            SOURCE_DOCUMENT_PATTERNS.len() + CREDENTIAL_PATTERNS.len()
        );
    }

    #[test]
    fn test_source_documents_are_denied() {
        let limits = InputLimits::default();

        assert_eq!(limits.denied_by("tender/3-需求說明書.docx"), Some("**/*.docx"));
        assert_eq!(limits.denied_by("RFP.xlsx"), Some("**/*.xlsx"));
        assert_eq!(limits.denied_by("附件/REPORT.PDF"), Some("**/*.pdf"));
    }

    #[test]
    fn test_drafts_and_evidence_are_allowed() {
        let limits = InputLimits::default();

        assert!(!limits.is_denylisted("citations.json"));
        assert!(!limits.is_denylisted("drafts/需求說明.txt"));
        assert!(!limits.is_denylisted("requirements.jsonl"));
        assert!(!limits.is_denylisted("notes/docx-naming.md"));
    }

    #[test]
    fn test_credentials_are_denied() {
        let limits = InputLimits::default();

        assert!(limits.is_denylisted(".env"));
        assert!(limits.is_denylisted("project/.env.local"));
        assert!(limits.is_denylisted("certs/server.pem"));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let limits = InputLimits {
            denylist_patterns: vec!["[".to_string(), "**/*.pdf".to_string()],
            ..Default::default()
        };
        assert_eq!(limits.denied_by("a.pdf"), Some("**/*.pdf"));
        assert!(!limits.is_denylisted("a.json"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let limits: InputLimits = serde_yaml::from_str("max_input_bytes: 42").unwrap();
        assert_eq!(limits.max_input_bytes, 42);
        assert_eq!(limits.max_output_bytes, 10 * MIB);
        assert_eq!(limits.denylist_patterns, default_denylist());
    }
}
