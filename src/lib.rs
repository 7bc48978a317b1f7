//! citemark - Citation mark resolution for drafted tender text
//!
//! Language-model drafts cite their sources inline as
//! `(出處：3-需求說明書.docx P.1, P.2)`. citemark rewrites those groups into
//! sequential markers (`[1] [2]`) and builds the marker → evidence table a
//! renderer needs for clickable citation badges.
//!
//! # Modules
//!
//! - `citation`: The resolution engine (scanner, splitter, matcher, numbering)
//! - `limits`: Input/output size limits and path denylist for the CLI
//! - `config`: Configuration file and environment handling
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Resolve a draft against its evidence array
//! citemark resolve --input draft.txt --evidence citations.json
//!
//! # Number the whole evidence array
//! citemark table --evidence citations.json
//!
//! # Resolve many drafts at once
//! citemark batch --input drafts.jsonl
//!
//! # Add formatted_text annotations to requirement objects
//! citemark batch --input requirements.jsonl --annotate
//! ```

pub mod citation;
pub mod cli;
pub mod config;
pub mod limits;

// Re-export main types at crate root for convenience
pub use citation::{
    build_table, resolve, resolve_many, Evidence, EvidenceRecord, EvidenceTable, MatchStrategy,
    Reference, Resolution,
};
pub use limits::{InputLimits, LimitViolation};
