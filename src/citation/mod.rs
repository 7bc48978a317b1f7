//! Citation mark resolution
//!
//! Drafted tender text carries inline annotations such as
//! `(出處：3-需求說明書.docx P.1, P.2)`. This module rewrites them into
//! numbered markers (`[1] [2]`) backed by an evidence table the UI can
//! render as clickable badges.
//!
//! # Design Principles
//!
//! - **Never fail**: unparseable parts are dropped and unmatched references
//!   are synthesized, so every pass yields renderable output.
//! - **Pass-scoped numbering**: markers are dense from 1 in order of first
//!   appearance, and each `resolve` call owns its own numbering.
//! - **Read-only evidence**: the supplied records are never mutated.
//!
//! # Example
//!
//! ```
//! use citemark::citation::{resolve, EvidenceRecord};
//!
//! let evidence = vec![EvidenceRecord::new("uuid", 1).with_title("doc.docx")];
//! let result = resolve("需求 (出處：doc.docx P.1)", &evidence);
//! assert_eq!(result.text, "需求 [1]");
//! assert_eq!(result.evidences[&1].source_id, "uuid");
//! ```

pub mod formatter;
pub mod matcher;
pub mod numbering;
pub mod resolver;
pub mod scanner;
pub mod splitter;
pub mod table;
pub mod types;

pub use formatter::{
    append_sources, append_sources_all, extract_sources, format_single_source, format_sources,
    has_source_annotation,
};
pub use matcher::{match_reference, MatchOutcome, MatchStrategy};
pub use numbering::{canonical_key, MarkerRegistry};
pub use resolver::{resolve, resolve_many};
pub use scanner::{contains_annotation, scan, AnnotationGroup};
pub use splitter::parse_references;
pub use table::{build_table, UNKNOWN_SOURCE_TITLE};
pub use types::{Evidence, EvidenceRecord, EvidenceTable, Marker, Reference, Resolution};
