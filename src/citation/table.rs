//! Standalone evidence table for "all sources" views
//!
//! Unlike [`resolve`](super::resolver::resolve), this numbers every record
//! in input order with no text and no deduplication involved.

use super::types::{Evidence, EvidenceRecord, EvidenceTable, Marker};

/// Title shown for records that carry none
pub const UNKNOWN_SOURCE_TITLE: &str = "Unknown Source";

/// Number each record 1..N in input order
pub fn build_table(evidence: &[EvidenceRecord]) -> EvidenceTable {
    evidence
        .iter()
        .zip(1..)
        .map(|(record, marker): (&EvidenceRecord, Marker)| {
            let entry = Evidence {
                marker,
                source_id: record.source_id().to_string(),
                page: record.page,
                source_title: record.title().unwrap_or(UNKNOWN_SOURCE_TITLE).to_string(),
                quote: record.quote.clone(),
            };
            (marker, entry)
        })
        .collect()
}
