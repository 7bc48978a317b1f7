//! Deduplicating marker assignment
//!
//! Markers are dense, start at 1, and are handed out in order of first
//! appearance. A registry lives for exactly one resolution pass.

use std::collections::HashMap;

use super::types::{Evidence, EvidenceRecord, EvidenceTable, Marker, Reference};

/// Canonical identity of a resolved citation: `title-page`
///
/// The title comes from the record when it has one, otherwise from the
/// parsed reference. The page is always the record's.
pub fn canonical_key(record: &EvidenceRecord, reference: &Reference) -> String {
    let title = record.title().unwrap_or(&reference.title);
    format!("{}-{}", title, record.page)
}

/// Pass-scoped key → marker map plus the evidence created so far
#[derive(Debug)]
pub struct MarkerRegistry {
    key_to_marker: HashMap<String, Marker>,
    next_marker: Marker,
    evidences: EvidenceTable,
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self {
            key_to_marker: HashMap::new(),
            next_marker: 1,
            evidences: EvidenceTable::new(),
        }
    }

    /// Marker for this record, creating evidence only on first sight
    pub fn assign(&mut self, record: &EvidenceRecord, reference: &Reference) -> Marker {
        let key = canonical_key(record, reference);
        if let Some(&marker) = self.key_to_marker.get(&key) {
            return marker;
        }

        let marker = self.next_marker;
        self.next_marker += 1;
        self.key_to_marker.insert(key, marker);
        self.evidences.insert(
            marker,
            Evidence {
                marker,
                source_id: record.source_id().to_string(),
                page: record.page,
                source_title: record.title().unwrap_or(&reference.title).to_string(),
                quote: record.quote.clone(),
            },
        );
        marker
    }

    /// Number of distinct citations seen
    pub fn len(&self) -> usize {
        self.evidences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evidences.is_empty()
    }

    /// Consume the registry, yielding the marker → evidence table
    pub fn into_table(self) -> EvidenceTable {
        self.evidences
    }
}
