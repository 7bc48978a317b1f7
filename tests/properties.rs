//! Property-Based Tests for citation resolution
//!
//! Uses proptest to check the invariants every resolution must hold:
//! 1. Markers in the text are exactly 1..=k, all present in the table
//! 2. Identical input gives identical output
//! 3. First-seen citations get smaller markers
//! 4. Equal canonical keys always share a marker
//! 5. Text without groups passes through untouched
//! 6. Arbitrary input never panics

use std::collections::{BTreeSet, HashMap};

use citemark::citation::{build_table, resolve, EvidenceRecord};
use proptest::prelude::*;
use regex::Regex;

// ============================================================================
// Strategies
// ============================================================================

/// Short document titles, drawn from a small pool so collisions happen
fn title_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("3-需求說明書.docx".to_string()),
        Just("RFP.xlsx".to_string()),
        Just("附件一.pdf".to_string()),
        Just("技術規格.docx".to_string()),
        "[a-z]{1,6}\\.pdf",
    ]
}

/// One reference part: titled, or bare page
fn part_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => (title_strategy(), 1u32..20).prop_map(|(t, p)| format!("{} P.{}", t, p)),
        1 => (1u32..20).prop_map(|p| format!("P.{}", p)),
        1 => Just("見附件".to_string()),
    ]
}

/// A whole annotation group with random delimiters
fn group_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["(", "（"]),
        prop::sample::select(vec!["：", ":", " : "]),
        prop::collection::vec(part_strategy(), 0..4),
        prop::sample::select(vec![", ", "，", ","]),
        prop::sample::select(vec![")", "）"]),
    )
        .prop_map(|(open, colon, parts, sep, close)| {
            format!("{}出處{}{}{}", open, colon, parts.join(sep), close)
        })
}

/// Plain prose with no parentheses
fn prose_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 系統應支援查詢報表。，]{0,12}"
}

/// Text interleaving prose and groups
fn annotated_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((prose_strategy(), group_strategy()), 0..6).prop_map(|chunks| {
        chunks
            .into_iter()
            .map(|(prose, group)| format!("{}{}", prose, group))
            .collect()
    })
}

fn record_strategy() -> impl Strategy<Value = EvidenceRecord> {
    (
        "[a-z0-9]{4}",
        1u32..20,
        prop::option::of(title_strategy()),
        prop::option::of("[a-z ]{0,10}"),
    )
        .prop_map(|(source_id, page, title, quote)| EvidenceRecord {
            source_id,
            page,
            title,
            quote,
        })
}

fn evidence_strategy() -> impl Strategy<Value = Vec<EvidenceRecord>> {
    prop::collection::vec(record_strategy(), 0..6)
}

fn markers_in(text: &str) -> Vec<u32> {
    let re = Regex::new(r"\[(\d+)\]").unwrap();
    re.captures_iter(text)
        .map(|c| c[1].parse().unwrap())
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn markers_are_dense_and_backed(text in annotated_text_strategy(), evidence in evidence_strategy()) {
        let result = resolve(&text, &evidence);

        let used: BTreeSet<u32> = markers_in(&result.text).into_iter().collect();
        let expected: BTreeSet<u32> = (1..=result.evidences.len() as u32).collect();
        prop_assert_eq!(&used, &expected);

        let table_keys: BTreeSet<u32> = result.evidences.keys().copied().collect();
        prop_assert_eq!(used, table_keys);

        for (marker, entry) in &result.evidences {
            prop_assert_eq!(*marker, entry.marker);
        }
    }

    #[test]
    fn resolution_is_deterministic(text in annotated_text_strategy(), evidence in evidence_strategy()) {
        prop_assert_eq!(resolve(&text, &evidence), resolve(&text, &evidence));
    }

    #[test]
    fn markers_follow_first_appearance(text in annotated_text_strategy(), evidence in evidence_strategy()) {
        let result = resolve(&text, &evidence);

        // The first occurrence of each marker must come in increasing order.
        let mut seen = BTreeSet::new();
        let mut first_order = Vec::new();
        for marker in markers_in(&result.text) {
            if seen.insert(marker) {
                first_order.push(marker);
            }
        }
        let sorted: Vec<u32> = (1..=first_order.len() as u32).collect();
        prop_assert_eq!(first_order, sorted);
    }

    #[test]
    fn equal_keys_share_markers(text in annotated_text_strategy(), evidence in evidence_strategy()) {
        let result = resolve(&text, &evidence);

        let mut by_key: HashMap<String, u32> = HashMap::new();
        for entry in result.evidences.values() {
            let key = format!("{}-{}", entry.source_title, entry.page);
            prop_assert!(by_key.insert(key, entry.marker).is_none());
        }
    }

    #[test]
    fn groupless_text_passes_through(text in "[^(（]{0,40}", evidence in evidence_strategy()) {
        let result = resolve(&text, &evidence);
        prop_assert_eq!(result.text, text);
        prop_assert!(result.evidences.is_empty());
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC{0,60}", evidence in evidence_strategy()) {
        let _ = resolve(&text, &evidence);
    }

    #[test]
    fn table_numbers_every_record(evidence in evidence_strategy()) {
        let table = build_table(&evidence);
        prop_assert_eq!(table.len(), evidence.len());
        for (idx, record) in evidence.iter().enumerate() {
            let entry = &table[&(idx as u32 + 1)];
            prop_assert_eq!(entry.page, record.page);
            prop_assert_eq!(entry.quote.as_ref(), record.quote.as_ref());
        }
    }
}
