//! Tolerant evidence matching
//!
//! The evidence list is itself model output and is often partial, so a
//! reference is resolved through progressively looser strategies and, as a
//! last resort, a placeholder record is synthesized. Matching never fails.

use std::borrow::Cow;

use super::types::{EvidenceRecord, Reference};

/// Strategy that produced a match, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrategy {
    /// Title and page both equal
    Exact,
    /// Title equal, page may differ
    TitleOnly,
    /// One title contains the other
    Fuzzy,
    /// Page equal; record title replaced by the parsed title
    PageOnly,
    /// Nothing matched; placeholder built from the reference
    Synthesized,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::TitleOnly => "title_only",
            MatchStrategy::Fuzzy => "fuzzy",
            MatchStrategy::PageOnly => "page_only",
            MatchStrategy::Synthesized => "synthesized",
        }
    }
}

/// Result of matching one reference
#[derive(Debug, Clone)]
pub struct MatchOutcome<'a> {
    pub record: Cow<'a, EvidenceRecord>,
    pub strategy: MatchStrategy,
}

impl<'a> MatchOutcome<'a> {
    fn borrowed(record: &'a EvidenceRecord, strategy: MatchStrategy) -> Self {
        Self {
            record: Cow::Borrowed(record),
            strategy,
        }
    }
}

/// Resolve `reference` against `evidence`; the first strategy to succeed wins
pub fn match_reference<'a>(reference: &Reference, evidence: &'a [EvidenceRecord]) -> MatchOutcome<'a> {
    let title = reference.title.as_str();

    if let Some(record) = evidence
        .iter()
        .find(|r| r.title() == Some(title) && r.page == reference.page)
    {
        return MatchOutcome::borrowed(record, MatchStrategy::Exact);
    }

    if let Some(record) = evidence.iter().find(|r| r.title() == Some(title)) {
        return MatchOutcome::borrowed(record, MatchStrategy::TitleOnly);
    }

    // Records without a title fall through to page matching instead of
    // trivially "containing" the empty string.
    if let Some(record) = evidence.iter().find(|r| {
        r.title()
            .is_some_and(|candidate| candidate.contains(title) || title.contains(candidate))
    }) {
        return MatchOutcome::borrowed(record, MatchStrategy::Fuzzy);
    }

    if let Some(record) = evidence.iter().find(|r| r.page == reference.page) {
        let mut merged = record.clone();
        merged.title = Some(reference.title.clone());
        return MatchOutcome {
            record: Cow::Owned(merged),
            strategy: MatchStrategy::PageOnly,
        };
    }

    MatchOutcome {
        record: Cow::Owned(EvidenceRecord::synthesized(reference)),
        strategy: MatchStrategy::Synthesized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<EvidenceRecord> {
        vec![
            EvidenceRecord::new("uuid-1", 1)
                .with_title("3-需求說明書.docx")
                .with_quote("需求引文"),
            EvidenceRecord::new("uuid-2", 5).with_title("RFP.xlsx"),
            EvidenceRecord::new("uuid-3", 2).with_title("3-需求說明書.docx"),
        ]
    }

    #[test]
    fn test_exact_match_prefers_matching_page() {
        let evidence = records();
        let outcome = match_reference(&Reference::new("3-需求說明書.docx", 2), &evidence);
        assert_eq!(outcome.strategy, MatchStrategy::Exact);
        assert_eq!(outcome.record.source_id, "uuid-3");
    }

    #[test]
    fn test_title_only_match_keeps_record_page() {
        let evidence = records();
        let outcome = match_reference(&Reference::new("3-需求說明書.docx", 99), &evidence);
        assert_eq!(outcome.strategy, MatchStrategy::TitleOnly);
        assert_eq!(outcome.record.source_id, "uuid-1");
        assert_eq!(outcome.record.page, 1);
    }

    #[test]
    fn test_fuzzy_match_either_direction() {
        let evidence = records();
        let outcome = match_reference(&Reference::new("需求說明書", 7), &evidence);
        assert_eq!(outcome.strategy, MatchStrategy::Fuzzy);
        assert_eq!(outcome.record.source_id, "uuid-1");

        let outcome = match_reference(&Reference::new("附件 RFP.xlsx", 7), &evidence);
        assert_eq!(outcome.strategy, MatchStrategy::Fuzzy);
        assert_eq!(outcome.record.source_id, "uuid-2");
    }

    #[test]
    fn test_page_only_match_merges_parsed_title() {
        let evidence = vec![EvidenceRecord::new("s9", 3).with_quote("引文")];
        let outcome = match_reference(&Reference::new("報告.pdf", 3), &evidence);
        assert_eq!(outcome.strategy, MatchStrategy::PageOnly);
        assert_eq!(outcome.record.source_id, "s9");
        assert_eq!(outcome.record.title(), Some("報告.pdf"));
        assert_eq!(outcome.record.quote.as_deref(), Some("引文"));
        // input untouched
        assert!(evidence[0].title.is_none());
    }

    #[test]
    fn test_page_only_picks_untitled_record_on_same_page() {
        let evidence = vec![EvidenceRecord::new("s1", 2), EvidenceRecord::new("s2", 5)];
        let outcome = match_reference(&Reference::new("報告.pdf", 5), &evidence);
        assert_eq!(outcome.strategy, MatchStrategy::PageOnly);
        assert_eq!(outcome.record.source_id, "s2");
        assert_eq!(outcome.record.page, 5);
    }

    #[test]
    fn test_synthesized_when_nothing_matches() {
        let evidence = records();
        let outcome = match_reference(&Reference::new("不存在的文件.docx", 99), &evidence);
        assert_eq!(outcome.strategy, MatchStrategy::Synthesized);
        assert_eq!(outcome.record.source_id, "unknown");
        assert_eq!(outcome.record.page, 99);
        assert_eq!(outcome.record.title(), Some("不存在的文件.docx"));
        assert!(outcome.record.quote.is_none());
    }

    #[test]
    fn test_empty_list_synthesizes() {
        let outcome = match_reference(&Reference::new("doc.docx", 1), &[]);
        assert_eq!(outcome.strategy, MatchStrategy::Synthesized);
    }
}
