//! Resolution driver
//!
//! Replaces every annotation group in a text with bracket markers and
//! collects the evidence behind them, in one left-to-right pass.

use tracing::{debug, instrument};

use super::matcher::match_reference;
use super::numbering::MarkerRegistry;
use super::scanner::scan;
use super::splitter::parse_references;
use super::types::{EvidenceRecord, Marker, Resolution};

/// Resolve all citation groups in `text` against `evidence`
///
/// Text outside groups is copied through untouched. A group whose content
/// yields no references is replaced by an empty string. Pass an empty
/// slice when no evidence list is available; every reference is then
/// synthesized.
#[instrument(skip_all, fields(text_len = text.len(), evidence_len = evidence.len()))]
pub fn resolve(text: &str, evidence: &[EvidenceRecord]) -> Resolution {
    let mut registry = MarkerRegistry::new();
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut groups = 0usize;

    for group in scan(text) {
        groups += 1;
        output.push_str(&text[cursor..group.span.start]);

        let mut markers: Vec<Marker> = Vec::new();
        for reference in parse_references(group.content) {
            let outcome = match_reference(&reference, evidence);
            let marker = registry.assign(&outcome.record, &reference);
            debug!(
                title = %reference.title,
                page = reference.page,
                strategy = outcome.strategy.as_str(),
                marker,
                "Resolved citation"
            );
            if !markers.contains(&marker) {
                markers.push(marker);
            }
        }

        output.push_str(&render_markers(&markers));
        cursor = group.span.end;
    }

    if groups == 0 {
        return Resolution {
            text: text.to_string(),
            evidences: Default::default(),
        };
    }

    output.push_str(&text[cursor..]);
    debug!(groups, distinct = registry.len(), "Resolution pass complete");

    Resolution {
        text: output,
        evidences: registry.into_table(),
    }
}

/// Resolve several independent texts; numbering restarts for each
pub fn resolve_many<I, S>(texts: I, evidence: &[EvidenceRecord]) -> Vec<Resolution>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts
        .into_iter()
        .map(|text| resolve(text.as_ref(), evidence))
        .collect()
}

/// `[1] [2]` style rendering of one group's markers
fn render_markers(markers: &[Marker]) -> String {
    markers
        .iter()
        .map(|m| format!("[{}]", m))
        .collect::<Vec<_>>()
        .join(" ")
}
