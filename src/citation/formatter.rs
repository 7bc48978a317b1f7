//! Source annotation formatting
//!
//! The inverse of resolution: renders evidence records as a trailing
//! `(出處：title P.n, ...)。` group on a requirement sentence, and reads such
//! a trailing group back off.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use super::scanner::MARKER_WORD;
use super::types::EvidenceRecord;

/// Title written for records that carry none
pub const UNKNOWN_TITLE_ZH: &str = "未知來源";

const SENTENCE_END: [char; 6] = ['。', '！', '？', '.', '!', '?'];

fn trailing_annotation() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\s*[\(（]出處\s*[：:]\s*([^)）]+)[）\)]。?$")
            .expect("trailing annotation pattern is valid")
    })
}

/// Swap characters that would close or split an annotation group for
/// lookalikes the scanner and splitter ignore
fn group_safe_title(title: &str) -> Cow<'_, str> {
    if !title.contains(['(', ')', '（', '）', ',', '，']) {
        return Cow::Borrowed(title);
    }

    Cow::Owned(
        title
            .chars()
            .map(|c| match c {
                '(' | '（' => '［',
                ')' | '）' => '］',
                ',' | '，' => '、',
                other => other,
            })
            .collect(),
    )
}

/// `"title P.page"` for one record
///
/// Parentheses and commas in the title become `［］` and `、` so the result
/// always reads back as a single reference.
pub fn format_single_source(record: &EvidenceRecord) -> String {
    let title = group_safe_title(record.title().unwrap_or(UNKNOWN_TITLE_ZH));
    format!("{} P.{}", title, record.page)
}

/// Comma-joined sources; empty when there are no records
pub fn format_sources(records: &[EvidenceRecord]) -> String {
    records
        .iter()
        .map(format_single_source)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Append a source annotation to the end of a requirement sentence
///
/// Trailing sentence punctuation is moved after the group. With no records
/// the text is returned as-is.
pub fn append_sources(text: &str, records: &[EvidenceRecord]) -> String {
    if records.is_empty() {
        return text.to_string();
    }

    let body = text.trim().trim_end_matches(SENTENCE_END);
    format!("{} ({}：{})。", body, MARKER_WORD, format_sources(records))
}

/// [`append_sources`] over a list of `(text, records)` items, in order
pub fn append_sources_all<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a [EvidenceRecord])>,
{
    items
        .into_iter()
        .map(|(text, records)| append_sources(text, records))
        .collect()
}

/// Split a trailing source annotation off `text`
///
/// Returns the remaining text and the raw group content, or the original
/// text and `None` when the text does not end in an annotation.
pub fn extract_sources(text: &str) -> (String, Option<String>) {
    match trailing_annotation().captures(text) {
        Some(caps) => {
            let start = caps.get(0).map_or(text.len(), |m| m.start());
            let sources = caps.get(1).map(|m| m.as_str().trim().to_string());
            (text[..start].trim().to_string(), sources)
        }
        None => (text.to_string(), None),
    }
}

/// Whether `text` already ends in a source annotation
pub fn has_source_annotation(text: &str) -> bool {
    trailing_annotation().is_match(text)
}
