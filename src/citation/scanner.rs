//! Annotation group scanner
//!
//! Finds `(出處：...)` groups in arbitrary text. Parentheses may be ASCII or
//! fullwidth on either side independently, and the colon may be half- or
//! full-width. Capture stops at the first closing parenthesis, so nested
//! parentheses inside a group are not supported.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Literal word that introduces a citation group
pub const MARKER_WORD: &str = "出處";

const ANNOTATION_PATTERN: &str = r"[\(（]出處\s*[：:]\s*([^)）]*?)[）\)]";

/// The compiled group pattern. `Regex` keeps no match cursor, so one
/// instance serves every call and every thread.
fn annotation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ANNOTATION_PATTERN).expect("annotation pattern is valid"))
}

/// One annotation group found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationGroup<'t> {
    /// Byte range of the whole group, delimiters included
    pub span: Range<usize>,
    /// Text between the colon and the closing parenthesis, untrimmed
    pub content: &'t str,
}

/// Scan `text` for annotation groups, left to right
///
/// The iterator is lazy and holds no state beyond its borrow of `text`;
/// calling `scan` again restarts from the beginning.
pub fn scan(text: &str) -> impl Iterator<Item = AnnotationGroup<'_>> + '_ {
    annotation_pattern().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let content = caps.get(1).map_or("", |m| m.as_str());
        Some(AnnotationGroup {
            span: whole.range(),
            content,
        })
    })
}

/// Whether `text` contains at least one annotation group
pub fn contains_annotation(text: &str) -> bool {
    annotation_pattern().is_match(text)
}
