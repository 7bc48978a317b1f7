//! Reference list splitting
//!
//! Turns one group's content, e.g. `"3-需求說明書.docx P.1, P.2, RFP.xlsx P.5"`,
//! into ordered `Reference`s. A bare `P.n` inherits the most recent title in
//! the same group; anything else that does not parse is dropped.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::types::Reference;

fn titled_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+?)\s+P\.(\d+)").expect("titled reference pattern is valid"))
}

fn bare_page_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^P\.(\d+)").expect("bare page pattern is valid"))
}

/// Split group content on ASCII or fullwidth commas, trimmed, empties dropped
fn split_parts(content: &str) -> impl Iterator<Item = &str> {
    content
        .split([',', '，'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// Parse all references in one group's content
pub fn parse_references(content: &str) -> Vec<Reference> {
    let mut references = Vec::new();
    // Scoped to this group; never carried into the next one.
    let mut last_title: Option<String> = None;

    for part in split_parts(content) {
        if let Some(caps) = titled_pattern().captures(part) {
            let title = caps[1].trim();
            match caps[2].parse::<u32>() {
                Ok(page) => {
                    last_title = Some(title.to_string());
                    references.push(Reference::new(title, page));
                }
                Err(_) => trace!(part, "page number out of range, dropping"),
            }
            continue;
        }

        if let Some(caps) = bare_page_pattern().captures(part) {
            match (&last_title, caps[1].parse::<u32>()) {
                (Some(title), Ok(page)) => references.push(Reference::new(title.clone(), page)),
                (None, _) => trace!(part, "bare page with no preceding title, dropping"),
                (_, Err(_)) => trace!(part, "page number out of range, dropping"),
            }
            continue;
        }

        trace!(part, "unparseable reference, dropping");
    }

    references
}
