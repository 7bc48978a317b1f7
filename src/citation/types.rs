//! Citation data types
//!
//! `EvidenceRecord` is the externally supplied input shape (the task's
//! citations array). `Evidence` is what the engine hands to the renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Source id used when a record carries none, or when it was synthesized
pub const UNKNOWN_SOURCE_ID: &str = "unknown";

/// Marker number shown as `[n]` in resolved text
pub type Marker = u32;

/// Marker → evidence lookup, ascending by marker
pub type EvidenceTable = BTreeMap<Marker, Evidence>;

/// One `title P.page` reference parsed out of an annotation group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub title: String,
    pub page: u32,
}

impl Reference {
    pub fn new(title: impl Into<String>, page: u32) -> Self {
        Self {
            title: title.into(),
            page,
        }
    }
}

/// Read an explicit JSON `null` the same as a missing key
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A structured evidence record supplied by the content repository
///
/// These are model-extracted and frequently incomplete, so everything but
/// the page is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Source document id (UUID upstream)
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_id: String,
    /// Page number within the source
    pub page: u32,
    /// Source file title, e.g. "3-需求說明書.docx"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Verbatim excerpt backing the citation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

impl EvidenceRecord {
    pub fn new(source_id: impl Into<String>, page: u32) -> Self {
        Self {
            source_id: source_id.into(),
            page,
            title: None,
            quote: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }

    /// Title if present and non-empty
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Source id, or `"unknown"` when missing
    pub fn source_id(&self) -> &str {
        if self.source_id.is_empty() {
            UNKNOWN_SOURCE_ID
        } else {
            &self.source_id
        }
    }

    /// Placeholder record for a reference nothing in the list matched
    pub fn synthesized(reference: &Reference) -> Self {
        Self {
            source_id: UNKNOWN_SOURCE_ID.to_string(),
            page: reference.page,
            title: Some(reference.title.clone()),
            quote: None,
        }
    }
}

/// Resolved, numbered evidence backing one marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub marker: Marker,
    pub source_id: String,
    pub page: u32,
    pub source_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

/// Output of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Text with every annotation group replaced by `[n]` markers
    pub text: String,
    /// Every marker that appears in `text`, and nothing else
    pub evidences: EvidenceTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let record: EvidenceRecord = serde_json::from_str(r#"{"page": 3}"#).unwrap();
        assert_eq!(record.page, 3);
        assert_eq!(record.source_id(), UNKNOWN_SOURCE_ID);
        assert!(record.title().is_none());
        assert!(record.quote.is_none());
    }

    #[test]
    fn test_null_fields_count_as_absent() {
        let records: Vec<EvidenceRecord> = serde_json::from_str(
            r#"[{"source_id": null, "page": 1, "title": "a.docx", "quote": null}]"#,
        )
        .unwrap();
        assert_eq!(records[0].source_id(), UNKNOWN_SOURCE_ID);
        assert_eq!(records[0].title(), Some("a.docx"));
        assert!(records[0].quote.is_none());
    }

    #[test]
    fn test_empty_title_counts_as_absent() {
        let record = EvidenceRecord::new("s1", 1).with_title("");
        assert!(record.title().is_none());
    }

    #[test]
    fn test_evidence_omits_missing_quote() {
        let evidence = Evidence {
            marker: 1,
            source_id: "s1".to_string(),
            page: 2,
            source_title: "doc.docx".to_string(),
            quote: None,
        };
        let json = serde_json::to_value(&evidence).unwrap();
        assert!(json.get("quote").is_none());
        assert_eq!(json["source_title"], "doc.docx");
    }
}
