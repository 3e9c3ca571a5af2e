//! Statutory section identity and records
//!
//! A section is identified by its `(title, section)` pair, e.g. title 42,
//! section 1320e. Upstream ingestion artifacts mix numeric and string forms
//! for both components, so every key goes through [`canonical_id`] before it
//! is stored or compared.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonicalize a title or section identifier for key comparison.
///
/// Upstream sources disagree on typing (`42` vs `"42"`); both stored keys and
/// lookup keys pass through this shim so equality is always string equality.
/// This mirrors the ingestion pipeline's behavior and is deliberate, not a
/// defect to fix.
pub fn canonical_id(raw: &str) -> String {
    raw.trim().to_string()
}

/// Normalized `(title, section)` lookup key for a statutory section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionKey {
    pub title: String,
    pub section: String,
}

impl SectionKey {
    /// Create a key, canonicalizing both components.
    pub fn new(title: impl AsRef<str>, section: impl AsRef<str>) -> Self {
        Self {
            title: canonical_id(title.as_ref()),
            section: canonical_id(section.as_ref()),
        }
    }

    /// Human-readable citation form: `"42 U.S.C. 1320e"`.
    pub fn section_id(&self) -> String {
        format!("{} U.S.C. {}", self.title, self.section)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section_id())
    }
}

/// A section of the statutory corpus.
///
/// Immutable once loaded. The corpus may contain duplicate headings but never
/// duplicate `(title, section)` keys; ingestion is last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatutorySection {
    /// Key of this section in the ingestion artifact (also the identifier
    /// stored in the vector index lookup table)
    pub source_id: String,
    /// Title number, canonical string form
    pub title_number: String,
    /// Section number, canonical string form
    pub section_number: String,
    /// Section heading text
    pub heading: String,
    /// Full body text
    pub content: String,
    /// Structural status flag from the source XML (e.g. "repealed"),
    /// empty when the section is in force
    #[serde(default)]
    pub status: String,
}

impl StatutorySection {
    pub fn new(
        source_id: impl Into<String>,
        title_number: impl AsRef<str>,
        section_number: impl AsRef<str>,
        heading: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            title_number: canonical_id(title_number.as_ref()),
            section_number: canonical_id(section_number.as_ref()),
            heading: heading.into(),
            content: content.into(),
            status: String::new(),
        }
    }

    /// Set the structural status flag
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Lookup key for this section
    pub fn key(&self) -> SectionKey {
        SectionKey::new(&self.title_number, &self.section_number)
    }

    /// Citation form: `"42 U.S.C. 1320e"`.
    pub fn section_id(&self) -> String {
        self.key().section_id()
    }

    /// Whether this section carries body text worth embedding
    pub fn has_usable_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}
