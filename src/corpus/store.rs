//! In-memory corpus store
//!
//! Exact lookup of statutory sections by `(title, section)` key and of
//! public-law reference lists by law number. Built once from ingestion
//! artifacts and read-only afterwards.

use crate::section::{SectionKey, StatutorySection, canonical_id};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification-table row types that carry no substantive section mapping
/// (notes, precedence markers, newly created or repealed sections).
pub const METADATA_TYPES: &[&str] = &["nt", "prec", "new", "repealed"];

/// A substantive `(title, section)` reference touched by a public law.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRef {
    pub title: String,
    pub section: String,
}

impl SectionRef {
    pub fn new(title: impl AsRef<str>, section: impl AsRef<str>) -> Self {
        Self {
            title: canonical_id(title.as_ref()),
            section: canonical_id(section.as_ref()),
        }
    }
}

/// A non-substantive classification-table entry. Never a statutory match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRef {
    /// One of [`METADATA_TYPES`]
    pub kind: String,
    pub title: String,
    pub section: String,
}

/// A public law and the U.S. Code sections it touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLaw {
    /// Public-law number, e.g. `"118-42"`
    pub number: String,
    pub title: String,
    /// Ordered substantive references
    pub sections: Vec<SectionRef>,
    /// Non-substantive entries, excluded from resolution candidates
    pub metadata: Vec<MetadataRef>,
}

impl PublicLaw {
    pub fn new(number: impl Into<String>) -> Self {
        let number = number.into();
        let title = format!("Public Law {}", number);
        Self {
            number,
            title,
            sections: Vec::new(),
            metadata: Vec::new(),
        }
    }
}

/// Read-only views over the statutory corpus and the public-law mapping.
///
/// Lookups are O(1) expected. All keys pass through
/// [`canonical_id`](crate::section::canonical_id) on the way in, so numeric
/// and string-typed upstream identifiers land on the same entries.
#[derive(Debug, Default)]
pub struct CorpusStore {
    sections: Vec<StatutorySection>,
    by_key: HashMap<SectionKey, usize>,
    by_source_id: HashMap<String, usize>,
    laws: HashMap<String, PublicLaw>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section. Duplicate keys are last-write-wins, matching the
    /// ingestion pipeline; the displaced entry stays addressable by source id.
    pub fn insert_section(&mut self, section: StatutorySection) {
        let key = section.key();
        let pos = self.sections.len();
        if let Some(prev) = self.by_key.insert(key.clone(), pos) {
            tracing::debug!(
                key = %key,
                previous = %self.sections[prev].source_id,
                "duplicate section key, keeping latest"
            );
        }
        self.by_source_id.insert(section.source_id.clone(), pos);
        self.sections.push(section);
    }

    /// Insert a public law, replacing any previous entry with the same number.
    pub fn insert_law(&mut self, law: PublicLaw) {
        self.laws.insert(law.number.clone(), law);
    }

    /// Exact lookup by normalized `(title, section)` key.
    pub fn lookup_section(&self, key: &SectionKey) -> Option<&StatutorySection> {
        self.by_key.get(key).map(|&pos| &self.sections[pos])
    }

    /// Lookup by the ingestion-artifact key (the identifier form stored in
    /// the vector index lookup table).
    pub fn lookup_source_id(&self, source_id: &str) -> Option<&StatutorySection> {
        self.by_source_id.get(source_id).map(|&pos| &self.sections[pos])
    }

    /// Lookup a public law's reference list by law number.
    pub fn lookup_law(&self, public_law_number: &str) -> Option<&PublicLaw> {
        self.laws.get(canonical_id(public_law_number).as_str())
    }

    /// Iterate all sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &StatutorySection> {
        self.sections.iter()
    }

    /// Count of loaded sections (including entries displaced by duplicate keys)
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Count of loaded public laws
    pub fn law_count(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.laws.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_section(id: &str, title: &str, section: &str, content: &str) -> StatutorySection {
        StatutorySection::new(id, title, section, "Heading", content)
    }

    #[test]
    fn test_lookup_section_exact() {
        let mut store = CorpusStore::new();
        store.insert_section(sample_section("id-1", "5", "8401", "text a"));
        store.insert_section(sample_section("id-2", "42", "2011", "text b"));

        let found = store.lookup_section(&SectionKey::new("42", "2011")).unwrap();
        assert_eq!(found.source_id, "id-2");
        assert!(store.lookup_section(&SectionKey::new("42", "9999")).is_none());
    }

    #[test]
    fn test_heterogeneous_key_typing() {
        let mut store = CorpusStore::new();
        store.insert_section(sample_section("id-1", " 5 ", "8401", "text"));

        // A lookup built from numeric-typed upstream data must still hit
        assert!(store.lookup_section(&SectionKey::new("5", "8401")).is_some());
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let mut store = CorpusStore::new();
        store.insert_section(sample_section("old", "5", "8401", "old text"));
        store.insert_section(sample_section("new", "5", "8401", "new text"));

        let found = store.lookup_section(&SectionKey::new("5", "8401")).unwrap();
        assert_eq!(found.source_id, "new");
        // Both entries remain addressable by source id
        assert!(store.lookup_source_id("old").is_some());
        assert_eq!(store.section_count(), 2);
    }

    #[test]
    fn test_lookup_law() {
        let mut store = CorpusStore::new();
        let mut law = PublicLaw::new("118-42");
        law.sections.push(SectionRef::new("42", "1320e"));
        store.insert_law(law);

        let found = store.lookup_law("118-42").unwrap();
        assert_eq!(found.sections.len(), 1);
        assert!(store.lookup_law("118-999").is_none());
    }
}
