//! Section resolver
//!
//! Produces the authoritative ranked section list for a bill by combining
//! exact and approximate evidence with strict tier precedence:
//!
//! 1. Direct law mapping (the bill became a public law with a classification
//!    entry)
//! 2. In-text citation mapping (explicit U.S.C. references in the bill text)
//! 3. Semantic fallback (nearest neighbors in the section index)
//!
//! Later tiers run only when all earlier tiers together produced nothing;
//! tiers are never merged or re-ranked against each other. "No match" is an
//! empty result, not an error.

use crate::bill::{Bill, BillId};
use crate::citation::{clean_section_number, extract_citations};
use crate::corpus::CorpusStore;
use crate::index::SemanticSearch;
use crate::section::{SectionKey, StatutorySection};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Sentinel body text for sections whose content is not in the corpus
pub const TEXT_UNAVAILABLE: &str = "No original text available.";

/// Provenance of a resolved section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// The bill became law and the classification table maps it directly
    PassedLawDirectMapping,
    /// The section is cited explicitly in the bill text
    MentionedInBillMapping,
    /// Nearest neighbor from the semantic index
    FaissSemanticMatch,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::PassedLawDirectMapping => "passed_law_direct_mapping",
            MatchType::MentionedInBillMapping => "mentioned_in_bill_mapping",
            MatchType::FaissSemanticMatch => "faiss_semantic_match",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A statutory section resolved for a bill, with provenance and confidence.
///
/// Constructed per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSection {
    /// Citation form, e.g. `"42 U.S.C. 1320e"`
    pub section_id: String,
    pub title_number: String,
    pub section_number: String,
    /// Full section text, or [`TEXT_UNAVAILABLE`]
    #[serde(rename = "us_code_text")]
    pub text: String,
    /// In `[0,1]`; 1.0 for exact-mapping tiers, `1/(1+distance)` for the
    /// semantic tier
    pub similarity_score: f32,
    pub match_type: MatchType,
}

impl ResolvedSection {
    fn from_section(section: &StatutorySection, score: f32, match_type: MatchType) -> Self {
        let text = if section.has_usable_text() {
            section.content.clone()
        } else {
            TEXT_UNAVAILABLE.to_string()
        };
        Self {
            section_id: section.section_id(),
            title_number: section.title_number.clone(),
            section_number: section.section_number.clone(),
            text,
            similarity_score: score,
            match_type,
        }
    }
}

/// Outcome for one candidate reference.
///
/// `Unresolved` keys (present in a mapping but absent from the corpus) are
/// dropped from results by [`SectionResolver::resolve`]; the variant exists
/// so the gap stays observable for diagnostics and tests.
#[derive(Debug, Clone)]
pub enum Candidate {
    Resolved(ResolvedSection),
    Unresolved(SectionKey),
}

/// Counters for a resolution run (or an accumulated batch).
#[derive(Debug, Default, Clone)]
pub struct ResolveStats {
    pub bills: usize,
    pub direct: usize,
    pub mentioned: usize,
    pub semantic: usize,
    /// Candidate references dropped because the corpus has no such key
    pub dropped: usize,
}

impl fmt::Display for ResolveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resolution statistics:")?;
        writeln!(f, "  Bills resolved: {}", self.bills)?;
        writeln!(f, "  Match breakdown:")?;
        writeln!(f, "    Direct law mapping: {}", self.direct)?;
        writeln!(f, "    Cited in bill text: {}", self.mentioned)?;
        writeln!(f, "    Semantic fallback: {}", self.semantic)?;
        write!(f, "  Unresolved references dropped: {}", self.dropped)
    }
}

/// Resolver over an explicitly constructed context: the bill table, the
/// corpus store, and a semantic index handle. No ambient state.
pub struct SectionResolver<'a> {
    bills: &'a HashMap<BillId, Bill>,
    corpus: &'a CorpusStore,
    semantic: &'a dyn SemanticSearch,
}

impl<'a> SectionResolver<'a> {
    pub fn new(
        bills: &'a HashMap<BillId, Bill>,
        corpus: &'a CorpusStore,
        semantic: &'a dyn SemanticSearch,
    ) -> Self {
        Self {
            bills,
            corpus,
            semantic,
        }
    }

    /// Resolve a bill to at most `top_k` statutory sections.
    pub fn resolve(
        &self,
        bill_id: &BillId,
        bill_text: &str,
        top_k: usize,
    ) -> Result<Vec<ResolvedSection>> {
        self.resolve_with_stats(bill_id, bill_text, top_k, &mut ResolveStats::default())
    }

    /// Resolve while accumulating counters into `stats`.
    pub fn resolve_with_stats(
        &self,
        bill_id: &BillId,
        bill_text: &str,
        top_k: usize,
        stats: &mut ResolveStats,
    ) -> Result<Vec<ResolvedSection>> {
        if bill_text.trim().is_empty() {
            return Ok(vec![]);
        }
        stats.bills += 1;

        let mut results = Vec::new();
        let mut seen: HashSet<SectionKey> = HashSet::new();

        // Tier 1: direct law mapping
        for candidate in self.resolve_keys(
            self.law_mapping_keys(bill_id),
            MatchType::PassedLawDirectMapping,
            &mut seen,
        ) {
            match candidate {
                Candidate::Resolved(section) => {
                    stats.direct += 1;
                    results.push(section);
                }
                Candidate::Unresolved(key) => {
                    stats.dropped += 1;
                    tracing::debug!(bill = %bill_id, key = %key, "mapped section absent from corpus");
                }
            }
        }

        // Tier 2: in-text citations, concatenated after tier 1
        let citation_keys: Vec<SectionKey> = extract_citations(bill_text)
            .into_iter()
            .map(|c| SectionKey::new(&c.title_number, clean_section_number(&c.section_number)))
            .collect();
        for candidate in
            self.resolve_keys(citation_keys, MatchType::MentionedInBillMapping, &mut seen)
        {
            match candidate {
                Candidate::Resolved(section) => {
                    stats.mentioned += 1;
                    results.push(section);
                }
                Candidate::Unresolved(key) => {
                    stats.dropped += 1;
                    tracing::debug!(bill = %bill_id, key = %key, "cited section absent from corpus");
                }
            }
        }

        // Tier 3: semantic fallback, only when tiers 1-2 found nothing at all
        if results.is_empty() {
            for hit in self.semantic.search(bill_text, top_k)? {
                match self.corpus.lookup_source_id(&hit.id) {
                    Some(section) => results.push(ResolvedSection::from_section(
                        section,
                        hit.score,
                        MatchType::FaissSemanticMatch,
                    )),
                    None => {
                        stats.dropped += 1;
                        tracing::debug!(id = %hit.id, "index identifier absent from corpus");
                    }
                }
            }
            stats.semantic += results.len();
        }

        // Exact matches are never evicted in favor of semantic ones: the
        // truncation preserves the tier/insertion order established above.
        results.truncate(top_k);
        Ok(results)
    }

    /// Candidate `(title, section)` keys from the public-law mapping for this
    /// bill. Non-substantive metadata entries never reach this list.
    fn law_mapping_keys(&self, bill_id: &BillId) -> Vec<SectionKey> {
        let Some(bill) = self.bills.get(bill_id) else {
            return vec![];
        };
        let Some(law_number) = bill.public_law_number.as_deref() else {
            return vec![];
        };
        let Some(law) = self.corpus.lookup_law(law_number) else {
            tracing::debug!(bill = %bill_id, law = law_number, "public law not in mapping");
            return vec![];
        };

        law.sections
            .iter()
            .map(|r| SectionKey::new(&r.title, clean_section_number(&r.section)))
            .collect()
    }

    /// Resolve keys against the corpus by exact equality, one [`Candidate`]
    /// per previously unseen key. Keys already in `seen` are skipped, which
    /// deduplicates across tiers (tier-1 entries win).
    pub fn resolve_keys(
        &self,
        keys: impl IntoIterator<Item = SectionKey>,
        match_type: MatchType,
        seen: &mut HashSet<SectionKey>,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for key in keys {
            if !seen.insert(key.clone()) {
                continue;
            }
            match self.corpus.lookup_section(&key) {
                Some(section) => candidates.push(Candidate::Resolved(
                    ResolvedSection::from_section(section, 1.0, match_type),
                )),
                None => candidates.push(Candidate::Unresolved(key)),
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::BillType;
    use crate::corpus::{PublicLaw, SectionRef};
    use crate::index::SearchHit;
    use crate::section::StatutorySection;
    use std::cell::Cell;

    /// Stub semantic tier that serves canned hits and counts invocations.
    struct StubSemantic {
        hits: Vec<SearchHit>,
        calls: Cell<usize>,
    }

    impl StubSemantic {
        fn new(hits: Vec<SearchHit>) -> Self {
            Self {
                hits,
                calls: Cell::new(0),
            }
        }

        fn empty() -> Self {
            Self::new(vec![])
        }
    }

    impl SemanticSearch for StubSemantic {
        fn search(&self, _query_text: &str, top_k: usize) -> Result<Vec<SearchHit>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.hits.iter().take(top_k).cloned().collect())
        }
    }

    fn sample_corpus() -> CorpusStore {
        let mut corpus = CorpusStore::new();
        corpus.insert_section(StatutorySection::new(
            "Title 5, Section 8401 - Purpose",
            "5",
            "8401",
            "Purpose",
            "federal employees retirement system",
        ));
        corpus.insert_section(StatutorySection::new(
            "Title 42, Section 2011 - Congressional declaration",
            "42",
            "2011",
            "Congressional declaration",
            "atomic energy development and control",
        ));
        corpus.insert_section(StatutorySection::new(
            "Title 10, Section 101 - Definitions",
            "10",
            "101",
            "Definitions",
            "in this title, armed forces means...",
        ));

        let mut law = PublicLaw::new("118-42");
        law.sections.push(SectionRef::new("5", "8401"));
        law.sections.push(SectionRef::new("42", "2011"));
        corpus.insert_law(law);

        corpus
    }

    fn passed_bill() -> (BillId, HashMap<BillId, Bill>) {
        let id = BillId::new(118, BillType::Hr, 82);
        let bill = Bill::new(id.clone(), "A passed bill").with_public_law("118-42");
        let mut bills = HashMap::new();
        bills.insert(id.clone(), bill);
        (id, bills)
    }

    fn unmapped_bill() -> (BillId, HashMap<BillId, Bill>) {
        let id = BillId::new(118, BillType::S, 7);
        let bill = Bill::new(id.clone(), "An unmapped bill");
        let mut bills = HashMap::new();
        bills.insert(id.clone(), bill);
        (id, bills)
    }

    #[test]
    fn test_direct_mapping_never_invokes_semantic() {
        let corpus = sample_corpus();
        let (id, bills) = passed_bill();
        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let results = resolver.resolve(&id, "some bill text without citations", 10).unwrap();

        assert_eq!(results.len(), 2);
        for section in &results {
            assert_eq!(section.similarity_score, 1.0);
            assert_eq!(section.match_type, MatchType::PassedLawDirectMapping);
        }
        assert_eq!(results[0].section_id, "5 U.S.C. 8401");
        assert_eq!(semantic.calls.get(), 0);
    }

    #[test]
    fn test_citation_tier_without_law_mapping() {
        let corpus = sample_corpus();
        let (id, bills) = unmapped_bill();
        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let results = resolver
            .resolve(&id, "Section 101 of Title 10, United States Code, is amended", 10)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].section_id, "10 U.S.C. 101");
        assert_eq!(results[0].match_type, MatchType::MentionedInBillMapping);
        assert_eq!(results[0].similarity_score, 1.0);
        assert_eq!(semantic.calls.get(), 0);
    }

    #[test]
    fn test_tiers_concatenate_and_dedup() {
        let corpus = sample_corpus();
        let (id, bills) = passed_bill();
        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        // 5 U.S.C. 8401 is both law-mapped and cited; the tier-1 entry wins.
        // 10 U.S.C. 101 is only cited.
        let text = "amends 5 U.S.C. 8401 and 10 U.S.C. 101";
        let results = resolver.resolve(&id, text, 10).unwrap();

        let provenance: Vec<(&str, MatchType)> = results
            .iter()
            .map(|r| (r.section_id.as_str(), r.match_type))
            .collect();
        assert_eq!(
            provenance,
            vec![
                ("5 U.S.C. 8401", MatchType::PassedLawDirectMapping),
                ("42 U.S.C. 2011", MatchType::PassedLawDirectMapping),
                ("10 U.S.C. 101", MatchType::MentionedInBillMapping),
            ]
        );
        assert_eq!(semantic.calls.get(), 0);
    }

    #[test]
    fn test_semantic_fallback_fires_only_when_exact_tiers_empty() {
        let corpus = sample_corpus();
        let (id, bills) = unmapped_bill();
        let semantic = StubSemantic::new(vec![
            SearchHit {
                id: "Title 42, Section 2011 - Congressional declaration".to_string(),
                score: 0.42,
            },
            SearchHit {
                id: "Title 5, Section 8401 - Purpose".to_string(),
                score: 0.17,
            },
        ]);
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let results = resolver.resolve(&id, "a bill about energy policy", 3).unwrap();

        assert_eq!(semantic.calls.get(), 1);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].section_id, "42 U.S.C. 2011");
        assert_eq!(results[0].match_type, MatchType::FaissSemanticMatch);
        assert!((results[0].similarity_score - 0.42).abs() < f32::EPSILON);
    }

    #[test]
    fn test_removing_citations_switches_all_matches_to_semantic() {
        let corpus = sample_corpus();
        let (id, bills) = unmapped_bill();
        let semantic = StubSemantic::new(vec![SearchHit {
            id: "Title 10, Section 101 - Definitions".to_string(),
            score: 0.3,
        }]);
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let cited = resolver.resolve(&id, "see 10 U.S.C. 101", 5).unwrap();
        assert!(cited.iter().all(|r| r.match_type == MatchType::MentionedInBillMapping));

        let uncited = resolver.resolve(&id, "see section one hundred one", 5).unwrap();
        assert!(!uncited.is_empty());
        assert!(uncited.iter().all(|r| r.match_type == MatchType::FaissSemanticMatch));
    }

    #[test]
    fn test_top_k_truncation_preserves_exact_matches() {
        let corpus = sample_corpus();
        let (id, bills) = passed_bill();
        // Even a semantic tier eager to answer contributes nothing here
        let semantic = StubSemantic::new(vec![SearchHit {
            id: "Title 10, Section 101 - Definitions".to_string(),
            score: 0.99,
        }]);
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let results = resolver.resolve(&id, "text", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_type, MatchType::PassedLawDirectMapping);
        assert_eq!(semantic.calls.get(), 0);
    }

    #[test]
    fn test_empty_bill_text_short_circuits() {
        let corpus = sample_corpus();
        let (id, bills) = passed_bill();
        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        assert!(resolver.resolve(&id, "", 5).unwrap().is_empty());
        assert!(resolver.resolve(&id, "   \n", 5).unwrap().is_empty());
        assert_eq!(semantic.calls.get(), 0);
    }

    #[test]
    fn test_unresolved_mapping_keys_silently_dropped() {
        let mut corpus = sample_corpus();
        let mut law = PublicLaw::new("118-99");
        law.sections.push(SectionRef::new("5", "8401"));
        law.sections.push(SectionRef::new("99", "12345")); // not in corpus
        corpus.insert_law(law);

        let id = BillId::new(118, BillType::Hr, 999);
        let bill = Bill::new(id.clone(), "Partially mapped").with_public_law("118-99");
        let mut bills = HashMap::new();
        bills.insert(id.clone(), bill);

        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let mut stats = ResolveStats::default();
        let results = resolver.resolve_with_stats(&id, "text", 10, &mut stats).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].section_id, "5 U.S.C. 8401");
        assert_eq!(stats.dropped, 1);
        // The gap stays invisible to callers except via omission
        assert_eq!(semantic.calls.get(), 0);
    }

    #[test]
    fn test_mapping_section_numbers_are_normalized() {
        let mut corpus = sample_corpus();
        let mut law = PublicLaw::new("118-55");
        law.sections.push(SectionRef::new("10", "101(a)(1)"));
        corpus.insert_law(law);

        let id = BillId::new(118, BillType::Hr, 500);
        let bill = Bill::new(id.clone(), "Subsection-level mapping").with_public_law("118-55");
        let mut bills = HashMap::new();
        bills.insert(id.clone(), bill);

        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let results = resolver.resolve(&id, "text", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].section_id, "10 U.S.C. 101");
    }

    #[test]
    fn test_unknown_bill_id_falls_through_to_citations() {
        let corpus = sample_corpus();
        let bills = HashMap::new(); // resolver has no record of this bill
        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let id = BillId::new(117, BillType::Hr, 1);
        let results = resolver.resolve(&id, "see 42 U.S.C. 2011", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_type, MatchType::MentionedInBillMapping);
    }

    #[test]
    fn test_match_type_serialized_names() {
        assert_eq!(
            serde_json::to_string(&MatchType::PassedLawDirectMapping).unwrap(),
            "\"passed_law_direct_mapping\""
        );
        assert_eq!(
            serde_json::to_string(&MatchType::MentionedInBillMapping).unwrap(),
            "\"mentioned_in_bill_mapping\""
        );
        assert_eq!(
            serde_json::to_string(&MatchType::FaissSemanticMatch).unwrap(),
            "\"faiss_semantic_match\""
        );
    }

    #[test]
    fn test_missing_section_text_uses_sentinel() {
        let mut corpus = CorpusStore::new();
        corpus.insert_section(StatutorySection::new("id-blank", "3", "301", "Heading", ""));

        let (id, bills) = unmapped_bill();
        let semantic = StubSemantic::empty();
        let resolver = SectionResolver::new(&bills, &corpus, &semantic);

        let results = resolver.resolve(&id, "see 3 U.S.C. 301", 5).unwrap();
        assert_eq!(results[0].text, TEXT_UNAVAILABLE);
    }
}
