//! Semantic index over a named corpus
//!
//! Pairs the embedding engine with the persisted vector store and exposes the
//! text-query seam the resolver depends on.

pub mod embedder;
pub mod store;

pub use embedder::{EMBEDDING_BATCH_SIZE, Embed, Embedder};
pub use store::{IndexStore, lookup_path};

use crate::corpus::CorpusStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A nearest-neighbor hit: corpus identifier plus similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
}

/// Text-query interface over a semantic index.
///
/// The resolver depends on this seam rather than on a concrete index, so the
/// fallback tier can be exercised without a model in tests.
pub trait SemanticSearch {
    /// Return up to `top_k` nearest corpus entries for `query_text`, sorted
    /// by descending similarity. An empty result is a valid answer.
    fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<SearchHit>>;
}

/// A loaded vector index paired with its embedding engine.
pub struct SemanticIndex<E: Embed = Embedder> {
    embedder: E,
    store: IndexStore,
}

impl<E: Embed> SemanticIndex<E> {
    /// Load a persisted index from `path`.
    pub fn open(path: &Path, embedder: E) -> Result<Self> {
        let store = IndexStore::open(path)?;
        Ok(Self { embedder, store })
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<E: Embed> SemanticSearch for SemanticIndex<E> {
    fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if top_k == 0 || self.store.is_empty() {
            return Ok(vec![]);
        }
        let query = self.embedder.embed_one(query_text)?;
        self.store.search_vector(&query, top_k)
    }
}

/// Build the statutory-section index at `path`.
///
/// Idempotent by path, not by content: an existing index is left untouched
/// and the build is skipped (callers delete stale indexes explicitly).
/// Returns the number of sections indexed, or zero when skipped. Fails with
/// [`Error::EmptyCorpus`] when no section yields usable text.
pub fn build_section_index(
    corpus: &CorpusStore,
    embedder: &dyn Embed,
    path: &Path,
) -> Result<usize> {
    if path.exists() {
        tracing::info!(path = %path.display(), "index already exists, skipping build");
        return Ok(0);
    }

    let mut ids = Vec::new();
    let mut texts = Vec::new();
    for section in corpus.sections() {
        if section.has_usable_text() {
            ids.push(section.source_id.clone());
            texts.push(section.content.clone());
        }
    }

    if texts.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    tracing::info!(sections = texts.len(), path = %path.display(), "building section index");
    let vectors = embedder.embed_batch(&texts)?;
    IndexStore::write(path, &vectors, &ids)?;

    Ok(ids.len())
}


#[cfg(test)]
mod tests {
    use super::testing::CharCountEmbedder;
    use super::*;
    use crate::section::StatutorySection;

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
        corpus
    }

    #[test]
    fn test_build_then_query_self_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sections.index");
        let corpus = sample_corpus();

        let indexed = build_section_index(&corpus, &CharCountEmbedder, &path).unwrap();
        assert_eq!(indexed, 2);

        let index = SemanticIndex::open(&path, CharCountEmbedder).unwrap();
        // A corpus member's own text comes back as the top hit at score 1.0
        let hits = index.search("atomic energy development and control", 2).unwrap();
        assert_eq!(hits[0].id, "Title 42, Section 2011 - Congressional declaration");
        assert_eq!(hits[0].score, 1.0);
        assert!(hits[1].score < hits[0].score);
    }

    #[test]
    fn test_build_is_idempotent_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sections.index");
        let corpus = sample_corpus();

        assert_eq!(build_section_index(&corpus, &CharCountEmbedder, &path).unwrap(), 2);
        // Second build sees the existing file and skips, even though the
        // corpus still has entries
        assert_eq!(build_section_index(&corpus, &CharCountEmbedder, &path).unwrap(), 0);
    }

    #[test]
    fn test_build_empty_corpus_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sections.index");

        let mut corpus = CorpusStore::new();
        corpus.insert_section(StatutorySection::new("id-1", "5", "8401", "Heading", "   "));

        assert!(matches!(
            build_section_index(&corpus, &CharCountEmbedder, &path),
            Err(Error::EmptyCorpus)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_search_zero_top_k() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sections.index");
        build_section_index(&sample_corpus(), &CharCountEmbedder, &path).unwrap();

        let index = SemanticIndex::open(&path, CharCountEmbedder).unwrap();
        assert!(index.search("anything", 0).unwrap().is_empty());
    }
}
