//! Demographic-group matching
//!
//! Scores a bill against a fixed taxonomy of demographic groups. The taxonomy
//! is a category → group → related-terms mapping; each group is indexed as
//! the arithmetic mean of its term embeddings, under the identifier
//! `"{category} - {group}"` (e.g. `"Age - Older Adults"`).

use crate::index::{Embed, IndexStore, SemanticIndex, SemanticSearch};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Taxonomy shape: category → group → related terms. Sorted maps keep the
/// build order deterministic so rebuilds are reproducible.
pub type DemographicData = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// A demographic group matched to a bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicMatch {
    pub group: String,
    pub similarity_score: f32,
}

/// Load the demographic taxonomy artifact. A missing file yields an empty
/// taxonomy with a warning.
pub fn load_demographic_data(path: &Path) -> Result<DemographicData> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "demographic taxonomy not found, continuing with empty data");
        return Ok(DemographicData::new());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Build the demographic descriptor index at `path`.
///
/// One vector per group: the mean of the group's term embeddings. Groups with
/// no terms are skipped. Idempotent by path like the section index build.
/// Fails with [`Error::EmptyCorpus`] when nothing was indexed.
pub fn build_demographic_index(
    data: &DemographicData,
    embedder: &dyn Embed,
    path: &Path,
) -> Result<usize> {
    if path.exists() {
        tracing::info!(path = %path.display(), "index already exists, skipping build");
        return Ok(0);
    }

    let mut ids = Vec::new();
    let mut vectors = Vec::new();
    for (category, groups) in data {
        for (group, terms) in groups {
            if terms.is_empty() {
                continue;
            }
            let embeddings = embedder.embed_batch(terms)?;
            let Some(mean) = mean_vector(&embeddings) else {
                continue;
            };
            ids.push(format!("{} - {}", category, group));
            vectors.push(mean);
        }
    }

    if ids.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    tracing::info!(groups = ids.len(), path = %path.display(), "building demographic index");
    IndexStore::write(path, &vectors, &ids)?;
    Ok(ids.len())
}

fn mean_vector(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let mut mean = vec![0.0f32; first.len()];
    for vector in vectors {
        for (acc, value) in mean.iter_mut().zip(vector.iter()) {
            *acc += value;
        }
    }
    let n = vectors.len() as f32;
    for value in &mut mean {
        *value /= n;
    }
    Some(mean)
}

/// Finds the demographic groups most relevant to a bill text.
pub struct DemographicMatcher<E: Embed> {
    index: SemanticIndex<E>,
}

impl<E: Embed> DemographicMatcher<E> {
    /// Load a previously built demographic index.
    pub fn open(path: &Path, embedder: E) -> Result<Self> {
        Ok(Self {
            index: SemanticIndex::open(path, embedder)?,
        })
    }

    /// Return the `top_k` most similar demographic groups for a bill text.
    pub fn match_groups(&self, bill_text: &str, top_k: usize) -> Result<Vec<DemographicMatch>> {
        let hits = self.index.search(bill_text, top_k)?;
        Ok(hits
            .into_iter()
            .map(|hit| DemographicMatch {
                group: hit.id,
                similarity_score: hit.score,
            })
            .collect())
    }
}
