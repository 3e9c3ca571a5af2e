//! Text embedding engine
//!
//! Wraps a local sentence-transformer model. Embedding is a pure function of
//! the input text and model configuration, so index rebuilds over the same
//! corpus are reproducible.

use crate::Result;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Batch size for bulk embedding runs
pub const EMBEDDING_BATCH_SIZE: usize = 32;

/// Text-to-vector interface. Index building and querying depend on this seam
/// rather than on the concrete model.
pub trait Embed {
    /// Generate a single embedding for a query text
    fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts, in input order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Engine for generating text embeddings using a local transformer model
pub struct Embedder {
    model: TextEmbedding,
}

impl Embedder {
    /// Create a new embedder with the default model (all-MiniLM-L12-v2)
    pub fn new() -> Result<Self> {
        let mut options = InitOptions::default();
        options.model_name = EmbeddingModel::AllMiniLML12V2;
        options.show_download_progress = true;

        let model = TextEmbedding::try_new(options)
            .map_err(|e| crate::Error::Embedding(format!("failed to load embedding model: {}", e)))?;

        Ok(Self { model })
    }
}

impl Embed for Embedder {
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self
            .model
            .embed(vec![text.to_string()], None)
            .map_err(|e| crate::Error::Embedding(format!("query embedding failed: {}", e)))?;

        Ok(embeddings.remove(0))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EMBEDDING_BATCH_SIZE) {
            let embeddings = self
                .model
                .embed(chunk.to_vec(), None)
                .map_err(|e| crate::Error::Embedding(format!("embedding generation failed: {}", e)))?;
            vectors.extend(embeddings);
            tracing::debug!(processed = vectors.len(), total = texts.len(), "embedding progress");
        }

        Ok(vectors)
    }
}
