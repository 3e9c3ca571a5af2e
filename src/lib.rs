//! # Billscope - Bill-to-Statute Resolution Engine
//!
//! Resolves free-text legislative bills to the U.S. Code sections they amend
//! or relate to, then scores bills against a demographic-group taxonomy.
//!
//! Billscope provides:
//! - Three-tier section resolution (public-law mapping, in-text citations,
//!   semantic fallback) with provenance and confidence per match
//! - Regex-based extraction of statutory citations from raw bill text
//! - A persistent flat vector index over the statutory corpus, paired with a
//!   JSON identifier lookup table
//! - Read-only corpus views over ingestion artifacts with exact key lookup
//! - Demographic-group matching over mean term embeddings

pub mod bill;
pub mod citation;
pub mod config;
pub mod corpus;
pub mod demographics;
pub mod index;
pub mod resolver;
pub mod section;
pub mod ui;

// Re-exports for convenient access
pub use bill::{Bill, BillId, BillType};
pub use corpus::CorpusStore;
pub use index::{SearchHit, SemanticIndex, SemanticSearch};
pub use resolver::{MatchType, ResolvedSection, SectionResolver};
pub use section::{SectionKey, StatutorySection};

use std::path::PathBuf;

/// Result type alias for Billscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Billscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A missing file or corpus entry. Recoverable: callers substitute an
    /// empty/default result rather than aborting the pipeline.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("no index found at {}", .0.display())]
    IndexNotFound(PathBuf),

    /// Structural mismatch between the vector table and the identifier
    /// lookup. Fatal; never silently repaired.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// No entry in the corpus yielded usable text at build time.
    #[error("empty corpus: no entry yielded usable text")]
    EmptyCorpus,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("invalid bill id: {0}")]
    InvalidBillId(String),
}
