//! Read-only corpus views over ingestion artifacts
//!
//! The statutory corpus, the public-law mapping, and the bill table are
//! produced offline by external ingestion and loaded here once per session.

pub mod loader;
pub mod store;

pub use loader::{load_bills, load_law_mapping, load_sections};
pub use store::{CorpusStore, MetadataRef, PublicLaw, SectionRef};
