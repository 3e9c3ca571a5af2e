//! Persisted flat vector index
//!
//! The index is a file pair: a SQLite database holding one row per vector
//! (little-endian f32 blobs, ordered by row position) and a JSON-encoded
//! ordered identifier list at the same path with a `.json` extension. The
//! lookup table maps vector-row position to corpus identifier; a length
//! disagreement between the two files is corruption, not a recoverable state.

use crate::index::SearchHit;
use crate::{Error, Result};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

/// SQL to create the vectors table
const CREATE_VECTORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vectors (
    pos INTEGER PRIMARY KEY,
    vector BLOB NOT NULL
)
"#;

/// SQL to create the index metadata table
const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

/// Path of the identifier lookup file paired with an index file
pub fn lookup_path(index_path: &Path) -> PathBuf {
    index_path.with_extension("json")
}

/// An in-memory view of a persisted vector index.
///
/// Loaded once and read-only afterwards; queries are a flat Euclidean scan.
pub struct IndexStore {
    vectors: Vec<Vec<f32>>,
    lookup: Vec<String>,
    dim: usize,
}

impl IndexStore {
    /// Persist vectors and their identifier lookup as an index file pair.
    ///
    /// Refuses to write a pair whose lengths disagree - that state would be
    /// unreadable by [`IndexStore::open`].
    pub fn write(path: &Path, vectors: &[Vec<f32>], lookup: &[String]) -> Result<()> {
        if vectors.len() != lookup.len() {
            return Err(Error::CorruptIndex(format!(
                "refusing to write {} vectors with {} lookup entries",
                vectors.len(),
                lookup.len()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let dim = vectors.first().map(|v| v.len()).unwrap_or(0);

        let mut conn = Connection::open(path)?;
        conn.execute(CREATE_VECTORS_TABLE, [])?;
        conn.execute(CREATE_META_TABLE, [])?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('dim', ?1)",
            params![dim.to_string()],
        )?;
        for (pos, vector) in vectors.iter().enumerate() {
            let blob: Vec<u8> = vector.iter().flat_map(|f| f.to_le_bytes()).collect();
            tx.execute(
                "INSERT OR REPLACE INTO vectors (pos, vector) VALUES (?1, ?2)",
                params![pos as i64, blob],
            )?;
        }
        tx.commit()?;

        let lookup_file = std::fs::File::create(lookup_path(path))?;
        serde_json::to_writer_pretty(lookup_file, lookup)?;

        tracing::info!(rows = vectors.len(), dim, path = %path.display(), "index persisted");
        Ok(())
    }

    /// Load a persisted index file pair.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::IndexNotFound(path.to_path_buf()));
        }

        let conn = Connection::open(path)?;

        let dim: usize = conn
            .query_row("SELECT value FROM index_meta WHERE key = 'dim'", [], |row| {
                row.get::<_, String>(0)
            })
            .map_err(|_| Error::CorruptIndex("missing dimension metadata".to_string()))?
            .parse()
            .map_err(|_| Error::CorruptIndex("malformed dimension metadata".to_string()))?;

        let mut stmt = conn.prepare("SELECT vector FROM vectors ORDER BY pos")?;
        let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;

        let mut vectors = Vec::new();
        for blob in rows {
            let blob = blob?;
            if blob.len() != dim * 4 {
                return Err(Error::CorruptIndex(format!(
                    "vector blob of {} bytes does not match dimension {}",
                    blob.len(),
                    dim
                )));
            }
            let vector: Vec<f32> = blob
                .chunks(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            vectors.push(vector);
        }

        let lookup: Vec<String> = match std::fs::read_to_string(lookup_path(path)) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        if lookup.len() != vectors.len() {
            return Err(Error::CorruptIndex(format!(
                "lookup table has {} entries but index has {} vectors",
                lookup.len(),
                vectors.len()
            )));
        }

        tracing::debug!(rows = vectors.len(), dim, path = %path.display(), "index loaded");
        Ok(Self { vectors, lookup, dim })
    }

    /// Nearest-neighbor search by vector.
    ///
    /// Similarity is `1 / (1 + euclidean_distance)`, so scores lie in `(0,1]`
    /// and are NOT cosine similarities. Results are sorted descending,
    /// at most `top_k` of them. An empty index or `top_k == 0` yields an
    /// empty result, never an error.
    pub fn search_vector(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if top_k == 0 || self.vectors.is_empty() {
            return Ok(vec![]);
        }
        if query.len() != self.dim {
            return Err(Error::Embedding(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dim
            )));
        }

        let mut scored: Vec<SearchHit> = self
            .vectors
            .iter()
            .zip(self.lookup.iter())
            .map(|(vector, id)| {
                let distance = euclidean_distance(query, vector);
                SearchHit {
                    id: id.clone(),
                    score: 1.0 / (1.0 + distance),
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored)
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Embedding dimensionality
    pub fn dim(&self) -> usize {
        self.dim
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
