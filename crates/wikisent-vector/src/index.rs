//! In-memory vector index with brute-force nearest-neighbor search.
//!
//! Vectors are kept in one dense row-major buffer; row `i` belongs to the
//! record with id `i`. Search scores every row, which is exact and fast
//! enough for the few thousand sentences this index is meant to hold.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::similarity::{neg_squared_euclidean, top_k_by_score};

/// Sequential identifier assigned by the index at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored sentence together with its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub text: String,
    pub vector: Vec<f32>,
}

/// A single hit returned from a vector search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The record that matched.
    pub record_id: RecordId,
    /// The text the record was added with.
    pub text: String,
    /// Negative squared Euclidean distance to the query (0.0 is exact).
    pub score: f64,
}

/// Capability interface for anything that can store vectors and answer
/// top-k queries.
pub trait VectorIndex: Send + Sync {
    /// Append a record and return its id.
    ///
    /// The first vector fixes the index dimension. A failed add leaves the
    /// index unchanged.
    fn add(&self, text: &str, vector: Vec<f32>) -> Result<RecordId, IndexError>;

    /// Return up to `top_k` records ordered by descending score, ties by
    /// ascending id. An empty index yields an empty result.
    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Match>, IndexError>;

    /// Number of records stored.
    ///
    /// Infallible: an implementation whose storage is unreadable (e.g. a
    /// poisoned lock) reports `0` here, while `add` and `search` return an
    /// error.
    fn len(&self) -> usize;

    /// Dimension fixed by the first insert, if any. `None` when the storage
    /// is unreadable, like [`VectorIndex::len`].
    fn dimensions(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct Storage {
    dimensions: Option<usize>,
    /// Row-major `[len, dimensions]` matrix.
    vectors: Vec<f32>,
    /// Indexed by `RecordId`.
    texts: Vec<String>,
}

impl Storage {
    fn row(&self, row: usize) -> &[f32] {
        // Only called with rows < texts.len(), which implies dimensions is set.
        let dim = self.dimensions.unwrap_or(0);
        &self.vectors[row * dim..(row + 1) * dim]
    }
}

/// Flat (exhaustive) vector index.
///
/// Thread-safe via interior `RwLock`: adds take the write lock, searches
/// share the read lock, so a search never sees a half-appended row.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    storage: Arc<RwLock<Storage>>,
}

impl FlatIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored record by id.
    pub fn get(&self, id: RecordId) -> Result<Option<Record>, IndexError> {
        let storage = self.storage.read().map_err(|_| IndexError::LockPoisoned)?;
        let row = id.0 as usize;
        if row >= storage.texts.len() {
            return Ok(None);
        }
        Ok(Some(Record {
            id,
            text: storage.texts[row].clone(),
            vector: storage.row(row).to_vec(),
        }))
    }
}

fn check_vector(vector: &[f32], expected: Option<usize>) -> Result<(), IndexError> {
    if let Some(expected) = expected {
        if vector.len() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
    }
    match vector.iter().position(|x| !x.is_finite()) {
        Some(position) => Err(IndexError::NonFiniteComponent { position }),
        None => Ok(()),
    }
}

impl VectorIndex for FlatIndex {
    fn add(&self, text: &str, vector: Vec<f32>) -> Result<RecordId, IndexError> {
        let mut storage = self.storage.write().map_err(|_| IndexError::LockPoisoned)?;

        check_vector(&vector, storage.dimensions)?;

        let id = RecordId(storage.texts.len() as u64);
        if storage.dimensions.is_none() {
            storage.dimensions = Some(vector.len());
        }
        storage.vectors.extend_from_slice(&vector);
        storage.texts.push(text.to_string());
        Ok(id)
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Match>, IndexError> {
        if top_k == 0 {
            return Err(IndexError::InvalidTopK);
        }

        let storage = self.storage.read().map_err(|_| IndexError::LockPoisoned)?;
        if storage.texts.is_empty() {
            return Ok(Vec::new());
        }
        check_vector(query, storage.dimensions)?;

        let scores =
            (0..storage.texts.len()).map(|row| (row, neg_squared_euclidean(query, storage.row(row))));

        Ok(top_k_by_score(scores, top_k)
            .into_iter()
            .map(|(row, score)| Match {
                record_id: RecordId(row as u64),
                text: storage.texts[row].clone(),
                score,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.storage.read().map(|s| s.texts.len()).unwrap_or(0)
    }

    fn dimensions(&self) -> Option<usize> {
        self.storage.read().ok().and_then(|s| s.dimensions)
    }
}
