//! wikisent vector crate - encoders, flat index, ranking, and the pipeline.
//!
//! Provides an `Encoder` trait with a hashing and an ONNX implementation,
//! an exact in-memory `VectorIndex` scored by negative squared Euclidean
//! distance, the ingestion/query pipeline, and console rendering.

pub mod encoder;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod render;
pub mod similarity;

pub use encoder::{Encoder, HashEncoder, OnnxEncoder};
pub use error::{EncodingError, IndexError};
pub use index::{FlatIndex, Match, Record, RecordId, VectorIndex};
pub use pipeline::{IngestResult, IngestSummary, Pipeline};
pub use render::{render_matches, usable_matches};
