//! Ingestion and query pipeline.
//!
//! `Pipeline` ties an [`Encoder`] to a [`VectorIndex`]: text goes in, gets
//! encoded, and is either stored or used as a query. Both stages are trait
//! objects so any encoder can be paired with any index.

use std::io::BufRead;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use wikisent_core::error::Result;

use crate::encoder::{decode_text, Encoder};
use crate::index::{Match, RecordId, VectorIndex};

/// Result of an ingestion attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IngestResult {
    /// The text was stored under `id`.
    Stored { id: RecordId },
    /// The text was skipped (e.g., blank line).
    Skipped { reason: String },
}

/// Counters for a bulk ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Encoder + index, wired together.
#[derive(Clone)]
pub struct Pipeline {
    encoder: Arc<dyn Encoder>,
    index: Arc<dyn VectorIndex>,
}

impl Pipeline {
    pub fn new(encoder: Arc<dyn Encoder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { encoder, index }
    }

    /// Encode and store one piece of text. Blank text is skipped.
    pub fn ingest_text(&self, text: &str) -> Result<IngestResult> {
        if text.trim().is_empty() {
            return Ok(IngestResult::Skipped {
                reason: "Blank line".to_string(),
            });
        }

        let vector = self.encoder.encode(text)?;
        let id = self.index.add(text, vector)?;
        debug!(id = %id, "Record stored");
        Ok(IngestResult::Stored { id })
    }

    /// Ingest newline-separated text until `max_docs` records are stored.
    ///
    /// Lines that are not valid UTF-8 or fail to encode are logged and
    /// counted as failed. Index errors abort the run.
    pub fn ingest_reader<R: BufRead>(&self, reader: R, max_docs: usize) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();

        for (line_no, line) in reader.split(b'\n').enumerate() {
            if summary.stored >= max_docs {
                break;
            }

            let bytes = line?;
            let raw = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);

            let text = match decode_text(raw) {
                Ok(text) => text,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "Skipping undecodable line");
                    summary.failed += 1;
                    continue;
                }
            };

            if text.trim().is_empty() {
                summary.skipped += 1;
                continue;
            }

            let vector = match self.encoder.encode(text) {
                Ok(vector) => vector,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "Skipping unencodable line");
                    summary.failed += 1;
                    continue;
                }
            };

            self.index.add(text, vector)?;
            summary.stored += 1;
        }

        info!(
            stored = summary.stored,
            skipped = summary.skipped,
            failed = summary.failed,
            "Ingestion finished"
        );
        Ok(summary)
    }

    /// Encode `text` and return its `top_k` nearest records.
    pub fn query(&self, text: &str, top_k: usize) -> Result<Vec<Match>> {
        let vector = self.encoder.encode(text)?;
        Ok(self.index.search(&vector, top_k)?)
    }

    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::HashEncoder;
    use crate::error::EncodingError;
    use crate::index::FlatIndex;
    use std::io::Cursor;
    use wikisent_core::error::WikisentError;

    fn make_pipeline() -> Pipeline {
        Pipeline::new(
            Arc::new(HashEncoder::new(64).unwrap()),
            Arc::new(FlatIndex::new()),
        )
    }

    /// Encoder that fails on any text containing "poison".
    struct PickyEncoder;

    impl Encoder for PickyEncoder {
        fn encode(&self, text: &str) -> std::result::Result<Vec<f32>, EncodingError> {
            if text.contains("poison") {
                return Err(EncodingError::Tokenization("unknown token".into()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Encoder whose output length depends on the input, to trip the index.
    struct RaggedEncoder;

    impl Encoder for RaggedEncoder {
        fn encode(&self, text: &str) -> std::result::Result<Vec<f32>, EncodingError> {
            Ok(vec![1.0; text.len()])
        }

        fn dimensions(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_ingest_text_stores() {
        let pipeline = make_pipeline();
        let result = pipeline.ingest_text("Paris is the capital of France").unwrap();
        assert_eq!(result, IngestResult::Stored { id: RecordId(0) });
        assert_eq!(pipeline.index().len(), 1);
    }

    #[test]
    fn test_ingest_text_skips_blank() {
        let pipeline = make_pipeline();
        let result = pipeline.ingest_text("   ").unwrap();
        assert!(matches!(result, IngestResult::Skipped { .. }));
        assert!(pipeline.index().is_empty());
    }

    #[test]
    fn test_duplicate_text_is_stored_twice() {
        let pipeline = make_pipeline();
        pipeline.ingest_text("same").unwrap();
        let second = pipeline.ingest_text("same").unwrap();
        assert_eq!(second, IngestResult::Stored { id: RecordId(1) });
    }

    #[test]
    fn test_query_finds_exact_sentence() {
        let pipeline = make_pipeline();
        pipeline.ingest_text("The Nile is a river in Africa").unwrap();
        pipeline.ingest_text("Mount Everest is the highest mountain").unwrap();

        let hits = pipeline.query("The Nile is a river in Africa", 2).unwrap();
        assert_eq!(hits[0].text, "The Nile is a river in Africa");
        assert_eq!(hits[0].score, 0.0);
        assert!(hits[1].score < 0.0);
    }

    #[test]
    fn test_query_empty_index() {
        let pipeline = make_pipeline();
        assert!(pipeline.query("anything", 3).unwrap().is_empty());
    }

    #[test]
    fn test_ingest_reader_counts_lines() {
        let pipeline = make_pipeline();
        let input = "first line\r\n\nsecond line\n   \nthird line\n";
        let summary = pipeline.ingest_reader(Cursor::new(input), 50).unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                stored: 3,
                skipped: 2,
                failed: 0
            }
        );
        let hits = pipeline.query("first line", 1).unwrap();
        assert_eq!(hits[0].text, "first line");
    }

    #[test]
    fn test_ingest_reader_respects_max_docs() {
        let pipeline = make_pipeline();
        let input = "one\ntwo\nthree\nfour\n";
        let summary = pipeline.ingest_reader(Cursor::new(input), 2).unwrap();
        assert_eq!(summary.stored, 2);
        assert_eq!(pipeline.index().len(), 2);
    }

    #[test]
    fn test_ingest_reader_skips_invalid_utf8() {
        let pipeline = make_pipeline();
        let mut input = b"good line\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"another good line");
        let summary = pipeline.ingest_reader(Cursor::new(input), 50).unwrap();
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_ingest_reader_skips_encoding_failures() {
        let pipeline = Pipeline::new(Arc::new(PickyEncoder), Arc::new(FlatIndex::new()));
        let input = "fine\npoison pill\nalso fine\n";
        let summary = pipeline.ingest_reader(Cursor::new(input), 50).unwrap();
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_ingest_text_propagates_encoding_error() {
        let pipeline = Pipeline::new(Arc::new(PickyEncoder), Arc::new(FlatIndex::new()));
        let err = pipeline.ingest_text("poison").unwrap_err();
        assert!(matches!(err, WikisentError::Encoding(_)));
    }

    #[test]
    fn test_ingest_reader_aborts_on_dimension_mismatch() {
        let pipeline = Pipeline::new(Arc::new(RaggedEncoder), Arc::new(FlatIndex::new()));
        let err = pipeline
            .ingest_reader(Cursor::new("abc\nabcd\n"), 50)
            .unwrap_err();
        assert!(matches!(
            err,
            WikisentError::DimensionMismatch {
                expected: 3,
                actual: 4
            }
        ));
        assert_eq!(pipeline.index().len(), 1);
    }
}
