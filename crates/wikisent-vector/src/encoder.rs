//! Text encoders.
//!
//! - `HashEncoder` maps tokens into signed hash buckets. No model files, fully
//!   deterministic, and sentences sharing words land near each other.
//! - `OnnxEncoder` loads a sentence-transformer ONNX model (e.g.
//!   all-MiniLM-L6-v2) via ort and tokenizes with the HuggingFace tokenizers
//!   crate.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::Tokenizer;
use tracing::info;
use xxhash_rust::xxh3::Xxh3;

use wikisent_core::error::WikisentError;

use crate::error::EncodingError;
use crate::similarity::l2_normalize;

/// Converts text into fixed-dimension vectors.
///
/// Implementations are deterministic for a fixed model and safe to call from
/// several threads at once. Empty text must produce a vector, not an error.
pub trait Encoder: Send + Sync {
    /// Encode `text` into a vector of length [`Encoder::dimensions`].
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError>;

    /// Length of every vector this encoder produces.
    fn dimensions(&self) -> usize;
}

/// Decode a raw input line, rejecting byte sequences that are not UTF-8.
pub fn decode_text(bytes: &[u8]) -> Result<&str, EncodingError> {
    Ok(std::str::from_utf8(bytes)?)
}

// ---------------------------------------------------------------------------
// HashEncoder - feature hashing, no model required
// ---------------------------------------------------------------------------

/// Bag-of-words encoder using the hashing trick.
///
/// Each lowercased word, and each pair of adjacent words at half weight, is
/// hashed to a bucket and a sign. The bucket sums are L2-normalised. Empty or
/// punctuation-only text encodes to the zero vector.
///
/// Features are hashed with XXH3-64, whose output is fixed by its published
/// specification, so vectors are identical across runs, platforms and
/// compiler releases.
#[derive(Debug, Clone)]
pub struct HashEncoder {
    dimensions: usize,
}

impl HashEncoder {
    pub fn new(dimensions: usize) -> Result<Self, WikisentError> {
        if dimensions == 0 {
            return Err(WikisentError::Config(
                "hash encoder dimensions must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    /// Add `weight` to the signed bucket of the feature made of `parts`
    /// joined by single spaces.
    fn accumulate(&self, out: &mut [f32], parts: &[&str], weight: f32) {
        let mut hasher = Xxh3::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                hasher.update(b" ");
            }
            hasher.update(part.as_bytes());
        }
        let h = hasher.digest();
        let bucket = (h % self.dimensions as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        out[bucket] += sign * weight;
    }
}

impl Encoder for HashEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let mut out = vec![0.0f32; self.dimensions];
        for &token in &tokens {
            self.accumulate(&mut out, &[token], 1.0);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut out, pair, 0.5);
        }

        l2_normalize(&mut out);
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// OnnxEncoder - ONNX Runtime inference
// ---------------------------------------------------------------------------

/// ONNX Runtime-backed encoder using a sentence-transformer model.
///
/// Expects a model directory containing:
/// - `model.onnx` — the sentence-transformer ONNX export
/// - `tokenizer.json` — the HuggingFace fast-tokenizer file
///
/// The model takes `input_ids`, `attention_mask` and `token_type_ids` as i64
/// inputs and produces token-level embeddings; masked mean pooling and L2
/// normalisation give one vector per input.
pub struct OnnxEncoder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimensions: usize,
}

impl std::fmt::Debug for OnnxEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEncoder")
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl OnnxEncoder {
    /// Load a sentence-transformer model from the given directory.
    pub fn from_directory(model_dir: &Path) -> Result<Self, EncodingError> {
        Self::from_files(
            &model_dir.join("model.onnx"),
            &model_dir.join("tokenizer.json"),
        )
    }

    /// Load from explicit model and tokenizer file paths.
    pub fn from_files(model_path: &Path, tokenizer_path: &Path) -> Result<Self, EncodingError> {
        if !model_path.exists() {
            return Err(EncodingError::ModelLoad(format!(
                "ONNX model not found at {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(EncodingError::ModelLoad(format!(
                "tokenizer not found at {}",
                tokenizer_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| EncodingError::ModelLoad(format!("session builder: {}", e)))?
            .with_intra_threads(1)
            .map_err(|e| EncodingError::ModelLoad(format!("set threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| EncodingError::ModelLoad(format!("load model: {}", e)))?;

        // Sentence-transformer output is [batch, seq_len, hidden_dim].
        let dimensions = session
            .outputs()
            .first()
            .and_then(|out| out.dtype().tensor_shape())
            .and_then(|shape| shape.last().copied())
            .map(|d| if d > 0 { d as usize } else { 384 })
            .unwrap_or(384);

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EncodingError::ModelLoad(format!("load tokenizer: {}", e)))?;

        info!(
            model = %model_path.display(),
            dimensions,
            "Loaded ONNX encoder"
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dimensions,
        })
    }
}

impl Encoder for OnnxEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EncodingError::Tokenization(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let seq_len = input_ids.len();

        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| EncodingError::Inference(format!("input_ids array: {}", e)))?;
        let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .map_err(|e| EncodingError::Inference(format!("attention_mask array: {}", e)))?;
        let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
            .map_err(|e| EncodingError::Inference(format!("token_type_ids array: {}", e)))?;

        let ids_ref = TensorRef::from_array_view(&ids_array)
            .map_err(|e| EncodingError::Inference(format!("input_ids tensor: {}", e)))?;
        let mask_ref = TensorRef::from_array_view(&mask_array)
            .map_err(|e| EncodingError::Inference(format!("attention_mask tensor: {}", e)))?;
        let type_ref = TensorRef::from_array_view(&type_array)
            .map_err(|e| EncodingError::Inference(format!("token_type_ids tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| EncodingError::Inference(format!("session lock poisoned: {}", e)))?;
        let outputs = session
            .run(ort::inputs![ids_ref, mask_ref, type_ref])
            .map_err(|e| EncodingError::Inference(e.to_string()))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EncodingError::Inference(format!("extract embeddings: {}", e)))?;

        let shape_dims: Vec<i64> = shape.iter().copied().collect();
        let hidden_dim = match shape_dims.as_slice() {
            [_, .., last] => *last as usize,
            _ => {
                return Err(EncodingError::Inference(format!(
                    "unexpected output shape: {:?}",
                    shape_dims
                )))
            }
        };

        let mut pooled = vec![0.0f32; hidden_dim];
        let mut count = 0.0f32;
        for (tok_idx, &mask_val) in attention_mask.iter().enumerate() {
            if mask_val > 0 {
                let offset = tok_idx * hidden_dim;
                for (dim, slot) in pooled.iter_mut().enumerate() {
                    *slot += data[offset + dim];
                }
                count += 1.0;
            }
        }
        if count > 0.0 {
            for val in &mut pooled {
                *val /= count;
            }
        }

        l2_normalize(&mut pooled);
        Ok(pooled)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::neg_squared_euclidean;

    fn encoder() -> HashEncoder {
        HashEncoder::new(384).unwrap()
    }

    #[test]
    fn test_hash_encoder_dimension() {
        let v = encoder().encode("hello world").unwrap();
        assert_eq!(v.len(), 384);
    }

    #[test]
    fn test_hash_encoder_deterministic() {
        let e = encoder();
        assert_eq!(e.encode("same text").unwrap(), e.encode("same text").unwrap());
    }

    #[test]
    fn test_hash_encoder_ignores_case_and_punctuation() {
        let e = encoder();
        assert_eq!(
            e.encode("The Eiffel Tower!").unwrap(),
            e.encode("the eiffel tower").unwrap()
        );
    }

    #[test]
    fn test_hash_encoder_different_inputs() {
        let e = encoder();
        assert_ne!(e.encode("text one").unwrap(), e.encode("text two").unwrap());
    }

    #[test]
    fn test_hash_encoder_empty_text_is_zero_vector() {
        let v = encoder().encode("").unwrap();
        assert_eq!(v, vec![0.0f32; 384]);
        let v = encoder().encode("  ...  ").unwrap();
        assert_eq!(v, vec![0.0f32; 384]);
    }

    #[test]
    fn test_hash_encoder_unit_norm() {
        let v = encoder().encode("a sentence about rivers").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hash_encoder_shared_words_are_closer() {
        let e = encoder();
        let q = e.encode("the river flows north").unwrap();
        let near = e.encode("the river flows south").unwrap();
        let far = e.encode("quantum chromodynamics lecture").unwrap();
        assert!(neg_squared_euclidean(&q, &near) > neg_squared_euclidean(&q, &far));
    }

    #[test]
    fn test_hash_encoder_single_word_uses_xxh3_bucket() {
        let e = encoder();
        let h = xxhash_rust::xxh3::xxh3_64(b"paris");
        let mut expected = vec![0.0f32; 384];
        expected[(h % 384) as usize] = if h >> 63 == 0 { 1.0 } else { -1.0 };

        assert_eq!(e.encode("Paris").unwrap(), expected);
    }

    #[test]
    fn test_hash_encoder_bigram_joins_words_with_space() {
        let e = HashEncoder::new(4096).unwrap();
        let mut expected = vec![0.0f32; 4096];
        for (feature, weight) in [(&b"new"[..], 1.0f32), (b"york", 1.0), (b"new york", 0.5)] {
            let h = xxhash_rust::xxh3::xxh3_64(feature);
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            expected[(h % 4096) as usize] += sign * weight;
        }
        l2_normalize(&mut expected);

        assert_eq!(e.encode("New York").unwrap(), expected);
    }

    #[test]
    fn test_hash_encoder_zero_dimensions_rejected() {
        assert!(matches!(
            HashEncoder::new(0),
            Err(WikisentError::Config(_))
        ));
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"plain").unwrap(), "plain");
        assert!(matches!(
            decode_text(&[0xc3, 0x28]),
            Err(EncodingError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_onnx_missing_model() {
        let result = OnnxEncoder::from_directory(Path::new("/nonexistent"));
        assert!(matches!(result, Err(EncodingError::ModelLoad(_))));
    }
}
