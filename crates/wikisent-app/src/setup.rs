//! Startup wiring: encoder selection, pipeline construction, data loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use wikisent_core::config::{EncoderBackend, EncoderConfig, WikisentConfig};
use wikisent_core::error::{Result, WikisentError};
use wikisent_vector::{Encoder, FlatIndex, HashEncoder, IngestSummary, OnnxEncoder, Pipeline};

/// Build the encoder selected in the config.
pub fn build_encoder(config: &EncoderConfig) -> Result<Arc<dyn Encoder>> {
    match config.backend {
        EncoderBackend::Hash => {
            let encoder = HashEncoder::new(config.dimensions)?;
            tracing::info!(dimensions = config.dimensions, "Hash encoder ready");
            Ok(Arc::new(encoder))
        }
        EncoderBackend::Onnx => {
            let dir = config.model_dir.as_deref().ok_or_else(|| {
                WikisentError::Config("encoder.model_dir is required for the onnx backend".into())
            })?;
            let encoder = OnnxEncoder::from_directory(Path::new(dir))?;
            tracing::info!(
                model_dir = dir,
                dimensions = encoder.dimensions(),
                "ONNX encoder ready"
            );
            Ok(Arc::new(encoder))
        }
    }
}

/// Build an empty pipeline: configured encoder over a flat index.
pub fn build_pipeline(config: &WikisentConfig) -> Result<Pipeline> {
    let encoder = build_encoder(&config.encoder)?;
    Ok(Pipeline::new(encoder, Arc::new(FlatIndex::new())))
}

/// Load up to `max_docs` sentences from `path` and log indexing throughput.
pub fn ingest_data_file(pipeline: &Pipeline, path: &Path, max_docs: usize) -> Result<IngestSummary> {
    let file = File::open(path).map_err(|e| {
        WikisentError::Config(format!("cannot open data file {}: {}", path.display(), e))
    })?;

    let start = Instant::now();
    let summary = pipeline.ingest_reader(BufReader::new(file), max_docs)?;
    let elapsed = start.elapsed();

    let secs = elapsed.as_secs_f64();
    let qps = if secs > 0.0 {
        summary.stored as f64 / secs
    } else {
        0.0
    };
    tracing::info!(
        docs = summary.stored,
        elapsed_ms = elapsed.as_millis() as u64,
        qps = %format!("{:.1}", qps),
        "QPS: indexing"
    );

    Ok(summary)
}
