use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WikisentError};

/// Top-level configuration for wikisent.
///
/// Built once at startup and handed to the driver. Nothing in the index or
/// encoder reads it directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WikisentConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl WikisentConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WikisentConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Reject settings no query could run with.
    pub fn validate(&self) -> Result<()> {
        if self.search.top_k == 0 {
            return Err(WikisentError::Config(
                "search.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WikisentError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Input corpus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Text file with one sentence per line.
    pub data_file: String,
    /// Maximum number of records to ingest from the data file.
    pub max_docs: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_file: "data/toy-input.txt".to_string(),
            max_docs: 50,
        }
    }
}

/// Query and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of matches requested per query.
    pub top_k: usize,
    /// Matches scoring below this are hidden when rendering.
    ///
    /// Scores are negative squared distances, so `0.0` only admits exact
    /// matches. Set to `-inf` to show everything.
    pub score_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: 0.0,
        }
    }
}

/// Which encoder implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderBackend {
    /// Model-free feature hashing.
    #[default]
    Hash,
    /// Sentence-transformer ONNX model.
    Onnx,
}

/// Encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub backend: EncoderBackend,
    /// Output dimension of the hash encoder.
    pub dimensions: usize,
    /// Directory holding `model.onnx` and `tokenizer.json`.
    pub model_dir: Option<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            backend: EncoderBackend::Hash,
            dimensions: 384,
            model_dir: None,
        }
    }
}

/// REST gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 45678,
        }
    }
}
