//! CLI argument definitions for the wikisent binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use wikisent_core::config::WikisentConfig;
use wikisent_core::error::Result;

/// wikisent — index sentences and find the nearest ones to a query.
#[derive(Parser, Debug)]
#[command(name = "wikisent", version, about)]
pub struct CliArgs {
    /// What to run.
    #[arg(short = 't', long = "task", value_enum)]
    pub task: Task,

    /// Maximum number of sentences to index.
    #[arg(short = 'n', long = "num-docs")]
    pub num_docs: Option<usize>,

    /// Number of matches to retrieve per query (at least 1).
    #[arg(short = 'k', long = "top-k", value_parser = parse_top_k)]
    pub top_k: Option<usize>,

    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Text file with one sentence per line.
    #[arg(long = "data-file")]
    pub data_file: Option<PathBuf>,

    /// REST gateway port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
    /// Index the data file, then answer a single query.
    Index,
    /// Index the data file, then answer queries until an empty line.
    Query,
    /// Index the data file, then serve queries over HTTP.
    #[value(alias = "query_restful")]
    QueryRestful,
}

fn parse_top_k(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(k) => Ok(k),
        Err(e) => Err(e.to_string()),
    }
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > WIKISENT_CONFIG env var > ./wikisent.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(|key| std::env::var(key).ok())
    }

    fn resolve_config_path_with(&self, env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env("WIKISENT_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("wikisent.toml")
    }

    /// Apply environment and CLI overrides on top of a file-loaded config,
    /// then validate the result.
    pub fn resolve(&self, config: WikisentConfig) -> Result<WikisentConfig> {
        self.resolve_with(config, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        &self,
        mut config: WikisentConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<WikisentConfig> {
        if let Some(p) = env("WIKISENT_DATA_FILE") {
            config.data.data_file = p;
        }
        if let Some(n) = env("WIKISENT_MAX_DOCS").and_then(|v| v.parse().ok()) {
            config.data.max_docs = n;
        }
        if let Some(p) = env("WIKISENT_PORT").and_then(|v| v.parse().ok()) {
            config.server.port = p;
        }
        if let Some(level) = env("WIKISENT_LOG_LEVEL") {
            config.general.log_level = level;
        }

        if let Some(ref p) = self.data_file {
            config.data.data_file = p.to_string_lossy().to_string();
        }
        if let Some(n) = self.num_docs {
            config.data.max_docs = n;
        }
        if let Some(k) = self.top_k {
            config.search.top_k = k;
        }
        if let Some(p) = self.port {
            config.server.port = p;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        config.validate()?;
        Ok(config)
    }
}
