//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use wikisent_core::config::WikisentConfig;
use wikisent_vector::Pipeline;

/// Shared application state.
///
/// Cheap to clone: the config sits behind an `Arc` and the pipeline only
/// holds `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<WikisentConfig>,
    /// Encoder + index used to answer queries.
    pub pipeline: Pipeline,
    /// Wall-clock start time, reported by `/health`.
    pub started_at: DateTime<Utc>,
    /// Monotonic start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: WikisentConfig, pipeline: Pipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }
}
