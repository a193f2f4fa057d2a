//! Shared configuration and the top-level error type for wikisent.

pub mod config;
pub mod error;

pub use config::WikisentConfig;
pub use error::{Result, WikisentError};
