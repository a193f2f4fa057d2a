//! wikisent API crate - axum HTTP gateway over the query pipeline.
//!
//! Exposes health and search endpoints. The gateway is read-only: the
//! index is built before the server starts.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, serve};
pub use state::AppState;
