//! Error types for graphtrack
//!
//! Store operations themselves are total; only the persistence boundary can
//! fail, and those failures are absorbed as silent degradation by the store.

use thiserror::Error;

/// Errors that can occur while loading or saving the persisted state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
