use std::time::Duration;
use thiserror::Error;

/// Failure talking to the store: connectivity, query, decode or constraint
/// errors reported by sqlx, or a statement that did not finish in time.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        operation: &'static str,
        after: Duration,
    },
}
