#![forbid(unsafe_code)]

//! Store error types.

use gridport_core::CoreError;
use thiserror::Error;

/// Errors surfaced to callers of the store.
///
/// Background refresh failures never appear here; they are logged and
/// the previous cached value is left in place. Only caller misuse
/// (`NoViewport`, `InvalidViewport`) and failures of directly awaited
/// operations (`Backend`) propagate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A snapshot was requested before any viewport was established.
    #[error("no viewport has been set")]
    NoViewport,

    /// An inverted row window was passed in.
    #[error(transparent)]
    InvalidViewport(#[from] CoreError),

    /// The underlying document store failed a directly awaited call.
    #[error("backend failure: {0}")]
    Backend(String),
}
