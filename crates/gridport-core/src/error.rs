#![forbid(unsafe_code)]

//! Core error types.

use thiserror::Error;

/// Errors raised by the core vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The requested row window is inverted. Rejected before any backend
    /// call is made; this is a programming error in the caller.
    #[error("invalid viewport: bottom {bottom} < top {top}")]
    InvalidViewport { top: usize, bottom: usize },
}
