//! Framework error type.
//!
//! Sub-crates define their own error enums (`ModelError`, `NetworkError`,
//! `SimError`) and either convert into `CoreError` via `From` impls or wrap
//! it as one variant.  Both patterns are acceptable; prefer whichever keeps
//! error sites clean.

use thiserror::Error;

use crate::NodeId;

/// The top-level error type for `meio-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `meio-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
