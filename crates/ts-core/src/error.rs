//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant when they need to surface it.

use thiserror::Error;

use crate::ActorId;

/// The base error type for `ts-core` and a common building block for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `ts-core`.
pub type CoreResult<T> = Result<T, CoreError>;
