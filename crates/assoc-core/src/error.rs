//! Error types for assoc-core.

use thiserror::Error;

/// A chain received from the backend could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The flat array is not made of whole `(stage, term, match, result)` groups.
    #[error("chain has {len} elements, expected a multiple of 4")]
    Ragged { len: usize },
}

/// A stage name that is not one of the known search strategies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stage: {0}")]
pub struct UnknownStage(pub String);
