//! Error types.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or training a network.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector or matrix does not match the configured layer widths.
    #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// A function name outside of the activation or loss registry.
    #[error("unknown {kind} function '{name}'")]
    UnknownFunction { kind: &'static str, name: String },

    /// Backward propagation without a matching forward propagation.
    #[error("backward propagation requires a preceding forward propagation of the same input")]
    InvalidState,

    /// The layer size sequence cannot describe a network.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A session setting is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Parse(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Distribution(#[from] rand_distr::NormalError),
}

impl Error {
    pub(crate) fn mismatch<S: Into<String>>(what: S, expected: usize, found: usize) -> Self {
        Error::DimensionMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}
