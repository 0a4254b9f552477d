//! Error types for colordim_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur in colordim_core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid histogram configuration.
    #[error("Invalid histogram config: {0}")]
    InvalidConfig(String),

    /// Invalid tensor shape provided.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        got: String,
    },

    /// Dimension error.
    #[error("Dimension error: expected at least {expected} dimensions, got {got}")]
    DimensionError {
        /// Minimum number of dimensions.
        expected: usize,
        /// Actual number of dimensions.
        got: usize,
    },

    /// A layer index does not exist in the flattened model.
    #[error("Invalid layer index {index}: model has {n_layers} layers")]
    InvalidLayer {
        /// Requested index.
        index: usize,
        /// Number of layers in the flattened model.
        n_layers: usize,
    },

    /// Tensor data could not be copied to host memory.
    #[error("Tensor data error: {0}")]
    TensorData(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}
