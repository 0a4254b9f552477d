//! Error types for chart rendering.

use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, VizError>;

/// Errors that can occur while building or drawing charts.
#[derive(Error, Debug)]
pub enum VizError {
    /// Nothing has been recorded yet.
    #[error("No training history recorded")]
    NoHistory,

    /// A requested panel does not exist.
    #[error("Invalid layer position {position}: {n_layers} layers were monitored")]
    InvalidLayer {
        /// Requested position in the monitored layer list.
        position: usize,
        /// Number of monitored layers.
        n_layers: usize,
    },

    /// Output format not recognised from the file extension.
    #[error("Unsupported output format: {0} (expected .svg or .png)")]
    UnsupportedFormat(String),

    /// Plotting backend error.
    #[error("Render error: {0}")]
    Render(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] colordim_core::CoreError),
}

/// Map a plotting backend error, which is generic over the backend, into
/// [`VizError::Render`].
pub(crate) fn render_err<E: std::fmt::Display>(err: E) -> VizError {
    VizError::Render(err.to_string())
}
