//! Error types for histogram recording.

use thiserror::Error;

/// Result type alias for recording operations.
pub type Result<T> = std::result::Result<T, TrainError>;

/// Errors that can occur while recording activation histograms.
#[derive(Error, Debug)]
pub enum TrainError {
    /// A batch does not fit the shape of the accumulated history.
    #[error("Histogram shape mismatch: expected [layers, bins, classes] = {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Shape `[layers, bins, classes]` established by earlier batches.
        expected: Vec<usize>,
        /// Shape of the offending batch.
        got: Vec<usize>,
    },

    /// A lifecycle event arrived out of order.
    #[error("Lifecycle error: {event} is not valid while {state}")]
    Lifecycle {
        /// Event that was received.
        event: &'static str,
        /// State the recorder was in.
        state: String,
    },

    /// Callback error.
    #[error("Callback error: {0}")]
    CallbackError(String),

    /// Core error.
    #[error("Core error: {0}")]
    CoreError(#[from] colordim_core::CoreError),
}
