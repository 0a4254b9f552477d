//! # colordim_core
//!
//! Core types for colordim activation histograms.
//!
//! This crate provides:
//! - [`HistogramConfig`] for the fixed histogram range of a training run
//! - [`Phase`] to tell training batches from validation batches
//! - [`Activation`], a detached host copy of a layer output
//! - Error types and common utilities
//!
//! ## Example
//!
//! ```rust
//! use colordim_core::{HistogramConfig, Phase};
//!
//! let config = HistogramConfig::new(-1.0, 1.0, 100).unwrap();
//! assert!(Phase::Train.is_train());
//! assert_eq!(config.bin_starts().len(), 100);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod activation;
mod config;
mod error;
mod phase;

pub use activation::Activation;
pub use config::HistogramConfig;
pub use error::{CoreError, Result};
pub use phase::Phase;

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;
}
