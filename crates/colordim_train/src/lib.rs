//! # colordim_train
//!
//! Activation histogram recording for colordim training runs.
//!
//! This crate provides:
//! - [`ActivationsHistogram`], a callback that bins the output of every
//!   monitored layer for every batch
//! - Per-phase `[layer, batch, bin, class]` accumulation ([`PhaseHistory`])
//! - Epoch boundaries in batch-index space ([`EpochBoundaries`])
//! - Windowed mean summaries for live charts ([`Curve`], [`LiveChart`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use colordim_core::HistogramConfig;
//! use colordim_train::{ActivationsHistogram, ActivationsHistogramConfig, AsciiLiveChart};
//!
//! let config = ActivationsHistogramConfig::new(HistogramConfig::symmetric(3.0, 100)?);
//! let mut recorder = ActivationsHistogram::new(&model, config)?
//!     .with_live_chart(AsciiLiveChart::new());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod activations;
pub mod callback;
pub mod epochs;
pub mod error;
pub mod histogram;
pub mod live;
pub mod summary;

pub use accumulator::{stack_batch, PhaseHistory};
pub use activations::{ActivationsHistogram, ActivationsHistogramConfig, RunState, ValidWindow};
pub use callback::{Callback, CallbackContext};
pub use epochs::EpochBoundaries;
pub use error::{Result, TrainError};
pub use histogram::{histogram, BatchHistogram, HistogramHook};
pub use live::{AsciiLiveChart, ChannelLiveChart, LiveChart};
pub use summary::{class_mean, class_sum, summarize_window, windowed_mean, Curve};
