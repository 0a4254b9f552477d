//! # colordim
//!
//! Per-layer activation histograms for burn training loops.
//!
//! For every batch, colordim bins the output of each monitored layer into a
//! fixed-range histogram, accumulates the histograms per phase into a
//! `[layer, batch, bin, class]` history, marks epoch boundaries, and draws
//! the result as one log-scaled "colorful dimension" image per layer.
//!
//! - **Core**: histogram configuration, phases, host copies of activations
//! - **Hooks**: layer introspection and forward-pass observers
//! - **Train**: the [`ActivationsHistogram`](prelude::ActivationsHistogram) callback, accumulation, live summaries
//! - **Viz**: post-training SVG/PNG charts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use colordim::prelude::*;
//!
//! let config = ActivationsHistogramConfig::new(HistogramConfig::symmetric(3.0, 100)?);
//! let mut recorder = ActivationsHistogram::new(&model, config)?;
//! let mut ctx = CallbackContext::new(n_epochs, n_batches);
//!
//! recorder.before_fit(&mut ctx)?;
//! for epoch in 0..n_epochs {
//!     recorder.before_epoch(&mut ctx)?;
//!     for (x, y) in train_batches() {
//!         recorder.before_batch(&mut ctx)?;
//!         let logits = model.forward_observed(x, &mut recorder)?;
//!         // loss, backward, step
//!         recorder.after_batch(&mut ctx)?;
//!     }
//!     recorder.after_epoch(&mut ctx)?;
//! }
//! recorder.after_fit(&mut ctx)?;
//!
//! let chart = HistogramChart::from_recorder(&recorder, PlotOptions::default())?;
//! save(&chart, "activations.svg")?;
//! ```
//!
//! ## Feature Flags
//!
//! - `backend-ndarray` (default): re-export the CPU backend as `colordim::core::backend::NdArray`

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use colordim_core as core;
pub use colordim_hooks as hooks;
pub use colordim_train as train;
pub use colordim_viz as viz;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use colordim::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use colordim_core::{Activation, CoreError, HistogramConfig, Phase};

    // Hooks
    pub use colordim_hooks::{ForwardObserver, Hook, Hooks, LayerInfo, LayerSelection, LayerTree};

    // Recording
    pub use colordim_train::{
        ActivationsHistogram, ActivationsHistogramConfig, AsciiLiveChart, Callback,
        CallbackContext, ChannelLiveChart, Curve, EpochBoundaries, LiveChart, PhaseHistory,
        RunState, TrainError, ValidWindow,
    };

    // Charts
    pub use colordim_viz::{save, HistogramChart, PlotOptions, VizError};
}
