//! # colordim_viz
//!
//! Post-training charts of recorded activation histograms.
//!
//! Each monitored layer gets a panel: the log-scaled `[bin, batch]` histogram
//! image with batches along x, a red line at the bin of value 0, blue lines
//! between epochs and per-epoch mean curves on top.
//!
//! ## Example
//!
//! ```rust,ignore
//! use colordim_viz::{save, HistogramChart, PlotOptions};
//!
//! let chart = HistogramChart::from_recorder(&recorder, PlotOptions::default().with_cols(2))?;
//! save(&chart, "activations.svg")?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod colormap;
pub mod error;
pub mod options;
pub mod panel;
pub mod render;

pub use error::{Result, VizError};
pub use options::PlotOptions;
pub use panel::{log_image, HistogramChart, Overlay, Panel};
pub use render::{draw_on, render_png, render_svg, save};
