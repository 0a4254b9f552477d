//! Chart layout options.

use serde::{Deserialize, Serialize};

/// Options for the post-training activation histogram chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Maximum number of panels per row.
    pub cols: usize,
    /// Image size in pixels `(width, height)`.
    pub size: (u32, u32),
    /// Positions in the monitored layer list to draw; all when `None`.
    pub layers: Option<Vec<usize>>,
    /// Horizontal scale applied to mean counts in the overlay curves.
    pub h_scale: f32,
    /// Draw epoch markers and per-epoch mean curves.
    pub show_epochs: bool,
    /// Add the layer description and output shape to panel titles.
    pub show_layer_info: bool,
    /// Stretch each histogram to fill its panel instead of keeping square cells.
    pub aspect_auto: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            cols: 3,
            size: (1600, 800),
            layers: None,
            h_scale: 0.05,
            show_epochs: true,
            show_layer_info: false,
            aspect_auto: true,
        }
    }
}

impl PlotOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of panels per row.
    #[must_use]
    pub fn with_cols(mut self, cols: usize) -> Self {
        self.cols = cols.max(1);
        self
    }

    /// Set the image size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Draw only the given positions of the monitored layer list.
    #[must_use]
    pub fn with_layers(mut self, layers: Vec<usize>) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Set the overlay curve scale.
    #[must_use]
    pub fn with_h_scale(mut self, h_scale: f32) -> Self {
        self.h_scale = h_scale;
        self
    }

    /// Enable or disable epoch markers and curves.
    #[must_use]
    pub fn with_show_epochs(mut self, show_epochs: bool) -> Self {
        self.show_epochs = show_epochs;
        self
    }

    /// Enable or disable layer details in panel titles.
    #[must_use]
    pub fn with_show_layer_info(mut self, show_layer_info: bool) -> Self {
        self.show_layer_info = show_layer_info;
        self
    }

    /// Enable or disable stretching histograms to their panels.
    #[must_use]
    pub fn with_aspect_auto(mut self, aspect_auto: bool) -> Self {
        self.aspect_auto = aspect_auto;
        self
    }

    /// Grid `(rows, cols)` for `n` panels.
    pub fn grid(&self, n: usize) -> (usize, usize) {
        if n == 0 {
            return (0, 0);
        }
        let cols = self.cols.clamp(1, n);
        (n.div_ceil(cols), cols)
    }
}
