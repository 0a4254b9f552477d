//! Fixed-range histograms of layer activations.

use std::collections::HashMap;

use ndarray::{Array2, ArrayViewMut1, Axis};

use colordim_core::{Activation, CoreError, HistogramConfig, Result};
use colordim_hooks::{Hook, LayerInfo};

/// Histogram of one layer for one batch, shaped `[bin, class]`.
///
/// The class axis has length 1 unless per-class histograms are enabled.
pub type BatchHistogram = Array2<f32>;

/// Bin an activation according to `config`.
///
/// Without `per_class` the whole activation is flattened into a single
/// `[n_bins, 1]` histogram. With `per_class` every entry along axis 1 (the
/// class axis of a `[batch, classes]` output) gets its own column, giving
/// `[n_bins, n_classes]`. Out-of-range values are clipped into the boundary
/// bins; NaN values are skipped.
///
/// # Errors
///
/// Returns [`CoreError::InvalidConfig`] if `config` fails
/// [`HistogramConfig::validate`], and [`CoreError::DimensionError`] for a
/// per-class histogram of an activation with fewer than two dimensions.
pub fn histogram(config: &HistogramConfig, activation: &Activation) -> Result<BatchHistogram> {
    config.validate()?;
    let values = activation.view();

    if !config.per_class {
        let mut counts = Array2::zeros((config.n_bins, 1));
        let skipped = bin_into(config, values.iter().copied(), counts.column_mut(0));
        if skipped > 0 {
            tracing::trace!("Skipped {} NaN activations", skipped);
        }
        return Ok(counts);
    }

    if activation.ndim() < 2 {
        return Err(CoreError::DimensionError {
            expected: 2,
            got: activation.ndim(),
        });
    }

    let n_classes = activation.shape()[1];
    let mut counts = Array2::zeros((config.n_bins, n_classes));
    for (class, class_values) in values.axis_iter(Axis(1)).enumerate() {
        bin_into(config, class_values.iter().copied(), counts.column_mut(class));
    }
    Ok(counts)
}

/// Add every value to its bin, returning how many values were skipped.
fn bin_into(
    config: &HistogramConfig,
    values: impl Iterator<Item = f32>,
    mut counts: ArrayViewMut1<'_, f32>,
) -> usize {
    let mut skipped = 0;
    for value in values {
        match config.bin_index(value) {
            Some(bin) => counts[bin] += 1.0,
            None => skipped += 1,
        }
    }
    skipped
}

/// Hook that bins each monitored layer output and remembers its shape.
#[derive(Debug, Clone)]
pub struct HistogramHook {
    config: HistogramConfig,
    shapes: HashMap<usize, Vec<usize>>,
}

impl HistogramHook {
    /// Create a hook for `config`.
    pub fn new(config: HistogramConfig) -> Self {
        Self {
            config,
            shapes: HashMap::new(),
        }
    }

    /// The histogram configuration.
    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// Output shape first observed for the layer at `index`.
    pub fn shape(&self, index: usize) -> Option<&[usize]> {
        self.shapes.get(&index).map(Vec::as_slice)
    }

    /// Forget all recorded shapes.
    pub fn reset(&mut self) {
        self.shapes.clear();
    }
}

impl Hook for HistogramHook {
    type Output = BatchHistogram;

    fn hook(&mut self, layer: &LayerInfo, output: &Activation) -> Result<BatchHistogram> {
        self.shapes
            .entry(layer.index)
            .or_insert_with(|| output.shape().to_vec());
        histogram(&self.config, output)
    }
}
