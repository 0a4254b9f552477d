//! Panel data model: everything one chart panel draws, without the drawing.

use ndarray::{s, Array2, ArrayView1, ArrayView3, Axis};
use plotters::style::RGBColor;

use colordim_core::HistogramConfig;
use colordim_hooks::LayerInfo;
use colordim_train::{class_mean, windowed_mean, ActivationsHistogram, EpochBoundaries};

use crate::colormap::{gray, rainbow};
use crate::error::{Result, VizError};
use crate::options::PlotOptions;

/// A polyline drawn over the histogram image, in `(batch, bin)` coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Curve points.
    pub points: Vec<(f32, f32)>,
    /// Line color.
    pub color: RGBColor,
    /// Stroke width in pixels.
    pub width: u32,
    /// Legend label.
    pub label: Option<String>,
}

/// One layer's panel.
#[derive(Debug, Clone)]
pub struct Panel {
    /// Layer shown in the panel.
    pub layer: LayerInfo,
    /// First observed output shape of the layer.
    pub out_shape: Option<Vec<usize>>,
    /// Natural log of the class-summed counts, shaped `[bin, batch]`.
    /// Empty cells are `-inf`.
    pub image: Array2<f32>,
    /// Batch positions of the epoch markers.
    pub epoch_markers: Vec<f32>,
    /// Bin-space position of the value 0.
    pub zero_position: f32,
    /// Per-epoch mean curves.
    pub overlays: Vec<Overlay>,
}

impl Panel {
    /// Build a panel from one layer's `[batch, bin, class]` history.
    pub fn new(
        layer: LayerInfo,
        out_shape: Option<Vec<usize>>,
        history: ArrayView3<'_, f32>,
        epochs: &EpochBoundaries,
        config: &HistogramConfig,
        options: &PlotOptions,
    ) -> Self {
        let mut epoch_markers = Vec::new();
        let mut overlays = Vec::new();

        if options.show_epochs {
            let n_batches = history.len_of(Axis(0));
            let n_epochs = epochs.len();
            for (epoch, (start, end)) in epochs.windows().enumerate() {
                if epoch + 1 < n_epochs {
                    epoch_markers.push(end as f32);
                }
                let end = end.min(n_batches);
                let domain = history.slice(s![start.min(end)..end, .., ..]);
                overlays.extend(epoch_overlays(
                    domain,
                    start as f32,
                    options.h_scale,
                    config.per_class,
                    epoch == 0,
                ));
            }
        }

        Self {
            layer,
            out_shape,
            image: log_image(history),
            epoch_markers,
            zero_position: config.zero_position(),
            overlays,
        }
    }

    /// Number of bins (image rows).
    pub fn n_bins(&self) -> usize {
        self.image.nrows()
    }

    /// Number of batches (image columns).
    pub fn n_batches(&self) -> usize {
        self.image.ncols()
    }

    /// Smallest and largest finite log count, if any cell is non-empty.
    pub fn log_range(&self) -> Option<(f32, f32)> {
        self.image
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Panel title: `L:<index> <name>`, with the output shape and the layer
    /// description when `show_layer_info` is set.
    pub fn title(&self, show_layer_info: bool) -> String {
        let mut title = format!("L:{} {}", self.layer.index, self.layer.name);
        if show_layer_info {
            if let Some(shape) = &self.out_shape {
                title.push_str(&format!("  (out: {:?})", shape));
            }
            if self.layer.description != self.layer.name {
                title.push_str(&format!(" {}", self.layer.description));
            }
        }
        title
    }
}

/// Collapse the class axis and take the log: `[batch, bin, class] → [bin, batch]`.
pub fn log_image(history: ArrayView3<'_, f32>) -> Array2<f32> {
    history.sum_axis(Axis(2)).reversed_axes().mapv(f32::ln)
}

/// Mean curves of one epoch window.
///
/// Per class: one rainbow curve per class over the whole window. Otherwise a
/// gray curve over the last half of the window. Always: a black, thicker
/// class-mean curve over the whole window.
fn epoch_overlays(
    domain: ArrayView3<'_, f32>,
    shift: f32,
    h_scale: f32,
    per_class: bool,
    with_labels: bool,
) -> Vec<Overlay> {
    let mut overlays = Vec::new();
    let Some(full) = windowed_mean(domain, 1.0) else {
        tracing::warn!("Empty epoch window at batch {}, skipping its curves", shift);
        return overlays;
    };

    if per_class {
        let n_classes = full.ncols();
        for (class, counts) in full.axis_iter(Axis(1)).enumerate() {
            overlays.push(Overlay {
                points: curve_points(counts, shift, h_scale),
                color: rainbow(class as f64 / n_classes as f64),
                width: 1,
                label: with_labels.then(|| class.to_string()),
            });
        }
    } else if let Some(half) = windowed_mean(domain, 0.5) {
        overlays.push(Overlay {
            points: curve_points(class_mean(&half).view(), shift, h_scale),
            color: gray(0.5),
            width: 1,
            label: None,
        });
    }

    overlays.push(Overlay {
        points: curve_points(class_mean(&full).view(), shift, h_scale),
        color: gray(0.0),
        width: 2,
        label: None,
    });
    overlays
}

fn curve_points(counts: ArrayView1<'_, f32>, shift: f32, h_scale: f32) -> Vec<(f32, f32)> {
    counts
        .iter()
        .enumerate()
        .map(|(bin, &count)| (shift + count * h_scale, bin as f32 + 0.5))
        .collect()
}

/// Every panel of a chart plus the shared axis labels.
#[derive(Debug, Clone)]
pub struct HistogramChart {
    /// Panels in display order.
    pub panels: Vec<Panel>,
    /// Lower bound of the histogram range.
    pub lower: f32,
    /// Upper bound of the histogram range.
    pub upper: f32,
    /// Layout options.
    pub options: PlotOptions,
}

impl HistogramChart {
    /// Build the chart of the training history held by `recorder`.
    ///
    /// # Errors
    ///
    /// Returns [`VizError::NoHistory`] before the first recorded batch and
    /// [`VizError::InvalidLayer`] for a position outside the monitored layers.
    pub fn from_recorder(recorder: &ActivationsHistogram, options: PlotOptions) -> Result<Self> {
        let history = recorder.train_history();
        let n_layers = history.n_layers().ok_or(VizError::NoHistory)?;
        let positions = options
            .layers
            .clone()
            .unwrap_or_else(|| (0..n_layers).collect());

        let config = recorder.histogram_config();
        let mut panels = Vec::with_capacity(positions.len());
        for position in positions {
            let invalid = || VizError::InvalidLayer { position, n_layers };
            let layer_history = history.layer(position).ok_or_else(invalid)?;
            let layer = recorder.layers().get(position).cloned().ok_or_else(invalid)?;
            let out_shape = recorder.output_shape(&layer).map(<[usize]>::to_vec);
            panels.push(Panel::new(
                layer,
                out_shape,
                layer_history,
                recorder.train_epochs(),
                config,
                &options,
            ));
        }

        tracing::debug!(
            "Built {} panels over {} batches",
            panels.len(),
            history.n_batches()
        );
        Ok(Self {
            panels,
            lower: config.lower,
            upper: config.upper,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn config(per_class: bool) -> HistogramConfig {
        HistogramConfig::new(-1.0, 1.0, 4).unwrap().with_per_class(per_class)
    }

    fn epochs(ends: &[usize]) -> EpochBoundaries {
        let mut epochs = EpochBoundaries::new();
        for &end in ends {
            epochs.push(end);
        }
        epochs
    }

    /// `[batch, bin, class]` with `batch + 1` counts in bin 2 of every class.
    fn history(batches: usize, classes: usize) -> Array3<f32> {
        Array3::from_shape_fn((batches, 4, classes), |(b, bin, _)| {
            if bin == 2 {
                (b + 1) as f32
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_log_image() {
        let image = log_image(history(3, 2).view());
        assert_eq!(image.shape(), &[4, 3]);
        assert_eq!(image[[2, 0]], 2.0f32.ln());
        assert_eq!(image[[2, 2]], 6.0f32.ln());
        assert_eq!(image[[0, 1]], f32::NEG_INFINITY);
    }

    #[test]
    fn test_markers_and_overlays() {
        let h = history(6, 1);
        let panel = Panel::new(
            LayerInfo::new(0, "fc1"),
            None,
            h.view(),
            &epochs(&[3, 6]),
            &config(false),
            &PlotOptions::default(),
        );

        assert_eq!(panel.epoch_markers, vec![3.0]);
        assert_eq!(panel.zero_position, 2.0);
        // Gray half-window and black full-window curve per epoch.
        assert_eq!(panel.overlays.len(), 4);
        assert!(panel.overlays.iter().all(|o| o.label.is_none()));

        let full_second = &panel.overlays[3];
        assert_eq!(full_second.width, 2);
        assert_eq!(full_second.points.len(), 4);
        // Batches 3..6 average 5 counts in bin 2, shifted by the window start.
        assert_eq!(full_second.points[2], (3.0 + 5.0 * 0.05, 2.5));
        assert_eq!(full_second.points[0], (3.0, 0.5));
    }

    #[test]
    fn test_per_class_overlays() {
        let h = history(2, 3);
        let panel = Panel::new(
            LayerInfo::new(4, "head"),
            Some(vec![8, 3]),
            h.view(),
            &epochs(&[2]),
            &config(true),
            &PlotOptions::default().with_h_scale(1.0),
        );

        assert!(panel.epoch_markers.is_empty());
        assert_eq!(panel.overlays.len(), 4);
        let labels: Vec<_> = panel.overlays.iter().filter_map(|o| o.label.clone()).collect();
        assert_eq!(labels, vec!["0", "1", "2"]);
        assert_eq!(panel.overlays[0].color, rainbow(0.0));
        assert_eq!(panel.overlays[0].points[2], (1.5, 2.5));
    }

    #[test]
    fn test_epochs_hidden() {
        let h = history(4, 1);
        let panel = Panel::new(
            LayerInfo::new(0, "fc1"),
            None,
            h.view(),
            &epochs(&[2, 4]),
            &config(false),
            &PlotOptions::default().with_show_epochs(false),
        );
        assert!(panel.epoch_markers.is_empty());
        assert!(panel.overlays.is_empty());
        assert_eq!(panel.n_batches(), 4);
        assert_eq!(panel.n_bins(), 4);
    }

    #[test]
    fn test_log_range() {
        let h = history(2, 1);
        let panel = Panel::new(
            LayerInfo::new(0, "fc1"),
            None,
            h.view(),
            &EpochBoundaries::new(),
            &config(false),
            &PlotOptions::default(),
        );
        assert_eq!(panel.log_range(), Some((0.0, 2.0f32.ln())));

        let empty = Array3::<f32>::zeros((2, 4, 1));
        let panel = Panel::new(
            LayerInfo::new(0, "fc1"),
            None,
            empty.view(),
            &EpochBoundaries::new(),
            &config(false),
            &PlotOptions::default(),
        );
        assert_eq!(panel.log_range(), None);
    }

    #[test]
    fn test_title() {
        let h = history(1, 1);
        let layer = LayerInfo::new(2, "fc2").with_description("Linear(d_input=32, d_output=16)");
        let panel = Panel::new(
            layer,
            Some(vec![64, 16]),
            h.view(),
            &EpochBoundaries::new(),
            &config(false),
            &PlotOptions::default(),
        );
        assert_eq!(panel.title(false), "L:2 fc2");
        assert_eq!(
            panel.title(true),
            "L:2 fc2  (out: [64, 16]) Linear(d_input=32, d_output=16)"
        );
    }
}
