//! Windowed means over histogram history, shared by the live chart and the
//! offline renderer.

use ndarray::{s, Array1, Array2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use colordim_core::Phase;

/// Mean histogram over the most recent `fraction` of a `[batch, bin, class]` window.
///
/// `fraction = 0.25` averages the last quarter of the batches, `1.0` all of
/// them. The window always keeps at least one batch. Returns `None` for an
/// empty window.
pub fn windowed_mean(window: ArrayView3<'_, f32>, fraction: f32) -> Option<Array2<f32>> {
    let n = window.len_of(Axis(0));
    if n == 0 {
        return None;
    }
    let fraction = fraction.clamp(0.0, 1.0);
    let start = ((n as f32 * (1.0 - fraction)) as usize).min(n - 1);
    window.slice(s![start.., .., ..]).mean_axis(Axis(0))
}

/// Collapse the class axis by summing: `[bin, class] → [bin]`.
pub fn class_sum(mean: &Array2<f32>) -> Array1<f32> {
    mean.sum_axis(Axis(1))
}

/// Collapse the class axis by averaging: `[bin, class] → [bin]`.
pub fn class_mean(mean: &Array2<f32>) -> Array1<f32> {
    mean.mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::zeros(mean.len_of(Axis(0))))
}

/// One curve for the live chart: mean count (`x`) against bin position (`y`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Phase the curve was computed from.
    pub phase: Phase,
    /// Mean counts per bin, shifted by the window start.
    pub x: Vec<f32>,
    /// Bin positions (value space).
    pub y: Vec<f32>,
}

impl Curve {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Build a class-summed curve from a window of one layer's history.
///
/// `shift` is added to every mean count so windows from later epochs are
/// drawn further right; `y` is the bin axis the counts are paired with.
pub fn summarize_window(
    phase: Phase,
    window: ArrayView3<'_, f32>,
    fraction: f32,
    shift: f32,
    y: &[f32],
) -> Option<Curve> {
    let mean = windowed_mean(window, fraction)?;
    let x = class_sum(&mean).iter().map(|&count| shift + count).collect();
    Some(Curve {
        phase,
        x,
        y: y.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// `[batch, bin, class]` where batch `b` has value `b` everywhere.
    fn ramp(batches: usize, bins: usize, classes: usize) -> Array3<f32> {
        Array3::from_shape_fn((batches, bins, classes), |(b, _, _)| b as f32)
    }

    #[test]
    fn test_windowed_mean_last_quarter() {
        let history = ramp(8, 3, 1);
        let mean = windowed_mean(history.view(), 0.25).unwrap();
        // Last two batches: 6 and 7.
        assert_eq!(mean.shape(), &[3, 1]);
        assert_eq!(mean[[0, 0]], 6.5);
    }

    #[test]
    fn test_windowed_mean_full_and_small_windows() {
        let history = ramp(4, 2, 1);
        assert_eq!(windowed_mean(history.view(), 1.0).unwrap()[[0, 0]], 1.5);

        // Three batches, quarter window: start = floor(2.25) = 2.
        let history = ramp(3, 2, 1);
        assert_eq!(windowed_mean(history.view(), 0.25).unwrap()[[1, 0]], 2.0);

        // A zero fraction still keeps the last batch.
        assert_eq!(windowed_mean(history.view(), 0.0).unwrap()[[1, 0]], 2.0);
    }

    #[test]
    fn test_windowed_mean_empty() {
        let history = ramp(0, 2, 1);
        assert!(windowed_mean(history.view(), 0.25).is_none());
    }

    #[test]
    fn test_class_reductions() {
        let mean = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(class_sum(&mean).to_vec(), vec![6.0, 15.0]);
        assert_eq!(class_mean(&mean).to_vec(), vec![2.0, 5.0]);
    }

    #[test]
    fn test_summarize_window_shift() {
        let history = ramp(2, 2, 3);
        let curve =
            summarize_window(Phase::Train, history.view(), 1.0, 10.0, &[-1.0, 0.0]).unwrap();
        // Mean of batches 0 and 1 is 0.5 per class, three classes summed.
        assert_eq!(curve.x, vec![11.5, 11.5]);
        assert_eq!(curve.y, vec![-1.0, 0.0]);
        assert_eq!(curve.len(), 2);
    }
}
