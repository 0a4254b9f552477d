//! Per-phase accumulation of batch histograms.

use ndarray::{s, stack, Array3, Array4, ArrayView2, ArrayView3, Axis};

use crate::error::{Result, TrainError};
use crate::histogram::BatchHistogram;

/// Stack the per-layer histograms of one batch into `[layer, bin, class]`.
///
/// Returns `Ok(None)` when no layer produced a histogram. A layer without a
/// histogram in a batch where others have one gets zero counts, so the layer
/// axis keeps lining up with the monitored layers.
///
/// # Errors
///
/// Returns [`TrainError::ShapeMismatch`] if the histograms do not share one
/// `[bin, class]` shape.
pub fn stack_batch(entries: &[Option<BatchHistogram>]) -> Result<Option<Array3<f32>>> {
    let Some(template) = entries.iter().flatten().next() else {
        return Ok(None);
    };
    let shape = template.raw_dim();

    let zeros = BatchHistogram::zeros(shape);
    let mut views: Vec<ArrayView2<'_, f32>> = Vec::with_capacity(entries.len());
    for (layer, entry) in entries.iter().enumerate() {
        match entry {
            Some(hist) if hist.raw_dim() == shape => views.push(hist.view()),
            Some(hist) => {
                return Err(TrainError::ShapeMismatch {
                    expected: vec![entries.len(), shape[0], shape[1]],
                    got: vec![entries.len(), hist.shape()[0], hist.shape()[1]],
                })
            }
            None => {
                tracing::trace!("Layer slot {} has no histogram this batch", layer);
                views.push(zeros.view());
            }
        }
    }

    stack(Axis(0), &views)
        .map(Some)
        .map_err(|e| TrainError::CallbackError(format!("failed to stack histograms: {}", e)))
}

/// Growing `[layer, batch, bin, class]` history of one phase.
///
/// The batch axis grows by one for every pushed batch. The layer, bin and
/// class axes are fixed by the first batch.
#[derive(Debug, Clone, Default)]
pub struct PhaseHistory {
    data: Option<Array4<f32>>,
}

impl PhaseHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one stacked batch (`[layer, bin, class]`) along the batch axis.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::ShapeMismatch`] if the batch does not match the
    /// layer, bin and class counts of earlier batches.
    pub fn push(&mut self, batch: Array3<f32>) -> Result<()> {
        let batch = batch.insert_axis(Axis(1));
        if let Some(data) = self.data.as_mut() {
            let expected = [data.shape()[0], data.shape()[2], data.shape()[3]];
            let got = [batch.shape()[0], batch.shape()[2], batch.shape()[3]];
            if expected != got {
                return Err(TrainError::ShapeMismatch {
                    expected: expected.to_vec(),
                    got: got.to_vec(),
                });
            }
            return data
                .append(Axis(1), batch.view())
                .map_err(|e| TrainError::CallbackError(format!("failed to append batch: {}", e)));
        }

        self.data = Some(batch);
        Ok(())
    }

    /// Number of recorded batches.
    pub fn n_batches(&self) -> usize {
        self.data.as_ref().map_or(0, |data| data.len_of(Axis(1)))
    }

    /// Number of layers, once the first batch has been recorded.
    pub fn n_layers(&self) -> Option<usize> {
        self.data.as_ref().map(|data| data.len_of(Axis(0)))
    }

    /// Whether no batch has been recorded.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// The full `[layer, batch, bin, class]` tensor.
    pub fn as_array(&self) -> Option<&Array4<f32>> {
        self.data.as_ref()
    }

    /// History of one layer, shaped `[batch, bin, class]`.
    pub fn layer(&self, layer: usize) -> Option<ArrayView3<'_, f32>> {
        let data = self.data.as_ref()?;
        (layer < data.len_of(Axis(0))).then(|| data.index_axis(Axis(0), layer))
    }

    /// History of the last layer.
    pub fn last_layer(&self) -> Option<ArrayView3<'_, f32>> {
        let n_layers = self.n_layers()?;
        self.layer(n_layers.checked_sub(1)?)
    }

    /// Batches `[start, end)` of one layer, clamped to the recorded range.
    pub fn window(&self, layer: usize, start: usize, end: usize) -> Option<ArrayView3<'_, f32>> {
        let history = self.layer(layer)?;
        let n = history.len_of(Axis(0));
        let end = end.min(n);
        let start = start.min(end);
        Some(history.slice_move(s![start..end, .., ..]))
    }

    /// Drop all recorded batches.
    pub fn clear(&mut self) {
        self.data = None;
    }
}
