//! Host-side copies of layer activations.

use burn::prelude::*;
use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::error::{CoreError, Result};

/// A detached, host-memory copy of a layer output.
///
/// The training loop reuses activation tensors and keeps them attached to the
/// autodiff graph, so everything downstream works on this copy instead.
/// The leading axis is the batch (samples) axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    values: ArrayD<f32>,
}

impl Activation {
    /// Copy a Burn tensor to host memory, detached from the graph.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TensorData`] if the tensor data cannot be read as `f32`.
    pub fn from_tensor<B: Backend, const D: usize>(tensor: &Tensor<B, D>) -> Result<Self> {
        let data = tensor.clone().detach().into_data().convert::<f32>();
        let shape = data.shape.clone();
        let values: Vec<f32> = data
            .to_vec()
            .map_err(|e| CoreError::TensorData(format!("{:?}", e)))?;
        Self::from_shape_vec(&shape, values)
    }

    /// Build an activation from a flat buffer and a shape.
    pub fn from_shape_vec(shape: &[usize], values: Vec<f32>) -> Result<Self> {
        let values = ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|e| {
            CoreError::InvalidShape {
                expected: format!("{:?}", shape),
                got: e.to_string(),
            }
        })?;
        Ok(Self { values })
    }

    /// Wrap an existing host array.
    #[must_use]
    pub fn from_array(values: ArrayD<f32>) -> Self {
        Self { values }
    }

    /// Shape of the original tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the activation holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// View of the values.
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.values.view()
    }
}
