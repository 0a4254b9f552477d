//! Demo MLP that reports its layer outputs to a [`ForwardObserver`].

use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use colordim_core::Result;
use colordim_hooks::{ForwardObserver, LayerInfo, LayerTree};

/// Layer index of the classifier head.
const HEAD_INDEX: usize = 4;

/// Configuration for [`Mlp`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Number of input features.
    pub d_input: usize,
    /// Width of both hidden layers.
    pub d_hidden: usize,
    /// Number of output classes.
    pub n_classes: usize,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            d_input: 8,
            d_hidden: 32,
            n_classes: 3,
        }
    }
}

impl MlpConfig {
    /// Create a new config.
    pub fn new(d_input: usize, n_classes: usize) -> Self {
        Self {
            d_input,
            n_classes,
            ..Default::default()
        }
    }

    /// Set the hidden width.
    #[must_use]
    pub fn with_d_hidden(mut self, d_hidden: usize) -> Self {
        self.d_hidden = d_hidden;
        self
    }

    /// Width of axis 1 of the output of the layer at `index`.
    pub fn output_width(&self, index: usize) -> usize {
        if index == HEAD_INDEX {
            self.n_classes
        } else {
            self.d_hidden
        }
    }

    /// Initialize the model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        Mlp {
            fc1: LinearConfig::new(self.d_input, self.d_hidden).init(device),
            act1: Relu::new(),
            fc2: LinearConfig::new(self.d_hidden, self.d_hidden).init(device),
            act2: Relu::new(),
            head: LinearConfig::new(self.d_hidden, self.n_classes).init(device),
        }
    }
}

/// `Linear → ReLU → Linear → ReLU → Linear` classifier.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    fc1: Linear<B>,
    act1: Relu,
    fc2: Linear<B>,
    act2: Relu,
    head: Linear<B>,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass reporting every layer output to `observer`.
    pub fn forward_observed<O: ForwardObserver<B>>(
        &self,
        x: Tensor<B, 2>,
        observer: &mut O,
    ) -> Result<Tensor<B, 2>> {
        let x = self.fc1.forward(x);
        observer.observe(0, Some(&x))?;
        let x = self.act1.forward(x);
        observer.observe(1, Some(&x))?;
        let x = self.fc2.forward(x);
        observer.observe(2, Some(&x))?;
        let x = self.act2.forward(x);
        observer.observe(3, Some(&x))?;
        let x = self.head.forward(x);
        observer.observe(HEAD_INDEX, Some(&x))?;
        Ok(x)
    }
}

fn describe_linear<B: Backend>(index: usize, name: &str, linear: &Linear<B>) -> LayerInfo {
    let [d_input, d_output] = linear.weight.dims();
    LayerInfo::new(index, name).with_description(format!(
        "Linear(d_input={}, d_output={}, bias={})",
        d_input,
        d_output,
        linear.bias.is_some()
    ))
}

impl<B: Backend> LayerTree for Mlp<B> {
    fn layers(&self) -> Vec<LayerInfo> {
        vec![
            describe_linear(0, "fc1", &self.fc1),
            LayerInfo::new(1, "act1").with_description("Relu"),
            describe_linear(2, "fc2", &self.fc2),
            LayerInfo::new(3, "act2").with_description("Relu"),
            describe_linear(HEAD_INDEX, "head", &self.head),
        ]
    }
}
