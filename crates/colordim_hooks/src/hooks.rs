//! Forward-pass hooks over monitored layers.

use std::collections::HashMap;
use std::fmt;

use burn::prelude::*;

use colordim_core::{Activation, Result};

use crate::layer::LayerInfo;

/// Receives layer outputs while a model runs its forward pass.
///
/// Models call [`observe`](ForwardObserver::observe) once per flattened layer,
/// in the order reported by [`LayerTree::layers`](crate::LayerTree::layers).
/// A layer whose output is not a tensor passes `None`.
pub trait ForwardObserver<B: Backend> {
    /// Observe the output of the layer at `index`.
    fn observe<const D: usize>(
        &mut self,
        index: usize,
        output: Option<&Tensor<B, D>>,
    ) -> Result<()>;

    /// Report that the layer at `index` ran without a tensor output.
    fn observe_none(&mut self, index: usize) -> Result<()> {
        self.observe::<1>(index, None)
    }
}

impl<B: Backend, O: ForwardObserver<B>> ForwardObserver<B> for &mut O {
    fn observe<const D: usize>(
        &mut self,
        index: usize,
        output: Option<&Tensor<B, D>>,
    ) -> Result<()> {
        (**self).observe(index, output)
    }
}

/// Function run on the output of every monitored layer.
pub trait Hook {
    /// Value stored per layer per forward pass.
    type Output;

    /// Compute the stored value from a host copy of the layer output.
    fn hook(&mut self, layer: &LayerInfo, output: &Activation) -> Result<Self::Output>;
}

/// A [`Hook`] registered on a fixed set of layers.
///
/// Results are stored per monitored layer, in selection order, until taken
/// with [`take_stored`](Hooks::take_stored). Outputs of unmonitored layers are
/// never copied to host memory.
pub struct Hooks<H: Hook> {
    hook: H,
    layers: Vec<LayerInfo>,
    slots: HashMap<usize, usize>,
    stored: Vec<Option<H::Output>>,
    attached: bool,
    remove_on_end: bool,
}

impl<H: Hook> Hooks<H> {
    /// Register `hook` on `layers`. Hooks start detached.
    pub fn new(hook: H, layers: Vec<LayerInfo>, remove_on_end: bool) -> Self {
        let slots = layers
            .iter()
            .enumerate()
            .map(|(slot, layer)| (layer.index, slot))
            .collect();
        let stored = layers.iter().map(|_| None).collect();
        Self {
            hook,
            layers,
            slots,
            stored,
            attached: false,
            remove_on_end,
        }
    }

    /// Start receiving layer outputs.
    pub fn attach(&mut self) {
        if !self.attached {
            tracing::debug!("Attaching hooks to {} layers", self.layers.len());
        }
        self.attached = true;
    }

    /// Stop receiving layer outputs. Stored results are kept.
    pub fn remove(&mut self) {
        if self.attached {
            tracing::debug!("Removing hooks from {} layers", self.layers.len());
        }
        self.attached = false;
    }

    /// Whether hooks currently receive layer outputs.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether hooks should be removed when training ends.
    pub fn remove_on_end(&self) -> bool {
        self.remove_on_end
    }

    /// Monitored layers in selection order.
    pub fn layers(&self) -> &[LayerInfo] {
        &self.layers
    }

    /// The registered hook.
    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Mutable access to the registered hook.
    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Results of the current forward pass, one slot per monitored layer.
    pub fn stored(&self) -> &[Option<H::Output>] {
        &self.stored
    }

    /// Take the stored results, leaving every slot empty.
    pub fn take_stored(&mut self) -> Vec<Option<H::Output>> {
        let empty = self.layers.iter().map(|_| None).collect();
        std::mem::replace(&mut self.stored, empty)
    }

    /// Drop all stored results.
    pub fn clear(&mut self) {
        self.stored.iter_mut().for_each(|slot| *slot = None);
    }
}

impl<B: Backend, H: Hook> ForwardObserver<B> for Hooks<H> {
    fn observe<const D: usize>(
        &mut self,
        index: usize,
        output: Option<&Tensor<B, D>>,
    ) -> Result<()> {
        if !self.attached {
            return Ok(());
        }
        let Some(&slot) = self.slots.get(&index) else {
            return Ok(());
        };
        let Some(tensor) = output else {
            tracing::trace!("Layer {} produced no tensor output", index);
            return Ok(());
        };

        let activation = Activation::from_tensor(tensor)?;
        let value = self.hook.hook(&self.layers[slot], &activation)?;
        self.stored[slot] = Some(value);
        Ok(())
    }
}

impl<H: Hook> fmt::Debug for Hooks<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("layers", &self.layers)
            .field("attached", &self.attached)
            .field("remove_on_end", &self.remove_on_end)
            .field(
                "stored",
                &self.stored.iter().filter(|slot| slot.is_some()).count(),
            )
            .finish()
    }
}
