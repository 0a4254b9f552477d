//! # colordim_hooks
//!
//! Layer introspection and forward-pass hooks for colordim.
//!
//! Burn modules have no hook registry, so instrumentation is inverted: a
//! model exposes its flattened layer list through [`LayerTree`] and reports
//! each layer output to a [`ForwardObserver`] while running `forward`.
//! [`Hooks`] is the observer that runs a [`Hook`] on the monitored layers and
//! collects one result per layer per pass.
//!
//! ```rust,ignore
//! impl<B: Backend> Mlp<B> {
//!     pub fn forward_observed<O: ForwardObserver<B>>(&self, x: Tensor<B, 2>, obs: &mut O) -> Result<Tensor<B, 2>> {
//!         let x = self.fc1.forward(x);
//!         obs.observe(0, Some(&x))?;
//!         let x = self.act.forward(x);
//!         obs.observe(1, Some(&x))?;
//!         Ok(x)
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod hooks;
mod layer;

pub use hooks::{ForwardObserver, Hook, Hooks};
pub use layer::{LayerInfo, LayerSelection, LayerTree};
