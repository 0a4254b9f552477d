//! Callback system for training hooks.

use colordim_core::Phase;

use crate::error::Result;

/// Context passed to callbacks containing training state.
#[derive(Debug, Clone)]
pub struct CallbackContext {
    /// Current epoch (0-indexed).
    pub epoch: usize,
    /// Total number of epochs.
    pub n_epochs: usize,
    /// Current batch within the phase (0-indexed).
    pub batch: usize,
    /// Total number of batches in the current phase.
    pub n_batches: usize,
    /// Phase of the current batch.
    pub phase: Phase,
    /// Current learning rate.
    pub lr: f64,
    /// Current training loss.
    pub train_loss: Option<f32>,
    /// Current validation loss.
    pub valid_loss: Option<f32>,
}

impl CallbackContext {
    /// Create a new callback context.
    pub fn new(n_epochs: usize, n_batches: usize) -> Self {
        Self {
            epoch: 0,
            n_epochs,
            batch: 0,
            n_batches,
            phase: Phase::Train,
            lr: 0.0,
            train_loss: None,
            valid_loss: None,
        }
    }

    /// Switch phase and reset the batch position.
    pub fn enter_phase(&mut self, phase: Phase, n_batches: usize) {
        self.phase = phase;
        self.batch = 0;
        self.n_batches = n_batches;
    }
}

/// Trait for training callbacks.
///
/// The training loop calls these in the order
/// `before_fit → {before_epoch → {before_batch → after_batch}* → after_epoch}* → after_fit`,
/// with validation batches inside the epoch and [`CallbackContext::phase`]
/// set to [`Phase::Valid`].
pub trait Callback: Send + Sync {
    /// Called before training starts.
    fn before_fit(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        Ok(())
    }

    /// Called after training completes.
    fn after_fit(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        Ok(())
    }

    /// Called before each epoch.
    fn before_epoch(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        Ok(())
    }

    /// Called after each epoch.
    fn after_epoch(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        Ok(())
    }

    /// Called before each batch, training or validation.
    fn before_batch(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        Ok(())
    }

    /// Called after each batch, training or validation.
    fn after_batch(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        Ok(())
    }

    /// Get the callback name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_context() {
        let ctx = CallbackContext::new(10, 100);
        assert_eq!(ctx.epoch, 0);
        assert_eq!(ctx.n_epochs, 10);
        assert_eq!(ctx.phase, Phase::Train);
        assert_eq!(ctx.train_loss, None);
        assert_eq!(ctx.valid_loss, None);
    }

    #[test]
    fn test_enter_phase() {
        let mut ctx = CallbackContext::new(2, 8);
        ctx.batch = 7;
        ctx.enter_phase(Phase::Valid, 3);
        assert_eq!(ctx.phase, Phase::Valid);
        assert_eq!(ctx.batch, 0);
        assert_eq!(ctx.n_batches, 3);
    }
}
