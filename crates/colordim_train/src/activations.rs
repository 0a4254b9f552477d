//! Callback recording per-layer activation histograms across training.

use std::fmt;

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use colordim_core::{HistogramConfig, Phase};
use colordim_hooks::{ForwardObserver, Hooks, LayerInfo, LayerSelection, LayerTree};

use crate::accumulator::{stack_batch, PhaseHistory};
use crate::callback::{Callback, CallbackContext};
use crate::epochs::EpochBoundaries;
use crate::error::{Result, TrainError};
use crate::histogram::HistogramHook;
use crate::live::LiveChart;
use crate::summary::{summarize_window, Curve};

/// Share of the latest training epoch averaged for the live chart.
const LIVE_TRAIN_FRACTION: f32 = 0.25;

/// Which validation batches feed the live chart's validation curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidWindow {
    /// Every validation batch since training started.
    #[default]
    SinceStart,
    /// Only the validation batches of the latest epoch.
    SinceLastEpoch,
}

/// Configuration for [`ActivationsHistogram`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationsHistogramConfig {
    /// Histogram range and bins.
    pub histogram: HistogramConfig,
    /// Layers to monitor.
    pub layers: LayerSelection,
    /// Push curves to the live chart at every epoch end.
    pub live_chart: bool,
    /// Remove the hooks when training ends.
    pub remove_on_end: bool,
    /// Validation batches used for the live validation curve.
    pub valid_window: ValidWindow,
}

impl Default for ActivationsHistogramConfig {
    fn default() -> Self {
        Self {
            histogram: HistogramConfig::default(),
            layers: LayerSelection::All,
            live_chart: true,
            remove_on_end: true,
            valid_window: ValidWindow::SinceStart,
        }
    }
}

impl ActivationsHistogramConfig {
    /// Create a configuration with the given histogram settings.
    pub fn new(histogram: HistogramConfig) -> Self {
        Self {
            histogram,
            ..Default::default()
        }
    }

    /// Set the layers to monitor.
    #[must_use]
    pub fn with_layers(mut self, layers: LayerSelection) -> Self {
        self.layers = layers;
        self
    }

    /// Enable or disable live chart updates.
    #[must_use]
    pub fn with_live_chart(mut self, live_chart: bool) -> Self {
        self.live_chart = live_chart;
        self
    }

    /// Set whether hooks are removed when training ends.
    #[must_use]
    pub fn with_remove_on_end(mut self, remove_on_end: bool) -> Self {
        self.remove_on_end = remove_on_end;
        self
    }

    /// Set the validation window of the live chart.
    #[must_use]
    pub fn with_valid_window(mut self, valid_window: ValidWindow) -> Self {
        self.valid_window = valid_window;
        self
    }
}

/// Where the recorder is in the training lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, training has not started.
    Idle,
    /// Training started, between epochs.
    Fitting,
    /// Inside an epoch.
    InEpoch,
    /// Training ended; history is final.
    Finished,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Fitting => write!(f, "between epochs"),
            RunState::InEpoch => write!(f, "inside an epoch"),
            RunState::Finished => write!(f, "finished"),
        }
    }
}

/// Callback that records a histogram of the activations of every monitored
/// layer for every batch.
///
/// The training loop drives it twice over: as a [`Callback`] for lifecycle
/// events, and as a [`ForwardObserver`] passed to the model's forward pass so
/// the hooks see each layer output.
///
/// # Example
///
/// ```rust,ignore
/// use colordim_train::{ActivationsHistogram, ActivationsHistogramConfig, Callback, CallbackContext};
///
/// let mut recorder = ActivationsHistogram::new(&model, ActivationsHistogramConfig::default())?;
/// let mut ctx = CallbackContext::new(n_epochs, n_batches);
/// recorder.before_fit(&mut ctx)?;
/// for epoch in 0..n_epochs {
///     recorder.before_epoch(&mut ctx)?;
///     for (x, y) in batches {
///         recorder.before_batch(&mut ctx)?;
///         let logits = model.forward_observed(x, &mut recorder)?;
///         // loss, backward, optimizer step
///         recorder.after_batch(&mut ctx)?;
///     }
///     recorder.after_epoch(&mut ctx)?;
/// }
/// recorder.after_fit(&mut ctx)?;
///
/// let history = recorder.train_history().as_array(); // [layer, batch, bin, class]
/// ```
pub struct ActivationsHistogram {
    config: ActivationsHistogramConfig,
    all_layers: Vec<LayerInfo>,
    hooks: Hooks<HistogramHook>,
    chart: Option<Box<dyn LiveChart>>,
    state: RunState,
    epochs_started: usize,
    train_batches: usize,
    train_history: PhaseHistory,
    valid_history: PhaseHistory,
    train_epochs: EpochBoundaries,
    valid_epochs: EpochBoundaries,
}

impl ActivationsHistogram {
    /// Create a recorder for the layers of `model` selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram configuration is invalid or the
    /// layer selection does not resolve against the model.
    pub fn new<M: LayerTree + ?Sized>(
        model: &M,
        config: ActivationsHistogramConfig,
    ) -> Result<Self> {
        config.histogram.validate()?;
        let all_layers = model.layers();
        let monitored = config.layers.resolve(&all_layers)?;
        let hooks = Hooks::new(
            HistogramHook::new(config.histogram),
            monitored,
            config.remove_on_end,
        );

        Ok(Self {
            config,
            all_layers,
            hooks,
            chart: None,
            state: RunState::Idle,
            epochs_started: 0,
            train_batches: 0,
            train_history: PhaseHistory::new(),
            valid_history: PhaseHistory::new(),
            train_epochs: EpochBoundaries::new(),
            valid_epochs: EpochBoundaries::new(),
        })
    }

    /// Attach a live chart sink.
    #[must_use]
    pub fn with_live_chart<C: LiveChart + 'static>(mut self, chart: C) -> Self {
        self.chart = Some(Box::new(chart));
        self
    }

    /// The recorder configuration.
    pub fn config(&self) -> &ActivationsHistogramConfig {
        &self.config
    }

    /// The histogram configuration.
    pub fn histogram_config(&self) -> &HistogramConfig {
        &self.config.histogram
    }

    /// Every layer of the model, monitored or not.
    pub fn all_layers(&self) -> &[LayerInfo] {
        &self.all_layers
    }

    /// Monitored layers, in history order.
    pub fn layers(&self) -> &[LayerInfo] {
        self.hooks.layers()
    }

    /// Output shape first observed for a monitored layer.
    pub fn output_shape(&self, layer: &LayerInfo) -> Option<&[usize]> {
        self.hooks.hook().shape(layer.index)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Index of the current epoch, `None` before the first one.
    pub fn current_epoch(&self) -> Option<usize> {
        self.epochs_started.checked_sub(1)
    }

    /// Index of the current training batch, `None` before the first one.
    pub fn current_train_batch(&self) -> Option<usize> {
        self.train_batches.checked_sub(1)
    }

    /// Number of training batches started since training began.
    pub fn train_batches_seen(&self) -> usize {
        self.train_batches
    }

    /// Accumulated training history.
    pub fn train_history(&self) -> &PhaseHistory {
        &self.train_history
    }

    /// Accumulated validation history.
    pub fn valid_history(&self) -> &PhaseHistory {
        &self.valid_history
    }

    /// Training epoch boundaries.
    pub fn train_epochs(&self) -> &EpochBoundaries {
        &self.train_epochs
    }

    /// Validation epoch boundaries.
    pub fn valid_epochs(&self) -> &EpochBoundaries {
        &self.valid_epochs
    }

    /// History of a phase.
    pub fn history(&self, phase: Phase) -> &PhaseHistory {
        match phase {
            Phase::Train => &self.train_history,
            Phase::Valid => &self.valid_history,
        }
    }

    /// Whether the hooks currently receive layer outputs.
    pub fn hooks_attached(&self) -> bool {
        self.hooks.is_attached()
    }

    /// Detach the hooks. Recorded history is kept.
    pub fn remove_hooks(&mut self) {
        self.hooks.remove();
    }

    /// Curves for the live chart, computed from the last monitored layer.
    ///
    /// The training curve averages the last quarter of the latest training
    /// epoch; the validation curve averages the whole validation window. Both
    /// collapse the class axis by summing. Does not modify any state.
    pub fn live_summary(&self) -> Vec<Curve> {
        let mut curves = Vec::with_capacity(2);
        let y = self.config.histogram.bin_starts();
        let Some(last_layer) = self.train_history.n_layers().and_then(|n| n.checked_sub(1)) else {
            return curves;
        };

        let end = self.train_epochs.last();
        let start = self.train_epochs.start_before(end);
        if let Some(curve) = self
            .train_history
            .window(last_layer, start, end)
            .and_then(|w| summarize_window(Phase::Train, w, LIVE_TRAIN_FRACTION, start as f32, &y))
        {
            curves.push(curve);
        }

        let valid_end = self.valid_history.n_batches();
        let valid_start = match self.config.valid_window {
            ValidWindow::SinceStart => 0,
            ValidWindow::SinceLastEpoch => self.valid_epochs.start_before(valid_end),
        };
        if let Some(curve) = self
            .valid_history
            .window(last_layer, valid_start, valid_end)
            .and_then(|w| summarize_window(Phase::Valid, w, 1.0, start as f32, &y))
        {
            curves.push(curve);
        }

        curves
    }

    fn expect_state(&self, event: &'static str, allowed: &[RunState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TrainError::Lifecycle {
                event,
                state: self.state.to_string(),
            })
        }
    }

    fn reset(&mut self) {
        self.epochs_started = 0;
        self.train_batches = 0;
        self.train_history.clear();
        self.valid_history.clear();
        self.train_epochs.clear();
        self.valid_epochs.clear();
        self.hooks.clear();
        self.hooks.hook_mut().reset();
    }
}

impl<B: Backend> ForwardObserver<B> for ActivationsHistogram {
    fn observe<const D: usize>(
        &mut self,
        index: usize,
        output: Option<&Tensor<B, D>>,
    ) -> colordim_core::Result<()> {
        self.hooks.observe(index, output)
    }
}

impl Callback for ActivationsHistogram {
    fn before_fit(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        self.expect_state("before_fit", &[RunState::Idle, RunState::Finished])?;
        self.reset();
        self.hooks.attach();
        self.state = RunState::Fitting;

        tracing::info!(
            "Recording activation histograms of {} layers ({} bins over [{}, {}]{})",
            self.hooks.layers().len(),
            self.config.histogram.n_bins,
            self.config.histogram.lower,
            self.config.histogram.upper,
            if self.config.histogram.per_class { ", per class" } else { "" }
        );
        Ok(())
    }

    fn before_epoch(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        self.expect_state("before_epoch", &[RunState::Fitting])?;
        self.epochs_started += 1;
        self.state = RunState::InEpoch;
        Ok(())
    }

    fn before_batch(&mut self, ctx: &mut CallbackContext) -> Result<()> {
        self.expect_state("before_batch", &[RunState::InEpoch])?;
        if ctx.phase.is_train() {
            self.train_batches += 1;
        }
        self.hooks.clear();
        Ok(())
    }

    fn after_batch(&mut self, ctx: &mut CallbackContext) -> Result<()> {
        self.expect_state("after_batch", &[RunState::InEpoch])?;
        let stored = self.hooks.take_stored();
        let Some(stacked) = stack_batch(&stored)? else {
            tracing::trace!("No histograms recorded for {} batch {}", ctx.phase, ctx.batch);
            return Ok(());
        };

        match ctx.phase {
            Phase::Train => self.train_history.push(stacked),
            Phase::Valid => self.valid_history.push(stacked),
        }
    }

    fn after_epoch(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        self.expect_state("after_epoch", &[RunState::InEpoch])?;
        self.state = RunState::Fitting;

        let epoch = self.epochs_started.saturating_sub(1);
        let train_advanced = self.train_epochs.push(self.train_batches);
        if self.valid_epochs.push(self.valid_history.n_batches()) {
            tracing::debug!(
                "Epoch {} ends at validation batch {}",
                epoch,
                self.valid_epochs.last()
            );
        }

        if !train_advanced {
            tracing::warn!(
                "Epoch {} ended without training batches, skipping its summary",
                epoch
            );
            return Ok(());
        }
        tracing::debug!(
            "Epoch {} ends at training batch {} ({} recorded)",
            epoch,
            self.train_batches,
            self.train_history.n_batches()
        );

        if self.config.live_chart && self.chart.is_some() {
            let curves = self.live_summary();
            if let Some(chart) = self.chart.as_mut().filter(|_| !curves.is_empty()) {
                chart.update_graph(&curves);
            }
        }
        Ok(())
    }

    fn after_fit(&mut self, _ctx: &mut CallbackContext) -> Result<()> {
        self.expect_state("after_fit", &[RunState::Fitting, RunState::InEpoch])?;
        if self.hooks.remove_on_end() {
            self.hooks.remove();
        }
        self.state = RunState::Finished;

        tracing::info!(
            "Recorded {} training and {} validation batches over {} epochs",
            self.train_history.n_batches(),
            self.valid_history.n_batches(),
            self.train_epochs.len()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "ActivationsHistogram"
    }
}

impl fmt::Debug for ActivationsHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationsHistogram")
            .field("config", &self.config)
            .field("layers", &self.hooks.layers())
            .field("state", &self.state)
            .field("train_batches", &self.train_history.n_batches())
            .field("valid_batches", &self.valid_history.n_batches())
            .field("train_epochs", &self.train_epochs)
            .finish()
    }
}
