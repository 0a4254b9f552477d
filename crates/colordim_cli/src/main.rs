//! colordim CLI: train a small model while recording activation histograms,
//! then chart them.

mod data;
mod model;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;

use colordim_core::{HistogramConfig, Phase};
use colordim_hooks::{LayerInfo, LayerSelection, LayerTree};
use colordim_train::{
    ActivationsHistogram, ActivationsHistogramConfig, AsciiLiveChart, Callback, CallbackContext,
};
use colordim_viz::{HistogramChart, PlotOptions};

use crate::data::{centers, Clusters};
use crate::model::{Mlp, MlpConfig};

/// Backend type for training.
type TrainBackend = Autodiff<NdArray>;

/// Input features of the demo data.
const D_INPUT: usize = 8;

#[derive(Parser)]
#[command(name = "colordim")]
#[command(author, version)]
#[command(about = "Record per-layer activation histograms while training and chart them")]
#[command(long_about = "colordim: activation histograms (\"colorful dimension\" charts) for burn models.

EXAMPLES:
  # Train the demo model and write activations.svg
  colordim run

  # Per-class histograms of the last layer, with a live terminal chart
  colordim run --per-class --layers last --live

  # Load recorder and plot settings from JSON and write a PNG
  colordim run --config colordim.json --output activations.png

  # Show the layers --layers selects from
  colordim layers")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the demo model and chart its activation histograms
    Run(RunArgs),
    /// List the demo model's layers
    Layers {
        /// Hidden layer width
        #[arg(long, default_value = "32", value_name = "N")]
        hidden: usize,

        /// Number of classes
        #[arg(long, default_value = "3", value_name = "N")]
        classes: usize,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Number of training epochs
    #[arg(long, default_value = "4", value_name = "N")]
    epochs: usize,

    /// Training batches per epoch
    #[arg(long, default_value = "20", value_name = "N")]
    batches: usize,

    /// Batch size
    #[arg(long, default_value = "64", value_name = "SIZE")]
    batch_size: usize,

    /// Learning rate for the Adam optimizer
    #[arg(long, default_value = "0.001", value_name = "LR")]
    lr: f64,

    /// Number of histogram bins
    #[arg(long, default_value = "100", value_name = "N")]
    bins: usize,

    /// Lower histogram bound (defaults to -upper)
    #[arg(long, allow_hyphen_values = true, value_name = "VALUE")]
    lower: Option<f32>,

    /// Upper histogram bound
    #[arg(long, default_value = "3.0", value_name = "VALUE")]
    upper: f32,

    /// Record one histogram per class (axis 1 of each output). Every
    /// monitored layer must have the same axis-1 width, so --layers defaults
    /// to the head
    #[arg(long)]
    per_class: bool,

    /// Layers to monitor: all, last, or comma-separated indices
    /// [default: all, or last with --per-class]
    #[arg(long, value_name = "SELECTION")]
    layers: Option<String>,

    /// Print a terminal chart at the end of every epoch
    #[arg(long)]
    live: bool,

    /// JSON file with recorder and plot settings (overrides the matching flags)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Chart output file (.svg or .png)
    #[arg(long, default_value = "activations.svg", value_name = "FILE")]
    output: PathBuf,

    /// Panels per row
    #[arg(long, default_value = "3", value_name = "N")]
    cols: usize,

    /// Add layer descriptions and output shapes to panel titles
    #[arg(long)]
    show_layer_info: bool,

    /// Hidden layer width
    #[arg(long, default_value = "32", value_name = "N")]
    hidden: usize,

    /// Number of classes
    #[arg(long, default_value = "3", value_name = "N")]
    classes: usize,

    /// Random seed for reproducibility
    #[arg(long, default_value = "42", value_name = "SEED")]
    seed: u64,
}

/// Settings loadable from `--config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunConfig {
    recorder: ActivationsHistogramConfig,
    plot: PlotOptions,
}

impl RunArgs {
    fn run_config(&self) -> Result<RunConfig> {
        if let Some(path) = &self.config {
            return load_config(path);
        }

        let lower = self.lower.unwrap_or(-self.upper);
        let histogram = HistogramConfig::new(lower, self.upper, self.bins)
            .context("Invalid histogram bounds")?
            .with_per_class(self.per_class);
        let layers = match &self.layers {
            Some(layers) => layers.parse().context("Invalid --layers")?,
            None if self.per_class => LayerSelection::Last,
            None => LayerSelection::All,
        };

        Ok(RunConfig {
            recorder: ActivationsHistogramConfig::new(histogram).with_layers(layers),
            plot: PlotOptions::default()
                .with_cols(self.cols)
                .with_show_layer_info(self.show_layer_info),
        })
    }
}

/// Per-class histograms of every monitored layer are stacked together, so
/// their class axes must agree.
fn check_per_class(
    mlp: &MlpConfig,
    layers: &[LayerInfo],
    recorder: &ActivationsHistogramConfig,
) -> Result<()> {
    if !recorder.histogram.per_class {
        return Ok(());
    }
    let selected = recorder.layers.resolve(layers)?;
    let widths: BTreeSet<usize> = selected
        .iter()
        .map(|layer| mlp.output_width(layer.index))
        .collect();
    if widths.len() > 1 {
        bail!(
            "--per-class needs layers with one axis-1 width, but the selected layers have widths {:?}; try --layers last",
            widths
        );
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<RunConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: RunConfig = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded settings from {}", path.display());
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::Layers { hidden, classes } => handle_layers(hidden, classes),
    }
}

fn handle_layers(hidden: usize, classes: usize) -> Result<()> {
    let device = Default::default();
    let model: Mlp<NdArray> = MlpConfig::new(D_INPUT, classes)
        .with_d_hidden(hidden)
        .init(&device);

    println!("Layers of the demo model:\n");
    for layer in model.layers() {
        println!("  {:>3}  {:<6} {}", layer.index, layer.name, layer.description);
    }
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<()> {
    if args.epochs == 0 || args.batches == 0 || args.batch_size == 0 {
        bail!("--epochs, --batches and --batch-size must be positive");
    }
    if args.classes == 0 {
        bail!("--classes must be positive");
    }
    let config = args.run_config()?;

    println!("=== colordim run ===\n");
    println!("Epochs: {}", args.epochs);
    println!("Batches per epoch: {} x {}", args.batches, args.batch_size);
    println!(
        "Histogram: {} bins over [{}, {}]{}",
        config.recorder.histogram.n_bins,
        config.recorder.histogram.lower,
        config.recorder.histogram.upper,
        if config.recorder.histogram.per_class { ", per class" } else { "" }
    );
    println!();

    let device = Default::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let class_centers = centers(&mut rng, args.classes, D_INPUT);
    let train = Clusters::generate(&mut rng, &class_centers, args.batches * args.batch_size, 1.0);
    let n_valid_batches = (args.batches / 4).max(1);
    let valid = Clusters::generate(
        &mut rng,
        &class_centers,
        n_valid_batches * args.batch_size,
        1.0,
    );

    let mlp_config = MlpConfig::new(D_INPUT, args.classes).with_d_hidden(args.hidden);
    let mut model: Mlp<TrainBackend> = mlp_config.init(&device);
    check_per_class(&mlp_config, &model.layers(), &config.recorder)?;
    let mut optim = AdamConfig::new().init::<TrainBackend, Mlp<TrainBackend>>();
    let loss_fn = CrossEntropyLossConfig::new().init::<TrainBackend>(&device);
    let valid_loss_fn = CrossEntropyLossConfig::new().init::<NdArray>(&device);

    let mut recorder = ActivationsHistogram::new(&model, config.recorder.clone())
        .context("Failed to set up the activation recorder")?;
    if args.live {
        recorder = recorder.with_live_chart(AsciiLiveChart::new());
    }

    let mut ctx = CallbackContext::new(args.epochs, train.n_batches(args.batch_size));
    ctx.lr = args.lr;
    recorder.before_fit(&mut ctx)?;

    for epoch in 0..args.epochs {
        ctx.epoch = epoch;
        recorder.before_epoch(&mut ctx)?;

        ctx.enter_phase(Phase::Train, train.n_batches(args.batch_size));
        let mut total_loss = 0.0f32;
        for batch in 0..ctx.n_batches {
            let Some((x, y)) = train.batch::<TrainBackend>(batch, args.batch_size, &device) else {
                break;
            };
            ctx.batch = batch;
            recorder.before_batch(&mut ctx)?;

            let logits = model.forward_observed(x, &mut recorder)?;
            let loss = loss_fn.forward(logits, y);
            total_loss += loss.clone().into_scalar().elem::<f32>();

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(args.lr, model, grads);

            recorder.after_batch(&mut ctx)?;
        }
        ctx.train_loss = Some(total_loss / ctx.n_batches.max(1) as f32);

        let valid_model = model.valid();
        ctx.enter_phase(Phase::Valid, valid.n_batches(args.batch_size));
        let (mut correct, mut total, mut valid_loss) = (0usize, 0usize, 0.0f32);
        for batch in 0..ctx.n_batches {
            let Some((x, y)) = valid.batch::<NdArray>(batch, args.batch_size, &device) else {
                break;
            };
            ctx.batch = batch;
            recorder.before_batch(&mut ctx)?;

            let logits = valid_model.forward_observed(x, &mut recorder)?;
            valid_loss += valid_loss_fn
                .forward(logits.clone(), y.clone())
                .into_scalar()
                .elem::<f32>();
            let [batch_size, _] = logits.dims();
            let preds = logits.argmax(1).squeeze::<1>(1);
            let hits: i64 = preds.equal(y).int().sum().into_scalar().elem();
            correct += hits as usize;
            total += batch_size;

            recorder.after_batch(&mut ctx)?;
        }
        let accuracy = correct as f32 / total.max(1) as f32;
        ctx.valid_loss = Some(valid_loss / ctx.n_batches.max(1) as f32);

        recorder.after_epoch(&mut ctx)?;
        tracing::info!(
            "Epoch {}/{}: train loss {:.4}, valid loss {:.4}, valid accuracy {:.2}%",
            epoch + 1,
            args.epochs,
            ctx.train_loss.unwrap_or_default(),
            ctx.valid_loss.unwrap_or_default(),
            accuracy * 100.0
        );
        println!(
            "Epoch {:>3}: loss {:.4}  valid loss {:.4}  valid acc {:.2}%",
            epoch + 1,
            ctx.train_loss.unwrap_or_default(),
            ctx.valid_loss.unwrap_or_default(),
            accuracy * 100.0
        );
    }
    recorder.after_fit(&mut ctx)?;

    print_summary(&recorder);

    let chart = HistogramChart::from_recorder(&recorder, config.plot)
        .context("Failed to build the activation chart")?;
    colordim_viz::save(&chart, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("\nChart saved to: {}", args.output.display());

    println!("\n=== Run complete! ===");
    Ok(())
}

fn print_summary(recorder: &ActivationsHistogram) {
    println!("\nRecorded history:");
    for phase in [Phase::Train, Phase::Valid] {
        match recorder.history(phase).as_array() {
            Some(history) => println!(
                "  {}: {:?} [layer, batch, bin, class]",
                phase,
                history.shape()
            ),
            None => println!("  {}: empty", phase),
        }
    }
    println!("  Train epoch ends: {:?}", recorder.train_epochs().as_slice());
    println!("  Valid epoch ends: {:?}", recorder.valid_epochs().as_slice());
    for layer in recorder.layers() {
        let shape = recorder
            .output_shape(layer)
            .map(|s| format!("{:?}", s))
            .unwrap_or_else(|| "-".to_string());
        println!("  L:{} {:<6} out {}", layer.index, layer.name, shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_defaults() {
        let cli = Cli::parse_from([
            "colordim",
            "run",
            "--per-class",
            "--layers",
            "0,4",
            "--lower",
            "-2",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.run_config().unwrap();
        assert_eq!(config.recorder.histogram.lower, -2.0);
        assert_eq!(config.recorder.histogram.upper, 3.0);
        assert!(config.recorder.histogram.per_class);
        assert_eq!(config.recorder.layers, LayerSelection::Indices(vec![0, 4]));
        assert_eq!(config.plot.cols, 3);
    }

    #[test]
    fn test_per_class_defaults_to_last_layer() {
        let cli = Cli::parse_from(["colordim", "run", "--per-class"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.run_config().unwrap();
        assert_eq!(config.recorder.layers, LayerSelection::Last);

        let cli = Cli::parse_from(["colordim", "run"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.run_config().unwrap().recorder.layers, LayerSelection::All);
    }

    #[test]
    fn test_per_class_rejects_mixed_widths() {
        let device = Default::default();
        let mlp = MlpConfig::new(D_INPUT, 3);
        let layers = mlp.init::<NdArray>(&device).layers();
        let histogram = HistogramConfig::default().with_per_class(true);

        let mixed = ActivationsHistogramConfig::new(histogram).with_layers(LayerSelection::All);
        assert!(check_per_class(&mlp, &layers, &mixed).is_err());

        let hidden = ActivationsHistogramConfig::new(histogram)
            .with_layers(LayerSelection::Indices(vec![0, 3]));
        assert!(check_per_class(&mlp, &layers, &hidden).is_ok());

        let head = ActivationsHistogramConfig::new(histogram).with_layers(LayerSelection::Last);
        assert!(check_per_class(&mlp, &layers, &head).is_ok());

        let flat = ActivationsHistogramConfig::new(HistogramConfig::default());
        assert!(check_per_class(&mlp, &layers, &flat).is_ok());
    }

    #[test]
    fn test_symmetric_default_bounds() {
        let cli = Cli::parse_from(["colordim", "run", "--upper", "2.5"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.run_config().unwrap();
        assert_eq!(config.recorder.histogram.lower, -2.5);
    }

    #[test]
    fn test_load_config() {
        let path = std::env::temp_dir().join(format!("colordim_cli_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "recorder": {
                    "histogram": {"lower": -4.0, "upper": 4.0, "n_bins": 50},
                    "layers": "Last"
                },
                "plot": {"cols": 1, "h_scale": 0.1}
            }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.recorder.histogram.n_bins, 50);
        assert!(!config.recorder.histogram.per_class);
        assert_eq!(config.recorder.layers, LayerSelection::Last);
        assert!(config.recorder.live_chart);
        assert_eq!(config.plot.cols, 1);
        assert_eq!(config.plot.h_scale, 0.1);

        std::fs::write(
            &path,
            r#"{"recorder": {"histogram": {"lower": 1.0, "upper": 0.0, "n_bins": 5}}}"#,
        )
        .unwrap();
        assert!(load_config(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_demo_model_layers() {
        let device = Default::default();
        let model: Mlp<NdArray> = MlpConfig::new(D_INPUT, 3).init(&device);
        let layers = model.layers();
        assert_eq!(layers.len(), 5);
        assert_eq!(layers[4].name, "head");
        assert_eq!(layers[0].description, "Linear(d_input=8, d_output=32, bias=true)");
    }
}
