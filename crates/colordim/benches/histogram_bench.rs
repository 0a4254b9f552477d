//! Benchmarks for histogram binning and recording.
//!
//! Run with: cargo bench --bench histogram_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use burn::prelude::*;
use burn_ndarray::NdArray;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use colordim::prelude::*;
use colordim::train::histogram;

struct Layers(usize);

impl LayerTree for Layers {
    fn layers(&self) -> Vec<LayerInfo> {
        (0..self.0).map(|i| LayerInfo::new(i, format!("layer{}", i))).collect()
    }
}

/// Create a `[batch, features]` activation with values roughly in `[-2, 2]`.
fn create_activation(batch: usize, features: usize) -> Activation {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let values: Vec<f32> = (0..batch * features).map(|_| rng.gen::<f32>() * 4.0 - 2.0).collect();
    Activation::from_shape_vec(&[batch, features], values).unwrap()
}

fn bench_binning(c: &mut Criterion) {
    let mut group = c.benchmark_group("binning");

    for features in [16, 128, 1024].iter() {
        let activation = create_activation(64, *features);
        let config = HistogramConfig::symmetric(3.0, 100).unwrap();
        let per_class = config.with_per_class(true);

        group.bench_with_input(BenchmarkId::new("flat", features), features, |b, _| {
            b.iter(|| black_box(histogram(&config, black_box(&activation)).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("per_class", features), features, |b, _| {
            b.iter(|| black_box(histogram(&per_class, black_box(&activation)).unwrap()))
        });
    }

    group.finish();
}

fn bench_record_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_batch");
    let device = <NdArray as Backend>::Device::default();

    for n_layers in [1, 4, 8].iter() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let values: Vec<f32> = (0..64 * 128).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
        let output = Tensor::<NdArray, 2>::from_data(TensorData::new(values, [64, 128]), &device);

        let config = ActivationsHistogramConfig::default().with_live_chart(false);
        let mut recorder = ActivationsHistogram::new(&Layers(*n_layers), config).unwrap();
        let mut ctx = CallbackContext::new(1, 1);
        recorder.before_fit(&mut ctx).unwrap();
        recorder.before_epoch(&mut ctx).unwrap();

        group.bench_with_input(BenchmarkId::new("layers", n_layers), n_layers, |b, &n| {
            b.iter(|| {
                recorder.before_batch(&mut ctx).unwrap();
                for layer in 0..n {
                    recorder.observe(layer, Some(&output)).unwrap();
                }
                recorder.after_batch(&mut ctx).unwrap();
                // Restart the run so the history does not grow without bound.
                if recorder.train_history().n_batches() >= 1000 {
                    recorder.after_fit(&mut ctx).unwrap();
                    recorder.before_fit(&mut ctx).unwrap();
                    recorder.before_epoch(&mut ctx).unwrap();
                }
            })
        });
    }

    group.finish();
}

fn bench_live_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_summary");
    let device = <NdArray as Backend>::Device::default();

    let output = Tensor::<NdArray, 2>::ones([32, 64], &device);
    let config = ActivationsHistogramConfig::new(HistogramConfig::symmetric(2.0, 100).unwrap())
        .with_live_chart(false);
    let mut recorder = ActivationsHistogram::new(&Layers(4), config).unwrap();
    let mut ctx = CallbackContext::new(4, 100);
    recorder.before_fit(&mut ctx).unwrap();
    for _ in 0..4 {
        recorder.before_epoch(&mut ctx).unwrap();
        for _ in 0..100 {
            recorder.before_batch(&mut ctx).unwrap();
            for layer in 0..4 {
                recorder.observe(layer, Some(&output)).unwrap();
            }
            recorder.after_batch(&mut ctx).unwrap();
        }
        recorder.after_epoch(&mut ctx).unwrap();
    }

    group.bench_function("four_epochs", |b| b.iter(|| black_box(recorder.live_summary())));
    group.finish();
}

criterion_group!(benches, bench_binning, bench_record_batch, bench_live_summary);
criterion_main!(benches);
