//! Seeded synthetic classification data: noisy points around class centers.

use burn::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Labelled points stored row-major, `d_input` features per sample.
#[derive(Debug, Clone)]
pub struct Clusters {
    features: Vec<f32>,
    labels: Vec<i64>,
    d_input: usize,
}

/// Random class centers in `[-2, 2]^d_input`.
pub fn centers(rng: &mut ChaCha8Rng, n_classes: usize, d_input: usize) -> Vec<Vec<f32>> {
    (0..n_classes)
        .map(|_| (0..d_input).map(|_| rng.gen_range(-2.0..2.0)).collect())
        .collect()
}

impl Clusters {
    /// Draw `n_samples` points, cycling through the classes, each feature
    /// offset from its center by uniform noise of half-width `spread`.
    pub fn generate(
        rng: &mut ChaCha8Rng,
        centers: &[Vec<f32>],
        n_samples: usize,
        spread: f32,
    ) -> Self {
        let d_input = centers.first().map_or(0, Vec::len);
        let mut features = Vec::with_capacity(n_samples * d_input);
        let mut labels = Vec::with_capacity(n_samples);

        for i in 0..n_samples {
            let class = i % centers.len().max(1);
            if let Some(center) = centers.get(class) {
                features.extend(center.iter().map(|&c| c + rng.gen_range(-spread..spread)));
                labels.push(class as i64);
            }
        }

        Self {
            features,
            labels,
            d_input,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Number of batches of `batch_size`, counting a final partial batch.
    pub fn n_batches(&self, batch_size: usize) -> usize {
        self.len().div_ceil(batch_size.max(1))
    }

    /// Batch `index` as `(features [n, d_input], labels [n])`.
    pub fn batch<B: Backend>(
        &self,
        index: usize,
        batch_size: usize,
        device: &B::Device,
    ) -> Option<(Tensor<B, 2>, Tensor<B, 1, Int>)> {
        let start = index * batch_size;
        let end = (start + batch_size).min(self.len());
        if start >= end {
            return None;
        }

        let n = end - start;
        let x = TensorData::new(
            self.features[start * self.d_input..end * self.d_input].to_vec(),
            [n, self.d_input],
        );
        let y = TensorData::new(self.labels[start..end].to_vec(), [n]);
        Some((
            Tensor::from_data(x, device),
            Tensor::from_data(y, device),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use rand::SeedableRng;

    #[test]
    fn test_generate_is_seeded() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let c = centers(&mut rng, 3, 4);
        let a = Clusters::generate(&mut rng, &c, 10, 0.5);

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let c2 = centers(&mut rng, 3, 4);
        let b = Clusters::generate(&mut rng, &c2, 10, 0.5);

        assert_eq!(a.features, b.features);
        assert_eq!(a.labels, vec![0, 1, 2, 0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_batches() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let c = centers(&mut rng, 2, 3);
        let data = Clusters::generate(&mut rng, &c, 10, 0.1);
        assert_eq!(data.n_batches(4), 3);

        let device = Default::default();
        let (x, y) = data.batch::<NdArray>(2, 4, &device).unwrap();
        assert_eq!(x.dims(), [2, 3]);
        assert_eq!(y.dims(), [2]);
        assert!(data.batch::<NdArray>(3, 4, &device).is_none());
    }
}
