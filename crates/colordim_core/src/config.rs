//! Histogram configuration shared by the binner, the accumulator and the renderers.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Fixed-range histogram configuration for one training run.
///
/// Values are binned into `n_bins` equal-width bins over `[lower, upper]`.
/// Values outside the range are clipped into the first or last bin.
///
/// # Example
///
/// ```rust
/// use colordim_core::HistogramConfig;
///
/// let config = HistogramConfig::new(-1.0, 1.0, 4).unwrap();
/// assert_eq!(config.bin_width(), 0.5);
/// assert_eq!(config.bin_index(0.1), Some(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistogramConfig")]
pub struct HistogramConfig {
    /// Lower bound of the histogram range.
    pub lower: f32,
    /// Upper bound of the histogram range.
    pub upper: f32,
    /// Number of bins.
    pub n_bins: usize,
    /// Compute one histogram per class (axis 1 of the activation).
    #[serde(default)]
    pub per_class: bool,
}

/// Unchecked wire form of [`HistogramConfig`].
#[derive(Deserialize)]
struct RawHistogramConfig {
    lower: f32,
    upper: f32,
    n_bins: usize,
    #[serde(default)]
    per_class: bool,
}

impl TryFrom<RawHistogramConfig> for HistogramConfig {
    type Error = CoreError;

    fn try_from(raw: RawHistogramConfig) -> Result<Self> {
        Ok(Self::new(raw.lower, raw.upper, raw.n_bins)?.with_per_class(raw.per_class))
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            lower: -1.0,
            upper: 1.0,
            n_bins: 100,
            per_class: false,
        }
    }
}

impl HistogramConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `lower >= upper`, either bound
    /// is not finite, or `n_bins == 0`.
    pub fn new(lower: f32, upper: f32, n_bins: usize) -> Result<Self> {
        let config = Self {
            lower,
            upper,
            n_bins,
            per_class: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a range symmetric around zero: `[-amplitude, amplitude]`.
    pub fn symmetric(amplitude: f32, n_bins: usize) -> Result<Self> {
        Self::new(-amplitude, amplitude, n_bins)
    }

    /// Enable or disable per-class histograms.
    #[must_use]
    pub fn with_per_class(mut self, per_class: bool) -> Self {
        self.per_class = per_class;
        self
    }

    /// Check the range and bin count invariants.
    pub fn validate(&self) -> Result<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(CoreError::InvalidConfig(format!(
                "bounds must be finite, got [{}, {}]",
                self.lower, self.upper
            )));
        }
        if self.lower >= self.upper {
            return Err(CoreError::InvalidConfig(format!(
                "lower bound {} must be below upper bound {}",
                self.lower, self.upper
            )));
        }
        if self.n_bins == 0 {
            return Err(CoreError::InvalidConfig(
                "bin count must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Width of the range covered by the histogram.
    #[must_use]
    pub fn range(&self) -> f32 {
        self.upper - self.lower
    }

    /// Width of a single bin.
    #[must_use]
    pub fn bin_width(&self) -> f32 {
        self.range() / self.n_bins as f32
    }

    /// Bin that `value` falls into, clipping out-of-range values.
    ///
    /// Returns `None` for NaN, which has no position in the range.
    #[must_use]
    pub fn bin_index(&self, value: f32) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let pos = ((value - self.lower) / self.range() * self.n_bins as f32).floor();
        if pos <= 0.0 {
            Some(0)
        } else {
            Some((pos as usize).min(self.n_bins - 1))
        }
    }

    /// Lower edge of every bin, spanning `[lower, upper)`.
    pub fn bin_starts(&self) -> Vec<f32> {
        let width = self.bin_width();
        (0..self.n_bins)
            .map(|i| self.lower + i as f32 * width)
            .collect()
    }

    /// Position of the value `0.0` in bin coordinates (`0..n_bins`).
    #[must_use]
    pub fn zero_position(&self) -> f32 {
        -self.lower / self.range() * self.n_bins as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistogramConfig::default();
        assert_eq!(config.lower, -1.0);
        assert_eq!(config.upper, 1.0);
        assert_eq!(config.n_bins, 100);
        assert!(!config.per_class);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(HistogramConfig::new(1.0, 1.0, 10).is_err());
        assert!(HistogramConfig::new(2.0, -1.0, 10).is_err());
        assert!(HistogramConfig::new(-1.0, 1.0, 0).is_err());
        assert!(HistogramConfig::new(f32::NEG_INFINITY, 1.0, 10).is_err());
    }

    #[test]
    fn test_bin_index_clips() {
        let config = HistogramConfig::new(-1.0, 1.0, 4).unwrap();
        assert_eq!(config.bin_index(-1.0), Some(0));
        assert_eq!(config.bin_index(-0.4), Some(1));
        assert_eq!(config.bin_index(0.1), Some(2));
        assert_eq!(config.bin_index(0.9), Some(3));
        assert_eq!(config.bin_index(1.0), Some(3));
        assert_eq!(config.bin_index(-7.5), Some(0));
        assert_eq!(config.bin_index(42.0), Some(3));
        assert_eq!(config.bin_index(f32::INFINITY), Some(3));
        assert_eq!(config.bin_index(f32::NEG_INFINITY), Some(0));
        assert_eq!(config.bin_index(f32::NAN), None);
    }

    #[test]
    fn test_bin_starts_and_zero() {
        let config = HistogramConfig::new(-1.0, 1.0, 4).unwrap();
        assert_eq!(config.bin_starts(), vec![-1.0, -0.5, 0.0, 0.5]);
        assert_eq!(config.zero_position(), 2.0);

        let shifted = HistogramConfig::new(0.0, 2.0, 10).unwrap();
        assert_eq!(shifted.zero_position(), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let config = HistogramConfig::symmetric(3.0, 60).unwrap().with_per_class(true);
        assert_eq!(config.lower, -3.0);
        assert_eq!(config.upper, 3.0);
        assert!(config.per_class);
    }

    #[test]
    fn test_config_from_json() {
        let config: HistogramConfig =
            serde_json::from_str(r#"{"lower": -2.0, "upper": 2.0, "n_bins": 40}"#).unwrap();
        assert_eq!(config.n_bins, 40);
        assert!(!config.per_class);
    }

    #[test]
    fn test_config_from_json_is_validated() {
        let zero_bins = serde_json::from_str::<HistogramConfig>(
            r#"{"lower": -1.0, "upper": 1.0, "n_bins": 0}"#,
        );
        assert!(zero_bins.is_err());

        let inverted = serde_json::from_str::<HistogramConfig>(
            r#"{"lower": 1.0, "upper": -1.0, "n_bins": 8}"#,
        );
        assert!(inverted.is_err());

        let per_class: HistogramConfig = serde_json::from_str(
            r#"{"lower": -1.0, "upper": 1.0, "n_bins": 8, "per_class": true}"#,
        )
        .unwrap();
        assert!(per_class.per_class);
    }
}
