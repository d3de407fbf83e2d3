//! Normal-approximation confidence intervals

use super::{require, SampleSet, StatsError};
use serde::Serialize;

/// Two-tailed 95% standard normal quantile
pub const Z_95: f64 = 1.96;

/// `mean ± z·std_dev/√n`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub half_width: f64,
    pub low: f64,
    pub high: f64,
    pub z: f64,
}

impl ConfidenceInterval {
    /// Interval around the mean of `samples`, using the unbiased std dev
    ///
    /// # Example
    /// ```
    /// use queue_simulator_core_rs::metrics::{ConfidenceInterval, SampleSet, Z_95};
    ///
    /// let samples: SampleSet = vec![0.8, 1.1, 0.9, 1.2].into();
    /// let ci = ConfidenceInterval::from_samples(&samples, Z_95).unwrap();
    /// assert!(ci.contains(1.0));
    ///
    /// let too_few: SampleSet = vec![1.0].into();
    /// assert!(ConfidenceInterval::from_samples(&too_few, Z_95).is_err());
    /// ```
    pub fn from_samples(samples: &SampleSet, z: f64) -> Result<Self, StatsError> {
        require(2, samples.count())?;
        interval(samples.mean()?, samples.sample_std_dev()?, samples.count(), z)
    }

    /// Whether `value` lies inside the closed interval
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Interval from precomputed statistics; needs `n >= 2`
pub fn interval(
    mean: f64,
    std_dev: f64,
    n: usize,
    z: f64,
) -> Result<ConfidenceInterval, StatsError> {
    require(2, n)?;

    let half_width = z * std_dev / (n as f64).sqrt();
    Ok(ConfidenceInterval {
        mean,
        half_width,
        low: mean - half_width,
        high: mean + half_width,
        z,
    })
}
