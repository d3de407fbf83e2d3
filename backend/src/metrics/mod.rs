//! Sample collection and summary statistics
//!
//! The engine feeds a [`MetricsCollector`] with:
//! - **waits**: time in system of every departing customer
//! - **counts**: customers in system immediately after every event
//! - **busy periods**: length of every completed busy period
//!
//! All sample sets are append-only. Statistics that need more data than is
//! available return [`StatsError::InsufficientSamples`] instead of NaN.
//!
//! # Standard deviation
//!
//! Intervals use the unbiased sample standard deviation (denominator n−1).
//! [`SampleSet::population_std_dev`] (denominator n) is available for
//! comparison only.

pub mod confidence;

pub use confidence::{interval, ConfidenceInterval, Z_95};

use serde::Serialize;
use thiserror::Error;

/// Errors from summary statistics
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    #[error("Not enough data: need at least {required} samples, have {available}")]
    InsufficientSamples { required: usize, available: usize },
}

fn require(required: usize, available: usize) -> Result<(), StatsError> {
    if available < required {
        return Err(StatsError::InsufficientSamples {
            required,
            available,
        });
    }
    Ok(())
}

/// Append-only sequence of real-valued samples
///
/// # Example
/// ```
/// use queue_simulator_core_rs::metrics::SampleSet;
///
/// let samples: SampleSet = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into();
/// assert_eq!(samples.mean().unwrap(), 5.0);
/// assert_eq!(samples.population_std_dev().unwrap(), 2.0);
/// assert!(samples.sample_std_dev().unwrap() > 2.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSet {
    values: Vec<f64>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All samples in recording order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Arithmetic mean; needs at least one sample
    pub fn mean(&self) -> Result<f64, StatsError> {
        require(1, self.count())?;
        Ok(self.values.iter().sum::<f64>() / self.count() as f64)
    }

    /// Unbiased standard deviation (n−1); needs at least two samples
    pub fn sample_std_dev(&self) -> Result<f64, StatsError> {
        require(2, self.count())?;
        Ok((self.sum_squared_deviations()? / (self.count() - 1) as f64).sqrt())
    }

    /// Population standard deviation (n); needs at least one sample
    pub fn population_std_dev(&self) -> Result<f64, StatsError> {
        require(1, self.count())?;
        Ok((self.sum_squared_deviations()? / self.count() as f64).sqrt())
    }

    fn sum_squared_deviations(&self) -> Result<f64, StatsError> {
        let mean = self.mean()?;
        Ok(self.values.iter().map(|v| (v - mean).powi(2)).sum())
    }

    /// Means of `num_batches` equal, non-overlapping batches
    ///
    /// When the sample count is not a multiple of `num_batches`, the oldest
    /// leftover samples are dropped (they belong to the warm-up end of the
    /// run). Needs at least two batches and one sample per batch.
    pub fn batch_means(&self, num_batches: usize) -> Result<SampleSet, StatsError> {
        require(2, num_batches)?;
        require(num_batches, self.count())?;

        let batch_size = self.count() / num_batches;
        let skip = self.count() - batch_size * num_batches;

        let means = self.values[skip..]
            .chunks_exact(batch_size)
            .map(|batch| batch.iter().sum::<f64>() / batch_size as f64)
            .collect::<Vec<_>>();

        Ok(means.into())
    }
}

impl From<Vec<f64>> for SampleSet {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl FromIterator<f64> for SampleSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Accumulates all samples of one simulation run
#[derive(Debug, Clone, Serialize)]
pub struct MetricsCollector {
    waits: SampleSet,
    counts: SampleSet,
    busy_periods: SampleSet,

    /// Customer-count step function: (time the level started, level).
    /// Starts with the initial level at time zero.
    occupancy: Vec<(f64, u64)>,

    /// Start of the busy period in progress, if the server is busy
    busy_since: Option<f64>,
}

impl MetricsCollector {
    /// Create a collector for a run that starts with `initial_customers`
    pub fn new(initial_customers: u64) -> Self {
        Self {
            waits: SampleSet::new(),
            counts: SampleSet::new(),
            busy_periods: SampleSet::new(),
            occupancy: vec![(0.0, initial_customers)],
            busy_since: (initial_customers > 0).then_some(0.0),
        }
    }

    /// Record an applied arrival
    pub fn record_arrival(&mut self, time: f64, customers_after: u64) {
        if customers_after == 1 {
            self.busy_since = Some(time);
        }
        self.record_count(time, customers_after);
    }

    /// Record an applied departure and the departing customer's wait
    pub fn record_departure(&mut self, time: f64, wait: f64, customers_after: u64) {
        self.waits.push(wait);
        if customers_after == 0 {
            if let Some(start) = self.busy_since.take() {
                self.busy_periods.push(time - start);
            }
        }
        self.record_count(time, customers_after);
    }

    fn record_count(&mut self, time: f64, customers: u64) {
        self.counts.push(customers as f64);
        self.occupancy.push((time, customers));
    }

    /// Time in system of each departed customer
    pub fn waits(&self) -> &SampleSet {
        &self.waits
    }

    /// Customers in system after each event
    pub fn counts(&self) -> &SampleSet {
        &self.counts
    }

    /// Lengths of completed busy periods
    pub fn busy_periods(&self) -> &SampleSet {
        &self.busy_periods
    }

    /// Customer counts as integers, one per event (trace file content)
    pub fn count_trace(&self) -> Vec<u64> {
        self.occupancy[1..].iter().map(|&(_, level)| level).collect()
    }

    /// Time of the last recorded event
    pub fn horizon(&self) -> f64 {
        self.occupancy.last().map(|&(t, _)| t).unwrap_or(0.0)
    }

    /// Time-weighted mean number of customers over `[0, horizon]`
    pub fn time_average_customers(&self) -> Result<f64, StatsError> {
        let horizon = self.horizon();
        if horizon <= 0.0 {
            return Err(StatsError::InsufficientSamples {
                required: 1,
                available: 0,
            });
        }

        let area: f64 = self
            .occupancy
            .windows(2)
            .map(|pair| (pair[1].0 - pair[0].0) * pair[0].1 as f64)
            .sum();
        Ok(area / horizon)
    }

    /// Time-weighted mean occupancy in each of `num_windows` equal time windows
    ///
    /// Window averages are far less correlated than per-event counts, so
    /// they make a sound input for an interval on the time-average occupancy.
    pub fn occupancy_batch_means(&self, num_windows: usize) -> Result<SampleSet, StatsError> {
        require(2, num_windows)?;
        // Need at least one event per window to say anything
        require(num_windows, self.counts.count())?;

        let horizon = self.horizon();
        let width = horizon / num_windows as f64;
        let boundary = |index: usize| index as f64 * width;

        let mut areas = vec![0.0; num_windows];
        let mut window = 0;

        for pair in self.occupancy.windows(2) {
            let (mut t, level) = pair[0];
            let end = pair[1].0;

            while t < end {
                while window + 1 < num_windows && t >= boundary(window + 1) {
                    window += 1;
                }
                let window_end = if window + 1 < num_windows {
                    boundary(window + 1).min(end)
                } else {
                    end
                };
                areas[window] += (window_end - t) * level as f64;
                t = window_end;
            }
        }

        Ok(areas.into_iter().map(|area| area / width).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_has_no_mean() {
        let set = SampleSet::new();
        assert_eq!(
            set.mean(),
            Err(StatsError::InsufficientSamples {
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_single_sample_has_no_std_dev() {
        let set: SampleSet = vec![3.0].into();
        assert_eq!(set.mean(), Ok(3.0));
        assert_eq!(
            set.sample_std_dev(),
            Err(StatsError::InsufficientSamples {
                required: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_unbiased_std_dev() {
        let set: SampleSet = vec![1.0, 3.0].into();
        // mean 2, squared deviations 1 + 1, divided by n-1 = 1
        assert!((set.sample_std_dev().unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert!((set.population_std_dev().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_batch_means_drop_oldest_leftovers() {
        let set: SampleSet = (1..=7).map(|v| v as f64).collect();
        let batches = set.batch_means(3).unwrap();
        // 7 samples, batch size 2, drop the first one: [2,3] [4,5] [6,7]
        assert_eq!(batches.values(), &[2.5, 4.5, 6.5]);
    }

    #[test]
    fn test_batch_means_need_enough_samples() {
        let set: SampleSet = vec![1.0, 2.0].into();
        assert!(set.batch_means(3).is_err());
        assert!(set.batch_means(1).is_err());
    }

    #[test]
    fn test_busy_period_tracking() {
        let mut metrics = MetricsCollector::new(0);
        metrics.record_arrival(1.0, 1);
        metrics.record_arrival(1.5, 2);
        metrics.record_departure(2.0, 1.0, 1);
        metrics.record_departure(4.0, 2.5, 0);
        metrics.record_arrival(5.0, 1);

        assert_eq!(metrics.busy_periods().values(), &[3.0]);
        assert_eq!(metrics.waits().values(), &[1.0, 2.5]);
        assert_eq!(metrics.count_trace(), vec![1, 2, 1, 0, 1]);
    }

    #[test]
    fn test_preloaded_busy_period_starts_at_zero() {
        let mut metrics = MetricsCollector::new(1);
        metrics.record_departure(0.75, 0.75, 0);
        assert_eq!(metrics.busy_periods().values(), &[0.75]);
    }

    #[test]
    fn test_time_average_customers() {
        let mut metrics = MetricsCollector::new(0);
        metrics.record_arrival(1.0, 1); // level 0 on [0, 1)
        metrics.record_arrival(2.0, 2); // level 1 on [1, 2)
        metrics.record_departure(4.0, 3.0, 1); // level 2 on [2, 4)

        // area = 0 + 1 + 4 = 5 over horizon 4
        assert!((metrics.time_average_customers().unwrap() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_occupancy_windows_split_segments() {
        let mut metrics = MetricsCollector::new(0);
        metrics.record_arrival(1.0, 1);
        metrics.record_arrival(3.0, 2);
        metrics.record_departure(4.0, 3.0, 1);

        // windows [0,2) and [2,4): areas 1 and 1 + 2
        let windows = metrics.occupancy_batch_means(2).unwrap();
        assert_eq!(windows.values(), &[0.5, 1.5]);
    }

    #[test]
    fn test_no_events_means_no_time_average() {
        let metrics = MetricsCollector::new(0);
        assert!(metrics.time_average_customers().is_err());
        assert!(metrics.occupancy_batch_means(2).is_err());
    }
}
