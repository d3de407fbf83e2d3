//! End-of-run report
//!
//! Summarises the samples of one run and, for a stable queue, compares them
//! against the closed-form M/M/1 predictions.
//!
//! Two interval kinds are reported per metric:
//! - **naive**: `mean ± z·s/√n` over the raw samples. Successive samples of
//!   one run are autocorrelated, so this interval is too narrow and its
//!   coverage falls well short of the nominal level.
//! - **batch**: the same formula over batch means, which are close to
//!   independent. This is the interval the comparison verdict is based on.
//!
//! Event-epoch customer counts are summarised but not compared: counts seen
//! right after an arrival are one higher than the steady-state level, so
//! their mean is biased upwards. The time-weighted occupancy is compared
//! against ρ/(1−ρ) instead.

use crate::analysis::QueueParameters;
use crate::metrics::{ConfidenceInterval, MetricsCollector, SampleSet, StatsError};
use serde::Serialize;
use std::fmt;
use tracing::warn;

// ============================================================================
// Report Types
// ============================================================================

/// Summary statistics of one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub name: &'static str,
    /// Number of samples behind `mean`
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub interval: Option<ConfidenceInterval>,
    pub batch_interval: Option<ConfidenceInterval>,
}

impl MetricSummary {
    fn from_samples(name: &'static str, samples: &SampleSet, z: f64, batches: usize) -> Self {
        Self {
            name,
            count: samples.count(),
            mean: samples.mean().ok(),
            std_dev: samples.sample_std_dev().ok(),
            interval: ConfidenceInterval::from_samples(samples, z).ok(),
            batch_interval: batch_interval(samples.batch_means(batches), z),
        }
    }

    /// Time-weighted occupancy; only a batch interval makes sense here
    fn occupancy(metrics: &MetricsCollector, z: f64, batches: usize) -> Self {
        let windows = metrics.occupancy_batch_means(batches);
        Self {
            name: "customers in system (time average)",
            count: metrics.counts().count(),
            mean: metrics.time_average_customers().ok(),
            std_dev: None,
            interval: None,
            batch_interval: batch_interval(windows, z),
        }
    }
}

fn batch_interval(
    batch_means: Result<SampleSet, StatsError>,
    z: f64,
) -> Option<ConfidenceInterval> {
    batch_means
        .and_then(|means| ConfidenceInterval::from_samples(&means, z))
        .ok()
}

/// Outcome of comparing a metric against its analytical value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    Failure,
    /// No interval could be computed
    NotEnoughData,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "SUCCESS"),
            Verdict::Failure => write!(f, "FAILURE"),
            Verdict::NotEnoughData => write!(f, "NOT ENOUGH DATA"),
        }
    }
}

/// One metric checked against its analytical value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub name: &'static str,
    pub expected: f64,
    pub observed: Option<f64>,
    pub within_interval: Option<bool>,
    pub within_batch_interval: Option<bool>,
}

impl Comparison {
    fn new(summary: &MetricSummary, expected: f64) -> Self {
        Self {
            name: summary.name,
            expected,
            observed: summary.mean,
            within_interval: summary.interval.map(|ci| ci.contains(expected)),
            within_batch_interval: summary.batch_interval.map(|ci| ci.contains(expected)),
        }
    }

    /// Batch interval verdict, falling back to the naive interval
    pub fn verdict(&self) -> Verdict {
        match self.within_batch_interval.or(self.within_interval) {
            Some(true) => Verdict::Success,
            Some(false) => Verdict::Failure,
            None => Verdict::NotEnoughData,
        }
    }
}

/// Everything printed at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub parameters: QueueParameters,
    pub utilization: f64,
    pub stable: bool,
    /// Quantile used for every interval
    pub z: f64,
    pub batches: usize,
    pub waits: MetricSummary,
    pub event_counts: MetricSummary,
    pub occupancy: MetricSummary,
    pub busy_periods: MetricSummary,
    /// Empty when the queue is unstable
    pub comparisons: Vec<Comparison>,
}

impl SimulationReport {
    /// Summarise `metrics` and compare against `params`
    ///
    /// # Example
    /// ```
    /// use queue_simulator_core_rs::{
    ///     QueueParameters, SimulationConfig, SimulationEngine, SimulationReport, Z_95,
    /// };
    ///
    /// let config = SimulationConfig {
    ///     seed: Some(7),
    ///     max_iterations: 20_000,
    ///     ..SimulationConfig::new(1.0, 2.0)
    /// };
    /// let mut engine = SimulationEngine::new(config).unwrap();
    /// engine.run().unwrap();
    ///
    /// let params = QueueParameters::new(1.0, 2.0).unwrap();
    /// let report = SimulationReport::build(params, engine.metrics(), Z_95, 20);
    /// assert!(report.stable);
    /// assert_eq!(report.comparisons.len(), 3);
    /// assert!(report.to_string().contains("Analytical comparison"));
    /// ```
    pub fn build(
        params: QueueParameters,
        metrics: &MetricsCollector,
        z: f64,
        batches: usize,
    ) -> Self {
        let waits = MetricSummary::from_samples("time in system", metrics.waits(), z, batches);
        let event_counts =
            MetricSummary::from_samples("customers after event", metrics.counts(), z, batches);
        let occupancy = MetricSummary::occupancy(metrics, z, batches);
        let busy_periods =
            MetricSummary::from_samples("busy period", metrics.busy_periods(), z, batches);

        let stable = params.is_stable();
        let comparisons = match (
            params.expected_time_in_system(),
            params.expected_customers(),
            params.expected_busy_period(),
        ) {
            (Some(wait), Some(customers), Some(busy)) => vec![
                Comparison::new(&waits, wait),
                Comparison::new(&occupancy, customers),
                Comparison::new(&busy_periods, busy),
            ],
            _ => {
                warn!(
                    utilization = params.utilization(),
                    "Arrivals outpace service; skipping analytical comparison"
                );
                Vec::new()
            }
        };

        Self {
            parameters: params,
            utilization: params.utilization(),
            stable,
            z,
            batches,
            waits,
            event_counts,
            occupancy,
            busy_periods,
            comparisons,
        }
    }

    /// Pretty-printed JSON rendering
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Text Rendering
// ============================================================================

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

fn fmt_interval(ci: Option<ConfidenceInterval>) -> String {
    ci.map_or_else(
        || "not enough data".to_string(),
        |ci| format!("[{:.4}, {:.4}]", ci.low, ci.high),
    )
}

fn fmt_within(within: Option<bool>) -> &'static str {
    match within {
        Some(true) => "inside",
        Some(false) => "outside",
        None => "n/a",
    }
}

impl fmt::Display for MetricSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (n = {})", self.name, self.count)?;
        writeln!(
            f,
            "  mean {}, std dev {}",
            fmt_value(self.mean),
            fmt_value(self.std_dev)
        )?;
        writeln!(f, "  naive interval {}", fmt_interval(self.interval))?;
        writeln!(f, "  batch interval {}", fmt_interval(self.batch_interval))
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "M/M/1 queue: lambda = {}, mu = {}, rho = {:.4}",
            self.parameters.arrival_rate, self.parameters.service_rate, self.utilization
        )?;
        writeln!(f, "Intervals: z = {}, {} batches", self.z, self.batches)?;
        writeln!(f)?;

        for summary in [
            &self.waits,
            &self.event_counts,
            &self.occupancy,
            &self.busy_periods,
        ] {
            write!(f, "{}", summary)?;
        }
        writeln!(f)?;

        if !self.stable {
            return writeln!(
                f,
                "Arrivals are faster than services, the queue grows without bound. \
                 No analytical comparison."
            );
        }

        writeln!(f, "Analytical comparison:")?;
        for comparison in &self.comparisons {
            writeln!(
                f,
                "  {}: expected {:.4}, observed {} (naive {}, batch {}) => {}",
                comparison.name,
                comparison.expected,
                fmt_value(comparison.observed),
                fmt_within(comparison.within_interval),
                fmt_within(comparison.within_batch_interval),
                comparison.verdict()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy_metrics() -> MetricsCollector {
        let mut metrics = MetricsCollector::new(0);
        let mut t = 0.0;
        for _ in 0..50 {
            t += 1.0;
            metrics.record_arrival(t, 1);
            t += 0.5;
            metrics.record_departure(t, 0.5, 0);
        }
        metrics
    }

    #[test]
    fn test_empty_run_reports_not_enough_data() {
        let params = QueueParameters::new(1.0, 2.0).unwrap();
        let report = SimulationReport::build(params, &MetricsCollector::new(0), 1.96, 20);

        assert_eq!(report.waits.count, 0);
        assert_eq!(report.waits.mean, None);
        assert_eq!(report.occupancy.mean, None);
        assert!(report
            .comparisons
            .iter()
            .all(|c| c.verdict() == Verdict::NotEnoughData));
        assert!(report.to_string().contains("not enough data"));
    }

    #[test]
    fn test_unstable_queue_skips_comparison() {
        let params = QueueParameters::new(4.0, 2.0).unwrap();
        let report = SimulationReport::build(params, &busy_metrics(), 1.96, 5);

        assert!(!report.stable);
        assert!(report.comparisons.is_empty());
        assert!(report.to_string().contains("grows without bound"));
    }

    #[test]
    fn test_deterministic_samples_fail_comparison() {
        // Every wait is exactly 0.5 and every busy period 0.5: zero-width
        // intervals that cannot contain E[T] = 1
        let params = QueueParameters::new(1.0, 2.0).unwrap();
        let report = SimulationReport::build(params, &busy_metrics(), 1.96, 5);

        let wait = &report.comparisons[0];
        assert_eq!(wait.name, "time in system");
        assert_eq!(wait.observed, Some(0.5));
        assert_eq!(wait.verdict(), Verdict::Failure);
        assert!(report.to_string().contains("FAILURE"));
    }

    #[test]
    fn test_occupancy_uses_time_weights() {
        let params = QueueParameters::new(1.0, 2.0).unwrap();
        let report = SimulationReport::build(params, &busy_metrics(), 1.96, 5);

        // One customer for 0.5 out of every 1.5 time units
        let mean = report.occupancy.mean.unwrap();
        assert!((mean - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.occupancy.interval, None);
        assert!(report.occupancy.batch_interval.is_some());
    }

    #[test]
    fn test_json_rendering() {
        let params = QueueParameters::new(1.0, 2.0).unwrap();
        let report = SimulationReport::build(params, &busy_metrics(), 1.96, 5);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["stable"], true);
        assert_eq!(json["waits"]["count"], 50);
        assert_eq!(json["comparisons"][0]["name"], "time in system");
    }
}
