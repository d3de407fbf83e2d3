//! Independent replications and drain-time sweeps
//!
//! Each replication is a separate [`SimulationEngine`] with its own seed, so
//! replications run in parallel (rayon) while every individual run stays
//! strictly sequential.

use crate::analysis::QueueParameters;
use crate::metrics::{ConfidenceInterval, SampleSet, StatsError, Z_95};
use crate::orchestrator::engine::{
    EngineStatus, SimulationConfig, SimulationEngine, SimulationError,
};
use rayon::prelude::*;
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Number of batches used for batch-means intervals
pub const DEFAULT_BATCHES: usize = 20;

/// Interval estimates of one replication
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplicationRun {
    pub seed: u64,
    /// Naive interval over per-customer waits
    pub wait_interval: Option<ConfidenceInterval>,
    /// Batch-means interval over per-customer waits
    pub wait_batch_interval: Option<ConfidenceInterval>,
    /// Mean of the per-event customer counts
    pub mean_event_count: Option<f64>,
    /// Batch-means interval over time-window occupancy
    pub occupancy_batch_interval: Option<ConfidenceInterval>,
}

/// Fraction of runs whose interval contained the analytical value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coverage {
    pub covered: usize,
    /// Runs that produced an interval at all
    pub evaluated: usize,
}

impl Coverage {
    fn measure<'a>(
        intervals: impl Iterator<Item = &'a Option<ConfidenceInterval>>,
        target: f64,
    ) -> Self {
        let mut covered = 0;
        let mut evaluated = 0;
        for ci in intervals.flatten() {
            evaluated += 1;
            if ci.contains(target) {
                covered += 1;
            }
        }
        Self { covered, evaluated }
    }

    /// Covered fraction, or `None` if no interval was evaluated
    pub fn fraction(&self) -> Option<f64> {
        (self.evaluated > 0).then(|| self.covered as f64 / self.evaluated as f64)
    }
}

/// Result of [`replicate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub parameters: QueueParameters,
    pub expected_time_in_system: f64,
    pub expected_customers: f64,
    pub runs: Vec<ReplicationRun>,
    pub wait_coverage: Coverage,
    pub wait_batch_coverage: Coverage,
    pub occupancy_batch_coverage: Coverage,
}

impl ReplicationSummary {
    /// Mean of per-run mean waits
    pub fn grand_mean_wait(&self) -> Option<f64> {
        let means: SampleSet = self
            .runs
            .iter()
            .filter_map(|run| run.wait_interval.map(|ci| ci.mean))
            .collect();
        means.mean().ok()
    }
}

/// Run one independent replication of `config` per seed
///
/// The seed in `config` is ignored. Requires a stable system, since the
/// coverage is measured against steady-state predictions.
pub fn replicate(
    config: &SimulationConfig,
    seeds: impl IntoIterator<Item = u64>,
) -> Result<ReplicationSummary, SimulationError> {
    config.validate()?;
    let parameters = QueueParameters::new(config.arrival_rate, config.service_rate)?;

    let (expected_time_in_system, expected_customers) = match (
        parameters.expected_time_in_system(),
        parameters.expected_customers(),
    ) {
        (Some(wait), Some(customers)) => (wait, customers),
        _ => {
            warn!(
                utilization = parameters.utilization(),
                "Replication requested for an unstable queue"
            );
            return Err(SimulationError::InvalidConfig(format!(
                "replication needs a stable queue (rho < 1), got rho = {}",
                parameters.utilization()
            )));
        }
    };

    let seeds: Vec<u64> = seeds.into_iter().collect();
    debug!(runs = seeds.len(), "Starting replications");

    let runs = seeds
        .par_iter()
        .map(|&seed| {
            let run_config = SimulationConfig {
                seed: Some(seed),
                ..config.clone()
            };
            let mut engine = SimulationEngine::new(run_config)?;
            engine.run()?;
            let metrics = engine.into_metrics();

            let batch_interval = |set: Result<SampleSet, StatsError>| {
                set.and_then(|batches| ConfidenceInterval::from_samples(&batches, Z_95))
                    .ok()
            };

            Ok(ReplicationRun {
                seed,
                wait_interval: ConfidenceInterval::from_samples(metrics.waits(), Z_95).ok(),
                wait_batch_interval: batch_interval(metrics.waits().batch_means(DEFAULT_BATCHES)),
                mean_event_count: metrics.counts().mean().ok(),
                occupancy_batch_interval: batch_interval(
                    metrics.occupancy_batch_means(DEFAULT_BATCHES),
                ),
            })
        })
        .collect::<Result<Vec<_>, SimulationError>>()?;

    Ok(ReplicationSummary {
        parameters,
        expected_time_in_system,
        expected_customers,
        wait_coverage: Coverage::measure(
            runs.iter().map(|r| &r.wait_interval),
            expected_time_in_system,
        ),
        wait_batch_coverage: Coverage::measure(
            runs.iter().map(|r| &r.wait_batch_interval),
            expected_time_in_system,
        ),
        occupancy_batch_coverage: Coverage::measure(
            runs.iter().map(|r| &r.occupancy_batch_interval),
            expected_customers,
        ),
        runs,
    })
}

/// Drain-time statistics for one starting customer count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrainTimeResult {
    pub initial_customers: u64,
    /// Customer count that ends each run
    pub target: u64,
    /// Time until a departure first left `target` customers, per completed run
    pub drain_times: SampleSet,
    /// Runs that used up their iteration budget before draining
    pub incomplete: usize,
    pub interval: Option<ConfidenceInterval>,
    /// (C−target)·E[B], if the queue is stable
    pub expected: Option<f64>,
}

impl DrainTimeResult {
    /// Whether the interval contains the analytical value
    pub fn within_interval(&self) -> Option<bool> {
        match (self.interval, self.expected) {
            (Some(ci), Some(expected)) => Some(ci.contains(expected)),
            _ => None,
        }
    }
}

/// For each starting count `C` in `customers`, run `replications` drain runs
/// (start with `C` customers, stop when a departure leaves `target` behind)
///
/// A `target` of zero measures the busy period started by `C` customers.
/// Seeds are derived from `base_seed`, `C` and the replication index, so
/// the whole sweep is reproducible.
pub fn drain_time_sweep(
    parameters: QueueParameters,
    customers: RangeInclusive<u64>,
    target: u64,
    replications: usize,
    base_seed: u64,
    max_iterations: u64,
) -> Result<Vec<DrainTimeResult>, SimulationError> {
    if *customers.start() <= target {
        return Err(SimulationError::InvalidConfig(format!(
            "drain sweeps need more than {} initial customers, got {}",
            target,
            customers.start()
        )));
    }

    customers
        .map(|initial_customers| {
            let outcomes = (0..replications as u64)
                .into_par_iter()
                .map(|index| {
                    let config = SimulationConfig {
                        arrival_rate: parameters.arrival_rate,
                        service_rate: parameters.service_rate,
                        seed: Some(base_seed.wrapping_add((initial_customers << 32) | index)),
                        max_iterations,
                        initial_customers,
                        drain_target: Some(target),
                    };
                    let mut engine = SimulationEngine::new(config)?;
                    let summary = engine.run()?;
                    Ok((summary.status == EngineStatus::TerminatedDrainTarget)
                        .then_some(summary.final_clock))
                })
                .collect::<Result<Vec<Option<f64>>, SimulationError>>()?;

            let incomplete = outcomes.iter().filter(|o| o.is_none()).count();
            let drain_times: SampleSet = outcomes.into_iter().flatten().collect();

            Ok(DrainTimeResult {
                initial_customers,
                target,
                interval: ConfidenceInterval::from_samples(&drain_times, Z_95).ok(),
                expected: parameters.expected_drain_time(initial_customers, target),
                drain_times,
                incomplete,
            })
        })
        .collect()
}
