//! Statistical convergence tests
//!
//! Many independent seeded runs, checked against the closed-form M/M/1
//! results. Waits within one run are autocorrelated, so naive per-customer
//! intervals cover the true mean far less often than their nominal 95%;
//! batch-means intervals restore most of the coverage.

use queue_simulator_core_rs::{
    drain_time_sweep, replicate, QueueParameters, SampleSet, SimulationConfig, SimulationError,
};

const RUNS: u64 = 200;

fn stable_config() -> SimulationConfig {
    SimulationConfig {
        max_iterations: 10_000,
        ..SimulationConfig::new(1.0, 2.0)
    }
}

#[test]
fn test_replications_converge_to_analytical_values() {
    let summary = replicate(&stable_config(), 1_000..1_000 + RUNS).unwrap();

    assert_eq!(summary.runs.len(), RUNS as usize);
    assert_eq!(summary.expected_time_in_system, 1.0);
    assert_eq!(summary.expected_customers, 1.0);

    let grand_mean = summary.grand_mean_wait().unwrap();
    assert!(
        (grand_mean - 1.0).abs() < 0.03,
        "grand mean wait {} too far from 1/(mu - lambda)",
        grand_mean
    );

    let occupancy: SampleSet = summary
        .runs
        .iter()
        .filter_map(|run| run.occupancy_batch_interval.map(|ci| ci.mean))
        .collect();
    let occupancy_mean = occupancy.mean().unwrap();
    assert!(
        (0.93..1.07).contains(&occupancy_mean),
        "time-average occupancy {} too far from rho/(1 - rho)",
        occupancy_mean
    );
}

#[test]
fn test_event_epoch_counts_are_biased_upwards() {
    // Arrivals see the steady state and add one; departures leave the
    // steady state behind. Half the samples are shifted by one.
    let summary = replicate(&stable_config(), 5_000..5_000 + 50).unwrap();

    let counts: SampleSet = summary
        .runs
        .iter()
        .filter_map(|run| run.mean_event_count)
        .collect();
    let mean = counts.mean().unwrap();
    assert!((1.35..1.65).contains(&mean), "event-epoch mean count {}", mean);
}

#[test]
fn test_batch_intervals_cover_better_than_naive() {
    let summary = replicate(&stable_config(), 2_000..2_000 + RUNS).unwrap();

    let naive = summary.wait_coverage.fraction().unwrap();
    let batch = summary.wait_batch_coverage.fraction().unwrap();
    let occupancy = summary.occupancy_batch_coverage.fraction().unwrap();

    assert_eq!(summary.wait_coverage.evaluated, RUNS as usize);
    assert!(naive > 0.15, "naive coverage {}", naive);
    assert!(batch > 0.75, "batch coverage {}", batch);
    assert!(batch > naive, "batch {} vs naive {}", batch, naive);
    assert!(occupancy > 0.7, "occupancy coverage {}", occupancy);
}

#[test]
fn test_replication_is_reproducible() {
    let config = SimulationConfig {
        max_iterations: 2_000,
        ..stable_config()
    };
    let first = replicate(&config, 0..20).unwrap();
    let second = replicate(&config, 0..20).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_replication_rejects_unstable_queue() {
    let config = SimulationConfig::new(2.0, 2.0);
    assert!(matches!(
        replicate(&config, 0..5),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_drain_time_grows_linearly() {
    let params = QueueParameters::new(1.0, 2.0).unwrap();
    let results = drain_time_sweep(params, 2..=5, 1, 400, 77, 1_000_000).unwrap();

    assert_eq!(results.len(), 4);
    for result in &results {
        let expected = (result.initial_customers - 1) as f64;
        assert_eq!(result.expected, Some(expected));
        assert_eq!(result.incomplete, 0);
        assert_eq!(result.drain_times.count(), 400);

        let mean = result.drain_times.mean().unwrap();
        let std_err = result.drain_times.sample_std_dev().unwrap() / 20.0;
        assert!(
            (mean - expected).abs() < 5.0 * std_err,
            "C = {}: mean drain time {} vs expected {}",
            result.initial_customers,
            mean,
            expected
        );
    }
}

#[test]
fn test_busy_period_from_loaded_start() {
    // Target zero: the busy period opened by C customers lasts C·E[B]
    let params = QueueParameters::new(1.0, 2.0).unwrap();
    let results = drain_time_sweep(params, 1..=3, 0, 400, 314, 1_000_000).unwrap();

    assert_eq!(results.len(), 3);
    for result in &results {
        let expected = result.initial_customers as f64;
        assert_eq!(result.target, 0);
        assert_eq!(result.expected, Some(expected));
        assert_eq!(result.incomplete, 0);

        let mean = result.drain_times.mean().unwrap();
        let std_err = result.drain_times.sample_std_dev().unwrap() / 20.0;
        assert!(
            (mean - expected).abs() < 5.0 * std_err,
            "C = {}: mean busy period {} vs expected {}",
            result.initial_customers,
            mean,
            expected
        );
    }
}

#[test]
fn test_drain_sweep_needs_customers_above_target() {
    let params = QueueParameters::new(1.0, 2.0).unwrap();
    assert!(drain_time_sweep(params, 1..=3, 1, 10, 0, 1_000).is_err());
    assert!(drain_time_sweep(params, 2..=3, 2, 10, 0, 1_000).is_err());
    assert!(drain_time_sweep(params, 1..=1, 0, 10, 0, 1_000).is_ok());
}
