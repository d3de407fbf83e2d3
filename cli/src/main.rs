//! Queue Simulator CLI
//!
//! Run M/M/1 simulations, replication studies and drain-time sweeps.
//!
//! # Example
//!
//! ```bash
//! # One seeded run, narrating every event
//! queue-sim run --arrival-rate 1 --service-rate 2 --seed 42 --show-events
//!
//! # Run from a JSON config, overriding the budget, and keep the count trace
//! queue-sim run --config run.json --max-iterations 50000 --trace-out counts.txt
//!
//! # Interval coverage over 200 independent runs
//! queue-sim replicate --arrival-rate 1 --service-rate 2 --runs 200
//!
//! # Time for 2..=10 queued customers to drain down to one
//! queue-sim drain --arrival-rate 1 --service-rate 2
//!
//! # Busy periods opened by 1..=5 customers
//! queue-sim drain --arrival-rate 1 --service-rate 2 --min-customers 1 --max-customers 5 --target 0
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use queue_simulator_core_rs::{
    drain_time_sweep, replicate, write_trace, EventNotification, QueueParameters,
    SimulationConfig, SimulationEngine, SimulationReport, Verdict, DEFAULT_BATCHES, Z_95,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// M/M/1 queue simulator
///
/// Single-server FIFO queue with Poisson arrivals and exponential service.
/// Runs are reproducible when the same seed is used.
#[derive(Parser, Debug)]
#[command(name = "queue-sim")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulation and report its statistics
    Run(RunArgs),
    /// Run independent replications and measure interval coverage
    Replicate(ReplicateArgs),
    /// Measure the time for a loaded queue to drain down to a target count
    Drain(DrainArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Arrival rate λ (required unless given by --config)
    #[arg(long)]
    arrival_rate: Option<f64>,

    /// Service rate μ (required unless given by --config)
    #[arg(long)]
    service_rate: Option<f64>,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of events to process
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Customers already in the system at time zero
    #[arg(long)]
    initial_customers: Option<u64>,

    /// Stop when a departure leaves exactly this many customers
    #[arg(long)]
    drain_target: Option<u64>,

    /// JSON file with a full run configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every event as it is applied
    #[arg(long)]
    show_events: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the per-event customer counts to this file
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// Number of batches for batch-means intervals
    #[arg(long, default_value_t = DEFAULT_BATCHES)]
    batches: usize,
}

#[derive(Args, Debug)]
struct ReplicateArgs {
    #[arg(long)]
    arrival_rate: f64,

    #[arg(long)]
    service_rate: f64,

    /// Number of independent runs
    #[arg(long)]
    runs: u64,

    /// Seed of the first run; run `i` uses `base_seed + i`
    #[arg(long)]
    base_seed: Option<u64>,

    /// Maximum number of events per run
    #[arg(long, default_value = "10000")]
    max_iterations: u64,
}

#[derive(Args, Debug)]
struct DrainArgs {
    #[arg(long)]
    arrival_rate: f64,

    #[arg(long)]
    service_rate: f64,

    /// Smallest starting customer count
    #[arg(long, default_value = "2")]
    min_customers: u64,

    /// Largest starting customer count
    #[arg(long, default_value = "10")]
    max_customers: u64,

    /// Customer count that ends a run; 0 measures whole busy periods
    #[arg(long, default_value = "1")]
    target: u64,

    /// Runs per starting count
    #[arg(long, default_value = "400")]
    replications: usize,

    #[arg(long)]
    base_seed: Option<u64>,

    /// Per-run event budget; runs that exhaust it are reported as incomplete
    #[arg(long, default_value = "1000000")]
    max_iterations: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,queue_simulator_core_rs=info")),
        )
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Replicate(args) => run_replications(args),
        Command::Drain(args) => run_drain(args),
    }
}

/// Start from the config file (if any) and apply flag overrides
fn resolve_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<SimulationConfig>(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => match (args.arrival_rate, args.service_rate) {
            (Some(arrival_rate), Some(service_rate)) => {
                SimulationConfig::new(arrival_rate, service_rate)
            }
            _ => bail!("--arrival-rate and --service-rate are required without --config"),
        },
    };

    if let Some(rate) = args.arrival_rate {
        config.arrival_rate = rate;
    }
    if let Some(rate) = args.service_rate {
        config.service_rate = rate;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(budget) = args.max_iterations {
        config.max_iterations = budget;
    }
    if let Some(customers) = args.initial_customers {
        config.initial_customers = customers;
    }
    if args.drain_target.is_some() {
        config.drain_target = args.drain_target;
    }

    Ok(config)
}

fn run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let params = QueueParameters::new(config.arrival_rate, config.service_rate)
        .context("Invalid queue parameters")?;
    let mut engine = SimulationEngine::new(config).context("Failed to create simulation")?;

    info!(
        arrival_rate = params.arrival_rate,
        service_rate = params.service_rate,
        seed = engine.seed(),
        max_iterations = engine.config().max_iterations,
        initial_customers = engine.config().initial_customers,
        "Starting simulation"
    );

    let summary = if args.show_events {
        let mut narrate = |notification: &EventNotification| println!("{}", notification);
        engine.run_observed(&mut narrate)?
    } else {
        engine.run()?
    };

    info!(
        status = ?summary.status,
        events = summary.events_processed,
        clock = summary.final_clock,
        "Simulation finished"
    );

    if let Some(path) = &args.trace_out {
        write_trace(path, &engine.metrics().count_trace())
            .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    }

    let report = SimulationReport::build(params, engine.metrics(), Z_95, args.batches);
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!(
            "Seed {}: {} events, clock {:.4}, {:?}",
            summary.seed, summary.events_processed, summary.final_clock, summary.status
        );
        print!("{}", report);
    }

    Ok(())
}

fn run_replications(args: ReplicateArgs) -> Result<()> {
    let base_seed = args.base_seed.unwrap_or_else(rand::random);
    let config = SimulationConfig {
        max_iterations: args.max_iterations,
        ..SimulationConfig::new(args.arrival_rate, args.service_rate)
    };

    info!(runs = args.runs, base_seed, "Starting replications");

    let seeds = (0..args.runs).map(|i| base_seed.wrapping_add(i));
    let summary = replicate(&config, seeds)?;

    let fmt_fraction =
        |fraction: Option<f64>| fraction.map_or_else(|| "n/a".to_string(), |f| format!("{:.3}", f));

    println!(
        "{} runs, lambda = {}, mu = {}, base seed {}",
        summary.runs.len(),
        args.arrival_rate,
        args.service_rate,
        base_seed
    );
    println!(
        "Expected time in system {:.4}, grand mean {}",
        summary.expected_time_in_system,
        summary
            .grand_mean_wait()
            .map_or_else(|| "n/a".to_string(), |m| format!("{:.4}", m))
    );
    println!(
        "Time in system coverage: naive {}, batch {}",
        fmt_fraction(summary.wait_coverage.fraction()),
        fmt_fraction(summary.wait_batch_coverage.fraction())
    );
    println!(
        "Expected customers {:.4}, time-average coverage (batch) {}",
        summary.expected_customers,
        fmt_fraction(summary.occupancy_batch_coverage.fraction())
    );

    Ok(())
}

fn run_drain(args: DrainArgs) -> Result<()> {
    if args.min_customers > args.max_customers {
        bail!(
            "--min-customers ({}) exceeds --max-customers ({})",
            args.min_customers,
            args.max_customers
        );
    }

    let params = QueueParameters::new(args.arrival_rate, args.service_rate)?;
    let base_seed = args.base_seed.unwrap_or_else(rand::random);

    info!(
        min_customers = args.min_customers,
        max_customers = args.max_customers,
        target = args.target,
        replications = args.replications,
        base_seed,
        "Starting drain-time sweep"
    );

    let results = drain_time_sweep(
        params,
        args.min_customers..=args.max_customers,
        args.target,
        args.replications,
        base_seed,
        args.max_iterations,
    )?;

    for result in &results {
        let observed = result.interval.map_or_else(
            || "not enough data".to_string(),
            |ci| format!("{:.4} [{:.4}, {:.4}]", ci.mean, ci.low, ci.high),
        );
        let verdict = match result.within_interval() {
            Some(true) => Verdict::Success,
            Some(false) => Verdict::Failure,
            None => Verdict::NotEnoughData,
        };
        let expected = result
            .expected
            .map_or_else(|| "unbounded".to_string(), |e| format!("{:.4}", e));

        println!(
            "C = {:>2} -> {}: drain time {}, expected {} => {} ({} incomplete)",
            result.initial_customers,
            result.target,
            observed,
            expected,
            verdict,
            result.incomplete
        );
    }

    Ok(())
}
