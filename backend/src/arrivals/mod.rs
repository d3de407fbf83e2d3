//! Stochastic interval generation for arrivals and service completions.
//!
//! Interarrival times are exponential with rate λ (so arrivals form a
//! Poisson process) and service times are exponential with rate μ. Both are
//! drawn with the mean-interval parameterization, `scale = 1 / rate`.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed → same sequence of intervals
//! 2. **Replayability**: Unseeded generators pick an entropy seed and expose it
//! 3. **Single Stream**: Arrival and service draws share one RNG, so the
//!    order of draws is part of the reproducible behavior
//!
//! # Example
//!
//! ```
//! use queue_simulator_core_rs::arrivals::RandomEventGenerator;
//!
//! let mut gen_a = RandomEventGenerator::new(1.0, 2.0, Some(42)).unwrap();
//! let mut gen_b = RandomEventGenerator::new(1.0, 2.0, Some(42)).unwrap();
//!
//! assert_eq!(gen_a.next_interarrival(), gen_b.next_interarrival());
//! assert_eq!(gen_a.next_service_time(), gen_b.next_service_time());
//! ```

use crate::orchestrator::SimulationError;
use crate::rng::RngManager;

/// Check that a rate is usable as an exponential parameter.
pub(crate) fn validate_rate(name: &str, rate: f64) -> Result<(), SimulationError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(SimulationError::InvalidConfig(format!(
            "{} must be a finite positive number, got {}",
            name, rate
        )));
    }
    Ok(())
}

/// Generator of exponential interarrival and service intervals.
#[derive(Debug, Clone)]
pub struct RandomEventGenerator {
    /// Mean interarrival time (1 / λ)
    arrival_scale: f64,

    /// Mean service time (1 / μ)
    service_scale: f64,

    /// Seed actually used, whether given or drawn from entropy
    seed: u64,

    rng: RngManager,
}

impl RandomEventGenerator {
    /// Create a generator for arrival rate λ and service rate μ.
    ///
    /// # Arguments
    ///
    /// * `arrival_rate` - λ, arrivals per unit time
    /// * `service_rate` - μ, service completions per unit time while busy
    /// * `seed` - `Some` for a reproducible stream, `None` to seed from OS entropy
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidConfig` if either rate is not finite and positive.
    pub fn new(
        arrival_rate: f64,
        service_rate: f64,
        seed: Option<u64>,
    ) -> Result<Self, SimulationError> {
        validate_rate("arrival_rate", arrival_rate)?;
        validate_rate("service_rate", service_rate)?;

        let seed = seed.unwrap_or_else(rand::random);

        Ok(Self {
            arrival_scale: 1.0 / arrival_rate,
            service_scale: 1.0 / service_rate,
            seed,
            rng: RngManager::new(seed),
        })
    }

    /// Draw the time until the next arrival (> 0)
    pub fn next_interarrival(&mut self) -> f64 {
        self.rng.exponential(self.arrival_scale)
    }

    /// Draw the service time of the customer entering service (> 0)
    pub fn next_service_time(&mut self) -> f64 {
        self.rng.exponential(self.service_scale)
    }

    /// Seed of this generator's stream
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
