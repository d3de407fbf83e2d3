//! Closed-form M/M/1 predictions
//!
//! All predictions assume a stable system (ρ = λ/μ < 1) and return `None`
//! otherwise: with ρ ≥ 1 the queue grows without bound and there is no
//! steady state to compare against.

use crate::arrivals::validate_rate;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};

/// Arrival and service rates of an M/M/1 queue
///
/// # Example
/// ```
/// use queue_simulator_core_rs::QueueParameters;
///
/// let params = QueueParameters::new(1.0, 2.0).unwrap();
/// assert_eq!(params.utilization(), 0.5);
/// assert_eq!(params.expected_time_in_system(), Some(1.0));
/// assert_eq!(params.expected_customers(), Some(1.0));
///
/// let unstable = QueueParameters::new(4.0, 2.0).unwrap();
/// assert!(!unstable.is_stable());
/// assert_eq!(unstable.expected_customers(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueParameters {
    /// λ
    pub arrival_rate: f64,
    /// μ
    pub service_rate: f64,
}

impl QueueParameters {
    pub fn new(arrival_rate: f64, service_rate: f64) -> Result<Self, SimulationError> {
        validate_rate("arrival_rate", arrival_rate)?;
        validate_rate("service_rate", service_rate)?;
        Ok(Self {
            arrival_rate,
            service_rate,
        })
    }

    /// ρ = λ/μ
    pub fn utilization(&self) -> f64 {
        self.arrival_rate / self.service_rate
    }

    /// Stable iff ρ < 1
    pub fn is_stable(&self) -> bool {
        self.utilization() < 1.0
    }

    /// Mean time in system (queue + service): 1/(μ−λ)
    pub fn expected_time_in_system(&self) -> Option<f64> {
        let span = self.service_rate - self.arrival_rate;
        self.is_stable().then(|| 1.0 / span)
    }

    /// Mean number of customers in system: ρ/(1−ρ)
    pub fn expected_customers(&self) -> Option<f64> {
        let rho = self.utilization();
        self.is_stable().then(|| rho / (1.0 - rho))
    }

    /// Mean busy period: (1/μ)/(1−ρ)
    pub fn expected_busy_period(&self) -> Option<f64> {
        let rho = self.utilization();
        self.is_stable().then(|| (1.0 / self.service_rate) / (1.0 - rho))
    }

    /// Mean time for a queue holding `initial_customers` to first drop to
    /// `target` customers: (C−target)·E[B]
    ///
    /// Every customer above the target has to be cleared, and clearing
    /// one customer (plus everyone arriving meanwhile) takes a busy period.
    /// A target of zero gives the busy period started by `C` customers.
    pub fn expected_drain_time(&self, initial_customers: u64, target: u64) -> Option<f64> {
        let steps = initial_customers.saturating_sub(target) as f64;
        self.expected_busy_period().map(|busy| steps * busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rho_different_rates() {
        let slow = QueueParameters::new(1.0, 2.0).unwrap();
        let fast = QueueParameters::new(2.0, 4.0).unwrap();

        assert_eq!(slow.utilization(), fast.utilization());
        assert_eq!(slow.expected_customers(), fast.expected_customers());
        assert_eq!(fast.expected_time_in_system(), Some(0.5));
    }

    #[test]
    fn test_busy_period_and_drain_time() {
        let params = QueueParameters::new(1.0, 2.0).unwrap();
        assert_eq!(params.expected_busy_period(), Some(1.0));
        assert_eq!(params.expected_drain_time(5, 1), Some(4.0));
        assert_eq!(params.expected_drain_time(1, 1), Some(0.0));
        assert_eq!(params.expected_drain_time(3, 0), Some(3.0));
    }

    #[test]
    fn test_critical_load_is_unstable() {
        let params = QueueParameters::new(2.0, 2.0).unwrap();
        assert!(!params.is_stable());
        assert_eq!(params.expected_time_in_system(), None);
        assert_eq!(params.expected_busy_period(), None);
        assert_eq!(params.expected_drain_time(3, 1), None);
    }

    #[test]
    fn test_invalid_rates() {
        assert!(QueueParameters::new(0.0, 1.0).is_err());
        assert!(QueueParameters::new(1.0, -1.0).is_err());
    }
}
