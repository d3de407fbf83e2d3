//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, reproducible random numbers.
//! All randomness inside a simulation run goes through this module.

mod xorshift;

pub use xorshift::RngManager;
