//! Compute module - Illumination simulation and evolutionary search.

mod illumination;

pub mod evolution;

pub use illumination::*;
