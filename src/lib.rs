//! Light placement - Evolutionary optimization of ceiling light layouts.
//!
//! This crate searches for the positions, brightness settings and power
//! states of up to N ceiling fixtures in a rectangular room, maximizing even
//! illumination while charging for fixture count and wattage.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, fixture/layout and reporting types
//! - `compute`: Illumination sampling and the evolution strategy
//!
//! # Example
//!
//! ```rust,no_run
//! use light_placement::{EvolutionEngine, OptimizerConfig, RoomConfig};
//!
//! let config = OptimizerConfig {
//!     room: RoomConfig { width: 120, length: 96 },
//!     fixture_count: 8,
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(config).expect("valid config");
//! let result = engine.run();
//!
//! for fixture in result.best.layout.powered() {
//!     println!("x={} y={} W={}", fixture.x(), fixture.y(), fixture.watts());
//! }
//! println!("fitness: {}", result.best.fitness);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::IlluminationGrid;
pub use compute::evolution::{EvolutionEngine, FitnessEvaluator};
pub use schema::{EvolutionResult, Fixture, Layout, OptimizerConfig, RoomConfig, ScoringMode};
