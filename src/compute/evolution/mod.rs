//! Evolutionary search for light fixture layouts.
//!
//! The search is a (μ,λ) evolution strategy with uncorrelated self-adaptive
//! mutation and restarts on stagnation.
//!
//! # Overview
//!
//! - **Fitness** (`fitness`): illumination-based scoring with a selectable cost term
//! - **Genome Operations** (`genome`): random layouts, recombination, mutation
//! - **Selection** (`selection`): non-elitist top-μ survivor selection
//! - **Search** (`search`): the generation and restart loops
//!
//! # Example
//!
//! ```rust,no_run
//! use light_placement::schema::OptimizerConfig;
//! use light_placement::compute::evolution::EvolutionEngine;
//!
//! let config = OptimizerConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(config).expect("valid config");
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best fitness = {:.3}",
//!         progress.generation, progress.best_fitness);
//! });
//!
//! println!("Best layout fitness: {:.3}", result.best.fitness);
//! ```

mod fitness;
mod genome;
mod search;
mod selection;

pub use fitness::{FitnessBreakdown, FitnessEvaluator, VOID_FITNESS, sanitize_fitness};
pub use genome::{
    Gene, GeneBounds, LayoutRng, LearningRates, Mutated, MutationOperator, StepSizes,
};
pub use search::{BestCandidate, Candidate, EvolutionEngine, RunState};
pub use selection::select_survivors;
