//! Progress and result types reported by the optimizer.

use serde::{Deserialize, Serialize};

use super::{Layout, RoomConfig};

/// Phase of the optimizer when a progress report is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionPhase {
    /// A segment just began; step sizes have been reset.
    SegmentStarted,
    /// A generation finished selection.
    Generation,
}

/// Snapshot of the optimizer state delivered to progress sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    pub phase: EvolutionPhase,
    /// Completed generations.
    pub generation: usize,
    /// Zero-based restart segment index.
    pub segment: usize,
    /// Budget units left.
    pub remaining_budget: u64,
    /// Best fitness seen in any segment.
    pub best_fitness: f64,
    /// Best fitness seen in the current segment.
    pub segment_best_fitness: f64,
    /// Best fitness among the latest survivors.
    pub generation_best: f64,
    /// Mean fitness of the latest survivors.
    pub avg_fitness: f64,
    /// Consecutive generations without segment improvement.
    pub stagnation_count: usize,
    /// Mutation step sizes for (x, y, selector, power).
    pub step_sizes: [f64; 4],
}

/// Serializable view of the best layout found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub layout: Layout,
    pub fitness: f64,
    pub room: RoomConfig,
    /// Generation in which this layout was selected.
    pub generation: usize,
    /// Segment in which this layout was selected.
    pub segment: usize,
    pub powered_count: usize,
    pub powered_watts: u64,
}

/// Per-generation history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    /// Best survivor fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Mean survivor fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Generation index at which each segment started.
    pub segment_starts: Vec<usize>,
}

/// Summary statistics for a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    pub generations: usize,
    /// Number of segments, including the first.
    pub segments: usize,
    /// Fitness evaluations performed (λ per generation).
    pub total_evaluations: u64,
    pub best_fitness: f64,
    pub elapsed_seconds: f64,
    pub evaluations_per_second: f64,
}

/// Outcome of an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    pub best: LayoutSnapshot,
    pub stats: EvolutionStats,
    pub history: EvolutionHistory,
}
