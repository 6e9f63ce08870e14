//! Fitness evaluation for candidate layouts.
//!
//! A layout is scored by simulating illuminance on the sensor grid, rewarding
//! total brightness, penalizing unevenness, and then charging for the powered
//! fixtures under the configured [`ScoringMode`].

use crate::compute::IlluminationGrid;
use crate::schema::{Layout, OptimizerConfig, RoomConfig, ScoringMode, SensorGridConfig};

/// Fitness assigned to void layouts and to any non-finite score.
pub const VOID_FITNESS: f64 = f64::MIN;

/// Map non-finite scores to [`VOID_FITNESS`].
#[inline]
pub fn sanitize_fitness(fitness: f64) -> f64 {
    if fitness.is_finite() {
        fitness
    } else {
        VOID_FITNESS
    }
}

/// Breakdown of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessBreakdown {
    pub total_intensity: f64,
    pub total_variation: f64,
    pub powered_count: usize,
    pub powered_watts: u64,
    /// Final fitness after the cost term.
    pub fitness: f64,
}

impl FitnessBreakdown {
    /// Brightness minus variation, before cost.
    #[inline]
    pub fn helper_score(&self) -> f64 {
        self.total_intensity - self.total_variation
    }
}

/// Scores layouts for one room. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    room: RoomConfig,
    grid: SensorGridConfig,
    scoring: ScoringMode,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(room: RoomConfig, grid: SensorGridConfig, scoring: ScoringMode) -> Self {
        Self {
            room,
            grid,
            scoring,
        }
    }

    /// Evaluator matching an optimizer configuration.
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.room, config.sensor_grid.clone(), config.scoring)
    }

    pub fn scoring(&self) -> ScoringMode {
        self.scoring
    }

    /// Fitness of `layout`; higher is better.
    pub fn evaluate(&self, layout: &Layout) -> f64 {
        self.breakdown(layout)
            .map_or(VOID_FITNESS, |breakdown| breakdown.fitness)
    }

    /// Full evaluation, or `None` when no fixture is powered.
    pub fn breakdown(&self, layout: &Layout) -> Option<FitnessBreakdown> {
        let powered_count = layout.powered_count();
        if powered_count == 0 {
            return None;
        }
        let powered_watts = layout.powered_watts();

        let illumination = IlluminationGrid::build(layout, &self.room, &self.grid);
        let total_intensity = illumination.total_intensity();
        let total_variation = illumination.total_variation();
        let helper = total_intensity - total_variation;

        let raw = match self.scoring {
            ScoringMode::Subtractive => helper - powered_count as f64 - powered_watts as f64,
            ScoringMode::Divisive => helper / (powered_count as f64 * powered_watts as f64),
        };

        Some(FitnessBreakdown {
            total_intensity,
            total_variation,
            powered_count,
            powered_watts,
            fitness: sanitize_fitness(raw),
        })
    }
}
