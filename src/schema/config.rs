//! Configuration types for light placement optimization runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level optimizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Room dimensions.
    #[serde(default)]
    pub room: RoomConfig,
    /// Number of fixture slots (N) in every layout.
    #[serde(default = "default_fixture_count")]
    pub fixture_count: usize,
    /// Parent and offspring population sizes.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Self-adaptive mutation settings.
    #[serde(default)]
    pub mutation: MutationConfig,
    /// Generation budget. Each generation consumes one unit; the run ends at zero.
    #[serde(default = "default_budget")]
    pub budget: u64,
    /// Generations without segment improvement before the step sizes restart.
    #[serde(default = "default_stagnation_limit")]
    pub stagnation_limit: usize,
    /// Cost term applied after the brightness/variation score.
    #[serde(default)]
    pub scoring: ScoringMode,
    /// Sensor grid geometry used by the fitness evaluator.
    #[serde(default)]
    pub sensor_grid: SensorGridConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            fixture_count: default_fixture_count(),
            population: PopulationConfig::default(),
            mutation: MutationConfig::default(),
            budget: default_budget(),
            stagnation_limit: default_stagnation_limit(),
            scoring: ScoringMode::default(),
            sensor_grid: SensorGridConfig::default(),
            random_seed: None,
        }
    }
}

fn default_fixture_count() -> usize {
    14
}
fn default_budget() -> u64 {
    1000
}
fn default_stagnation_limit() -> usize {
    150
}

/// Rectangular room dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Extent along the x axis.
    pub width: u32,
    /// Extent along the y axis.
    pub length: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 96,
            length: 96,
        }
    }
}

/// Population sizes for the (μ,λ) strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of parents (μ).
    #[serde(default = "default_parents")]
    pub parents: usize,
    /// Number of offspring per generation (λ).
    #[serde(default = "default_offspring")]
    pub offspring: usize,
    /// Permit μ > λ by wrapping around the ranked offspring during selection.
    #[serde(default)]
    pub allow_cyclic_fill: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            parents: default_parents(),
            offspring: default_offspring(),
            allow_cyclic_fill: false,
        }
    }
}

fn default_parents() -> usize {
    300
}
fn default_offspring() -> usize {
    3000
}

/// Self-adaptive mutation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Initial step size (σ0) for every encoded dimension.
    #[serde(default = "default_initial_step_size")]
    pub initial_step_size: f64,
    /// Rejected proposals allowed per dimension before clamping into bounds.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            initial_step_size: default_initial_step_size(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_initial_step_size() -> f64 {
    2.0
}
fn default_max_retries() -> usize {
    1000
}

/// Cost term combined with the brightness/variation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScoringMode {
    /// `score - powered_count - powered_watts`.
    #[default]
    Subtractive,
    /// `score / (powered_count * powered_watts)`.
    Divisive,
}

/// Geometry of the illuminance sampling grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorGridConfig {
    /// Distance between neighbouring sample points.
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    /// Horizontal throw beyond which a fixture lights nothing.
    ///
    /// The default is the reach of a 110° beam from the fixed ceiling height.
    #[serde(default = "default_max_throw")]
    pub max_throw: f64,
    /// Distance below which the full intensity is used instead of `I / d`.
    #[serde(default = "default_near_field")]
    pub near_field: f64,
}

impl Default for SensorGridConfig {
    fn default() -> Self {
        Self {
            spacing: default_spacing(),
            max_throw: default_max_throw(),
            near_field: default_near_field(),
        }
    }
}

fn default_spacing() -> f64 {
    12.0
}
fn default_max_throw() -> f64 {
    154.24
}
fn default_near_field() -> f64 {
    1.0
}

impl OptimizerConfig {
    /// Number of encoded genes (four per fixture).
    #[inline]
    pub fn gene_count(&self) -> usize {
        self.fixture_count * 4
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room.width == 0 || self.room.length == 0 {
            return Err(ConfigError::InvalidRoom {
                width: self.room.width,
                length: self.room.length,
            });
        }
        if self.fixture_count == 0 {
            return Err(ConfigError::NoFixtures);
        }
        if self.population.parents == 0 || self.population.offspring == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.population.parents > self.population.offspring
            && !self.population.allow_cyclic_fill
        {
            return Err(ConfigError::ParentsExceedOffspring {
                parents: self.population.parents,
                offspring: self.population.offspring,
            });
        }
        let sigma = self.mutation.initial_step_size;
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ConfigError::InvalidStepSize(sigma));
        }
        if self.budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if self.stagnation_limit == 0 {
            return Err(ConfigError::ZeroStagnationLimit);
        }
        let grid = &self.sensor_grid;
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(grid.spacing) || !positive(grid.max_throw) || !positive(grid.near_field) {
            return Err(ConfigError::InvalidSensorGrid);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Room dimensions must be non-zero (got {width}x{length})")]
    InvalidRoom { width: u32, length: u32 },
    #[error("Fixture count must be non-zero")]
    NoFixtures,
    #[error("Parent and offspring counts must be non-zero")]
    EmptyPopulation,
    #[error("Parents ({parents}) exceed offspring ({offspring}) and cyclic fill is disabled")]
    ParentsExceedOffspring { parents: usize, offspring: usize },
    #[error("Initial step size must be positive and finite (got {0})")]
    InvalidStepSize(f64),
    #[error("Budget must be non-zero")]
    ZeroBudget,
    #[error("Stagnation limit must be non-zero")]
    ZeroStagnationLimit,
    #[error("Sensor grid spacing, throw and near-field distance must be positive")]
    InvalidSensorGrid,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}
