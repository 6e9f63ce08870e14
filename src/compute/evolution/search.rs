//! (μ,λ) evolution strategy with stagnation-triggered restarts.

use std::time::Instant;

use crate::schema::{
    ConfigError, EvolutionHistory, EvolutionPhase, EvolutionProgress, EvolutionResult,
    EvolutionStats, Layout, LayoutSnapshot, OptimizerConfig,
};

use super::fitness::FitnessEvaluator;
use super::genome::{LayoutRng, MutationOperator, StepSizes};
use super::selection::select_survivors;

/// A scored layout.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub layout: Layout,
    pub fitness: f64,
}

/// Best candidate together with where it was found.
#[derive(Debug, Clone)]
pub struct BestCandidate {
    pub candidate: Candidate,
    pub generation: usize,
    pub segment: usize,
}

/// Mutable bookkeeping of a run, owned by the engine.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Budget units left; the run ends at zero.
    pub remaining_budget: u64,
    /// Completed generations.
    pub generation: usize,
    /// Zero-based index of the current segment.
    pub segment: usize,
    /// Best candidate over all segments.
    pub best: Option<BestCandidate>,
    /// Best fitness of the current segment.
    pub segment_best_fitness: f64,
    /// Consecutive generations without segment improvement.
    pub stagnation_count: usize,
}

impl RunState {
    fn new(budget: u64) -> Self {
        Self {
            remaining_budget: budget,
            generation: 0,
            segment: 0,
            best: None,
            segment_best_fitness: f64::NEG_INFINITY,
            stagnation_count: 0,
        }
    }

    /// Best fitness over all segments, or negative infinity before the first generation.
    pub fn best_fitness(&self) -> f64 {
        self.best
            .as_ref()
            .map_or(f64::NEG_INFINITY, |b| b.candidate.fitness)
    }

    /// Enter a fresh segment.
    fn begin_segment(&mut self) {
        self.segment_best_fitness = f64::NEG_INFINITY;
        self.stagnation_count = 0;
    }

    /// Record a finished generation whose best survivor is `leader`.
    fn record_generation(&mut self, leader: &Candidate) {
        if leader.fitness > self.segment_best_fitness {
            self.segment_best_fitness = leader.fitness;
            self.stagnation_count = 0;
        } else {
            self.stagnation_count += 1;
        }

        if leader.fitness > self.best_fitness() {
            self.best = Some(BestCandidate {
                candidate: leader.clone(),
                generation: self.generation,
                segment: self.segment,
            });
        }

        self.generation += 1;
        self.remaining_budget = self.remaining_budget.saturating_sub(1);
    }
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: OptimizerConfig,
    rng: LayoutRng,
    evaluator: FitnessEvaluator,
    mutation: MutationOperator,
    steps: StepSizes,
    parents: Vec<Candidate>,
    state: RunState,
    history: EvolutionHistory,
    evaluations: u64,
}

impl EvolutionEngine {
    /// Create a new evolution engine, rejecting invalid configurations.
    pub fn new(config: OptimizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        log::debug!("optimizer seed: {seed}");

        let evaluator = FitnessEvaluator::from_config(&config);
        let mutation = MutationOperator::new(
            &config.room,
            config.fixture_count,
            config.mutation.max_retries,
        );

        Ok(Self {
            rng: LayoutRng::new(seed),
            evaluator,
            mutation,
            steps: StepSizes::new(config.mutation.initial_step_size),
            parents: Vec::new(),
            state: RunState::new(config.budget),
            history: EvolutionHistory::default(),
            evaluations: 0,
            config,
        })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Current mutation step sizes.
    pub fn step_sizes(&self) -> StepSizes {
        self.steps
    }

    /// Current run bookkeeping.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Current parent population.
    pub fn parents(&self) -> &[Candidate] {
        &self.parents
    }

    /// Reset run state and draw μ random parents.
    pub fn initialize(&mut self) {
        let room = self.config.room;
        let fixture_count = self.config.fixture_count;

        self.parents = (0..self.config.population.parents)
            .map(|_| Candidate {
                layout: self.rng.random_layout(&room, fixture_count),
                fitness: f64::NEG_INFINITY,
            })
            .collect();
        self.steps = StepSizes::new(self.config.mutation.initial_step_size);
        self.state = RunState::new(self.config.budget);
        self.history = EvolutionHistory::default();
        self.evaluations = 0;
    }

    /// Reset the step sizes and the segment tracker.
    fn begin_segment(&mut self) {
        self.steps.reset(self.config.mutation.initial_step_size);
        self.state.begin_segment();
        self.history.segment_starts.push(self.state.generation);
    }

    /// Produce λ mutated offspring from the current parents.
    ///
    /// Children are mutated in order, each one continuing from the step sizes
    /// the previous child left behind.
    fn breed(&mut self) -> Vec<Layout> {
        let mut children = Vec::with_capacity(self.config.population.offspring);
        let mut clamped = 0;

        for _ in 0..self.config.population.offspring {
            let first = self.rng.pick_index(self.parents.len());
            let second = self.rng.pick_index(self.parents.len());
            let parent = self.rng.recombine(
                &self.parents[first].layout,
                &self.parents[second].layout,
            );
            let mutated = self.rng.mutate(parent, &mut self.steps, &self.mutation);
            clamped += mutated.clamped;
            children.push(mutated.layout);
        }

        if clamped > 0 {
            log::warn!(
                "generation {}: {clamped} gene(s) exhausted {} retries and were clamped",
                self.state.generation,
                self.mutation.max_retries
            );
        }
        children
    }

    /// Score offspring sequentially.
    fn evaluate(&mut self, children: Vec<Layout>) -> Vec<Candidate> {
        self.evaluations += children.len() as u64;
        children
            .into_iter()
            .map(|layout| {
                let fitness = self.evaluator.evaluate(&layout);
                Candidate { layout, fitness }
            })
            .collect()
    }

    /// Run one generation: breed, evaluate, select, update trackers.
    fn step_generation(&mut self) {
        let children = self.breed();
        let offspring = self.evaluate(children);
        self.parents = select_survivors(offspring, self.config.population.parents);

        let leader = &self.parents[0];
        self.state.record_generation(leader);

        let avg_fitness =
            self.parents.iter().map(|c| c.fitness).sum::<f64>() / self.parents.len() as f64;
        self.history.best_fitness.push(leader.fitness);
        self.history.avg_fitness.push(avg_fitness);

        log::debug!(
            "generation {} (segment {}): best {:.3}, segment best {:.3}, stagnation {}",
            self.state.generation,
            self.state.segment,
            leader.fitness,
            self.state.segment_best_fitness,
            self.state.stagnation_count
        );
    }

    /// Get current progress.
    pub fn progress(&self, phase: EvolutionPhase) -> EvolutionProgress {
        EvolutionProgress {
            phase,
            generation: self.state.generation,
            segment: self.state.segment,
            remaining_budget: self.state.remaining_budget,
            best_fitness: self.state.best_fitness(),
            segment_best_fitness: self.state.segment_best_fitness,
            generation_best: last_or_neg_inf(&self.history.best_fitness),
            avg_fitness: last_or_neg_inf(&self.history.avg_fitness),
            stagnation_count: self.state.stagnation_count,
            step_sizes: self.steps.as_array(),
        }
    }

    /// Run evolution with progress callback.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> EvolutionResult
    where
        F: FnMut(&EvolutionProgress),
    {
        let start_time = Instant::now();
        self.initialize();

        log::info!(
            "optimizing {} fixtures in a {}x{} room: mu={}, lambda={}, budget={}",
            self.config.fixture_count,
            self.config.room.width,
            self.config.room.length,
            self.config.population.parents,
            self.config.population.offspring,
            self.config.budget
        );

        while self.state.remaining_budget > 0 {
            self.begin_segment();
            callback(&self.progress(EvolutionPhase::SegmentStarted));

            while self.state.remaining_budget > 0
                && self.state.stagnation_count < self.config.stagnation_limit
            {
                self.step_generation();
                callback(&self.progress(EvolutionPhase::Generation));
            }

            if self.state.remaining_budget > 0 {
                log::info!(
                    "segment {} stagnated after {} generations at {:.3}; restarting step sizes",
                    self.state.segment,
                    self.config.stagnation_limit,
                    self.state.segment_best_fitness
                );
                self.state.segment += 1;
            }
        }

        self.finish(start_time)
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(|_| {})
    }

    fn finish(&self, start_time: Instant) -> EvolutionResult {
        let elapsed = start_time.elapsed().as_secs_f64();

        // A validated config has a non-zero budget, so at least one generation ran.
        let best = match &self.state.best {
            Some(best) => best.clone(),
            None => BestCandidate {
                candidate: self.parents[0].clone(),
                generation: 0,
                segment: 0,
            },
        };
        let layout = best.candidate.layout;

        log::info!(
            "finished after {} generations in {} segment(s): best fitness {:.3}",
            self.state.generation,
            self.state.segment + 1,
            best.candidate.fitness
        );

        EvolutionResult {
            best: LayoutSnapshot {
                fitness: best.candidate.fitness,
                room: self.config.room,
                generation: best.generation,
                segment: best.segment,
                powered_count: layout.powered_count(),
                powered_watts: layout.powered_watts(),
                layout,
            },
            stats: EvolutionStats {
                generations: self.state.generation,
                segments: self.state.segment + 1,
                total_evaluations: self.evaluations,
                best_fitness: best.candidate.fitness,
                elapsed_seconds: elapsed,
                evaluations_per_second: if elapsed > 0.0 {
                    self.evaluations as f64 / elapsed
                } else {
                    0.0
                },
            },
            history: self.history.clone(),
        }
    }
}

fn last_or_neg_inf(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(f64::NEG_INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MutationConfig, PopulationConfig, RoomConfig};

    fn small_config(budget: u64) -> OptimizerConfig {
        OptimizerConfig {
            room: RoomConfig {
                width: 48,
                length: 36,
            },
            fixture_count: 3,
            population: PopulationConfig {
                parents: 4,
                offspring: 12,
                allow_cyclic_fill: false,
            },
            budget,
            random_seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_evolution_engine_creation() {
        let mut engine = EvolutionEngine::new(small_config(5)).unwrap();
        engine.initialize();

        assert_eq!(engine.parents().len(), 4);
        assert!(engine.parents().iter().all(|c| c.layout.len() == 3));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config(5);
        config.population.parents = 20;
        assert!(matches!(
            EvolutionEngine::new(config),
            Err(ConfigError::ParentsExceedOffspring { .. })
        ));
    }

    #[test]
    fn test_evolution_run() {
        let mut engine = EvolutionEngine::new(small_config(10)).unwrap();
        let result = engine.run();

        assert_eq!(result.stats.generations, 10);
        assert_eq!(result.stats.total_evaluations, 120);
        assert_eq!(result.history.best_fitness.len(), 10);
        assert_eq!(result.best.layout.len(), 3);
        assert_eq!(engine.state().remaining_budget, 0);

        let best_seen = result
            .history
            .best_fitness
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(result.best.fitness, best_seen);
    }

    #[test]
    fn test_single_generation_budget() {
        let config = OptimizerConfig {
            room: RoomConfig {
                width: 96,
                length: 96,
            },
            fixture_count: 1,
            population: PopulationConfig {
                parents: 1,
                offspring: 1,
                allow_cyclic_fill: false,
            },
            mutation: MutationConfig {
                initial_step_size: 2.0,
                ..Default::default()
            },
            budget: 1,
            random_seed: Some(9),
            ..Default::default()
        };
        let mut engine = EvolutionEngine::new(config).unwrap();
        let result = engine.run();

        assert_eq!(result.stats.generations, 1);
        assert_eq!(result.stats.segments, 1);
        assert_eq!(result.stats.total_evaluations, 1);
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let a = EvolutionEngine::new(small_config(15)).unwrap().run();
        let b = EvolutionEngine::new(small_config(15)).unwrap().run();

        assert_eq!(a.best.layout, b.best.layout);
        assert_eq!(a.best.fitness.to_bits(), b.best.fitness.to_bits());
        assert_eq!(a.history.best_fitness, b.history.best_fitness);
    }

    #[test]
    fn test_restart_resets_step_sizes() {
        // With the sensor grid empty (room narrower than one cell) only the
        // cost term varies, so the segment best can improve at most a handful
        // of times and a stagnation limit of 1 must trigger restarts.
        let mut config = small_config(30);
        config.room = RoomConfig {
            width: 10,
            length: 10,
        };
        config.fixture_count = 1;
        config.stagnation_limit = 1;
        let initial = config.mutation.initial_step_size;

        let mut engine = EvolutionEngine::new(config).unwrap();
        let mut reports = Vec::new();
        let result = engine.run_with_callback(|p| reports.push(p.clone()));

        let restarts: Vec<_> = reports
            .iter()
            .filter(|p| p.phase == EvolutionPhase::SegmentStarted && p.segment > 0)
            .collect();
        assert!(!restarts.is_empty());
        assert_eq!(result.stats.segments, restarts.len() + 1);
        for report in restarts {
            assert_eq!(report.step_sizes, [initial; 4]);
            assert_eq!(report.stagnation_count, 0);
            assert_eq!(report.segment_best_fitness, f64::NEG_INFINITY);
        }
        assert_eq!(result.history.segment_starts.len(), result.stats.segments);
    }

    #[test]
    fn test_progress_reports_every_generation() {
        let mut engine = EvolutionEngine::new(small_config(6)).unwrap();
        let mut generations = Vec::new();
        engine.run_with_callback(|p| {
            if p.phase == EvolutionPhase::Generation {
                generations.push((p.generation, p.remaining_budget));
            }
        });

        assert_eq!(
            generations,
            vec![(1, 5), (2, 4), (3, 3), (4, 2), (5, 1), (6, 0)]
        );
    }

    #[test]
    fn test_cyclic_fill_run() {
        let mut config = small_config(3);
        config.population = PopulationConfig {
            parents: 8,
            offspring: 3,
            allow_cyclic_fill: true,
        };
        let mut engine = EvolutionEngine::new(config).unwrap();
        let result = engine.run();

        assert_eq!(engine.parents().len(), 8);
        assert_eq!(result.stats.total_evaluations, 9);
    }
}
