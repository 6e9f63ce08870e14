//! Quick optimizer performance test

use light_placement::{
    EvolutionEngine, OptimizerConfig, RoomConfig, ScoringMode, schema::PopulationConfig,
};
use std::time::Instant;

fn main() {
    println!("=== Optimizer Performance Test ===\n");

    // Test different room sizes
    for size in [48, 96, 192] {
        println!("Room size: {}x{}", size, size);

        let config = OptimizerConfig {
            room: RoomConfig {
                width: size,
                length: size,
            },
            fixture_count: 14,
            population: PopulationConfig {
                parents: 20,
                offspring: 200,
                ..Default::default()
            },
            budget: 50,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config).expect("valid config");
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", result.stats.generations);
        println!("  Segments:       {}", result.stats.segments);
        println!("  Evaluations:    {}", total_evals);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best fitness:   {:.4}", result.stats.best_fitness);
        println!("  Powered:        {}", result.best.powered_count);
        println!();
    }

    println!("=== Scoring Mode Comparison (96x96 room) ===\n");

    for scoring in [ScoringMode::Subtractive, ScoringMode::Divisive] {
        let config = OptimizerConfig {
            fixture_count: 14,
            population: PopulationConfig {
                parents: 20,
                offspring: 200,
                ..Default::default()
            },
            budget: 50,
            scoring,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config).expect("valid config");
        let result = engine.run();

        println!(
            "{:?}: best {:.4} with {} fixtures / {} W in {:.2}s",
            scoring,
            result.best.fitness,
            result.best.powered_count,
            result.best.powered_watts,
            start.elapsed().as_secs_f64()
        );
    }
}
