//! Light placement CLI - Optimize a room layout from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::time::Instant;

use light_placement::{
    EvolutionEngine, OptimizerConfig,
    schema::{EvolutionPhase, EvolutionResult},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Optimize ceiling light placement from a JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to optimizer configuration file");
        eprintln!();
        eprintln!("Run with --example to print a default configuration.");
        std::process::exit(1);
    }

    let config_path = PathBuf::from(&args[1]);
    let config = OptimizerConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {}", config_path.display(), e);
        std::process::exit(1);
    });

    println!("Light Placement Optimizer");
    println!("=========================");
    println!(
        "Room: {}\"x{}\" ({} fixtures)",
        config.room.width, config.room.length, config.fixture_count
    );
    println!(
        "Population: mu={}, lambda={}",
        config.population.parents, config.population.offspring
    );
    println!("Initial step size: {}", config.mutation.initial_step_size);
    println!("Budget: {} generations", config.budget);
    println!("Scoring: {:?}", config.scoring);
    println!();

    let budget = config.budget;
    let report_every = (budget / 10).max(1);

    let mut engine = EvolutionEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    println!("Running optimizer...");
    let start = Instant::now();

    let result = engine.run_with_callback(|progress| match progress.phase {
        EvolutionPhase::SegmentStarted if progress.segment > 0 => {
            println!(
                "  Restart {} at generation {}",
                progress.segment, progress.generation
            );
        }
        EvolutionPhase::Generation if progress.generation as u64 % report_every == 0 => {
            println!(
                "  Generation {}/{}: best={:.3}, segment best={:.3}, stagnation={}",
                progress.generation,
                budget,
                progress.best_fitness,
                progress.segment_best_fitness,
                progress.stagnation_count
            );
        }
        _ => {}
    });

    println!();
    print_result(&result);
    println!(
        "Time: {:.2}s ({:.1} evaluations/s)",
        start.elapsed().as_secs_f32(),
        result.stats.evaluations_per_second
    );
}

fn print_result(result: &EvolutionResult) {
    let best = &result.best;

    println!(
        "Best solution for {}\"x{}\" room: {{",
        best.room.width, best.room.length
    );
    for (i, fixture) in best.layout.iter().enumerate() {
        if fixture.is_on() {
            println!(
                "  Light {}: x={}\t y={}\t W={}",
                i + 1,
                fixture.x(),
                fixture.y(),
                fixture.watts()
            );
        }
    }
    println!("}} = {}", best.fitness);
    println!();
    println!(
        "Powered: {} fixtures, {} W total",
        best.powered_count, best.powered_watts
    );
    println!(
        "Found in generation {} (segment {}) of {} across {} segment(s)",
        best.generation + 1,
        best.segment + 1,
        result.stats.generations,
        result.stats.segments
    );
}

fn print_example_config() {
    let config = OptimizerConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
