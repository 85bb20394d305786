//! Rastrigin Example
//!
//! Minimizes the 2-D Rastrigin function with the default coefficients and
//! prints how the global best improves.

use swarm_pso::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("SwarmPSO Rastrigin Example");
    println!("==========================");

    let config = OptimizerConfig::builder()
        .function(Benchmark::Rastrigin)
        .dim(2)
        .swarm_size(200)
        .max_iterations(500)
        .seed(42)
        .build();

    println!("Configuration:");
    println!("  Particles: {}", config.swarm_size);
    println!("  Domain: [{}, {}]", config.xmin, config.xmax);
    println!("  Coefficients: {:?}", config.coefficients);

    let report = run_with_config(config, 4)?;

    for (iteration, fitness) in report.history.iter().enumerate().step_by(100) {
        println!("  iteration {iteration:>4}: {fitness:.6}");
    }
    println!(
        "\nBest particle {} at {:?} with fitness {:.3e}",
        report.best_index, report.best_position, report.best_fitness
    );

    Ok(())
}
