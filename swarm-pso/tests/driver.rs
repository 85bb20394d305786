//! Entry point and binary behavior.

use std::process::Command;

use swarm_pso::prelude::*;

fn swarm_pso(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_swarm_pso"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("spawn swarm_pso")
}

#[test]
fn rastrigin_reaches_the_basin_of_the_global_minimum() {
    let best = run_optimization("rastrigin", 2, 200, -5.12, 5.12, 500, 4).unwrap();
    assert!(best.fitness < 1.0, "best fitness {}", best.fitness);
    assert!(best.index < 200);
    assert_eq!(best.position.len(), 2);
}

#[test]
fn every_benchmark_name_is_accepted() {
    for benchmark in Benchmark::ALL {
        let dim = benchmark.fixed_dimension().unwrap_or(3);
        let (xmin, xmax) = benchmark.domain();
        let best = run_optimization(benchmark.name(), dim, 12, xmin, xmax, 5, 2).unwrap();
        assert_eq!(best.fitness, benchmark.evaluate(&best.position));
    }
}

#[test]
fn unknown_function_fails_at_the_boundary() {
    assert_eq!(
        run_optimization("ackley", 2, usize::MAX, -1.0, 1.0, 10, 1),
        Err(Error::UnknownFunction("ackley".into()))
    );
}

#[test]
fn fixed_dimension_functions_reject_other_dimensions() {
    assert!(matches!(
        run_optimization("holder_table", 3, 10, -10.0, 10.0, 10, 1),
        Err(Error::InvalidDimensionForFunction { expected: 2, dim: 3, .. })
    ));
    assert!(matches!(
        run_optimization("booth", 1, 10, -10.0, 10.0, 10, 1),
        Err(Error::InvalidDimensionForFunction { expected: 2, dim: 1, .. })
    ));
}

#[test]
fn eggholder_runs_above_two_dimensions() {
    let best = run_optimization("eggholder", 3, 10, -512.0, 512.0, 10, 2).unwrap();
    assert_eq!(best.position.len(), 3);
    assert!(matches!(
        run_optimization("eggholder", 1, 10, -512.0, 512.0, 10, 2),
        Err(Error::InvalidDimensionForFunction { expected: 2, dim: 1, .. })
    ));
}

#[test]
fn binary_prints_a_json_report() {
    let out = swarm_pso(&["booth", "2", "40", "-10", "10", "50", "2", "--seed", "3", "--json"]);
    assert!(out.status.success());
    let report: RunReport = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report.function, Benchmark::Booth);
    assert_eq!(report.seed, 3);
    assert_eq!(report.workers, 2);
    assert_eq!(report.history.len(), 50);
}

#[test]
fn binary_exit_codes() {
    assert_eq!(swarm_pso(&[]).status.code(), Some(2));
    assert_eq!(swarm_pso(&["booth", "2"]).status.code(), Some(2));
    assert_eq!(
        swarm_pso(&["booth", "two", "40", "-10", "10", "50", "2"]).status.code(),
        Some(2)
    );
    assert_eq!(
        swarm_pso(&["sphere", "2", "40", "-10", "10", "50", "2"]).status.code(),
        Some(1)
    );
    assert_eq!(
        swarm_pso(&["booth", "2", "40", "10", "-10", "50", "2"]).status.code(),
        Some(1)
    );
}

#[test]
fn binary_writes_a_loadable_report() {
    let path = std::env::temp_dir().join(format!("swarm_pso_out_{}.json", std::process::id()));
    let path_arg = path.to_string_lossy().into_owned();
    let out = swarm_pso(&[
        "rastrigin", "3", "20", "-5.12", "5.12", "15", "2", "--seed", "12", "--out", path_arg.as_str(),
    ]);
    assert!(out.status.success());
    let loaded = swarm_pso::report::load_report(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.function, Benchmark::Rastrigin);
    assert_eq!(loaded.dim, 3);
    assert_eq!(loaded.seed, 12);
    assert_eq!(loaded.history.len(), 15);
}

#[test]
fn binary_out_needs_a_path() {
    assert_eq!(
        swarm_pso(&["booth", "2", "40", "-10", "10", "5", "1", "--out"]).status.code(),
        Some(2)
    );
}

#[test]
fn bounds_wider_than_a_finite_span_are_rejected() {
    assert_eq!(
        run_optimization("rastrigin", 2, 8, -1e308, 1e308, 10, 2),
        Err(Error::InvalidParameter("domain width must be finite"))
    );
}
