use std::path::PathBuf;
use std::str::FromStr;

use swarm_pso::{report, Benchmark, OptimizerConfig};
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: swarm_pso <function> <dim> <swarm_size> <xmin> <xmax> <max_iter> <workers> [--seed N] [--json] [--out PATH]"
    );
    eprintln!();
    eprintln!("Functions: booth, rastrigin, holder_table, eggholder, schwefel");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  swarm_pso rastrigin 2 200 -5.12 5.12 500 4");
    std::process::exit(2);
}

fn parse<T: FromStr>(arg: &str, what: &str) -> T {
    arg.parse().unwrap_or_else(|_| {
        eprintln!("error: invalid {what}: {arg:?}");
        usage()
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1).collect::<Vec<_>>();

    let mut seed = None;
    let mut json = false;
    let mut out_path = None;
    let mut positional = Vec::new();
    while !args.is_empty() {
        let arg = args.remove(0);
        match arg.as_str() {
            "--json" => json = true,
            "--seed" => {
                if args.is_empty() {
                    usage();
                }
                seed = Some(parse::<u64>(&args.remove(0), "seed"));
            }
            "--out" => {
                if args.is_empty() {
                    usage();
                }
                out_path = Some(PathBuf::from(args.remove(0)));
            }
            "-h" | "--help" => usage(),
            _ => positional.push(arg),
        }
    }
    if positional.len() != 7 {
        usage();
    }

    let function = match Benchmark::from_str(&positional[0]) {
        Ok(function) => function,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let mut builder = OptimizerConfig::builder()
        .function(function)
        .dim(parse(&positional[1], "dimension"))
        .swarm_size(parse(&positional[2], "swarm size"))
        .bounds(parse(&positional[3], "xmin"), parse(&positional[4], "xmax"))
        .max_iterations(parse(&positional[5], "iteration count"));
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    let workers: usize = parse(&positional[6], "worker count");

    let run = match swarm_pso::run_with_config(builder.build(), workers) {
        Ok(run) => run,
        Err(e) => {
            tracing::error!(error = %e, "optimization failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if json {
        match report::render_json(&run) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", report::render_text(&run));
    }

    if let Some(path) = out_path {
        if let Err(e) = report::write_report(&run, &path) {
            eprintln!("error: {}: {e}", path.display());
            std::process::exit(1);
        }
        tracing::info!(path = %path.display(), "report written");
    }
}
