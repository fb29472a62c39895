// CLI entry point for the `replan` scenario runner.
//
// Loads a scenario JSON file, runs it, and prints a one-screen summary of
// the agent's trail. Progress is logged through `tracing`; set `RUST_LOG`
// to override the default `replan=info` filter.
//
// Usage:
//   replan <SCENARIO.json> [OPTIONS]
//     --max-steps <N>   Override the scenario's step limit
//     --quiet           Log warnings only

use replan_scenario::{ScenarioConfig, run};
use tracing_subscriber::EnvFilter;

struct CliArgs {
    scenario: String,
    max_steps: Option<usize>,
    quiet: bool,
}

fn main() {
    let args = parse_args();

    let default_directive = if args.quiet {
        "replan=warn"
    } else {
        "replan=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_directive)
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match ScenarioConfig::load(&args.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", args.scenario);
            std::process::exit(1);
        }
    };
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }

    let report = match run(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Scenario failed: {e}");
            std::process::exit(1);
        }
    };

    let trail: Vec<String> = report.trail.iter().map(ToString::to_string).collect();
    println!("Trail: {}", trail.join(" -> "));
    println!("Moves: {}", report.moves());
    println!("Travelled cost: {}", report.travelled_cost);
    println!("Replans: {} ({} expansions)", report.replans, report.expansions);
    if report.reached_goal {
        println!("Reached goal {}", config.goal);
    } else {
        println!(
            "Stopped at {} without reaching goal {} (remaining cost: {})",
            report.trail.last().copied().unwrap_or(config.start),
            config.goal,
            report.final_path.total_cost()
        );
        std::process::exit(2);
    }
}

/// Parse command-line arguments with plain `std::env::args()` matching.
fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut scenario = None;
    let mut max_steps = None;
    let mut quiet = false;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--max-steps" => {
                i += 1;
                max_steps = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--max-steps requires a valid number");
                    std::process::exit(1);
                }));
            }
            "--quiet" | "-q" => quiet = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            path => {
                if scenario.replace(path.to_string()).is_some() {
                    eprintln!("Only one scenario file may be given");
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let Some(scenario) = scenario else {
        print_usage();
        std::process::exit(1);
    };
    CliArgs {
        scenario,
        max_steps,
        quiet,
    }
}

fn print_usage() {
    println!("Usage: replan <SCENARIO.json> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --max-steps <N>   Override the scenario's step limit");
    println!("  --quiet, -q       Log warnings only");
    println!("  --help, -h        Show this help");
}
