//! te-sim: run the weight tuning loop on a scenario file.
//!
//! ```bash
//! te-sim run demos/seven_node.json
//! te-sim run demos/seven_node.json --max-iterations 5 --json
//! te-sim paths demos/seven_node.json
//! te-sim generate --nodes 6 --seed 42 > scenario.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use te_sim::traffic_engineering::generator::random_scenario;
use te_sim::traffic_engineering::{compute_paths_with, ExhaustiveKPaths, IterationReport, OptimizationReport};
use te_sim::{Matrix, Optimizer, Scenario};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "te-sim")]
#[command(version)]
#[command(about = "Traffic engineering by IGP weight tuning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tune weights until no link is congested
    Run {
        /// Scenario file (JSON)
        scenario: PathBuf,
        /// Override the iteration budget from the scenario
        #[arg(long, env = "TE_SIM_MAX_ITERATIONS")]
        max_iterations: Option<usize>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the candidate paths for the initial weights
    Paths {
        /// Scenario file (JSON)
        scenario: PathBuf,
    },
    /// Write a random connected scenario to stdout
    Generate {
        #[arg(long, default_value_t = 6)]
        nodes: usize,
        /// Probability that two non-consecutive nodes are linked
        #[arg(long, default_value_t = 0.4)]
        density: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn print_paths(report: &IterationReport) {
    println!("{:<10} {:<60} {}", "Pair", "All paths", "K-shortest paths");
    for pair in report.paths.iter() {
        let all: Vec<String> = pair.all_paths.iter().map(|p| p.to_string()).collect();
        let k: Vec<String> = pair.k_paths.iter().map(|p| p.to_string()).collect();
        println!("{:<10} {:<60} {}", format!("{} → {}", pair.src, pair.dst), all.join("; "), k.join("; "));
    }
}

fn print_iteration(report: &IterationReport, show_paths: bool) {
    println!("\nIteration {}", report.iteration);
    if show_paths {
        print_paths(report);
    }
    println!("{:<10} {:<10} {:<12} {:<12} {:<10} {:<10}", "Link", "Load", "Capacity", "Utilization", "Status", "Fortz");
    for stat in report.congestion.links.iter() {
        println!(
            "{:<10} {:<10.2} {:<12} {:<12.2} {:<10} {:<10}",
            stat.link.to_string(), stat.load, stat.capacity, stat.utilization, stat.status(), stat.fortz_cost
        );
    }
    println!("Total Fortz cost: {}", report.congestion.total_fortz_cost);
    println!("Phi: {:.2}", report.congestion.phi);
    for adjustment in report.adjustments.iter() {
        println!(
            "link {} +{:.2}, detour {}",
            adjustment.link, adjustment.delta, adjustment.alternate
        );
    }
    if !report.adjustments.is_empty() {
        if let Ok(weights) = Matrix::from_rows(&report.weights_after) {
            println!("Adjusted weights:\n{weights}");
        }
    }
}

fn print_summary(report: &OptimizationReport) {
    println!("\nState: {:?} after {} iterations", report.state, report.iterations);
    println!("MLU = {:.2}", report.summary.mlu);
    println!("{:?}", report.summary.utilizations);
    println!("{:?}", report.summary.fortz_costs);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { scenario, max_iterations, json } => {
            let scenario = Scenario::load(&scenario)?;
            let topology = scenario.topology()?;
            let mut config = scenario.optimizer.clone();
            if let Some(max_iterations) = max_iterations {
                config.max_iterations = max_iterations;
            }
            tracing::info!(nodes = topology.nodes().len(), demands = topology.demand().len(), "loaded scenario");
            let show_paths = config.report_all_paths;
            let optimizer = Optimizer::new(&topology, config);
            if json {
                let report = optimizer.run(&mut |_: &IterationReport| {});
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let report = optimizer.run(&mut |r: &IterationReport| print_iteration(r, show_paths));
                print_summary(&report);
            }
        }
        Commands::Paths { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let topology = scenario.topology()?;
            let strategy = ExhaustiveKPaths::new(scenario.optimizer.max_paths);
            let table = compute_paths_with(&topology.graph(), topology.nodes(), &strategy, scenario.optimizer.k);
            for ((src, dst), paths) in table.k_paths.iter() {
                let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
                println!("{src} → {dst}: {}", paths.join("; "));
            }
        }
        Commands::Generate { nodes, density, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            let scenario = random_scenario(&mut rng, nodes, density)?;
            println!("{}", scenario.to_json()?);
        }
    }
    Ok(())
}
