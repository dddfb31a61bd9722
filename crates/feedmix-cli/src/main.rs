use clap::{Parser, Subcommand};
use feedmix_plan::{Outcome, Pipeline, PlanConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "feedmix")]
#[command(about = "Integer production planning for items sharing one resource", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the plan, print the report and write the chart
    Solve {
        /// JSON config file; defaults are used when absent
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Parameter sheet, overrides the config
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Chart image, overrides the config
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Resource budget, overrides the sheet and the config
        #[arg(short, long)]
        budget: Option<f64>,
        /// Show objective, resource use and binding constraints
        #[arg(short, long)]
        analysis: bool,
    },
    /// Read the sheet and build the model without solving
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print the default config as JSON
    Config,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>, input: Option<PathBuf>) -> PlanConfig {
    let mut config = match path {
        Some(path) => match PlanConfig::load(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        },
        None => PlanConfig::default(),
    };
    if let Some(input) = input {
        config.input_path = input;
    }
    config
}

fn print_analysis(outcome: &Outcome) {
    println!();
    println!("Analysis:");
    println!("  Total profit:   {:.2}", outcome.report.objective_value);
    println!(
        "  Resource used:  {:.2} of {:.2}",
        outcome.resource_used(),
        outcome.problem.resource_budget()
    );
    if !outcome.solution.binding_constraints.is_empty() {
        println!();
        println!("Binding constraints:");
        for name in &outcome.solution.binding_constraints {
            println!("  - {}", name);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            config,
            input,
            output,
            budget,
            analysis,
        } => {
            let mut config = load_config(config, input);
            if let Some(output) = output {
                config.output_path = output;
            }
            if budget.is_some() {
                config.resource_budget = budget;
            }

            let output_path = config.output_path.clone();
            let outcome = match Pipeline::new(config).run() {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            print!("{}", outcome.report);
            if analysis {
                print_analysis(&outcome);
            }
            println!();
            println!("Chart written to {}", output_path.display());
        }
        Commands::Check { config, input } => {
            let pipeline = Pipeline::new(load_config(config, input));

            let problem = match pipeline
                .load_parameters()
                .and_then(|parameters| pipeline.build(&parameters))
            {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            println!("✓ {} is valid", pipeline.config().input_path.display());
            println!("  Resource budget: {}", problem.resource_budget());
            println!("  Items: {}", problem.items().len());
            for item in problem.items() {
                println!(
                    "    {:12} profit {:>8} rate {:>8} caps {} / {}",
                    item.name, item.unit_profit, item.resource_rate, item.capacity_cap, item.forecast_cap
                );
            }
            println!("  Constraints: {}", problem.lp().num_constraints());
        }
        Commands::Config => match serde_json::to_string_pretty(&PlanConfig::default()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}
