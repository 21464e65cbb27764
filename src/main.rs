use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cred_score::config;
use cred_score::output::{self, RankedSubject};
use cred_score::scoring::{self, CalculationElement, Inputs, ScoreCalculation};

const EXIT_SUCCESS: i32 = 0;
const EXIT_EVALUATION: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the scoring config (default if no subcommand)
    Check,
    /// Score a single subject
    Score {
        /// YAML or JSON file of input values
        #[arg(short, long)]
        inputs: Option<PathBuf>,

        /// Set an input value, e.g. --set "Account Age=400" (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,

        /// Show per-factor contributions
        #[arg(short, long)]
        breakdown: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score a list of subjects and print them ranked by score
    Rank {
        /// YAML or JSON file with a list of {subject, inputs}
        #[arg(short, long)]
        inputs: PathBuf,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Print the compiled calculation tree
    Tree {
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "cred-score")]
#[command(about = "Credibility score calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/cred-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{}' for '{}'", value.trim(), name.trim()))?;
    Ok((name.trim().to_string(), value))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Check);
    let config_path = cli.config.map(PathBuf::from);

    let code = match command {
        Commands::Init { force } => run_init(config_path, force),
        command => match load_calculation(config_path) {
            Ok(calculation) => run_command(command, &calculation),
            Err(code) => code,
        },
    };

    std::process::exit(code);
}

fn run_init(config_path: Option<PathBuf>, force: bool) -> i32 {
    let path = match config_path.map_or_else(config::get_config_path, Ok) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            return EXIT_CONFIG;
        }
    };

    match config::write_default_config(&path, force) {
        Ok(()) => {
            println!("Wrote starter config to {}", path.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            EXIT_CONFIG
        }
    }
}

/// Load, validate and compile the scoring config, reporting every problem.
fn load_calculation(config_path: Option<PathBuf>) -> Result<ScoreCalculation, i32> {
    let scoring_config = config::load_config(config_path).map_err(|e| {
        eprintln!("Config error: {:#}", e);
        EXIT_CONFIG
    })?;

    // Validate scoring config at startup
    if let Err(errors) = scoring::validate_scoring(&scoring_config) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(EXIT_CONFIG);
    }

    ScoreCalculation::compile(&scoring_config).map_err(|e| {
        eprintln!("Scoring config error: {}", e);
        EXIT_CONFIG
    })
}

fn run_command(command: Commands, calculation: &ScoreCalculation) -> i32 {
    match command {
        Commands::Check => run_check(calculation),
        Commands::Tree { json } => {
            if json {
                print_json(&calculation.root)
            } else {
                println!("{}", output::format_tree(&calculation.root));
                EXIT_SUCCESS
            }
        }
        Commands::Score {
            inputs,
            set,
            breakdown,
            json,
        } => run_score(calculation, inputs, set, breakdown, json),
        Commands::Rank { inputs, tsv } => run_rank(calculation, inputs, tsv),
        Commands::Init { .. } => EXIT_SUCCESS,
    }
}

fn run_check(calculation: &ScoreCalculation) -> i32 {
    for element in &calculation.catalog {
        if let CalculationElement::LookupInterval(lookup) = element {
            for warning in scoring::partition_warnings(lookup) {
                eprintln!("Warning: {}", warning);
            }
        }
    }

    let referenced = calculation.referenced_elements().len();
    println!(
        "Config OK: {} fragment(s), {} of {} element(s) referenced",
        calculation.root.children.len(),
        referenced,
        calculation.catalog.len()
    );
    EXIT_SUCCESS
}

fn run_score(
    calculation: &ScoreCalculation,
    inputs_path: Option<PathBuf>,
    overrides: Vec<(String, f64)>,
    breakdown: bool,
    json: bool,
) -> i32 {
    let mut inputs = Inputs::new();

    if let Some(path) = inputs_path {
        let mut subjects = match config::load_inputs(&path) {
            Ok(file) => file.into_subjects(),
            Err(e) => {
                eprintln!("Input error: {:#}", e);
                return EXIT_INPUT;
            }
        };
        if subjects.len() != 1 {
            eprintln!(
                "{} contains {} subjects. Use `cred-score rank` to score several at once.",
                path.display(),
                subjects.len()
            );
            return EXIT_INPUT;
        }
        if let Some(subject) = subjects.pop() {
            inputs.extend(subject.inputs);
        }
    }
    inputs.extend(overrides);

    let result = match scoring::calculate_score(calculation, &inputs) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Evaluation error: {}", e);
            return EXIT_EVALUATION;
        }
    };

    if json {
        return print_json(&result);
    }
    if breakdown {
        println!(
            "{}",
            output::format_breakdown(&result, output::should_use_colors())
        );
    } else {
        println!("{}", result.score);
    }
    EXIT_SUCCESS
}

fn run_rank(calculation: &ScoreCalculation, inputs_path: PathBuf, tsv: bool) -> i32 {
    let subjects = match config::load_inputs(&inputs_path) {
        Ok(file) => file.into_subjects(),
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };

    // The compiled tree is shared read-only across workers
    let results: Vec<_> = subjects
        .par_iter()
        .map(|subject| (subject, calculation.evaluate(&subject.inputs)))
        .collect();

    let mut ranked = Vec::with_capacity(results.len());
    let mut any_failed = false;
    for (subject, result) in &results {
        match result {
            Ok(score) => ranked.push(RankedSubject {
                subject: &subject.subject,
                score: *score,
            }),
            Err(e) => {
                eprintln!("Evaluation error for {}: {}", subject.subject, e);
                any_failed = true;
            }
        }
    }

    output::rank_subjects(&mut ranked);

    if tsv {
        println!("{}", output::format_tsv(&ranked));
    } else {
        println!(
            "{}",
            output::format_ranked_table(&ranked, output::should_use_colors())
        );
    }

    if any_failed {
        EXIT_EVALUATION
    } else {
        EXIT_SUCCESS
    }
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            EXIT_EVALUATION
        }
    }
}
