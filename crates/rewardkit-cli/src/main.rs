//! `rewardkit` command line.
//!
//! Loads the reward function selected by a training configuration and
//! verifies, scores or lists what the registry provides.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rewardkit_core::{
    evaluate_solution, gsm8k_smoke_cases, load_and_verify_with, CaseFile, RewardConfig,
    RewardError, RewardRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "rewardkit", version, about = "Load and verify RL reward functions")]
struct Cli {
    /// Enable debug logging (per-sample extraction traces)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the configured reward function and run test cases against it
    Verify {
        /// Training configuration (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Case file; the built-in GSM8K smoke cases are used when omitted
        #[arg(long)]
        cases: Option<PathBuf>,

        /// Print the verification report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a single solution
    Score {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        solution: String,

        #[arg(short, long)]
        ground_truth: String,
    },

    /// List registered reward modules and their functions
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<()> {
    let registry = RewardRegistry::with_defaults();

    match command {
        Command::Verify {
            config,
            cases,
            json,
        } => verify(&registry, &config, cases.as_deref(), json),
        Command::Score {
            config,
            solution,
            ground_truth,
        } => {
            let config = read_config(&config)?;
            let reward_fn = registry.load(&config)?;
            let reward = evaluate_solution(reward_fn.as_ref(), &solution, &ground_truth);
            println!("{}", reward);
            Ok(())
        }
        Command::List => {
            for path in registry.available_paths() {
                if let Some(module) = registry.get_module(path) {
                    println!("{}  {}", path, module.description());
                    for symbol in module.symbols() {
                        println!("  - {}", symbol);
                    }
                }
            }
            Ok(())
        }
    }
}

fn verify(
    registry: &RewardRegistry,
    config_path: &Path,
    cases_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = read_config(config_path)?;

    let cases = match cases_path {
        Some(path) => {
            CaseFile::from_file(path)
                .with_context(|| format!("reading cases from {}", path.display()))?
                .cases
        }
        None => gsm8k_smoke_cases(),
    };

    tracing::info!(
        path = config.path(),
        name = config.name(),
        cases = cases.len(),
        "Verifying reward function"
    );

    let (_, report) = match load_and_verify_with(registry, &config, &cases) {
        Ok(loaded) => loaded,
        Err(RewardError::Verification(failure)) => {
            return Err(failure).context("reward function verification failed");
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.outcomes {
            match outcome.expected {
                Some(expected) => println!(
                    "ok    {}  reward={} expected={}",
                    outcome.name, outcome.reward, expected
                ),
                None => println!("run   {}  reward={}", outcome.name, outcome.reward),
            }
        }
        println!(
            "{} cases, {} checked, all passed",
            report.outcomes.len(),
            report.checked()
        );
    }

    Ok(())
}

fn read_config(path: &Path) -> Result<RewardConfig> {
    RewardConfig::from_file(path)
        .with_context(|| format!("reading reward config from {}", path.display()))
}
