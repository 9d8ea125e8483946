//! Battle simulator command line.
//!
//! # Usage
//!
//! ```bash
//! # Resolve the built-in skirmish and print reports
//! cargo run -p battle_tools -- run --messages
//!
//! # Resolve a scenario and save the battle record
//! cargo run -p battle_tools -- run --scenario scenarios/convoy_raid.ron --save raid.bin
//!
//! # Resolve many scenarios in parallel
//! cargo run -p battle_tools -- batch crates/battle_tools/scenarios/*.ron --output results/batch.json
//!
//! # Check that a scenario always resolves identically
//! cargo run -p battle_tools -- verify --scenario scenarios/skirmish.ron --runs 16
//!
//! # Print a saved record
//! cargo run -p battle_tools -- replay --file raid.bin --round 2
//! ```
//!
//! Logs go to stderr; results go to stdout (as JSON with `--json`).

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use battle_core::record::BattleRecord;
use battle_tools::{
    batch::{run_batch, verify_scenario},
    messages::{battle_messages, describe_action, describe_record},
    scenario::{Scenario, ScenarioError},
    validate::validate_data_directory,
};

#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Deterministic tactical battle simulator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single battle
    Run {
        /// Scenario file (built-in skirmish when omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Save the battle record to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print per-player battle reports
        #[arg(long)]
        messages: bool,
    },

    /// Resolve many scenario files in parallel
    Batch {
        /// Scenario files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write results JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by resolving a scenario many times
    Verify {
        /// Scenario file (built-in skirmish when omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of verification runs
        #[arg(short, long, default_value = "8")]
        runs: usize,
    },

    /// Validate scenario and rules files
    Validate {
        /// Path to data directory
        #[arg(default_value = "crates/battle_tools/scenarios")]
        path: PathBuf,
    },

    /// Print a saved battle record
    Replay {
        /// Record file path
        #[arg(short, long)]
        file: PathBuf,

        /// Only print this round
        #[arg(long)]
        round: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    let result = match cli.command {
        Commands::Run {
            scenario,
            save,
            messages,
        } => cmd_run(scenario, save, messages, json),
        Commands::Batch { inputs, output } => cmd_batch(&inputs, output, json),
        Commands::Verify { scenario, runs } => cmd_verify(scenario, runs, json),
        Commands::Validate { path } => cmd_validate(&path, json),
        Commands::Replay { file, round } => cmd_replay(&file, round, json),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn load_scenario(path: Option<PathBuf>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(path) => Scenario::load(path),
        None => Ok(Scenario::skirmish()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ScenarioError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{text}");
    Ok(())
}

/// Resolve a single battle
fn cmd_run(
    scenario: Option<PathBuf>,
    save: Option<PathBuf>,
    messages: bool,
    json: bool,
) -> Result<(), ScenarioError> {
    let scenario = load_scenario(scenario)?;
    let outcome = scenario.resolve()?;

    if let Some(path) = save {
        outcome.record.save(&path)?;
        tracing::info!(path = %path.display(), "Saved battle record");
    }

    let reports = if messages {
        battle_messages(&scenario.name, &outcome)
    } else {
        Vec::new()
    };

    if json {
        #[derive(Serialize)]
        struct RunOutput<'a> {
            scenario: &'a str,
            record_hash: u64,
            stats: &'a battle_core::record::BattleStats,
            surviving_players: Vec<battle_core::fleet::PlayerId>,
            messages: &'a [battle_tools::messages::BattleMessage],
        }
        return print_json(&RunOutput {
            scenario: &scenario.name,
            record_hash: outcome.record.record_hash(),
            stats: &outcome.record.stats,
            surviving_players: outcome.surviving_players(),
            messages: &reports,
        });
    }

    let stats = &outcome.record.stats;
    println!("{}", scenario.name);
    println!("  rounds fought: {}", stats.rounds_fought);
    println!("  actions:       {}", outcome.record.action_count());
    for (player, lost) in &stats.ships_lost {
        println!("  player {player} lost {lost} ship(s)");
    }
    println!("  survivors:     {:?}", outcome.surviving_players());
    println!("  record hash:   {:016x}", outcome.record.record_hash());

    for message in &reports {
        println!();
        println!("To player {}: {}", message.player, message.subject);
        for line in &message.body {
            println!("  {line}");
        }
    }
    Ok(())
}

/// Resolve many scenario files in parallel
fn cmd_batch(inputs: &[PathBuf], output: Option<PathBuf>, json: bool) -> Result<(), ScenarioError> {
    let results = run_batch(inputs);

    if let Some(path) = output {
        results.save(&path)?;
        tracing::info!(path = %path.display(), "Saved batch results");
    }

    if json {
        print_json(&results)?;
    } else {
        for entry in &results.entries {
            println!(
                "{:<32} rounds={:<3} actions={:<5} survivors={:?} hash={:016x}",
                entry.name, entry.rounds, entry.actions, entry.surviving_players, entry.record_hash
            );
        }
    }

    if results.is_success() {
        Ok(())
    } else {
        Err(ScenarioError::Invalid(format!(
            "{} of {} scenarios failed",
            results.errors.len(),
            inputs.len()
        )))
    }
}

/// Verify determinism
fn cmd_verify(scenario: Option<PathBuf>, runs: usize, json: bool) -> Result<(), ScenarioError> {
    let scenario = load_scenario(scenario)?;
    let report = verify_scenario(&scenario, runs)?;

    if json {
        print_json(&report)?;
    } else if let Some(hash) = report.hashes.first() {
        println!("{}: {} runs, hash {hash:016x}", report.scenario, report.hashes.len());
    }

    if report.is_deterministic() {
        tracing::info!(runs, "Determinism verified");
        Ok(())
    } else {
        Err(ScenarioError::Invalid(format!(
            "{} produced differing records: {:?}",
            report.scenario, report.hashes
        )))
    }
}

/// Validate data files
fn cmd_validate(path: &Path, json: bool) -> Result<(), ScenarioError> {
    tracing::info!("Validating data files in: {}", path.display());
    let report = validate_data_directory(path)?;

    if json {
        print_json(&report)?;
    } else {
        for failure in &report.failures {
            println!("FAIL {}: {}", failure.path.display(), failure.message);
        }
        println!(
            "{} file(s) checked, {} failed",
            report.checked.len(),
            report.failures.len()
        );
    }

    if report.is_valid() {
        tracing::info!("Validation passed");
        Ok(())
    } else {
        Err(ScenarioError::Invalid("Validation failed".to_string()))
    }
}

/// Print a saved battle record
fn cmd_replay(file: &Path, round: Option<u32>, json: bool) -> Result<(), ScenarioError> {
    let record = BattleRecord::load(file)?;

    if json {
        return print_json(&record);
    }

    for (player, log) in &record.players {
        println!("Player {player}:");
        match round {
            Some(round) => {
                for action in log.actions(round) {
                    println!("  {}", describe_action(action));
                }
            }
            None => {
                for line in describe_record(log) {
                    println!("  {line}");
                }
            }
        }
    }
    Ok(())
}
