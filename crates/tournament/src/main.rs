//! Tournament CLI
//!
//! Predict how a Swiss or single-elimination stage plays out.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use swiss_core::Ruleset;
use tournament::{
    generate_odds, generate_trial_trace, Roster, SimulationConfig, SimulationRunner, MAX_TRIALS,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tournament", version)]
#[command(about = "Monte Carlo predictions for Swiss and single-elimination stages", long_about = None)]
struct Cli {
    /// Log round-level detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the stage many times and print each team's record odds
    Simulate {
        #[command(flatten)]
        roster: RosterArgs,

        /// Number of stages to simulate
        #[arg(short, long, default_value_t = 100_000, value_parser = clap::value_parser!(u64).range(1..=MAX_TRIALS))]
        trials: u64,

        /// Base seed (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Worker threads (defaults to one per core)
        #[arg(long)]
        threads: Option<usize>,

        /// Stop scheduling trials after this many seconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Also write the summary as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Skip the most-faced opponents section
        #[arg(long, default_value = "false")]
        no_head_to_head: bool,
    },

    /// Print the favourite of every opening-round match
    Odds {
        #[command(flatten)]
        roster: RosterArgs,
    },

    /// Play out one trial and print every match
    Trial {
        #[command(flatten)]
        roster: RosterArgs,

        /// Seed of the run the trial belongs to
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Trial number within that run
        #[arg(short, long, default_value_t = 0)]
        index: u64,
    },

    /// Write a built-in roster to a TOML file as a starting point
    Roster {
        /// Output TOML file path
        #[arg(long)]
        out: PathBuf,

        #[arg(long, value_enum, default_value_t = BracketKind::Standard)]
        bracket: BracketKind,
    },
}

#[derive(Args)]
struct RosterArgs {
    /// Roster TOML file (uses the built-in roster when omitted)
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Built-in stage to use when no roster file is given
    #[arg(long, value_enum, default_value_t = BracketKind::Standard)]
    bracket: BracketKind,
}

#[derive(Clone, Copy, ValueEnum)]
enum BracketKind {
    /// 16-team Swiss stage
    Standard,
    /// 8-team single elimination
    Champions,
}

impl BracketKind {
    fn ruleset(self) -> Ruleset {
        match self {
            BracketKind::Standard => Ruleset::standard(),
            BracketKind::Champions => Ruleset::champions(),
        }
    }
}

impl RosterArgs {
    fn load(&self) -> Result<Roster> {
        match &self.roster {
            Some(path) => Roster::load(path)
                .with_context(|| format!("Failed to load roster {}", path.display())),
            None => Ok(Roster::builtin(self.bracket.ruleset())),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_simulate(
    roster: &RosterArgs,
    trials: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    time_limit: Option<u64>,
    json: Option<PathBuf>,
    head_to_head: bool,
) -> Result<()> {
    let roster = roster.load()?;
    let config = SimulationConfig {
        trials,
        seed: seed.unwrap_or_else(rand::random),
        threads,
        time_limit: time_limit.map(Duration::from_secs),
    };

    let report = SimulationRunner::new(config)
        .run(&roster)
        .context("Simulation failed")?;

    println!("Note: These predictions are not guaranteed to be accurate.");
    println!("Use them as a guideline, alongside form, betting odds and results.");
    println!();
    report.print_report(head_to_head);

    if let Some(path) = json {
        report
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}

fn run_odds(roster: &RosterArgs) -> Result<()> {
    let roster = roster.load()?;
    print!("{}", generate_odds(&roster)?);
    Ok(())
}

fn run_trial(roster: &RosterArgs, seed: u64, index: u64) -> Result<()> {
    let roster = roster.load()?;
    let runner = SimulationRunner::new(SimulationConfig {
        seed,
        ..Default::default()
    });
    let outcome = runner
        .replay_trial(&roster, index)
        .with_context(|| format!("Trial {} of seed {} failed", index, seed))?;

    println!("=== Trial {} (seed {}) ===", index, seed);
    print!("{}", generate_trial_trace(&roster, &outcome));
    Ok(())
}

fn write_roster(out: &Path, bracket: BracketKind) -> Result<()> {
    Roster::builtin(bracket.ruleset())
        .save(out)
        .with_context(|| format!("Failed to write roster {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Simulate {
            roster,
            trials,
            seed,
            threads,
            time_limit,
            json,
            no_head_to_head,
        } => run_simulate(
            &roster,
            trials,
            seed,
            threads,
            time_limit,
            json,
            !no_head_to_head,
        ),
        Commands::Odds { roster } => run_odds(&roster),
        Commands::Trial {
            roster,
            seed,
            index,
        } => run_trial(&roster, seed, index),
        Commands::Roster { out, bracket } => write_roster(&out, bracket),
    }
}
