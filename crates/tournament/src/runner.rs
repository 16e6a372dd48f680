//! Simulation runner: turns a roster and a run configuration into a report

use rayon::ThreadPoolBuilder;
use std::time::{Duration, Instant};
use swiss_core::{
    simulate_many, trial_rng, Bracket, SimulationOptions, StopFlag, SwissError, TrialOutcome,
};
use thiserror::Error;
use tracing::info;

use crate::results::SimulationReport;
use crate::roster::Roster;

/// Largest trial count a single run accepts
pub const MAX_TRIALS: u64 = 50_000_000;

/// Errors raised by a simulation run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Trial count {0} is out of range (1..={})", MAX_TRIALS)]
    TrialCount(u64),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Simulation(#[from] SwissError),
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of trials to run
    pub trials: u64,
    /// Base seed; the same seed reproduces the same report
    pub seed: u64,
    /// Worker threads (None = one per core)
    pub threads: Option<usize>,
    /// Stop scheduling trials after this long (None = no limit)
    pub time_limit: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 100_000,
            seed: 0,
            threads: None,
            time_limit: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), RunError> {
        if self.trials == 0 || self.trials > MAX_TRIALS {
            return Err(RunError::TrialCount(self.trials));
        }
        Ok(())
    }
}

/// Runs simulations for a roster
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every configured trial and collect the report.
    ///
    /// Trials run on a dedicated pool sized by `threads`, so the global
    /// rayon pool is left alone.
    pub fn run(&self, roster: &Roster) -> Result<SimulationReport, RunError> {
        self.config.validate()?;
        roster.validate()?;

        let mut builder = ThreadPoolBuilder::new();
        if let Some(threads) = self.config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        let options = SimulationOptions {
            seed: self.config.seed,
            stop: self.config.time_limit.map(StopFlag::with_time_limit),
        };

        let started = Instant::now();
        let distribution = pool.install(|| {
            simulate_many(
                &roster.teams,
                self.config.trials,
                &roster.ruleset,
                &options,
            )
        })?;
        let elapsed = started.elapsed();

        info!(
            trials = distribution.trials(),
            elapsed_secs = elapsed.as_secs_f64(),
            "run complete"
        );

        Ok(SimulationReport::new(
            roster.clone(),
            distribution,
            self.config.seed,
            elapsed,
        ))
    }

    /// Replay trial `index` of this configuration's seed on its own.
    ///
    /// The outcome is the one [`run`](Self::run) counted for that index.
    pub fn replay_trial(&self, roster: &Roster, index: u64) -> Result<TrialOutcome, RunError> {
        let outcome = Bracket::new(&roster.teams, &roster.ruleset)?
            .run(&mut trial_rng(self.config.seed, index))?;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod runner_tests;
