//! Monte Carlo aggregation over many independent trials.
//!
//! Trials are spread over the current rayon pool. Each worker folds finished
//! trials into its own tally and the tallies are summed at the end, so no
//! counter is ever shared between threads while trials run.
//!
//! Every trial draws from its own ChaCha stream derived from the run seed
//! and the trial index. Results for a given seed are therefore identical no
//! matter how many threads run them or in which order they complete.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::bracket::{Bracket, TrialOutcome};
use crate::error::SwissError;
use crate::ruleset::Ruleset;
use crate::stop::StopFlag;
use crate::types::{Record, Team, TeamId};

/// Options for a simulation run
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// Base seed; trial `i` uses stream `i` of this seed
    pub seed: u64,
    /// Checked before each trial starts
    pub stop: Option<StopFlag>,
}

/// Random source for trial `index` of a run seeded with `seed`.
pub fn trial_rng(seed: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}

/// Per-worker accumulator
struct Tally {
    counts: Vec<BTreeMap<Record, u64>>,
    meetings: Vec<u64>,
    trials: u64,
}

impl Tally {
    fn new(team_count: usize) -> Self {
        Self {
            counts: vec![BTreeMap::new(); team_count],
            meetings: vec![0; team_count * team_count],
            trials: 0,
        }
    }

    fn absorb(&mut self, outcome: &TrialOutcome) {
        let n = self.counts.len();
        for (team, &record) in outcome.records.iter().enumerate() {
            *self.counts[team].entry(record).or_insert(0) += 1;
        }
        for m in &outcome.matches {
            let (a, b) = (m.matchup.home, m.matchup.away);
            self.meetings[a * n + b] += 1;
            self.meetings[b * n + a] += 1;
        }
        self.trials += 1;
    }

    fn merge(mut self, other: Tally) -> Tally {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            for (record, count) in theirs {
                *mine.entry(record).or_insert(0) += count;
            }
        }
        for (mine, theirs) in self.meetings.iter_mut().zip(other.meetings) {
            *mine += theirs;
        }
        self.trials += other.trials;
        self
    }
}

/// Final-record distribution of every team over a simulation run.
///
/// Owned by the caller; scoped to the run that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDistribution {
    teams: Vec<String>,
    counts: Vec<BTreeMap<Record, u64>>,
    meetings: Vec<u64>,
    trials_requested: u64,
    trials_completed: u64,
}

impl RecordDistribution {
    pub fn team_names(&self) -> &[String] {
        &self.teams
    }

    pub fn team_id(&self, name: &str) -> Option<TeamId> {
        self.teams.iter().position(|t| t.eq_ignore_ascii_case(name))
    }

    /// Trials that ran to completion
    pub fn trials(&self) -> u64 {
        self.trials_completed
    }

    pub fn trials_requested(&self) -> u64 {
        self.trials_requested
    }

    /// Whether the run was stopped before every requested trial ran
    pub fn interrupted(&self) -> bool {
        self.trials_completed < self.trials_requested
    }

    pub fn counts(&self, team: TeamId) -> &BTreeMap<Record, u64> {
        &self.counts[team]
    }

    pub fn count(&self, team: TeamId, record: Record) -> u64 {
        self.counts[team].get(&record).copied().unwrap_or(0)
    }

    /// Sum of all record counts for a team; equals [`trials`](Self::trials).
    pub fn total(&self, team: TeamId) -> u64 {
        self.counts[team].values().sum()
    }

    /// Fraction of completed trials in which `team` finished with `record`.
    pub fn probability(&self, team: TeamId, record: Record) -> f64 {
        self.probability_where(team, |r| r == record)
    }

    /// Fraction of completed trials whose final record matches `pred`.
    pub fn probability_where(&self, team: TeamId, pred: impl Fn(Record) -> bool) -> f64 {
        if self.trials_completed == 0 {
            return 0.0;
        }
        let hits: u64 = self.counts[team]
            .iter()
            .filter(|(&record, _)| pred(record))
            .map(|(_, &count)| count)
            .sum();
        hits as f64 / self.trials_completed as f64
    }

    pub fn percentage(&self, team: TeamId, record: Record) -> f64 {
        self.probability(team, record) * 100.0
    }

    /// Total meetings between two teams across all trials
    pub fn meetings(&self, a: TeamId, b: TeamId) -> u64 {
        self.meetings[a * self.teams.len() + b]
    }

    /// Opponents `team` met most often, with each one's share of the
    /// team's matches in percent.
    pub fn most_faced(&self, team: TeamId, limit: usize) -> Vec<(TeamId, f64)> {
        let n = self.teams.len();
        let row = &self.meetings[team * n..(team + 1) * n];
        let total: u64 = row.iter().sum();
        if total == 0 {
            return Vec::new();
        }

        let mut faced: Vec<(TeamId, u64)> = row
            .iter()
            .enumerate()
            .filter(|&(other, &count)| other != team && count > 0)
            .map(|(other, &count)| (other, count))
            .collect();
        faced.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        faced
            .into_iter()
            .take(limit)
            .map(|(other, count)| (other, count as f64 * 100.0 / total as f64))
            .collect()
    }
}

/// Run `trials` independent trials and aggregate every team's final record.
///
/// The roster and ruleset are validated before any trial runs. The first
/// trial that fails aborts the whole run. If `options.stop` trips, trials
/// not yet started are skipped and the distribution covers the completed
/// ones.
pub fn simulate_many(
    teams: &[Team],
    trials: u64,
    ruleset: &Ruleset,
    options: &SimulationOptions,
) -> Result<RecordDistribution, SwissError> {
    ruleset.validate(teams)?;
    info!(
        teams = teams.len(),
        trials,
        ruleset = ruleset.name(),
        seed = options.seed,
        threads = rayon::current_num_threads(),
        "starting simulation"
    );

    let n = teams.len();
    let tally = (0..trials)
        .into_par_iter()
        .try_fold(
            || Tally::new(n),
            |mut tally, index| {
                if options.stop.as_ref().is_some_and(StopFlag::is_stopped) {
                    return Ok(tally);
                }
                let mut rng = trial_rng(options.seed, index);
                let outcome = Bracket::prepared(teams, ruleset).run(&mut rng)?;
                tally.absorb(&outcome);
                Ok::<Tally, SwissError>(tally)
            },
        )
        .try_reduce(|| Tally::new(n), |a, b| Ok(a.merge(b)))?;

    if tally.trials < trials {
        warn!(
            completed = tally.trials,
            requested = trials,
            "simulation stopped early"
        );
    }
    info!(completed = tally.trials, "simulation finished");

    Ok(RecordDistribution {
        teams: teams.iter().map(|t| t.name.clone()).collect(),
        counts: tally.counts,
        meetings: tally.meetings,
        trials_requested: trials,
        trials_completed: tally.trials,
    })
}

#[cfg(test)]
#[path = "montecarlo_tests.rs"]
mod montecarlo_tests;
