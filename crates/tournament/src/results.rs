//! Simulation results storage and reporting

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use swiss_core::{
    most_likely_winner, win_probability, Bracket, Record, RecordDistribution, Ruleset, Side,
    SwissError, TrialOutcome,
};
use thiserror::Error;

use crate::roster::Roster;

/// Opponents listed per team in the head-to-head section
pub const HEAD_TO_HEAD_LIMIT: usize = 3;

/// Errors raised while exporting or importing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One percentage column of the results table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Finished with exactly this record
    Exact(Record),
    /// Advanced after dropping at least one match
    AdvancedWithLosses,
    /// Eliminated after winning at least one match
    EliminatedWithWins,
    /// Advanced with any record
    Advanced,
}

impl Column {
    /// Table columns for a ruleset, in display order.
    ///
    /// Swiss stages get the grouped `[W-X]`, `[X-L]` and `[W-A]` columns
    /// around the exact records; elimination stages list exact records only.
    pub fn for_ruleset(ruleset: &Ruleset) -> Vec<Column> {
        let exact = ruleset.final_records().into_iter().map(Column::Exact);
        match ruleset {
            Ruleset::Swiss(_) => [Column::AdvancedWithLosses, Column::EliminatedWithWins]
                .into_iter()
                .chain(exact)
                .chain(std::iter::once(Column::Advanced))
                .collect(),
            Ruleset::SingleElimination(_) => exact.collect(),
        }
    }

    pub fn label(&self, ruleset: &Ruleset) -> String {
        let (wins, losses) = match ruleset {
            Ruleset::Swiss(rules) => (rules.win_threshold, rules.loss_threshold),
            Ruleset::SingleElimination(rules) => (rules.rounds() as u8, 1),
        };
        match self {
            Column::Exact(record) => format!("[{}]", record),
            Column::AdvancedWithLosses => format!("[{}-X]", wins),
            Column::EliminatedWithWins => format!("[X-{}]", losses),
            Column::Advanced => format!("[{}-A]", wins),
        }
    }

    pub fn matches(&self, ruleset: &Ruleset, record: Record) -> bool {
        match self {
            Column::Exact(exact) => record == *exact,
            Column::AdvancedWithLosses => ruleset.is_advancing(record) && record.losses > 0,
            Column::EliminatedWithWins => !ruleset.is_advancing(record) && record.wins > 0,
            Column::Advanced => ruleset.is_advancing(record),
        }
    }
}

/// A finished simulation run, ready to print or export
#[derive(Debug, Clone)]
pub struct SimulationReport {
    roster: Roster,
    distribution: RecordDistribution,
    seed: u64,
    elapsed: Duration,
}

impl SimulationReport {
    pub fn new(
        roster: Roster,
        distribution: RecordDistribution,
        seed: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            roster,
            distribution,
            seed,
            elapsed,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn distribution(&self) -> &RecordDistribution {
        &self.distribution
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Percentage of completed trials in which `team` landed in `column`.
    pub fn percentage(&self, team: usize, column: Column) -> f64 {
        let ruleset = &self.roster.ruleset;
        self.distribution
            .probability_where(team, |record| column.matches(ruleset, record))
            * 100.0
    }

    /// Team indices ordered by seed
    fn seed_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.roster.teams.len()).collect();
        order.sort_by_key(|&team| self.roster.teams[team].seed);
        order
    }

    /// Serializable form of the report
    pub fn summary(&self) -> ReportSummary {
        let ruleset = &self.roster.ruleset;
        let teams = self
            .seed_order()
            .into_iter()
            .map(|id| {
                let team = &self.roster.teams[id];
                TeamSummary {
                    name: team.name.clone(),
                    seed: team.seed,
                    world_rank: team.world_rank,
                    round_swing: team.round_swing,
                    records: self
                        .distribution
                        .counts(id)
                        .iter()
                        .map(|(record, &count)| (record.to_string(), count))
                        .collect(),
                    advance_pct: self
                        .distribution
                        .probability_where(id, |record| ruleset.is_advancing(record))
                        * 100.0,
                    most_faced: self
                        .distribution
                        .most_faced(id, HEAD_TO_HEAD_LIMIT)
                        .into_iter()
                        .map(|(other, share_pct)| FacedOpponent {
                            name: self.roster.teams[other].name.clone(),
                            share_pct,
                        })
                        .collect(),
                }
            })
            .collect();

        ReportSummary {
            ruleset: ruleset.clone(),
            seed: self.seed,
            trials_requested: self.distribution.trials_requested(),
            trials_completed: self.distribution.trials(),
            elapsed_secs: self.elapsed.as_secs_f64(),
            teams,
        }
    }

    /// Save the report summary to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        self.summary().save(path)
    }

    /// Generate the results table
    pub fn generate_report(&self) -> String {
        let ruleset = &self.roster.ruleset;
        let columns = Column::for_ruleset(ruleset);
        let name_width = self
            .roster
            .teams
            .iter()
            .map(|team| team.name.len() + 2)
            .max()
            .unwrap_or(10)
            .clamp(14, 28);

        let mut report = String::new();
        report.push_str(&format!(
            "Results after {} simulations (took {:.3} seconds):\n",
            self.distribution.trials(),
            self.elapsed.as_secs_f64()
        ));
        report.push_str(&format!(
            "Ruleset: {} | Seed: {}\n",
            ruleset.name(),
            self.seed
        ));
        if self.distribution.interrupted() {
            report.push_str(&format!(
                "Stopped early: {} of {} trials completed\n",
                self.distribution.trials(),
                self.distribution.trials_requested()
            ));
        }
        report.push('\n');

        report.push_str(&format!(
            "{:<8} {:<name_width$}  {:>6}  {:>6}",
            "Seed", "Team", "Rank", "Swing"
        ));
        for column in &columns {
            report.push_str(&format!("  {:>11}", column.label(ruleset)));
        }
        report.push('\n');
        report.push_str(&"-".repeat(8 + 1 + name_width + 16 + columns.len() * 13));
        report.push('\n');

        for id in self.seed_order() {
            let team = &self.roster.teams[id];
            report.push_str(&format!(
                "{:<8} {:<name_width$}  {:>6.2}  {:>6.2}",
                format!("(#{})", team.seed),
                team.name,
                team.world_rank,
                team.round_swing
            ));
            for &column in &columns {
                report.push_str(&format!("  {:>10.2}%", self.percentage(id, column)));
            }
            report.push('\n');
        }

        report
    }

    /// Generate the most-faced opponents section
    pub fn generate_head_to_head(&self) -> String {
        let mut section = String::new();
        for id in self.seed_order() {
            section.push_str(&format!(
                "{}'s most faced opponents:\n",
                self.roster.teams[id].name
            ));
            for (other, pct) in self.distribution.most_faced(id, HEAD_TO_HEAD_LIMIT) {
                section.push_str(&format!(
                    "- {} ({:.2}%)\n",
                    self.roster.teams[other].name, pct
                ));
            }
            section.push('\n');
        }
        section
    }

    /// Print report to stdout
    pub fn print_report(&self, head_to_head: bool) {
        if head_to_head {
            println!("{}", self.generate_head_to_head());
        }
        println!("{}", self.generate_report());
    }
}

/// Exported run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub ruleset: Ruleset,
    pub seed: u64,
    pub trials_requested: u64,
    pub trials_completed: u64,
    pub elapsed_secs: f64,
    /// In seed order
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub seed: u32,
    pub world_rank: f64,
    pub round_swing: f64,
    /// Final record ("W-L") to number of trials
    pub records: BTreeMap<String, u64>,
    pub advance_pct: f64,
    pub most_faced: Vec<FacedOpponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacedOpponent {
    pub name: String,
    /// Share of the team's matches played against this opponent
    pub share_pct: f64,
}

impl ReportSummary {
    /// Save summary to JSON file
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load summary from JSON file
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Favourite and win chance for every opening-round pairing.
pub fn generate_odds(roster: &Roster) -> Result<String, SwissError> {
    let bracket = Bracket::new(&roster.teams, &roster.ruleset)?;
    let plan = bracket.upcoming_round()?.unwrap_or_default();

    let mut report = String::new();
    for matchup in &plan.matchups {
        let home = &roster.teams[matchup.home];
        let away = &roster.teams[matchup.away];
        let p = win_probability(home, away, matchup.series);
        let (favourite, underdog, chance) = match most_likely_winner(home, away, matchup.series)
        {
            Side::First => (home, away, p),
            Side::Second => (away, home, 1.0 - p),
        };
        report.push_str(&format!(
            "{} has a {:.2}% chance of winning against {} (bo{})\n",
            favourite.name,
            chance * 100.0,
            underdog.name,
            matchup.series
        ));
    }
    for &team in &plan.byes {
        report.push_str(&format!("{} advances on a bye\n", roster.teams[team].name));
    }
    Ok(report)
}

/// Round-by-round account of one trial.
///
/// Records are shown as they stood before each match.
pub fn generate_trial_trace(roster: &Roster, outcome: &TrialOutcome) -> String {
    let teams = &roster.teams;
    let mut records = vec![Record::default(); teams.len()];
    let mut trace = String::new();
    let swiss = matches!(roster.ruleset, Ruleset::Swiss(_));

    for round in 1..=outcome.rounds {
        trace.push_str(&format!("Round {}\n", round));
        for &(_, team) in outcome.byes.iter().filter(|(r, _)| *r == round) {
            trace.push_str(&format!(
                "  {} ({}) has a bye\n",
                teams[team].name,
                records[team]
            ));
            // Swiss byes score a win
            if swiss {
                records[team].add_win();
            }
        }

        for result in outcome.matches.iter().filter(|m| m.matchup.round == round) {
            let (winner, loser) = (result.winner, result.loser);
            trace.push_str(&format!(
                "  {} ({}) beat {} ({}) [bo{}, {:.2}%]{}\n",
                teams[winner].name,
                records[winner],
                teams[loser].name,
                records[loser],
                result.matchup.series,
                result.winner_probability * 100.0,
                if result.upset() { " upset" } else { "" }
            ));
            records[winner].add_win();
            records[loser].add_loss();
        }
    }

    let mut order: Vec<usize> = (0..teams.len()).collect();
    order.sort_by_key(|&team| {
        let record = outcome.record(team);
        (
            Reverse(record.differential()),
            Reverse(record.wins),
            teams[team].seed,
        )
    });

    trace.push_str("Final records\n");
    for team in order {
        trace.push_str(&format!(
            "  {:<6} {}\n",
            outcome.record(team).to_string(),
            teams[team].name
        ));
    }
    trace
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod results_tests;
