//! Bracket rulesets.
//!
//! One state machine drives every stage format; the ruleset carries what
//! differs between them (thresholds, series escalation, pairing style).

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

use crate::error::SwissError;
use crate::types::{Record, Team};

/// Swiss stage: teams play until they reach `win_threshold` wins or
/// `loss_threshold` losses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwissRules {
    pub teams: usize,
    pub win_threshold: u8,
    pub loss_threshold: u8,
    /// Series length for ordinary matches
    pub default_series: u8,
    /// Series length once either team can advance or be eliminated
    pub decider_series: u8,
}

impl Default for SwissRules {
    fn default() -> Self {
        Self {
            teams: 16,
            win_threshold: 3,
            loss_threshold: 3,
            default_series: 1,
            decider_series: 3,
        }
    }
}

impl SwissRules {
    pub fn is_decided(&self, record: Record) -> bool {
        record.wins >= self.win_threshold || record.losses >= self.loss_threshold
    }

    /// Whether this record is one result away from a decision.
    pub fn is_decider(&self, record: Record) -> bool {
        record.wins + 1 == self.win_threshold || record.losses + 1 == self.loss_threshold
    }

    pub fn series_for(&self, home: Record, away: Record) -> u8 {
        if self.is_decider(home) || self.is_decider(away) {
            self.decider_series
        } else {
            self.default_series
        }
    }

    /// Last round a record table exists for.
    pub fn max_round(&self) -> u32 {
        u32::from(self.win_threshold) + u32::from(self.loss_threshold)
    }

    /// Ordered record cohorts that make up the standings of `round`.
    ///
    /// A round lists every record reachable after `round - 1` games, plus
    /// the decided records reached earlier, from best differential to
    /// worst. For 3/3 thresholds, round 5 is
    /// `3-0, 3-1, 2-2, 1-3, 0-3`.
    pub fn round_table(&self, round: u32) -> Result<Vec<Record>, SwissError> {
        if round == 0 || round > self.max_round() {
            return Err(SwissError::UnsupportedRound { round });
        }
        let played = round - 1;

        let mut table = Vec::new();
        for wins in 0..=self.win_threshold {
            for losses in 0..=self.loss_threshold {
                if wins == self.win_threshold && losses == self.loss_threshold {
                    continue;
                }
                let record = Record::new(wins, losses);
                let games = record.games();
                if games == played || (self.is_decided(record) && games < played) {
                    table.push(record);
                }
            }
        }

        table.sort_by_key(|r| (Reverse(r.differential()), Reverse(r.wins)));
        Ok(table)
    }

    fn validate(&self) -> Result<(), SwissError> {
        if self.teams < 2 || self.teams % 2 != 0 {
            return Err(SwissError::InvalidRuleset(format!(
                "Swiss stage needs an even number of teams, got {}",
                self.teams
            )));
        }
        if self.win_threshold == 0 || self.loss_threshold == 0 {
            return Err(SwissError::InvalidRuleset(
                "win and loss thresholds must be at least 1".to_string(),
            ));
        }
        validate_series(self.default_series)?;
        validate_series(self.decider_series)
    }
}

/// Single-elimination stage: losers drop out until one team remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliminationRules {
    pub teams: usize,
    pub series: u8,
}

impl Default for EliminationRules {
    fn default() -> Self {
        Self {
            teams: 8,
            series: 1,
        }
    }
}

impl EliminationRules {
    /// Rounds needed to crown a champion
    pub fn rounds(&self) -> u32 {
        let mut rounds = 0;
        let mut remaining = self.teams;
        while remaining > 1 {
            remaining = remaining.div_ceil(2);
            rounds += 1;
        }
        rounds
    }

    /// Every record a team can finish with: champions first, then
    /// eliminated teams, most wins first.
    ///
    /// A bye advances a team without a win, so the champion may finish
    /// short of [`rounds`](Self::rounds). The set is collected by walking
    /// each way the bracket can unfold, tracking only the win count held
    /// in every surviving slot.
    pub fn final_records(&self) -> Vec<Record> {
        let mut finals = BTreeSet::new();
        let mut layer: BTreeSet<Vec<u8>> = BTreeSet::from([vec![0; self.teams]]);

        while !layer.is_empty() {
            let mut next = BTreeSet::new();
            for slots in &layer {
                let n = slots.len();
                if n <= 1 {
                    if let Some(&wins) = slots.first() {
                        finals.insert(Record::new(wins, 0));
                    }
                    continue;
                }

                let mut branches: Vec<Vec<u8>> = vec![Vec::with_capacity(n.div_ceil(2))];
                for i in 0..n / 2 {
                    let (home, away) = (slots[i], slots[n - 1 - i]);
                    finals.insert(Record::new(home, 1));
                    finals.insert(Record::new(away, 1));

                    let mut forked = Vec::new();
                    for branch in &mut branches {
                        if away != home {
                            let mut other = branch.clone();
                            other.push(away + 1);
                            forked.push(other);
                        }
                        branch.push(home + 1);
                    }
                    branches.extend(forked);
                }
                for mut branch in branches {
                    if n % 2 == 1 {
                        branch.push(slots[n / 2]);
                    }
                    next.insert(branch);
                }
            }
            layer = next;
        }

        let mut records: Vec<Record> = finals.into_iter().collect();
        records.sort_by_key(|r| (r.losses, Reverse(r.wins)));
        records
    }

    fn validate(&self) -> Result<(), SwissError> {
        if self.teams < 2 {
            return Err(SwissError::InvalidRuleset(format!(
                "elimination stage needs at least 2 teams, got {}",
                self.teams
            )));
        }
        validate_series(self.series)
    }
}

/// Stage format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ruleset {
    Swiss(SwissRules),
    SingleElimination(EliminationRules),
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::standard()
    }
}

impl Ruleset {
    /// 16-team Swiss, bo1 until a match can decide a team, then bo3
    pub fn standard() -> Self {
        Self::Swiss(SwissRules::default())
    }

    /// 8-team single elimination
    pub fn champions() -> Self {
        Self::SingleElimination(EliminationRules::default())
    }

    pub fn team_count(&self) -> usize {
        match self {
            Ruleset::Swiss(rules) => rules.teams,
            Ruleset::SingleElimination(rules) => rules.teams,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ruleset::Swiss(_) => "swiss",
            Ruleset::SingleElimination(_) => "single_elimination",
        }
    }

    /// Every final record a team can finish a trial with, best first.
    pub fn final_records(&self) -> Vec<Record> {
        match self {
            Ruleset::Swiss(rules) => {
                let mut records = Vec::new();
                for losses in 0..rules.loss_threshold {
                    records.push(Record::new(rules.win_threshold, losses));
                }
                for wins in (0..rules.win_threshold).rev() {
                    records.push(Record::new(wins, rules.loss_threshold));
                }
                records
            }
            Ruleset::SingleElimination(rules) => rules.final_records(),
        }
    }

    /// Records that count as advancing out of the stage.
    pub fn is_advancing(&self, record: Record) -> bool {
        match self {
            Ruleset::Swiss(rules) => record.wins >= rules.win_threshold,
            Ruleset::SingleElimination(_) => record.losses == 0,
        }
    }

    /// Check the ruleset and the roster it is about to run on.
    pub fn validate(&self, teams: &[Team]) -> Result<(), SwissError> {
        match self {
            Ruleset::Swiss(rules) => rules.validate()?,
            Ruleset::SingleElimination(rules) => rules.validate()?,
        }

        if teams.len() != self.team_count() {
            return Err(SwissError::RosterSize {
                expected: self.team_count(),
                found: teams.len(),
            });
        }

        let mut names = HashSet::new();
        let mut seeds = HashSet::new();
        for team in teams {
            if !names.insert(team.name.to_lowercase()) {
                return Err(SwissError::DuplicateTeam(team.name.clone()));
            }
            if !seeds.insert(team.seed) {
                return Err(SwissError::DuplicateSeed(team.seed));
            }
        }
        Ok(())
    }
}

fn validate_series(series: u8) -> Result<(), SwissError> {
    if series == 0 || series % 2 == 0 {
        return Err(SwissError::InvalidSeries(series));
    }
    Ok(())
}

#[cfg(test)]
#[path = "ruleset_tests.rs"]
mod ruleset_tests;
