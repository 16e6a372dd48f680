//! Bracket state machine.
//!
//! A [`Bracket`] owns everything one trial mutates and drives the round
//! loop for any [`Ruleset`]:
//!
//! ```text
//! RoundPending --pair + resolve--> MatchesResolved --advance--> RoundPending
//!                                                  \-----------> AllDecided
//! ```

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, trace};

use crate::error::SwissError;
use crate::outcome::{simulate_series, Side};
use crate::pairing::{first_round, pair_round_at, RoundPlan};
use crate::ruleset::Ruleset;
use crate::state::TrialState;
use crate::types::{MatchResult, Matchup, Record, Team, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RoundPending,
    MatchesResolved,
    AllDecided,
}

/// Everything a finished trial produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    /// Final record per team, indexed by [`TeamId`]
    pub records: Vec<Record>,
    /// Every match in the order it was played
    pub matches: Vec<MatchResult>,
    /// `(round, team)` for every bye handed out
    pub byes: Vec<(u32, TeamId)>,
    pub rounds: u32,
}

impl TrialOutcome {
    pub fn record(&self, team: TeamId) -> Record {
        self.records[team]
    }

    /// Final records keyed by team name
    pub fn records_by_name<'t>(&self, teams: &'t [Team]) -> BTreeMap<&'t str, Record> {
        teams
            .iter()
            .zip(&self.records)
            .map(|(team, &record)| (team.name.as_str(), record))
            .collect()
    }

    /// How many times two teams met in this trial
    pub fn meetings(&self, a: TeamId, b: TeamId) -> usize {
        self.matches
            .iter()
            .filter(|m| m.matchup.involves(a) && m.matchup.involves(b))
            .count()
    }
}

/// One trial's bracket.
pub struct Bracket<'a> {
    teams: &'a [Team],
    ruleset: &'a Ruleset,
    state: TrialState,
    /// Teams still to play, in seed order at the start
    active: Vec<TeamId>,
    phase: Phase,
    rounds_played: u32,
    last_plan: RoundPlan,
    history: Vec<MatchResult>,
    byes: Vec<(u32, TeamId)>,
}

impl<'a> Bracket<'a> {
    /// Validate the roster against the ruleset and set up a fresh trial.
    pub fn new(teams: &'a [Team], ruleset: &'a Ruleset) -> Result<Self, SwissError> {
        ruleset.validate(teams)?;
        Ok(Self::prepared(teams, ruleset))
    }

    /// Set up a trial for a roster that has already been validated.
    pub(crate) fn prepared(teams: &'a [Team], ruleset: &'a Ruleset) -> Self {
        let mut active: Vec<TeamId> = (0..teams.len()).collect();
        active.sort_by_key(|&team| teams[team].seed);

        Self {
            teams,
            ruleset,
            state: TrialState::new(teams.len()),
            active,
            phase: Phase::RoundPending,
            rounds_played: 0,
            last_plan: RoundPlan::default(),
            history: Vec::new(),
            byes: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &TrialState {
        &self.state
    }

    pub fn active(&self) -> &[TeamId] {
        &self.active
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Matches resolved so far
    pub fn history(&self) -> &[MatchResult] {
        &self.history
    }

    /// Pairings the next [`step`](Self::step) would play, without playing them.
    ///
    /// `None` unless a round is pending.
    pub fn upcoming_round(&self) -> Result<Option<RoundPlan>, SwissError> {
        if self.phase != Phase::RoundPending {
            return Ok(None);
        }
        self.plan_round().map(Some)
    }

    /// Advance the state machine by one transition.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Phase, SwissError> {
        match self.phase {
            Phase::RoundPending => {
                self.play_round(rng)?;
                self.phase = Phase::MatchesResolved;
            }
            Phase::MatchesResolved => {
                self.advance();
                self.phase = if self.is_finished() {
                    Phase::AllDecided
                } else {
                    Phase::RoundPending
                };
            }
            Phase::AllDecided => {}
        }
        Ok(self.phase)
    }

    /// Run the bracket to completion.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<TrialOutcome, SwissError> {
        while self.phase != Phase::AllDecided {
            self.step(rng)?;
        }
        Ok(TrialOutcome {
            records: self.state.records().to_vec(),
            matches: self.history,
            byes: self.byes,
            rounds: self.rounds_played,
        })
    }

    fn plan_round(&self) -> Result<RoundPlan, SwissError> {
        let round = self.rounds_played + 1;
        match self.ruleset {
            Ruleset::Swiss(rules) => {
                if round > rules.max_round() {
                    return Err(SwissError::UnsupportedRound { round });
                }
                if round == 1 {
                    Ok(first_round(self.teams, rules))
                } else {
                    pair_round_at(self.teams, &self.state, &self.active, round, rules)
                }
            }
            Ruleset::SingleElimination(rules) => {
                Ok(elimination_round(&self.active, round, rules.series))
            }
        }
    }

    fn play_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SwissError> {
        let plan = self.plan_round()?;
        debug!(
            round = plan.round,
            matches = plan.matchups.len(),
            byes = plan.byes.len(),
            "round paired"
        );

        for matchup in &plan.matchups {
            let result = self.resolve(matchup, rng);
            self.state.apply_result(result.winner, result.loser);
            self.history.push(result);
        }
        // A Swiss bye is a win without an opponent; a knockout bye only advances
        if matches!(self.ruleset, Ruleset::Swiss(_)) {
            for &team in &plan.byes {
                self.state.apply_bye(team);
            }
        }
        self.byes
            .extend(plan.byes.iter().map(|&team| (plan.round, team)));

        self.rounds_played += 1;
        self.last_plan = plan;
        Ok(())
    }

    fn resolve<R: Rng + ?Sized>(&self, matchup: &Matchup, rng: &mut R) -> MatchResult {
        let home = &self.teams[matchup.home];
        let away = &self.teams[matchup.away];
        let outcome = simulate_series(home, away, matchup.series, rng);

        let (winner, loser) = match outcome.winner {
            Side::First => (matchup.home, matchup.away),
            Side::Second => (matchup.away, matchup.home),
        };
        trace!(
            round = matchup.round,
            winner = %self.teams[winner].name,
            loser = %self.teams[loser].name,
            series = matchup.series,
            "match resolved"
        );

        MatchResult {
            matchup: *matchup,
            winner,
            loser,
            winner_probability: outcome.winner_probability(),
        }
    }

    fn advance(&mut self) {
        match self.ruleset {
            Ruleset::Swiss(rules) => {
                self.active
                    .retain(|&team| !rules.is_decided(self.state.record(team)));
                self.state.recompute_strength(&self.active);
            }
            Ruleset::SingleElimination(_) => {
                let round = self.last_plan.round;
                let winners = self
                    .history
                    .iter()
                    .filter(|m| m.matchup.round == round)
                    .map(|m| m.winner);
                self.active = winners.chain(self.last_plan.byes.iter().copied()).collect();
            }
        }
    }

    fn is_finished(&self) -> bool {
        match self.ruleset {
            Ruleset::Swiss(rules) => self
                .state
                .records()
                .iter()
                .all(|&record| rules.is_decided(record)),
            Ruleset::SingleElimination(_) => self.active.len() <= 1,
        }
    }
}

/// Knockout pairing: first against last, second against second-to-last.
/// An odd team out in the middle advances on a bye.
fn elimination_round(active: &[TeamId], round: u32, series: u8) -> RoundPlan {
    let n = active.len();
    let matchups = (0..n / 2)
        .map(|i| Matchup {
            round,
            home: active[i],
            away: active[n - 1 - i],
            series,
        })
        .collect();
    let byes = if n % 2 == 1 {
        vec![active[n / 2]]
    } else {
        Vec::new()
    };

    RoundPlan {
        round,
        matchups,
        byes,
    }
}

/// Run one complete trial with the given random source.
///
/// Deterministic for a seeded `rng`.
pub fn simulate_one_trial<R: Rng + ?Sized>(
    teams: &[Team],
    ruleset: &Ruleset,
    rng: &mut R,
) -> Result<TrialOutcome, SwissError> {
    Bracket::new(teams, ruleset)?.run(rng)
}

#[cfg(test)]
#[path = "bracket_tests.rs"]
mod bracket_tests;
