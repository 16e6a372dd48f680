//! Swiss pairing policy.
//!
//! Each round, active teams are grouped into cohorts by exact record. Within
//! a cohort, teams choose opponents in standing order:
//!
//! 1. Prefer an opponent not yet faced with a different Buchholz score,
//!    taking the largest score gap (ties go to the worse standing).
//! 2. Otherwise an unfaced opponent with the same score, worst standing first.
//! 3. Otherwise a rematch against the worst-standing unpaired team.
//! 4. A team left alone in its cohort gets a bye.
//!
//! Ties are resolved by standing, never by name, so identical states always
//! produce identical pairings.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::SwissError;
use crate::ruleset::SwissRules;
use crate::state::TrialState;
use crate::types::{Matchup, Record, Team, TeamId};

/// Matches and byes scheduled for one round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundPlan {
    pub round: u32,
    pub matchups: Vec<Matchup>,
    pub byes: Vec<TeamId>,
}

/// Per-round standing of every team whose record appears in the round table.
///
/// Standing 1 is the best. Teams outside the table have no standing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    ranks: Vec<Option<u32>>,
}

impl Standings {
    /// Rank teams cohort by cohort in `table` order, each cohort sorted by
    /// Buchholz score (descending) then seed (ascending).
    pub fn compute(teams: &[Team], state: &TrialState, table: &[Record]) -> Self {
        let mut ranks = vec![None; teams.len()];
        let mut standing = 0;

        for &record in table {
            let mut cohort: Vec<TeamId> = (0..teams.len())
                .filter(|&team| state.record(team) == record)
                .collect();
            sort_cohort(&mut cohort, teams, state);

            for team in cohort {
                standing += 1;
                ranks[team] = Some(standing);
            }
        }

        Self { ranks }
    }

    pub fn get(&self, team: TeamId) -> Option<u32> {
        self.ranks[team]
    }

    /// Standing of a team known to be ranked this round.
    fn of(&self, team: TeamId) -> u32 {
        self.ranks[team].unwrap_or(u32::MAX)
    }
}

fn sort_cohort(cohort: &mut [TeamId], teams: &[Team], state: &TrialState) {
    cohort.sort_by(|&a, &b| {
        state
            .strength(b)
            .cmp(&state.strength(a))
            .then(teams[a].seed.cmp(&teams[b].seed))
    });
}

/// Round number implied by the games the undecided active teams have played.
///
/// Swiss byes count as wins, so every undecided team has played the same
/// number of games at the start of a round.
pub fn current_round(active: &[TeamId], state: &TrialState, rules: &SwissRules) -> u32 {
    active
        .iter()
        .map(|&team| state.record(team))
        .find(|&record| !rules.is_decided(record))
        .map(|record| record.games() + 1)
        .unwrap_or(1)
}

/// Opening round: pairs sorted seed `i` with seed `i + n/2`.
pub fn first_round(teams: &[Team], rules: &SwissRules) -> RoundPlan {
    let mut seeded: Vec<TeamId> = (0..teams.len()).collect();
    seeded.sort_by_key(|&team| teams[team].seed);

    let half = seeded.len() / 2;
    let matchups = (0..half)
        .map(|i| Matchup {
            round: 1,
            home: seeded[i],
            away: seeded[half + i],
            series: rules.series_for(Record::default(), Record::default()),
        })
        .collect();
    let byes = if seeded.len() % 2 == 1 {
        vec![seeded[seeded.len() - 1]]
    } else {
        Vec::new()
    };

    RoundPlan {
        round: 1,
        matchups,
        byes,
    }
}

/// Pair every undecided team in `active` for the round their records imply.
///
/// See [`pair_round_at`].
pub fn pair_round(
    teams: &[Team],
    state: &TrialState,
    active: &[TeamId],
    rules: &SwissRules,
) -> Result<RoundPlan, SwissError> {
    let round = current_round(active, state, rules);
    pair_round_at(teams, state, active, round, rules)
}

/// Pair every undecided team in `active` for `round`.
///
/// Decided teams in `active` are skipped. Fails with `UnsupportedRound` if
/// the round has no record table, or `UnexpectedRecord` if an active
/// team's record is missing from it.
pub fn pair_round_at(
    teams: &[Team],
    state: &TrialState,
    active: &[TeamId],
    round: u32,
    rules: &SwissRules,
) -> Result<RoundPlan, SwissError> {
    let table = rules.round_table(round)?;
    let standings = Standings::compute(teams, state, &table);

    let mut cohorts: BTreeMap<Record, Vec<TeamId>> = BTreeMap::new();
    for &team in active {
        let record = state.record(team);
        if rules.is_decided(record) {
            continue;
        }
        if standings.get(team).is_none() {
            return Err(SwissError::UnexpectedRecord { record, round });
        }
        cohorts.entry(record).or_default().push(team);
    }

    let mut plan = RoundPlan {
        round,
        ..Default::default()
    };

    for record in &table {
        let Some(cohort) = cohorts.get_mut(record) else {
            continue;
        };
        cohort.sort_by_key(|&team| standings.of(team));
        pair_cohort(teams, state, &standings, cohort, rules, &mut plan)?;
    }

    Ok(plan)
}

fn pair_cohort(
    teams: &[Team],
    state: &TrialState,
    standings: &Standings,
    cohort: &[TeamId],
    rules: &SwissRules,
    plan: &mut RoundPlan,
) -> Result<(), SwissError> {
    let mut unpaired: Vec<TeamId> = cohort.to_vec();

    while !unpaired.is_empty() {
        let team = unpaired.remove(0);
        if unpaired.is_empty() {
            trace!(team = %teams[team].name, round = plan.round, "bye");
            plan.byes.push(team);
            break;
        }

        let opponent = select_opponent(team, &unpaired, state, standings).ok_or_else(|| {
            SwissError::NoOpponent {
                team: teams[team].name.clone(),
                round: plan.round,
            }
        })?;
        unpaired.retain(|&other| other != opponent);

        plan.matchups.push(Matchup {
            round: plan.round,
            home: team,
            away: opponent,
            series: rules.series_for(state.record(team), state.record(opponent)),
        });
    }

    Ok(())
}

/// Choose the opponent for `team` among the still-unpaired teams of its
/// cohort.
///
/// Every tie, and the same-score and rematch fallbacks, goes to the
/// numerically larger standing, i.e. the worse-placed team.
pub fn select_opponent(
    team: TeamId,
    unpaired: &[TeamId],
    state: &TrialState,
    standings: &Standings,
) -> Option<TeamId> {
    let score = state.strength(team);
    let gap = |other: TeamId| (state.strength(other) - score).abs();

    let (same, different): (Vec<TeamId>, Vec<TeamId>) = unpaired
        .iter()
        .copied()
        .filter(|&other| other != team && !state.has_faced(team, other))
        .partition(|&other| state.strength(other) == score);

    different
        .into_iter()
        .max_by(|&a, &b| {
            gap(a)
                .cmp(&gap(b))
                .then(standings.of(a).cmp(&standings.of(b)))
        })
        .or_else(|| same.into_iter().max_by_key(|&other| standings.of(other)))
        .or_else(|| {
            // Every remaining cohort-mate is a rematch
            unpaired
                .iter()
                .copied()
                .filter(|&other| other != team)
                .max_by_key(|&other| standings.of(other))
        })
}

#[cfg(test)]
#[path = "pairing_tests.rs"]
mod pairing_tests;
