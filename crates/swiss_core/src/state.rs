//! Mutable state owned by a single trial.

use crate::types::{Record, TeamId};

/// Records, opponent history and Buchholz scores for every roster team.
///
/// Indexed by [`TeamId`]. Created at trial start and dropped at trial end;
/// never shared between trials.
#[derive(Debug, Clone)]
pub struct TrialState {
    records: Vec<Record>,
    opponents: Vec<Vec<TeamId>>,
    strength: Vec<i32>,
}

impl TrialState {
    pub fn new(team_count: usize) -> Self {
        Self {
            records: vec![Record::default(); team_count],
            opponents: vec![Vec::new(); team_count],
            strength: vec![0; team_count],
        }
    }

    pub fn team_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, team: TeamId) -> Record {
        self.records[team]
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn opponents(&self, team: TeamId) -> &[TeamId] {
        &self.opponents[team]
    }

    pub fn has_faced(&self, team: TeamId, other: TeamId) -> bool {
        self.opponents[team].contains(&other)
    }

    /// Buchholz score as of the last [`recompute_strength`](Self::recompute_strength)
    pub fn strength(&self, team: TeamId) -> i32 {
        self.strength[team]
    }

    /// Apply one match result to both records and histories.
    pub fn apply_result(&mut self, winner: TeamId, loser: TeamId) {
        self.records[winner].add_win();
        self.records[loser].add_loss();
        self.opponents[winner].push(loser);
        self.opponents[loser].push(winner);
    }

    /// Credit a bye as a win. No opponent is recorded.
    pub fn apply_bye(&mut self, team: TeamId) {
        self.records[team].add_win();
    }

    /// Recompute the Buchholz score of `teams` from scratch: the sum of
    /// every past opponent's current win/loss differential.
    pub fn recompute_strength(&mut self, teams: &[TeamId]) {
        for &team in teams {
            self.strength[team] = self.opponents[team]
                .iter()
                .map(|&opponent| self.records[opponent].differential())
                .sum();
        }
    }

    #[cfg(test)]
    pub(crate) fn set_record(&mut self, team: TeamId, record: Record) {
        self.records[team] = record;
    }

    #[cfg(test)]
    pub(crate) fn set_strength(&mut self, team: TeamId, strength: i32) {
        self.strength[team] = strength;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_result_updates_both_sides() {
        let mut state = TrialState::new(4);
        state.apply_result(0, 1);
        assert_eq!(state.record(0), Record::new(1, 0));
        assert_eq!(state.record(1), Record::new(0, 1));
        assert!(state.has_faced(0, 1));
        assert!(state.has_faced(1, 0));
        assert!(!state.has_faced(0, 2));
    }

    #[test]
    fn test_buchholz_uses_current_records() {
        let mut state = TrialState::new(4);
        state.apply_result(0, 1);
        state.apply_result(2, 3);
        state.apply_result(0, 2);
        state.apply_result(3, 1);

        // 0 faced 1 (0-2) and 2 (1-1)
        state.recompute_strength(&[0, 1, 2, 3]);
        assert_eq!(state.strength(0), -2);
        // 1 faced 0 (2-0) and 3 (1-1)
        assert_eq!(state.strength(1), 2);
        // 2 faced 3 (1-1) and 0 (2-0)
        assert_eq!(state.strength(2), 2);
        // 3 faced 2 (1-1) and 1 (0-2)
        assert_eq!(state.strength(3), -2);
    }

    #[test]
    fn test_bye_adds_win_without_opponent() {
        let mut state = TrialState::new(3);
        state.apply_bye(2);
        assert_eq!(state.record(2), Record::new(1, 0));
        assert!(state.opponents(2).is_empty());
        state.recompute_strength(&[2]);
        assert_eq!(state.strength(2), 0);
    }

    #[test]
    fn test_recompute_only_touches_given_teams() {
        let mut state = TrialState::new(2);
        state.apply_result(0, 1);
        state.recompute_strength(&[0]);
        assert_eq!(state.strength(0), -1);
        assert_eq!(state.strength(1), 0);
    }
}
