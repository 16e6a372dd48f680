use super::*;

fn roster(n: u32) -> Vec<Team> {
    (1..=n)
        .map(|seed| Team::new(&format!("Team {}", seed), seed, seed as f64, 0.0))
        .collect()
}

fn pairs(plan: &RoundPlan) -> Vec<(TeamId, TeamId)> {
    plan.matchups.iter().map(|m| (m.home, m.away)).collect()
}

/// State where every listed team has `record` and the given Buchholz score.
fn state_with(n: usize, entries: &[(TeamId, Record, i32)]) -> TrialState {
    let mut state = TrialState::new(n);
    for &(team, record, strength) in entries {
        state.set_record(team, record);
        state.set_strength(team, strength);
    }
    state
}

#[test]
fn test_first_round_pairs_top_half_against_bottom_half() {
    // Roster order deliberately not seed order
    let mut teams = roster(16);
    teams.reverse();
    let plan = first_round(&teams, &SwissRules::default());

    let seeds: Vec<(u32, u32)> = plan
        .matchups
        .iter()
        .map(|m| (teams[m.home].seed, teams[m.away].seed))
        .collect();
    let expected: Vec<(u32, u32)> = (1..=8).map(|i| (i, i + 8)).collect();
    assert_eq!(seeds, expected);
    assert!(plan.byes.is_empty());
    assert!(plan.matchups.iter().all(|m| m.series == 1 && m.round == 1));
}

#[test]
fn test_round_two_pairs_within_cohorts() {
    let teams = roster(16);
    let mut state = TrialState::new(16);
    // Top seeds all won their opener
    for i in 0..8 {
        state.apply_result(i, i + 8);
    }
    let active: Vec<TeamId> = (0..16).collect();
    state.recompute_strength(&active);

    let plan = pair_round(&teams, &state, &active, &SwissRules::default()).unwrap();
    assert_eq!(plan.round, 2);
    assert_eq!(plan.matchups.len(), 8);
    assert!(plan.byes.is_empty());
    for m in &plan.matchups {
        assert_eq!(state.record(m.home), state.record(m.away));
        assert!(!state.has_faced(m.home, m.away));
        assert_eq!(m.series, 1);
    }
}

#[test]
fn test_equal_scores_pick_worst_standing() {
    let teams = roster(4);
    let one_zero = Record::new(1, 0);
    let state = state_with(
        4,
        &[(0, one_zero, 0), (1, one_zero, 0), (2, one_zero, 0), (3, one_zero, 0)],
    );
    let active = vec![2, 0, 3, 1];

    let first = pair_round(&teams, &state, &active, &SwissRules::default()).unwrap();
    assert_eq!(pairs(&first), vec![(0, 3), (1, 2)]);

    for _ in 0..10 {
        let again = pair_round(&teams, &state, &active, &SwissRules::default()).unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_largest_score_gap_wins_then_worst_standing() {
    let teams = roster(4);
    let r = Record::new(1, 1);
    let state = state_with(4, &[(0, r, 2), (1, r, 1), (2, r, -1), (3, r, -1)]);
    let active = vec![0, 1, 2, 3];

    let plan = pair_round(&teams, &state, &active, &SwissRules::default()).unwrap();
    // Team 0 sees a gap of 3 to both 2 and 3 and takes the worse standing
    assert_eq!(pairs(&plan), vec![(0, 3), (1, 2)]);
}

#[test]
fn test_different_score_preferred_over_same_score() {
    let teams = roster(4);
    let r = Record::new(1, 0);
    // Team 0 shares its score with 2 and 3; only team 1 differs
    let state = state_with(4, &[(0, r, 1), (1, r, 2), (2, r, 1), (3, r, 1)]);
    let standings = Standings::compute(&teams, &state, &[r, Record::new(0, 1)]);

    assert_eq!(select_opponent(0, &[1, 2, 3], &state, &standings), Some(1));
    assert_eq!(select_opponent(0, &[2, 3], &state, &standings), Some(3));
}

#[test]
fn test_standings_order_by_score_then_seed() {
    let teams = roster(6);
    let up = Record::new(1, 0);
    let down = Record::new(0, 1);
    let state = state_with(
        6,
        &[
            (0, up, -1),
            (1, up, 1),
            (2, up, 1),
            (3, down, 0),
            (4, down, 2),
            (5, down, 0),
        ],
    );
    let standings = Standings::compute(&teams, &state, &[up, down]);
    let ranks: Vec<Option<u32>> = (0..6).map(|t| standings.get(t)).collect();
    assert_eq!(
        ranks,
        vec![Some(3), Some(1), Some(2), Some(5), Some(4), Some(6)]
    );
}

#[test]
fn test_rematch_avoided_when_alternative_exists() {
    let teams = roster(4);
    let mut state = TrialState::new(4);
    state.apply_result(0, 3);
    let r = Record::new(1, 0);
    for team in 0..4 {
        state.set_record(team, r);
        state.set_strength(team, 0);
    }

    let plan = pair_round(&teams, &state, &[0, 1, 2, 3], &SwissRules::default()).unwrap();
    assert_eq!(pairs(&plan), vec![(0, 2), (1, 3)]);
}

#[test]
fn test_rematch_forced_when_only_option() {
    let teams = roster(2);
    let mut state = TrialState::new(2);
    state.apply_result(0, 1);
    let r = Record::new(1, 1);
    state.set_record(0, r);
    state.set_record(1, r);

    let plan = pair_round(&teams, &state, &[0, 1], &SwissRules::default()).unwrap();
    assert_eq!(pairs(&plan), vec![(0, 1)]);
}

#[test]
fn test_lone_team_gets_bye() {
    let teams = roster(3);
    let r = Record::new(1, 0);
    let state = state_with(3, &[(0, r, 0), (1, r, 0), (2, r, 0)]);

    let plan = pair_round(&teams, &state, &[0, 1, 2], &SwissRules::default()).unwrap();
    assert_eq!(pairs(&plan), vec![(0, 2)]);
    assert_eq!(plan.byes, vec![1]);
}

#[test]
fn test_decided_teams_are_not_paired() {
    let teams = roster(6);
    let state = state_with(
        6,
        &[
            (0, Record::new(3, 0), 0),
            (1, Record::new(2, 1), 0),
            (2, Record::new(2, 1), 0),
            (3, Record::new(1, 2), 0),
            (4, Record::new(1, 2), 0),
            (5, Record::new(0, 3), 0),
        ],
    );
    let plan = pair_round(&teams, &state, &[1, 0, 2, 3, 4, 5], &SwissRules::default()).unwrap();
    assert_eq!(plan.round, 4);
    assert!(plan.matchups.iter().all(|m| !m.involves(0) && !m.involves(5)));
    assert_eq!(pairs(&plan), vec![(1, 2), (3, 4)]);
    // Both cohorts can decide a team
    assert!(plan.matchups.iter().all(|m| m.series == 3));
}

#[test]
fn test_round_ignores_decided_teams_listed_first() {
    let teams = roster(4);
    let rules = SwissRules {
        teams: 4,
        win_threshold: 2,
        loss_threshold: 2,
        ..Default::default()
    };
    let state = state_with(
        4,
        &[
            (0, Record::new(2, 0), 0),
            (1, Record::new(1, 1), 0),
            (2, Record::new(1, 1), 0),
            (3, Record::new(0, 2), 0),
        ],
    );
    assert_eq!(current_round(&[0, 1, 2, 3], &state, &rules), 3);
    let plan = pair_round(&teams, &state, &[0, 1, 2, 3], &rules).unwrap();
    assert_eq!(plan.round, 3);
    assert_eq!(pairs(&plan), vec![(1, 2)]);
}

#[test]
fn test_round_three_series_escalation() {
    let teams = roster(8);
    let state = state_with(
        8,
        &[
            (0, Record::new(2, 0), 0),
            (1, Record::new(2, 0), 0),
            (2, Record::new(1, 1), 0),
            (3, Record::new(1, 1), 0),
            (4, Record::new(1, 1), 0),
            (5, Record::new(1, 1), 0),
            (6, Record::new(0, 2), 0),
            (7, Record::new(0, 2), 0),
        ],
    );
    let active: Vec<TeamId> = (0..8).collect();
    let plan = pair_round(&teams, &state, &active, &SwissRules::default()).unwrap();
    let series: Vec<u8> = plan.matchups.iter().map(|m| m.series).collect();
    assert_eq!(series, vec![3, 1, 1, 3]);
}

#[test]
fn test_record_outside_round_table_is_fatal() {
    let teams = roster(4);
    let state = state_with(
        4,
        &[
            (0, Record::new(1, 1), 0),
            (1, Record::new(1, 1), 0),
            (2, Record::new(0, 0), 0),
            (3, Record::new(0, 0), 0),
        ],
    );
    let err = pair_round(&teams, &state, &[0, 1, 2, 3], &SwissRules::default()).unwrap_err();
    assert_eq!(
        err,
        SwissError::UnexpectedRecord {
            record: Record::new(0, 0),
            round: 3
        }
    );
}

#[test]
fn test_round_past_table_is_fatal() {
    let teams = roster(2);
    let rules = SwissRules {
        teams: 2,
        win_threshold: 1,
        loss_threshold: 1,
        ..Default::default()
    };
    let state = state_with(2, &[(0, Record::new(1, 1), 0), (1, Record::new(1, 1), 0)]);
    assert_eq!(
        pair_round_at(&teams, &state, &[0, 1], 3, &rules),
        Err(SwissError::UnsupportedRound { round: 3 })
    );
}
