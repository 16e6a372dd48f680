use super::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn team(rank: f64, swing: f64) -> Team {
    Team::new("test", 1, rank, swing)
}

#[test]
fn test_equal_teams_are_coin_flips() {
    let a = team(5.0, 1.0);
    let b = team(5.0, 1.0);
    for series in [1, 3, 5] {
        assert!((win_probability(&a, &b, series) - 0.5).abs() < 1e-12);
    }
}

#[test]
fn test_better_rank_is_favoured() {
    let strong = team(1.0, 0.0);
    let weak = team(40.0, 0.0);
    assert!(win_probability(&strong, &weak, 1) > 0.5);
    assert_eq!(most_likely_winner(&strong, &weak, 1), Side::First);
    assert_eq!(most_likely_winner(&weak, &strong, 1), Side::Second);
}

#[test]
fn test_longer_series_lean_on_rank() {
    // Better ranked but worse swing: ranking matters more in a bo3
    let ranked = team(2.0, -1.0);
    let swingy = team(20.0, 2.0);
    let bo1 = win_probability(&ranked, &swingy, 1);
    let bo3 = win_probability(&ranked, &swingy, 3);
    assert!(bo3 > bo1);
}

#[test]
fn test_degenerate_rank_is_clamped() {
    let zero = team(0.0, 0.5);
    let negative = team(-12.0, 0.5);
    let one = team(1.0, 0.5);
    let p = win_probability(&zero, &one, 1);
    assert!(p.is_finite());
    assert!((p - 0.5).abs() < 1e-12);
    assert!((win_probability(&negative, &one, 3) - 0.5).abs() < 1e-12);
}

#[test]
fn test_wins_needed() {
    assert_eq!(wins_needed(1), 1);
    assert_eq!(wins_needed(3), 2);
    assert_eq!(wins_needed(5), 3);
}

#[test]
fn test_series_stops_at_majority() {
    let a = team(3.0, 0.2);
    let b = team(9.0, -0.1);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..500 {
        let outcome = simulate_series(&a, &b, 3, &mut rng);
        let (winner_games, loser_games) = match outcome.winner {
            Side::First => (outcome.first_games, outcome.second_games),
            Side::Second => (outcome.second_games, outcome.first_games),
        };
        assert_eq!(winner_games, 2);
        assert!(loser_games <= 1);
    }
}

#[test]
fn test_series_is_reproducible() {
    let a = team(3.0, 0.2);
    let b = team(9.0, -0.1);
    let mut first = ChaCha8Rng::seed_from_u64(99);
    let mut second = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..100 {
        assert_eq!(
            simulate_series(&a, &b, 1, &mut first),
            simulate_series(&a, &b, 1, &mut second)
        );
    }
}

#[test]
fn test_heavy_favourite_wins_most_series() {
    let a = team(1.0, 5.0);
    let b = team(90.0, -5.0);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let wins = (0..2000)
        .filter(|_| simulate_series(&a, &b, 1, &mut rng).winner == Side::First)
        .count();
    let expected = win_probability(&a, &b, 1) * 2000.0;
    assert!((wins as f64 - expected).abs() < 100.0);
}

proptest! {
    #[test]
    fn prop_probability_is_symmetric(
        rank_a in -5.0f64..150.0,
        rank_b in -5.0f64..150.0,
        swing_a in -6.0f64..6.0,
        swing_b in -6.0f64..6.0,
        series in prop::sample::select(vec![1u8, 3, 5]),
    ) {
        let a = team(rank_a, swing_a);
        let b = team(rank_b, swing_b);
        let sum = win_probability(&a, &b, series) + win_probability(&b, &a, series);
        prop_assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_probability_is_open_unit_interval(
        rank_a in 1.0f64..100.0,
        rank_b in 1.0f64..100.0,
        swing_a in -6.0f64..6.0,
        swing_b in -6.0f64..6.0,
    ) {
        let p = win_probability(&team(rank_a, swing_a), &team(rank_b, swing_b), 1);
        prop_assert!(p > 0.0 && p < 1.0);
    }
}
