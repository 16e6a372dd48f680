//! Match outcome model.
//!
//! Win probability is a logistic function of the score difference between
//! two teams. A team's score blends its world ranking (linear plus a
//! logarithmic adjustment that separates the very top ranks) with its round
//! swing. Longer series lean harder on ranking.

use rand::Rng;

use crate::types::Team;

/// Logistic steepness applied to the score difference
pub const SCALE: f64 = 0.3;

/// Rank range used to normalise the logarithmic rank adjustment
pub const MAX_RANK: f64 = 100.0;

/// Share of the score taken by world ranking for a best-of-N series.
pub fn rank_weight(series: u8) -> f64 {
    match series {
        0 | 1 => 0.50,
        2 | 3 => 0.70,
        _ => 0.90,
    }
}

/// Probability that `a` wins a best-of-`series` against `b`.
///
/// Ranks below 1 are clamped to 1 so the logarithm stays defined.
pub fn win_probability(a: &Team, b: &Team, series: u8) -> f64 {
    let rank_weight = rank_weight(series);
    let other_weight = 1.0 - rank_weight;

    let a_rank = a.world_rank.max(1.0);
    let b_rank = b.world_rank.max(1.0);
    let log_adj = (b_rank.ln() - a_rank.ln()) / MAX_RANK.ln();

    let a_score = rank_weight / MAX_RANK * (MAX_RANK - a_rank)
        + other_weight * a.round_swing
        + rank_weight * log_adj;
    let b_score = rank_weight / MAX_RANK * (MAX_RANK - b_rank)
        + other_weight * b.round_swing
        - rank_weight * log_adj;

    1.0 / (1.0 + (-SCALE * (a_score - b_score)).exp())
}

/// Game wins needed to take a best-of-`series`.
pub fn wins_needed(series: u8) -> u8 {
    series.div_ceil(2).max(1)
}

/// Which side of a series won
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// Outcome of one simulated series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesOutcome {
    pub winner: Side,
    /// Probability that the first team wins, as used for the draws
    pub first_probability: f64,
    pub first_games: u8,
    pub second_games: u8,
}

impl SeriesOutcome {
    /// Pre-match probability of the side that actually won
    pub fn winner_probability(&self) -> f64 {
        match self.winner {
            Side::First => self.first_probability,
            Side::Second => 1.0 - self.first_probability,
        }
    }
}

/// Play out a best-of-`series`, one uniform draw per game.
///
/// The first team takes a game when its draw falls below the win
/// probability. The series stops as soon as either side has
/// [`wins_needed`] games.
pub fn simulate_series<R: Rng + ?Sized>(
    a: &Team,
    b: &Team,
    series: u8,
    rng: &mut R,
) -> SeriesOutcome {
    let probability = win_probability(a, b, series);
    let needed = wins_needed(series);

    let mut first_games = 0u8;
    let mut second_games = 0u8;
    while first_games < needed && second_games < needed {
        if rng.gen_range(0.0..1.0) < probability {
            first_games += 1;
        } else {
            second_games += 1;
        }
    }

    SeriesOutcome {
        winner: if first_games == needed {
            Side::First
        } else {
            Side::Second
        },
        first_probability: probability,
        first_games,
        second_games,
    }
}

/// Favourite of a matchup without any randomness.
///
/// Returns `First` when the first team's probability is at least one half.
pub fn most_likely_winner(a: &Team, b: &Team, series: u8) -> Side {
    if win_probability(a, b, series) >= 0.5 {
        Side::First
    } else {
        Side::Second
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod outcome_tests;
