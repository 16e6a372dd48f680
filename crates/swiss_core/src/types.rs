use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a team inside the roster slice a trial was started with.
pub type TeamId = usize;

/// A participating team. Read-only for the lifetime of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Tournament seed, 1 is the top seed
    pub seed: u32,
    /// Averaged world ranking, lower is better
    pub world_rank: f64,
    /// Average round swing of the lineup, higher is better
    pub round_swing: f64,
}

impl Team {
    pub fn new(name: &str, seed: u32, world_rank: f64, round_swing: f64) -> Self {
        Self {
            name: name.to_string(),
            seed,
            world_rank,
            round_swing,
        }
    }
}

/// Win/loss record of one team within one trial.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Record {
    pub wins: u8,
    pub losses: u8,
}

impl Record {
    pub const fn new(wins: u8, losses: u8) -> Self {
        Self { wins, losses }
    }

    pub fn games(&self) -> u32 {
        u32::from(self.wins) + u32::from(self.losses)
    }

    pub fn differential(&self) -> i32 {
        i32::from(self.wins) - i32::from(self.losses)
    }

    pub fn add_win(&mut self) {
        self.wins += 1;
    }

    pub fn add_loss(&mut self) {
        self.losses += 1;
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

impl std::str::FromStr for Record {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (wins, losses) = s
            .split_once('-')
            .ok_or_else(|| format!("Record must look like W-L: {}", s))?;
        let wins = wins
            .trim()
            .parse()
            .map_err(|e| format!("Invalid win count in {}: {}", s, e))?;
        let losses = losses
            .trim()
            .parse()
            .map_err(|e| format!("Invalid loss count in {}: {}", s, e))?;
        Ok(Self::new(wins, losses))
    }
}

/// A scheduled match between two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub round: u32,
    /// Higher-placed team of the pair (the one that picked its opponent)
    pub home: TeamId,
    pub away: TeamId,
    /// Best-of-N; always odd
    pub series: u8,
}

impl Matchup {
    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }
}

/// Result of a resolved match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matchup: Matchup,
    pub winner: TeamId,
    pub loser: TeamId,
    /// Pre-match probability that `winner` would take the series
    pub winner_probability: f64,
}

impl MatchResult {
    pub fn upset(&self) -> bool {
        self.winner_probability < 0.5
    }
}
