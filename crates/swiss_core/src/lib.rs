//! Swiss-system bracket engine.
//!
//! Predicts how a Swiss stage (or a single-elimination stage) plays out by
//! running many randomized trials:
//!
//! - [`outcome`]: win probability and best-of-N series resolution
//! - [`pairing`]: record cohorts, Buchholz scores, standings and opponent choice
//! - [`bracket`]: the per-trial round loop
//! - [`montecarlo`]: fan-out over a worker pool and aggregation of final records
//!
//! # Example
//!
//! ```
//! use swiss_core::{simulate_many, Ruleset, SimulationOptions, Team};
//!
//! let teams: Vec<Team> = (1..=16)
//!     .map(|seed| Team::new(&format!("Team {}", seed), seed, seed as f64, 0.0))
//!     .collect();
//! let dist = simulate_many(&teams, 100, &Ruleset::standard(), &SimulationOptions::default())
//!     .unwrap();
//! assert_eq!(dist.total(0), 100);
//! ```

pub mod bracket;
pub mod error;
pub mod montecarlo;
pub mod outcome;
pub mod pairing;
pub mod ruleset;
pub mod state;
pub mod stop;
pub mod types;

pub use bracket::{simulate_one_trial, Bracket, Phase, TrialOutcome};
pub use error::SwissError;
pub use montecarlo::{simulate_many, trial_rng, RecordDistribution, SimulationOptions};
pub use outcome::{most_likely_winner, simulate_series, win_probability, SeriesOutcome, Side};
pub use ruleset::{EliminationRules, Ruleset, SwissRules};
pub use stop::StopFlag;
pub use types::*;
