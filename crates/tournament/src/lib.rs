//! Simulation runs for Swiss and single-elimination stages
//!
//! This crate provides infrastructure for:
//! - Loading rosters (teams plus stage format) from TOML
//! - Running seeded Monte Carlo simulations on a sized worker pool
//! - Generating result tables, head-to-head summaries and JSON exports
//!
//! # Usage
//!
//! ```bash
//! # Simulate the built-in 16-team Swiss stage
//! cargo run -p tournament -- simulate --trials 1000000
//!
//! # Simulate a roster file and export the summary
//! cargo run -p tournament -- simulate --roster major.toml --json report.json
//!
//! # Opening-round favourites for the built-in Champions stage
//! cargo run -p tournament -- odds --bracket champions
//! ```

mod results;
mod roster;
mod runner;

pub use results::*;
pub use roster::*;
pub use runner::*;
