//! Roster files: the teams taking part and the stage format they play.
//!
//! A roster is a TOML document:
//!
//! ```toml
//! [ruleset]
//! kind = "swiss"
//! win_threshold = 3
//! loss_threshold = 3
//!
//! [[teams]]
//! name = "FURIA"
//! seed = 1
//! world_rank = 1.5
//! round_swing = 3.26
//! ```
//!
//! Omitted ruleset fields fall back to the standard format.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swiss_core::{Ruleset, SwissError, Team, TeamId};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while reading or writing a roster
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write roster {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse roster: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize roster: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid roster: {0}")]
    Invalid(#[from] SwissError),
}

/// Teams and the stage they play in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub ruleset: Ruleset,
    pub teams: Vec<Team>,
}

impl Roster {
    pub fn new(ruleset: Ruleset, teams: Vec<Team>) -> Self {
        Self { ruleset, teams }
    }

    /// The built-in 16-team Swiss stage
    pub fn standard() -> Self {
        Self::builtin(Ruleset::standard())
    }

    /// The built-in 8-team single-elimination stage: the top eight seeds
    pub fn champions() -> Self {
        Self::builtin(Ruleset::champions())
    }

    /// Built-in roster for `ruleset`: the best seeds of a major field.
    pub fn builtin(ruleset: Ruleset) -> Self {
        let teams = major_teams()
            .into_iter()
            .take(ruleset.team_count())
            .collect();
        Self::new(ruleset, teams)
    }

    /// Parse and validate a roster document.
    ///
    /// Single-elimination rosters listing more teams than the stage holds
    /// are cut down to the top seeds first.
    pub fn from_toml_str(contents: &str) -> Result<Self, RosterError> {
        let mut roster: Roster = toml::from_str(contents)?;
        roster.fit_to_ruleset();
        roster.validate()?;
        Ok(roster)
    }

    pub fn to_toml_string(&self) -> Result<String, RosterError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a roster from a TOML file
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            teams = roster.teams.len(),
            ruleset = roster.ruleset.name(),
            "roster loaded"
        );
        Ok(roster)
    }

    /// Save roster to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), RosterError> {
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents).map_err(|source| RosterError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SwissError> {
        self.ruleset.validate(&self.teams)
    }

    /// Drop teams past the size of a single-elimination stage.
    ///
    /// Swiss rosters are never trimmed. Returns how many teams were dropped.
    pub fn fit_to_ruleset(&mut self) -> usize {
        if !matches!(self.ruleset, Ruleset::SingleElimination(_)) {
            return 0;
        }
        let wanted = self.ruleset.team_count();
        if self.teams.len() <= wanted {
            return 0;
        }

        self.teams.sort_by_key(|team| team.seed);
        let dropped = self.teams.len() - wanted;
        self.teams.truncate(wanted);
        warn!(dropped, kept = wanted, "trimmed roster to the top seeds");
        dropped
    }

    /// Index of the team called `name`, ignoring case
    pub fn find(&self, name: &str) -> Option<TeamId> {
        self.teams
            .iter()
            .position(|team| team.name.eq_ignore_ascii_case(name))
    }
}

/// HLTV-derived profile of a 16-team major field.
fn major_teams() -> Vec<Team> {
    vec![
        Team::new("FURIA", 1, 1.5, 3.26),
        Team::new("Vitality", 2, 2.5, 2.68),
        Team::new("Falcons", 3, 2.5, 5.64),
        Team::new("MongolZ", 4, 5.0, -0.88),
        Team::new("MOUZ", 5, 4.0, 1.93),
        Team::new("Spirit", 6, 7.0, 0.74),
        Team::new("G2", 7, 9.0, 0.86),
        Team::new("paiN", 8, 14.0, 0.32),
        Team::new("NAVI", 9, 7.0, 0.11),
        Team::new("FaZe", 10, 13.0, 0.83),
        Team::new("B8", 11, 14.0, 0.10),
        Team::new("Imperial", 12, 31.5, -0.55),
        Team::new("PARIVISION", 13, 21.0, 2.44),
        Team::new("Liquid", 14, 13.0, -0.83),
        Team::new("Passion UA", 15, 23.0, -5.61),
        Team::new("3DMAX", 16, 14.5, -0.81),
    ]
}

#[cfg(test)]
#[path = "roster_tests.rs"]
mod roster_tests;
