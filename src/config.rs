//! Solver settings loadable from TOML.
//!
//! ```
//! use slider_puzzle_ida::SolverConfig;
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     max_nodes = 5_000_000
//!     time_limit_ms = 2500
//!     parallel = true
//! "#).unwrap();
//!
//! assert_eq!(config.limits().time_limit, Some(Duration::from_millis(2500)));
//! assert!(config.verify_solvability);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::puzzle::{Board, Verification};
use crate::search::{solve_parallel, solve_with_limits, Outcome, SearchLimits};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop after this many nodes have been taken off the frontier.
    pub max_nodes: Option<u64>,

    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Split each iteration across the root's children on the rayon pool.
    pub parallel: bool,

    /// Reject unsolvable boards when parsing tiles.
    pub verify_solvability: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_nodes: None,
            time_limit_ms: None,
            parallel: false,
            verify_solvability: true,
        }
    }
}

impl SolverConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_nodes: self.max_nodes,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }

    pub fn verification(&self) -> Verification {
        if self.verify_solvability {
            Verification::Check
        } else {
            Verification::Skip
        }
    }

    /// Runs the search the way this configuration asks for.
    pub fn solve(&self, board: &Board) -> Outcome {
        if self.parallel {
            solve_parallel(board, &self.limits())
        } else {
            solve_with_limits(board, &self.limits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.limits(), SearchLimits::unbounded());
        assert_eq!(config.verification(), Verification::Check);
    }

    #[test]
    fn test_full_toml() {
        let config = SolverConfig::from_toml_str(
            r#"
            max_nodes = 1000
            time_limit_ms = 250
            parallel = true
            verify_solvability = false
            "#,
        )
        .unwrap();
        assert_eq!(config.max_nodes, Some(1000));
        assert_eq!(config.limits().time_limit, Some(Duration::from_millis(250)));
        assert!(config.parallel);
        assert_eq!(config.verification(), Verification::Skip);
    }

    #[test]
    fn test_serialized_keys_match_field_names() {
        let text = toml::to_string(&SolverConfig::default()).unwrap();
        assert!(text.contains("parallel = false"));
        assert!(text.contains("verify_solvability = true"));
        assert_eq!(SolverConfig::from_toml_str(&text).unwrap(), SolverConfig::default());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let result = SolverConfig::from_toml_str("max_nodes = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SolverConfig::load("/nonexistent/solver.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_solve_respects_limits() {
        let board = Board::from_tiles(&[2, 4, 0, 3, 6, 7, 5, 8, 1]).unwrap();
        let config = SolverConfig {
            max_nodes: Some(10),
            ..SolverConfig::default()
        };
        assert!(config.solve(&board).solution().is_none());

        let solution = SolverConfig::default().solve(&board).into_solution().unwrap();
        assert_eq!(solution.cost, 26);
    }
}
