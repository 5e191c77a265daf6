//! Runtime search configuration.

use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    EXPLORATION, HEURISTIC_WEIGHT, MCTS_SAFETY_MARGIN_MS, SOLVER_SAFETY_MARGIN_MS, TIME_LIMIT_MS,
};

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("exploration constant must be finite and non-negative, got {0}")]
    Exploration(f64),

    #[error("heuristic weight must be finite and non-negative, got {0}")]
    HeuristicWeight(f64),

    #[error("time limit {limit:?} must exceed the safety margin {margin:?}")]
    TimeLimit { limit: Duration, margin: Duration },
}

/// Configuration for the MCTS engine.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// UCT exploration constant `C`.
    pub exploration: f64,

    /// Weight `W` of the cached heuristic term. 0 disables it.
    pub heuristic_weight: f64,

    /// Wall-clock budget per move.
    pub time_limit: Duration,

    /// Search stops this much before `time_limit`.
    pub safety_margin: Duration,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: EXPLORATION,
            heuristic_weight: HEURISTIC_WEIGHT,
            time_limit: Duration::from_millis(TIME_LIMIT_MS),
            safety_margin: Duration::from_millis(MCTS_SAFETY_MARGIN_MS),
        }
    }
}

impl MctsConfig {
    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the heuristic weight.
    pub fn with_heuristic_weight(mut self, w: f64) -> Self {
        self.heuristic_weight = w;
        self
    }

    /// Builder pattern: set the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Time actually available for iterations.
    pub fn budget(&self) -> Duration {
        self.time_limit.saturating_sub(self.safety_margin)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Exploration(self.exploration));
        }
        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 0.0 {
            return Err(ConfigError::HeuristicWeight(self.heuristic_weight));
        }
        if self.time_limit <= self.safety_margin {
            return Err(ConfigError::TimeLimit {
                limit: self.time_limit,
                margin: self.safety_margin,
            });
        }
        Ok(())
    }
}

/// Configuration for the alpha-beta solver.
///
/// The time limit is not part of the configuration: each
/// [`solve`](crate::solver::AlphaBetaSolver::solve) call receives its own.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Search stops this much before the limit passed to `solve`.
    pub safety_margin: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            safety_margin: Duration::from_millis(SOLVER_SAFETY_MARGIN_MS),
        }
    }
}

impl SolverConfig {
    /// Builder pattern: set the safety margin.
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Time actually available to a search given `time_limit`.
    pub fn budget(&self, time_limit: Duration) -> Duration {
        time_limit.saturating_sub(self.safety_margin)
    }

    /// Check that `time_limit` leaves any time after the safety margin.
    pub fn validate(&self, time_limit: Duration) -> Result<(), ConfigError> {
        if time_limit <= self.safety_margin {
            return Err(ConfigError::TimeLimit {
                limit: time_limit,
                margin: self.safety_margin,
            });
        }
        Ok(())
    }
}
