use crate::solver::optimizer_error::ConfigurationError;

use super::greedy_rule::GreedyRule;

#[derive(Clone, Debug, PartialEq)]
pub struct GreedyParams {
    pub rule: GreedyRule,
    /// Without a fixed start location, builds one route per feasible first
    /// market and keeps the best.
    pub multi_start: bool,
}

impl Default for GreedyParams {
    fn default() -> Self {
        Self {
            rule: GreedyRule::NearestNeighbor,
            multi_start: false,
        }
    }
}

impl GreedyParams {
    pub fn new(rule: GreedyRule) -> Self {
        Self {
            rule,
            ..Self::default()
        }
    }

    pub fn with_multi_start(mut self, multi_start: bool) -> Self {
        self.multi_start = multi_start;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let GreedyRule::Hybrid {
            distance_weight,
            time_window_weight,
        } = self.rule
        {
            ConfigurationError::check_non_negative("distance_weight", distance_weight)?;
            ConfigurationError::check_non_negative("time_window_weight", time_window_weight)?;
        }

        Ok(())
    }
}
