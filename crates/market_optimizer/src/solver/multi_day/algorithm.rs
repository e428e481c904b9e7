use crate::solver::{
    aco::ant_colony_params::AntColonyParams, greedy::greedy_params::GreedyParams,
    optimizer_error::ConfigurationError,
};

/// The single-day optimizer run for every day of a plan.
#[derive(Clone, Debug, PartialEq)]
pub enum Algorithm {
    AntColony(AntColonyParams),
    Greedy(GreedyParams),
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::AntColony(AntColonyParams::default())
    }
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::AntColony(_) => "aco",
            Algorithm::Greedy(params) => params.rule.name(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Algorithm::AntColony(params) => params.validate(),
            Algorithm::Greedy(params) => params.validate(),
        }
    }
}
