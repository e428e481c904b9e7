use jiff::SignedDuration;

use crate::solver::{optimizer_error::ConfigurationError, threads::Threads};

#[derive(Clone, Debug, PartialEq)]
pub struct AntColonyParams {
    pub num_ants: usize,
    pub num_iterations: usize,

    /// Pheromone exponent.
    pub alpha: f64,
    /// Proximity exponent.
    pub beta: f64,
    /// Urgency exponent, favours markets that are about to close.
    pub gamma: f64,

    pub evaporation_rate: f64,
    pub initial_pheromone: f64,
    pub min_pheromone: f64,
    /// Deposit constant, `Q`.
    pub pheromone_deposit: f64,

    pub use_elite: bool,
    pub elite_weight: f64,

    pub seed: u64,
    pub threads: Threads,

    /// Stops once this many iterations in a row failed to improve the best solution.
    pub max_iterations_without_improvement: Option<usize>,
    /// Stops once the run has been going for this long.
    pub max_duration: Option<SignedDuration>,
}

impl Default for AntColonyParams {
    fn default() -> Self {
        Self {
            num_ants: 50,
            num_iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            gamma: 1.5,
            evaporation_rate: 0.5,
            initial_pheromone: 1.0,
            min_pheromone: 1e-6,
            pheromone_deposit: 100.0,
            use_elite: true,
            elite_weight: 2.0,
            seed: 42,
            threads: Threads::Single,
            max_iterations_without_improvement: None,
            max_duration: None,
        }
    }
}

impl AntColonyParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: Threads) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_ants(mut self, num_ants: usize) -> Self {
        self.num_ants = num_ants;
        self
    }

    pub fn with_iterations(mut self, num_iterations: usize) -> Self {
        self.num_iterations = num_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.num_ants == 0 {
            return Err(ConfigurationError::ZeroCount("num_ants"));
        }

        if self.num_iterations == 0 {
            return Err(ConfigurationError::ZeroCount("num_iterations"));
        }

        if self.max_iterations_without_improvement == Some(0) {
            return Err(ConfigurationError::ZeroCount(
                "max_iterations_without_improvement",
            ));
        }

        ConfigurationError::check_non_negative("alpha", self.alpha)?;
        ConfigurationError::check_non_negative("beta", self.beta)?;
        ConfigurationError::check_non_negative("gamma", self.gamma)?;
        ConfigurationError::check_open_unit("evaporation_rate", self.evaporation_rate)?;
        ConfigurationError::check_positive("initial_pheromone", self.initial_pheromone)?;
        ConfigurationError::check_positive("min_pheromone", self.min_pheromone)?;
        ConfigurationError::check_positive("pheromone_deposit", self.pheromone_deposit)?;
        ConfigurationError::check_non_negative("elite_weight", self.elite_weight)?;

        if self.min_pheromone > self.initial_pheromone {
            return Err(ConfigurationError::OutOfRange {
                name: "min_pheromone",
                value: self.min_pheromone,
                expected: "<= initial_pheromone",
            });
        }

        if let Some(duration) = self.max_duration.filter(|duration| !duration.is_positive()) {
            return Err(ConfigurationError::OutOfRange {
                name: "max_duration",
                value: duration.as_secs_f64(),
                expected: "> 0",
            });
        }

        Ok(())
    }
}
