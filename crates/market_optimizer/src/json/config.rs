use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    problem::{
        market::Market,
        market_problem::{
            DEFAULT_DAY_END, DEFAULT_DAY_START, DEFAULT_STAY_DURATION, Problem, ProblemBuilder,
            StartLocation,
        },
        travel_time_matrix::TravelTimeMatrix,
    },
    solver::{
        aco::ant_colony_params::AntColonyParams,
        greedy::{
            greedy_params::GreedyParams,
            greedy_rule::{
                DEFAULT_HYBRID_DISTANCE_WEIGHT, DEFAULT_HYBRID_TIME_WINDOW_WEIGHT, GreedyRule,
            },
        },
        multi_day::{algorithm::Algorithm, multi_day_params::MultiDayParams},
        optimizer_error::ConfigurationError,
        threads::Threads,
    },
};

use super::{
    json_error::JsonError,
    types::{JsonMarket, JsonStartLocation, JsonTravelTimes, parse_clock_time},
};

const MAX_SECONDS: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    #[default]
    Aco,
    Nearest,
    EarliestClosing,
    TimeEfficient,
    Hybrid,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::Aco,
        AlgorithmKind::Nearest,
        AlgorithmKind::EarliestClosing,
        AlgorithmKind::TimeEfficient,
        AlgorithmKind::Hybrid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmKind::Aco => "aco",
            AlgorithmKind::Nearest => "nearest",
            AlgorithmKind::EarliestClosing => "earliest-closing",
            AlgorithmKind::TimeEfficient => "time-efficient",
            AlgorithmKind::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| {
                let names = AlgorithmKind::ALL.map(|kind| kind.name()).join(", ");
                format!("unknown algorithm \"{value}\", expected one of {names}")
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename = "AntColonyConfig")]
pub struct JsonAntColonyConfig {
    pub num_ants: usize,
    pub num_iterations: usize,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub evaporation_rate: f64,
    pub initial_pheromone: f64,
    pub min_pheromone: f64,
    pub pheromone_deposit: f64,
    pub use_elite: bool,
    pub elite_weight: f64,
    pub seed: u64,
    /// `0` uses every available core.
    pub threads: usize,
    pub max_iterations_without_improvement: Option<usize>,
    pub max_duration_secs: Option<f64>,
}

impl Default for JsonAntColonyConfig {
    fn default() -> Self {
        let params = AntColonyParams::default();
        Self {
            num_ants: params.num_ants,
            num_iterations: params.num_iterations,
            alpha: params.alpha,
            beta: params.beta,
            gamma: params.gamma,
            evaporation_rate: params.evaporation_rate,
            initial_pheromone: params.initial_pheromone,
            min_pheromone: params.min_pheromone,
            pheromone_deposit: params.pheromone_deposit,
            use_elite: params.use_elite,
            elite_weight: params.elite_weight,
            seed: params.seed,
            threads: params.threads.number_of_threads(),
            max_iterations_without_improvement: params.max_iterations_without_improvement,
            max_duration_secs: None,
        }
    }
}

impl JsonAntColonyConfig {
    pub fn to_params(&self) -> Result<AntColonyParams, ConfigurationError> {
        let max_duration = self
            .max_duration_secs
            .map(|seconds| checked_duration("max_duration_secs", seconds))
            .transpose()?;

        Ok(AntColonyParams {
            num_ants: self.num_ants,
            num_iterations: self.num_iterations,
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            evaporation_rate: self.evaporation_rate,
            initial_pheromone: self.initial_pheromone,
            min_pheromone: self.min_pheromone,
            pheromone_deposit: self.pheromone_deposit,
            use_elite: self.use_elite,
            elite_weight: self.elite_weight,
            seed: self.seed,
            threads: Threads::from(self.threads),
            max_iterations_without_improvement: self.max_iterations_without_improvement,
            max_duration,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename = "GreedyConfig")]
pub struct JsonGreedyConfig {
    pub multi_start: bool,
    pub distance_weight: f64,
    pub time_window_weight: f64,
}

impl Default for JsonGreedyConfig {
    fn default() -> Self {
        Self {
            multi_start: GreedyParams::default().multi_start,
            distance_weight: DEFAULT_HYBRID_DISTANCE_WEIGHT,
            time_window_weight: DEFAULT_HYBRID_TIME_WINDOW_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename = "ProblemConfig")]
pub struct JsonProblemConfig {
    pub num_days: usize,
    /// Minutes spent at each market, one value per day.
    pub stay_durations: Vec<f64>,
    /// Minutes added to every move between two places.
    pub transfer_buffer: f64,
    /// `HH:MM`, defaults to the earliest opening, or midnight without markets.
    pub day_start: Option<String>,
    /// `HH:MM`, defaults to the latest closing, or the end of the day without markets.
    pub day_end: Option<String>,
    pub start_location: Option<JsonStartLocation>,
    /// Speed used to estimate travel times when no travel time file is given.
    pub speed_kmh: f64,
}

impl Default for JsonProblemConfig {
    fn default() -> Self {
        Self {
            num_days: 1,
            stay_durations: Vec::new(),
            transfer_buffer: 5.0,
            day_start: None,
            day_end: None,
            start_location: None,
            speed_kmh: 15.0,
        }
    }
}

impl JsonProblemConfig {
    pub fn multi_day_params(&self) -> Result<MultiDayParams, ConfigurationError> {
        let stay_durations = self
            .stay_durations
            .iter()
            .map(|&minutes| checked_duration("stay_durations", minutes * 60.0))
            .collect::<Result<Vec<_>, _>>()?;

        let params = MultiDayParams::new(self.num_days).with_stay_durations(stay_durations);
        params.validate()?;

        Ok(params)
    }

    /// Builds the problem from the loaded market list.
    ///
    /// Without travel times, they are estimated from the coordinates at
    /// `speed_kmh`. With `symmetric`, a missing `a -> b` takes the value of `b -> a`.
    #[instrument(skip_all, level = "debug")]
    pub fn build_problem(
        &self,
        markets: &[JsonMarket],
        travel_times: Option<&JsonTravelTimes>,
        symmetric: bool,
    ) -> Result<Problem, JsonError> {
        let markets = markets
            .iter()
            .map(JsonMarket::to_market)
            .collect::<Result<Vec<_>, _>>()?;
        let start_location = self.start_location.as_ref().map(StartLocation::from);

        let mut matrix = match travel_times {
            Some(travel_times) => travel_times.to_matrix(&markets, start_location.is_some())?,
            None => {
                ConfigurationError::check_positive("speed_kmh", self.speed_kmh)?;
                let points = markets
                    .iter()
                    .map(Market::point)
                    .chain(start_location.iter().map(StartLocation::point))
                    .collect::<Vec<_>>();
                debug!("Estimating travel times at {} km/h", self.speed_kmh);
                TravelTimeMatrix::from_haversine(&points, self.speed_kmh)
            }
        };

        if symmetric {
            let filled = matrix.fill_missing_from_reverse();
            debug!("Filled {} travel times from the reverse direction", filled);
        }

        let stay_duration = match self.stay_durations.first() {
            Some(&minutes) => checked_duration("stay_durations", minutes * 60.0)?,
            None => DEFAULT_STAY_DURATION,
        };

        let day_start = self
            .day_start
            .as_deref()
            .map(parse_clock_time)
            .transpose()?
            .or_else(|| markets.iter().map(Market::opening).min())
            .unwrap_or(DEFAULT_DAY_START);
        let day_end = self
            .day_end
            .as_deref()
            .map(parse_clock_time)
            .transpose()?
            .or_else(|| markets.iter().map(Market::closing).max())
            .unwrap_or(DEFAULT_DAY_END);

        let mut builder = ProblemBuilder::default();
        builder
            .set_markets(markets)
            .set_travel_times(matrix)
            .set_day_window(day_start, day_end)
            .set_stay_duration(stay_duration)
            .set_transfer_buffer(checked_duration(
                "transfer_buffer",
                self.transfer_buffer * 60.0,
            )?);

        if let Some(start_location) = start_location {
            builder.set_start_location(start_location);
        }

        Ok(builder.build()?)
    }
}

/// Everything a run needs besides the input data. Every field has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename = "OptimizerConfig")]
pub struct OptimizerConfig {
    pub algorithm: AlgorithmKind,
    pub aco: JsonAntColonyConfig,
    pub greedy: JsonGreedyConfig,
    pub problem: JsonProblemConfig,
}

impl OptimizerConfig {
    pub fn from_json(json: &str) -> Result<Self, JsonError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, JsonError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn to_algorithm(&self) -> Result<Algorithm, ConfigurationError> {
        let greedy = |rule| {
            Algorithm::Greedy(GreedyParams::new(rule).with_multi_start(self.greedy.multi_start))
        };

        let algorithm = match self.algorithm {
            AlgorithmKind::Aco => Algorithm::AntColony(self.aco.to_params()?),
            AlgorithmKind::Nearest => greedy(GreedyRule::NearestNeighbor),
            AlgorithmKind::EarliestClosing => greedy(GreedyRule::EarliestClosing),
            AlgorithmKind::TimeEfficient => greedy(GreedyRule::TimeEfficient),
            AlgorithmKind::Hybrid => greedy(GreedyRule::Hybrid {
                distance_weight: self.greedy.distance_weight,
                time_window_weight: self.greedy.time_window_weight,
            }),
        };

        algorithm.validate()?;
        Ok(algorithm)
    }
}

/// The sign is kept so that validation can report it.
fn checked_duration(
    name: &'static str,
    seconds: f64,
) -> Result<SignedDuration, ConfigurationError> {
    if !seconds.is_finite() || seconds.abs() > MAX_SECONDS {
        return Err(ConfigurationError::OutOfRange {
            name,
            value: seconds,
            expected: "a finite duration",
        });
    }

    Ok(SignedDuration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::civil::time;

    use super::*;
    use crate::{
        json::types::parse_markets, problem::validation_error::ValidationError,
        solver::multi_day::scheduler::MultiDayScheduler,
    };

    const MARKETS: &str = r#"[
        { "id": 3, "name": "Karlsplatz", "latitude": 48.1987, "longitude": 16.3713,
          "opening_time": "12:00", "closing_time": "20:00" },
        { "id": 1, "name": "Schönbrunn", "latitude": 48.1845, "longitude": 16.3122,
          "opening_time": "10:00", "closing_time": "21:00" }
    ]"#;

    #[test]
    fn test_default_config() {
        let config = OptimizerConfig::from_json("{}").unwrap();

        assert_eq!(config.algorithm, AlgorithmKind::Aco);
        assert_eq!(
            config.to_algorithm().unwrap(),
            Algorithm::AntColony(AntColonyParams::default())
        );
        assert_eq!(
            config.problem.multi_day_params().unwrap(),
            MultiDayParams::default()
        );
    }

    #[test]
    fn test_partial_config() {
        let config = OptimizerConfig::from_json(
            r#"{
                "algorithm": "hybrid",
                "greedy": { "distance_weight": 0.2, "multi_start": true },
                "problem": { "num_days": 3, "stay_durations": [45, 20] }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.to_algorithm().unwrap(),
            Algorithm::Greedy(
                GreedyParams::new(GreedyRule::Hybrid {
                    distance_weight: 0.2,
                    time_window_weight: 0.6,
                })
                .with_multi_start(true)
            )
        );

        let params = config.problem.multi_day_params().unwrap();
        assert_eq!(params.num_days, 3);
        assert_eq!(
            params.stay_durations,
            vec![SignedDuration::from_mins(45), SignedDuration::from_mins(20)]
        );
    }

    #[test]
    fn test_aco_config() {
        let config = OptimizerConfig::from_json(
            r#"{ "aco": { "num_ants": 5, "threads": 0, "max_duration_secs": 2.5 } }"#,
        )
        .unwrap();

        let Algorithm::AntColony(params) = config.to_algorithm().unwrap() else {
            panic!("expected the ant colony");
        };
        assert_eq!(params.num_ants, 5);
        assert_eq!(params.threads, Threads::Auto);
        assert_eq!(params.max_duration, Some(SignedDuration::from_millis(2500)));
    }

    #[test]
    fn test_invalid_values() {
        let config =
            OptimizerConfig::from_json(r#"{ "aco": { "evaporation_rate": 1.0 } }"#).unwrap();
        assert!(matches!(
            config.to_algorithm(),
            Err(ConfigurationError::OutOfRange {
                name: "evaporation_rate",
                ..
            })
        ));

        let config =
            OptimizerConfig::from_json(r#"{ "problem": { "stay_durations": [30, -10] } }"#)
                .unwrap();
        assert!(matches!(
            config.problem.multi_day_params(),
            Err(ConfigurationError::NegativeStayDuration { day: 2, .. })
        ));

        assert!(matches!(
            OptimizerConfig::from_json(r#"{ "algorithm": "tabu" }"#),
            Err(JsonError::Parse(_))
        ));
        assert!(matches!(
            OptimizerConfig::from_json(r#"{ "ants": 3 }"#),
            Err(JsonError::Parse(_))
        ));
    }

    #[test]
    fn test_algorithm_kind_from_str() {
        assert_eq!(
            "earliest-closing".parse::<AlgorithmKind>(),
            Ok(AlgorithmKind::EarliestClosing)
        );
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.to_string().parse::<AlgorithmKind>(), Ok(kind));
        }
        assert!("fastest".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn test_build_problem_with_travel_times() {
        let markets = parse_markets(MARKETS).unwrap();
        let travel_times =
            JsonTravelTimes::from_json(r#"{ "times": { "3": { "1": 18 }, "start": { "3": 7 } } }"#)
                .unwrap();
        let config = JsonProblemConfig {
            day_start: Some(String::from("09:30")),
            start_location: Some(JsonStartLocation {
                name: String::from("Hotel"),
                latitude: 48.2,
                longitude: 16.37,
            }),
            ..JsonProblemConfig::default()
        };

        let problem = config
            .build_problem(&markets, Some(&travel_times), true)
            .unwrap();

        assert_eq!(problem.num_markets(), 2);
        assert_eq!(problem.day_start(), time(9, 30, 0, 0));
        assert_eq!(problem.day_end(), time(21, 0, 0, 0));
        assert_eq!(problem.transfer_buffer(), SignedDuration::from_mins(5));
        assert_eq!(problem.start_location().unwrap().name(), "Hotel");

        let matrix = problem.travel_times();
        assert_eq!(matrix.minutes(0, 1), 18.0);
        // Filled from the reverse direction.
        assert_eq!(matrix.minutes(1, 0), 18.0);
        assert_eq!(matrix.minutes(2, 0), 7.0);
        assert_eq!(matrix.minutes(0, 2), 7.0);
        assert!(!matrix.is_reachable(2, 1));
    }

    #[test]
    fn test_build_problem_estimates_travel_times() {
        let markets = parse_markets(MARKETS).unwrap();
        let config = JsonProblemConfig {
            stay_durations: vec![40.0],
            ..JsonProblemConfig::default()
        };

        let problem = config.build_problem(&markets, None, false).unwrap();

        assert_eq!(problem.stay_duration(), SignedDuration::from_mins(40));
        assert_eq!(problem.day_start(), time(10, 0, 0, 0));
        let minutes = problem.travel_times().minutes(0, 1);
        assert!(minutes > 10.0 && minutes < 30.0, "{minutes}");
        let reverse = problem.travel_times().minutes(1, 0);
        assert!((reverse - minutes).abs() < 1e-9);
    }

    #[test]
    fn test_build_problem_errors() {
        let markets = parse_markets(MARKETS).unwrap();

        let config = JsonProblemConfig {
            day_end: Some(String::from("9pm")),
            ..JsonProblemConfig::default()
        };
        assert!(matches!(
            config.build_problem(&markets, None, false),
            Err(JsonError::InvalidTime(_))
        ));

        let config = JsonProblemConfig {
            day_start: Some(String::from("18:00")),
            day_end: Some(String::from("08:00")),
            ..JsonProblemConfig::default()
        };
        assert!(matches!(
            config.build_problem(&markets, None, false),
            Err(JsonError::Validation(
                ValidationError::InvalidDayWindow { .. }
            ))
        ));
    }

    #[test]
    fn test_empty_market_list_plans_empty_days() {
        let config = OptimizerConfig::from_json(r#"{ "problem": { "num_days": 2 } }"#).unwrap();
        let markets = parse_markets("[]").unwrap();

        let problem = config.problem.build_problem(&markets, None, false).unwrap();
        assert!(problem.is_empty());
        assert_eq!(problem.day_start(), DEFAULT_DAY_START);
        assert_eq!(problem.day_end(), DEFAULT_DAY_END);

        let solution = MultiDayScheduler::new(
            Arc::new(problem),
            config.to_algorithm().unwrap(),
            config.problem.multi_day_params().unwrap(),
        )
        .unwrap()
        .solve()
        .unwrap();

        assert_eq!(solution.num_days(), 2);
        assert!(solution.days().iter().all(|plan| plan.solution.is_empty()));
        assert_eq!(solution.total_score(), 0);
        assert!(solution.unvisited().is_empty());
    }
}
