use std::fmt;

use serde::Serialize;

use crate::{
    problem::market_problem::Problem,
    solver::solution::stop::Stop,
    utils::time::{minutes, minutes_between},
};

pub const DEFAULT_HYBRID_DISTANCE_WEIGHT: f64 = 0.4;
pub const DEFAULT_HYBRID_TIME_WINDOW_WEIGHT: f64 = 0.6;

/// How the greedy constructor picks the next market among the feasible ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GreedyRule {
    /// Shortest move from the current position.
    NearestNeighbor,
    /// Market closing first.
    EarliestClosing,
    /// Highest `1 / (travel + stay)`.
    TimeEfficient,
    /// Lowest weighted sum of normalised travel and normalised slack before closing.
    Hybrid {
        distance_weight: f64,
        time_window_weight: f64,
    },
}

impl GreedyRule {
    pub fn hybrid() -> Self {
        GreedyRule::Hybrid {
            distance_weight: DEFAULT_HYBRID_DISTANCE_WEIGHT,
            time_window_weight: DEFAULT_HYBRID_TIME_WINDOW_WEIGHT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GreedyRule::NearestNeighbor => "nearest",
            GreedyRule::EarliestClosing => "earliest-closing",
            GreedyRule::TimeEfficient => "time-efficient",
            GreedyRule::Hybrid { .. } => "hybrid",
        }
    }

    /// Picks the stop with the lowest cost, ties going to the lowest market id.
    pub(crate) fn select(&self, problem: &Problem, feasible: &[Stop]) -> Option<Stop> {
        let bounds = match self {
            GreedyRule::Hybrid { .. } => Bounds::of(problem, feasible),
            _ => Bounds::default(),
        };

        feasible
            .iter()
            .map(|stop| (self.cost(problem, stop, &bounds), stop))
            .min_by(|(cost_a, a), (cost_b, b)| {
                cost_a
                    .total_cmp(cost_b)
                    .then_with(|| a.market_id.cmp(&b.market_id))
            })
            .map(|(_, &stop)| stop)
    }

    fn cost(&self, problem: &Problem, stop: &Stop, bounds: &Bounds) -> f64 {
        match *self {
            GreedyRule::NearestNeighbor => minutes(stop.travel_time),
            GreedyRule::EarliestClosing => {
                minutes_between(problem.day_start(), problem.market(stop.market).closing())
            }
            GreedyRule::TimeEfficient => {
                let denominator = minutes(stop.travel_time) + minutes(stop.service_duration());
                let efficiency = if denominator > 0.0 {
                    1.0 / denominator
                } else {
                    f64::INFINITY
                };
                -efficiency
            }
            GreedyRule::Hybrid {
                distance_weight,
                time_window_weight,
            } => {
                distance_weight * normalize(minutes(stop.travel_time), bounds.max_travel)
                    + time_window_weight * normalize(slack(problem, stop), bounds.max_slack)
            }
        }
    }
}

impl fmt::Display for GreedyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Largest travel time and slack over the feasible set.
#[derive(Default)]
struct Bounds {
    max_travel: f64,
    max_slack: f64,
}

impl Bounds {
    fn of(problem: &Problem, feasible: &[Stop]) -> Self {
        feasible
            .iter()
            .fold(Bounds::default(), |bounds, stop| Bounds {
                max_travel: bounds.max_travel.max(minutes(stop.travel_time)),
                max_slack: bounds.max_slack.max(slack(problem, stop)),
            })
    }
}

fn slack(problem: &Problem, stop: &Stop) -> f64 {
    minutes_between(stop.departure, problem.market(stop.market).closing())
}

fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { 0.0 }
}
