use jiff::SignedDuration;
use serde::Serialize;

use crate::{
    problem::market::MarketId,
    solver::{aco::convergence::ConvergenceTrace, solution::solution::Solution},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    /// One-based day number.
    pub day: usize,
    pub stay_duration: SignedDuration,
    pub solution: Solution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convergence: Option<ConvergenceTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiDaySolution {
    days: Vec<DayPlan>,
    visited: Vec<MarketId>,
    unvisited: Vec<MarketId>,
    total_score: usize,
}

impl MultiDaySolution {
    pub(crate) fn new(days: Vec<DayPlan>, unvisited: Vec<MarketId>) -> Self {
        let visited = days
            .iter()
            .flat_map(|plan| plan.solution.market_ids())
            .collect::<Vec<_>>();

        MultiDaySolution {
            total_score: visited.len(),
            days,
            visited,
            unvisited,
        }
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    /// Visited markets, day after day in visit order.
    pub fn visited(&self) -> &[MarketId] {
        &self.visited
    }

    pub fn unvisited(&self) -> &[MarketId] {
        &self.unvisited
    }

    /// Sum of the daily scores.
    pub fn total_score(&self) -> usize {
        self.total_score
    }

    pub fn total_travel_time(&self) -> SignedDuration {
        self.days.iter().fold(SignedDuration::ZERO, |total, plan| {
            total + plan.solution.total_travel_time()
        })
    }

    pub fn total_wait_time(&self) -> SignedDuration {
        self.days.iter().fold(SignedDuration::ZERO, |total, plan| {
            total + plan.solution.total_wait_time()
        })
    }
}
