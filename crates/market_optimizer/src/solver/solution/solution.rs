use std::cmp::Ordering;

use fixedbitset::FixedBitSet;
use jiff::SignedDuration;
use serde::Serialize;

use crate::{
    problem::{
        market::{MarketId, MarketIdx},
        market_problem::Position,
    },
    solver::day_view::DayView,
};

use super::stop::Stop;

/// A single-day route with its schedule.
///
/// Built once by an optimizer and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    stops: Vec<Stop>,
    total_travel_time: SignedDuration,
    total_wait_time: SignedDuration,
    is_feasible: bool,
}

impl Solution {
    /// The solution of a day where no market can be visited.
    pub fn empty() -> Self {
        Solution {
            stops: Vec::new(),
            total_travel_time: SignedDuration::ZERO,
            total_wait_time: SignedDuration::ZERO,
            is_feasible: true,
        }
    }

    pub(crate) fn from_stops(stops: Vec<Stop>) -> Self {
        let (total_travel_time, total_wait_time) = stops.iter().fold(
            (SignedDuration::ZERO, SignedDuration::ZERO),
            |(travel, wait), stop| (travel + stop.travel_time, wait + stop.wait),
        );

        Solution {
            stops,
            total_travel_time,
            total_wait_time,
            is_feasible: true,
        }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn route(&self) -> impl Iterator<Item = MarketIdx> + '_ {
        self.stops.iter().map(|stop| stop.market)
    }

    pub fn market_ids(&self) -> Vec<MarketId> {
        self.stops.iter().map(|stop| stop.market_id).collect()
    }

    /// Number of visited markets.
    pub fn score(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn is_feasible(&self) -> bool {
        self.is_feasible
    }

    /// Sum of all moves, transfer buffers included.
    pub fn total_travel_time(&self) -> SignedDuration {
        self.total_travel_time
    }

    pub fn total_wait_time(&self) -> SignedDuration {
        self.total_wait_time
    }

    /// Time between the first arrival and the last departure.
    pub fn total_time(&self) -> SignedDuration {
        match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => last.departure.duration_since(first.arrival),
            _ => SignedDuration::ZERO,
        }
    }

    /// More markets first, then less travel.
    pub fn compare_quality(&self, other: &Solution) -> Ordering {
        self.score()
            .cmp(&other.score())
            .then_with(|| other.total_travel_time.cmp(&self.total_travel_time))
    }

    pub fn is_better_than(&self, other: &Solution) -> bool {
        self.compare_quality(other) == Ordering::Greater
    }

    /// Replays the route through the evaluator and checks that every stop
    /// matches, every market is a candidate and no market repeats.
    pub fn is_consistent_with(&self, view: &DayView) -> bool {
        let mut seen = FixedBitSet::with_capacity(view.problem().num_markets());
        let mut position = Position::Start;
        let mut clock = view.day_start();

        for stop in &self.stops {
            if !view.is_candidate(stop.market) || seen.put(stop.market.get()) {
                return false;
            }

            match view.evaluate(position, clock, stop.market) {
                Ok(expected) if expected == *stop => {
                    position = Position::Market(stop.market);
                    clock = stop.departure;
                }
                _ => return false,
            }
        }

        true
    }
}
