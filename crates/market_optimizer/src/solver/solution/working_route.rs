use fixedbitset::FixedBitSet;
use jiff::civil::Time;

use crate::{
    problem::{market::MarketIdx, market_problem::Position},
    solver::{day_view::DayView, evaluator::Rejection},
};

use super::{solution::Solution, stop::Stop};

/// A route under construction, shared by the ant colony and the greedy solvers.
pub struct WorkingRoute<'a> {
    view: &'a DayView,
    position: Position,
    clock: Time,
    visited: FixedBitSet,
    stops: Vec<Stop>,
}

impl<'a> WorkingRoute<'a> {
    pub fn new(view: &'a DayView) -> Self {
        WorkingRoute {
            view,
            position: Position::Start,
            clock: view.day_start(),
            visited: FixedBitSet::with_capacity(view.problem().num_markets()),
            stops: Vec::new(),
        }
    }

    pub fn view(&self) -> &DayView {
        self.view
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn clock(&self) -> Time {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn is_visited(&self, market: MarketIdx) -> bool {
        self.visited.contains(market.get())
    }

    pub fn evaluate(&self, market: MarketIdx) -> Result<Stop, Rejection> {
        self.view.evaluate(self.position, self.clock, market)
    }

    /// All visits that can be appended right now, in ascending market order.
    pub fn feasible_stops(&self) -> Vec<Stop> {
        let mut stops = Vec::new();
        self.feasible_stops_into(&mut stops);
        stops
    }

    /// Same as [`WorkingRoute::feasible_stops`], reusing the given buffer.
    pub fn feasible_stops_into(&self, stops: &mut Vec<Stop>) {
        stops.clear();
        stops.extend(
            self.view
                .candidates()
                .filter(|&market| !self.is_visited(market))
                .filter_map(|market| self.evaluate(market).ok()),
        );
    }

    /// Appends a stop previously returned by [`WorkingRoute::evaluate`] for the current state.
    pub fn push(&mut self, stop: Stop) {
        debug_assert!(!self.is_visited(stop.market));
        debug_assert_eq!(self.evaluate(stop.market), Ok(stop));

        self.visited.insert(stop.market.get());
        self.position = Position::Market(stop.market);
        self.clock = stop.departure;
        self.stops.push(stop);
    }

    pub fn into_solution(self) -> Solution {
        Solution::from_stops(self.stops)
    }
}
