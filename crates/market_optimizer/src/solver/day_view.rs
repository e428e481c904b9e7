use std::sync::Arc;

use fixedbitset::FixedBitSet;
use jiff::{SignedDuration, civil::Time};

use crate::problem::{
    market::MarketIdx,
    market_problem::{Position, Problem},
};

use super::{
    evaluator::{Rejection, evaluate_visit},
    solution::stop::Stop,
};

/// A problem restricted to one day: the markets still to be visited and the
/// stay duration that applies on that day.
#[derive(Clone)]
pub struct DayView {
    problem: Arc<Problem>,
    candidates: FixedBitSet,
    stay_duration: SignedDuration,
}

impl DayView {
    /// A view over every market of the problem with its default stay duration.
    pub fn new(problem: Arc<Problem>) -> Self {
        let mut candidates = FixedBitSet::with_capacity(problem.num_markets());
        candidates.insert_range(..);

        DayView {
            stay_duration: problem.stay_duration(),
            problem,
            candidates,
        }
    }

    pub fn with_candidates(mut self, candidates: FixedBitSet) -> Self {
        self.candidates = candidates;
        self.candidates.grow(self.problem.num_markets());
        self
    }

    pub fn with_stay_duration(mut self, stay_duration: SignedDuration) -> Self {
        self.stay_duration = stay_duration;
        self
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn stay_duration(&self) -> SignedDuration {
        self.stay_duration
    }

    pub fn day_start(&self) -> Time {
        self.problem.day_start()
    }

    pub fn is_candidate(&self, market: MarketIdx) -> bool {
        self.candidates.contains(market.get())
    }

    /// Candidate markets in ascending index order.
    pub fn candidates(&self) -> impl Iterator<Item = MarketIdx> + '_ {
        self.candidates.ones().map(MarketIdx::new)
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.count_ones(..)
    }

    pub fn evaluate(
        &self,
        from: Position,
        clock: Time,
        candidate: MarketIdx,
    ) -> Result<Stop, Rejection> {
        evaluate_visit(&self.problem, self.stay_duration, from, clock, candidate)
    }
}
