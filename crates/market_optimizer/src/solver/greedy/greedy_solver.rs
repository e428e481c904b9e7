use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    problem::{market::MarketId, market_problem::Problem},
    solver::{
        day_view::DayView,
        optimizer_error::ConfigurationError,
        solution::{solution::Solution, stop::Stop, working_route::WorkingRoute},
    },
};

use super::greedy_params::GreedyParams;

/// Deterministic single-pass constructor.
pub struct GreedySolver {
    view: DayView,
    params: GreedyParams,
}

impl GreedySolver {
    pub fn new(view: DayView, params: GreedyParams) -> Result<Self, ConfigurationError> {
        params.validate()?;
        Ok(GreedySolver { view, params })
    }

    pub fn for_problem(
        problem: Arc<Problem>,
        params: GreedyParams,
    ) -> Result<Self, ConfigurationError> {
        Self::new(DayView::new(problem), params)
    }

    pub fn view(&self) -> &DayView {
        &self.view
    }

    pub fn params(&self) -> &GreedyParams {
        &self.params
    }

    #[instrument(skip_all, level = "debug", fields(rule = %self.params.rule))]
    pub fn solve(&self) -> Solution {
        let use_multi_start =
            self.params.multi_start && self.view.problem().start_location().is_none();

        let solution = if use_multi_start {
            self.solve_multi_start()
        } else {
            self.extend(WorkingRoute::new(&self.view))
        };

        debug!(
            score = solution.score(),
            travel = ?solution.total_travel_time(),
            "Greedy route built"
        );

        solution
    }

    fn solve_multi_start(&self) -> Solution {
        WorkingRoute::new(&self.view)
            .feasible_stops()
            .into_iter()
            .map(|first| {
                let mut route = WorkingRoute::new(&self.view);
                route.push(first);
                self.extend(route)
            })
            .max_by(|a, b| {
                a.compare_quality(b)
                    .then_with(|| first_market_id(b).cmp(&first_market_id(a)))
            })
            .unwrap_or_else(Solution::empty)
    }

    fn extend(&self, mut route: WorkingRoute<'_>) -> Solution {
        let problem = self.view.problem();
        let mut feasible: Vec<Stop> = Vec::with_capacity(self.view.num_candidates());

        loop {
            route.feasible_stops_into(&mut feasible);
            match self.params.rule.select(problem, &feasible) {
                Some(stop) => route.push(stop),
                None => break,
            }
        }

        route.into_solution()
    }
}

fn first_market_id(solution: &Solution) -> Option<MarketId> {
    solution.stops().first().map(|stop| stop.market_id)
}
