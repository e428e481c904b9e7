use std::sync::Arc;

use fixedbitset::FixedBitSet;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    problem::{market::MarketIdx, market_problem::Problem},
    solver::{
        aco::ant_colony::{AntColony, IterationInfo},
        day_view::DayView,
        greedy::greedy_solver::GreedySolver,
        optimizer_error::ConfigurationError,
        solution::solution::Solution,
    },
    timer_debug,
};

use super::{
    algorithm::Algorithm,
    multi_day_params::MultiDayParams,
    multi_day_solution::{DayPlan, MultiDaySolution},
};

type DayIterationHandler = Arc<Mutex<dyn FnMut(usize, &IterationInfo<'_>) + Send + Sync + 'static>>;

/// Plans several days in a row. Each day only sees the markets that no
/// previous day visited.
pub struct MultiDayScheduler {
    problem: Arc<Problem>,
    algorithm: Algorithm,
    params: MultiDayParams,
    on_iteration_handler: Option<DayIterationHandler>,
}

impl MultiDayScheduler {
    pub fn new(
        problem: Arc<Problem>,
        algorithm: Algorithm,
        params: MultiDayParams,
    ) -> Result<Self, ConfigurationError> {
        algorithm.validate()?;
        params.validate()?;

        Ok(MultiDayScheduler {
            problem,
            algorithm,
            params,
            on_iteration_handler: None,
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    pub fn params(&self) -> &MultiDayParams {
        &self.params
    }

    /// Called after every ant colony iteration with the one-based day number.
    pub fn on_iteration<F>(&mut self, callback: F)
    where
        F: FnMut(usize, &IterationInfo<'_>) + Send + Sync + 'static,
    {
        self.on_iteration_handler = Some(Arc::new(Mutex::new(callback)));
    }

    #[instrument(skip_all, level = "debug")]
    pub fn solve(&self) -> Result<MultiDaySolution, ConfigurationError> {
        let num_markets = self.problem.num_markets();
        info!(
            days = self.params.num_days,
            markets = num_markets,
            algorithm = self.algorithm.name(),
            "Planning tour"
        );

        let mut pool = FixedBitSet::with_capacity(num_markets);
        pool.insert_range(..);

        let (remaining, days) = (0..self.params.num_days).try_fold(
            (pool, Vec::with_capacity(self.params.num_days)),
            |(mut remaining, mut days), day| {
                let plan = self.solve_day(day, &remaining)?;

                for stop in plan.solution.stops() {
                    remaining.set(stop.market.get(), false);
                }

                info!(
                    day = plan.day,
                    visited = plan.solution.score(),
                    remaining = remaining.count_ones(..),
                    "Day planned"
                );

                days.push(plan);
                Ok::<_, ConfigurationError>((remaining, days))
            },
        )?;

        let unvisited = remaining
            .ones()
            .map(|index| self.problem.market(MarketIdx::new(index)).id())
            .collect();

        let solution = MultiDaySolution::new(days, unvisited);
        info!(
            score = solution.total_score(),
            unvisited = solution.unvisited().len(),
            "Tour planned"
        );

        Ok(solution)
    }

    fn solve_day(
        &self,
        day: usize,
        remaining: &FixedBitSet,
    ) -> Result<DayPlan, ConfigurationError> {
        let day_number = day + 1;
        let stay_duration = self.params.stay_duration(day, self.problem.stay_duration());

        if remaining.is_clear() {
            debug!(day = day_number, "Every market already visited");
            return Ok(DayPlan {
                day: day_number,
                stay_duration,
                solution: Solution::empty(),
                convergence: None,
            });
        }

        let view = DayView::new(Arc::clone(&self.problem))
            .with_candidates(remaining.clone())
            .with_stay_duration(stay_duration);

        let (solution, convergence) = match &self.algorithm {
            Algorithm::AntColony(params) => {
                let params = params
                    .clone()
                    .with_seed(params.seed.wrapping_add(day as u64));
                let mut colony = AntColony::new(view, params)?;

                if let Some(handler) = &self.on_iteration_handler {
                    let handler = Arc::clone(handler);
                    colony.on_iteration(move |info| handler.lock()(day_number, info));
                }

                let result = timer_debug!("Ant colony for day", day_number, colony.run());
                (result.solution, Some(result.convergence))
            }
            Algorithm::Greedy(params) => {
                let solver = GreedySolver::new(view, params.clone())?;
                let solution = timer_debug!("Greedy for day", day_number, solver.solve());
                (solution, None)
            }
        };

        if solution.is_empty() {
            warn!(day = day_number, "No remaining market can be visited");
        }

        Ok(DayPlan {
            day: day_number,
            stay_duration,
            solution,
            convergence,
        })
    }
}
