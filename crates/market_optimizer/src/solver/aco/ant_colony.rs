use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use parking_lot::Mutex;
use rand::{SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    problem::market_problem::{Position, Problem},
    solver::{
        day_view::DayView,
        optimizer_error::ConfigurationError,
        solution::{solution::Solution, stop::Stop, working_route::WorkingRoute},
    },
    utils::time::{minutes, minutes_between},
};

use super::{
    ant_colony_params::AntColonyParams,
    convergence::{ConvergenceRow, ConvergenceTrace},
    pheromone::PheromoneMatrix,
    sampling::sample_index,
};

const MIN_DISTANCE_MINUTES: f64 = 0.01;

/// Progress of a run, handed to the iteration callback.
pub struct IterationInfo<'a> {
    pub row: ConvergenceRow,
    pub num_iterations: usize,
    pub best: &'a Solution,
}

type IterationHandler = Arc<Mutex<dyn FnMut(&IterationInfo<'_>) + Send + Sync + 'static>>;

#[derive(Debug, Clone, Serialize)]
pub struct AntColonyResult {
    pub solution: Solution,
    pub convergence: ConvergenceTrace,
    pub iterations: usize,
    pub stopped_early: bool,
}

pub struct AntColony {
    view: DayView,
    params: AntColonyParams,
    on_iteration_handler: Option<IterationHandler>,
    is_stopped: Arc<AtomicBool>,
}

impl AntColony {
    pub fn new(view: DayView, params: AntColonyParams) -> Result<Self, ConfigurationError> {
        params.validate()?;

        Ok(AntColony {
            view,
            params,
            on_iteration_handler: None,
            is_stopped: Arc::new(AtomicBool::new(false)),
        })
    }

    /// A colony over every market of the problem.
    pub fn for_problem(
        problem: Arc<Problem>,
        params: AntColonyParams,
    ) -> Result<Self, ConfigurationError> {
        Self::new(DayView::new(problem), params)
    }

    pub fn params(&self) -> &AntColonyParams {
        &self.params
    }

    pub fn view(&self) -> &DayView {
        &self.view
    }

    pub fn on_iteration<F>(&mut self, callback: F)
    where
        F: FnMut(&IterationInfo<'_>) + Send + Sync + 'static,
    {
        self.on_iteration_handler = Some(Arc::new(Mutex::new(callback)));
    }

    /// Requests the run to stop at the end of the current iteration.
    pub fn stop(&self) {
        self.is_stopped.store(true, Ordering::Relaxed);
    }

    /// Shared flag behind [`AntColony::stop`], usable from other threads or callbacks.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.is_stopped)
    }

    fn should_stop(&self, start: Timestamp) -> bool {
        if self.is_stopped.load(Ordering::Relaxed) {
            return true;
        }

        self.params
            .max_duration
            .is_some_and(|max_duration| Timestamp::now().duration_since(start) >= max_duration)
    }

    #[instrument(skip_all, level = "debug")]
    pub fn run(&self) -> AntColonyResult {
        self.is_stopped.store(false, Ordering::Relaxed);

        let num_candidates = self.view.num_candidates();
        if num_candidates == 0 {
            warn!("No market to visit, skipping the colony");
            return AntColonyResult {
                solution: Solution::empty(),
                convergence: ConvergenceTrace::default(),
                iterations: 0,
                stopped_early: false,
            };
        }

        let params = &self.params;
        info!(
            ants = params.num_ants,
            iterations = params.num_iterations,
            candidates = num_candidates,
            "Starting ant colony"
        );

        let start = Timestamp::now();
        let mut rng = SmallRng::seed_from_u64(params.seed);
        let mut pheromones = PheromoneMatrix::new(
            self.view.problem().num_markets(),
            params.initial_pheromone,
            params.min_pheromone,
        );
        let thread_pool = params.threads.build_pool();
        let deposit_unit = params.pheromone_deposit / num_candidates as f64;

        let mut best = Solution::empty();
        let mut convergence = ConvergenceTrace::with_capacity(params.num_iterations);
        let mut iterations_without_improvement = 0;
        let mut stopped_early = false;

        for iteration in 0..params.num_iterations {
            if self.should_stop(start) {
                stopped_early = true;
                break;
            }

            // Derived before the parallel section so the outcome does not depend on scheduling.
            let mut ant_rngs = (0..params.num_ants)
                .map(|_| SmallRng::from_rng(&mut rng))
                .collect::<Vec<_>>();

            let construct =
                |ant_rng: &mut SmallRng| construct_route(&self.view, &pheromones, params, ant_rng);
            let solutions: Vec<Solution> = match &thread_pool {
                Some(pool) => pool.install(|| ant_rngs.par_iter_mut().map(construct).collect()),
                None => ant_rngs.iter_mut().map(construct).collect(),
            };

            let iteration_best = solutions.iter().reduce(|current, candidate| {
                if candidate.is_better_than(current) {
                    candidate
                } else {
                    current
                }
            });

            let improved = match iteration_best {
                Some(candidate) if candidate.is_better_than(&best) => {
                    debug!(
                        iteration,
                        score = candidate.score(),
                        travel = ?candidate.total_travel_time(),
                        "New best route"
                    );
                    best = candidate.clone();
                    true
                }
                _ => false,
            };

            update_pheromones(&mut pheromones, &solutions, &best, params, deposit_unit);

            let row = ConvergenceRow {
                iteration,
                best_so_far: best.score(),
                iteration_best: iteration_best.map_or(0, Solution::score),
                average: solutions.iter().map(Solution::score).sum::<usize>() as f64
                    / solutions.len() as f64,
            };
            convergence.push(row);

            if iteration % 10 == 0 {
                info!(
                    iteration,
                    best = row.best_so_far,
                    iteration_best = row.iteration_best,
                    average = row.average,
                    "Ant colony progress"
                );
            }

            if let Some(callback) = &self.on_iteration_handler {
                callback.lock()(&IterationInfo {
                    row,
                    num_iterations: params.num_iterations,
                    best: &best,
                });
            }

            if improved {
                iterations_without_improvement = 0;
            } else {
                iterations_without_improvement += 1;
            }

            if params
                .max_iterations_without_improvement
                .is_some_and(|max| iterations_without_improvement >= max)
                && iteration + 1 < params.num_iterations
            {
                debug!(iteration, "No improvement for too long, stopping");
                stopped_early = true;
                break;
            }
        }

        info!(
            score = best.score(),
            iterations = convergence.len(),
            elapsed = ?Timestamp::now().duration_since(start),
            "Ant colony done"
        );

        AntColonyResult {
            iterations: convergence.len(),
            solution: best,
            convergence,
            stopped_early,
        }
    }
}

/// Evaporates, lets every ant deposit in proportion to its score, then
/// reinforces the best route found so far when elitism is enabled.
fn update_pheromones(
    pheromones: &mut PheromoneMatrix,
    solutions: &[Solution],
    best: &Solution,
    params: &AntColonyParams,
    deposit_unit: f64,
) {
    pheromones.evaporate(params.evaporation_rate);

    for solution in solutions.iter().filter(|solution| !solution.is_empty()) {
        pheromones.deposit(solution.route(), deposit_unit * solution.score() as f64);
    }

    if params.use_elite && !best.is_empty() {
        pheromones.deposit(
            best.route(),
            deposit_unit * best.score() as f64 * params.elite_weight,
        );
    }
}

/// Desirability of appending `stop` when standing at `from`.
fn attractiveness(
    pheromones: &PheromoneMatrix,
    params: &AntColonyParams,
    view: &DayView,
    from: Position,
    stop: &Stop,
) -> f64 {
    let pheromone = pheromones.get(from, stop.market);
    let distance = minutes(stop.travel_time).max(MIN_DISTANCE_MINUTES);
    let slack = minutes_between(stop.departure, view.problem().market(stop.market).closing());
    let urgency = 1.0 / (1.0 + slack.max(0.0));

    pheromone.powf(params.alpha) * (1.0 / distance).powf(params.beta) * urgency.powf(params.gamma)
}

/// Builds one ant's route: keep appending a sampled feasible market until none is left.
fn construct_route(
    view: &DayView,
    pheromones: &PheromoneMatrix,
    params: &AntColonyParams,
    rng: &mut SmallRng,
) -> Solution {
    let mut route = WorkingRoute::new(view);
    let mut feasible = Vec::with_capacity(view.num_candidates());
    let mut weights = Vec::with_capacity(view.num_candidates());

    loop {
        route.feasible_stops_into(&mut feasible);
        if feasible.is_empty() {
            break;
        }

        let position = route.position();
        weights.clear();
        weights.extend(
            feasible
                .iter()
                .map(|stop| attractiveness(pheromones, params, view, position, stop)),
        );

        match sample_index(&weights, rng) {
            Some(chosen) => route.push(feasible[chosen]),
            None => break,
        }
    }

    route.into_solution()
}
