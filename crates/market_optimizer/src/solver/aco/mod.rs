pub mod ant_colony;
pub mod ant_colony_params;
pub mod convergence;
pub mod pheromone;
pub mod sampling;
