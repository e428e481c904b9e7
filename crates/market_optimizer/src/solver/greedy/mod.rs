pub mod greedy_params;
pub mod greedy_rule;
pub mod greedy_solver;
