pub mod aco;
pub mod day_view;
pub mod evaluator;
pub mod greedy;
pub mod multi_day;
pub mod optimizer_error;
pub mod solution;
pub mod threads;
