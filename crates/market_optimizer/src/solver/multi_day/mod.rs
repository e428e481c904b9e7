pub mod algorithm;
pub mod multi_day_params;
pub mod multi_day_solution;
pub mod scheduler;
