pub mod market;
pub mod market_problem;
pub mod travel_time_matrix;
pub mod validation_error;
