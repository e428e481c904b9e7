#[allow(clippy::module_inception)]
pub mod solution;
pub mod stop;
pub mod working_route;
