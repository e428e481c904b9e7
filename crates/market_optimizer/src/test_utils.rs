use jiff::{SignedDuration, civil::time};
use rand::{Rng, RngCore, SeedableRng, rngs::SmallRng};

use crate::{
    problem::{
        market::{MarketBuilder, MarketIdx},
        market_problem::{Position, Problem, ProblemBuilder, StartLocation},
        travel_time_matrix::TravelTimeMatrix,
    },
    solver::{day_view::DayView, solution::solution::Solution},
};

pub fn market_a() -> MarketIdx {
    MarketIdx::new(0)
}

pub fn market_b() -> MarketIdx {
    MarketIdx::new(1)
}

pub fn market_c() -> MarketIdx {
    MarketIdx::new(2)
}

/// Three markets over a 09:00-12:00 day, no start location, 30 minutes stays
/// and no transfer buffer.
///
/// A (id 1) 09:00-10:00, B (id 2) 09:30-12:00, C (id 3) 11:00-11:30.
/// Only A -> B (10 minutes) and B -> C (20 minutes) are known.
pub fn create_scenario_problem() -> Problem {
    let mut matrix = TravelTimeMatrix::new(3);
    matrix.set(0, 1, 10.0);
    matrix.set(1, 2, 20.0);

    let mut builder = ProblemBuilder::default();
    builder
        .add_market(
            MarketBuilder::new(1, time(9, 0, 0, 0), time(10, 0, 0, 0))
                .with_name("A")
                .build(),
        )
        .add_market(
            MarketBuilder::new(2, time(9, 30, 0, 0), time(12, 0, 0, 0))
                .with_name("B")
                .build(),
        )
        .add_market(
            MarketBuilder::new(3, time(11, 0, 0, 0), time(11, 30, 0, 0))
                .with_name("C")
                .build(),
        )
        .set_travel_times(matrix)
        .set_day_window(time(9, 0, 0, 0), time(12, 0, 0, 0))
        .set_stay_duration(SignedDuration::from_mins(30))
        .set_transfer_buffer(SignedDuration::ZERO);

    builder.build().unwrap()
}

/// Random instance over a 08:00-22:00 day. Roughly one market pair in ten has
/// no travel time. Market ids are multiples of ten.
pub fn create_random_problem(num_markets: usize, seed: u64, with_start: bool) -> Problem {
    let mut rng = SmallRng::seed_from_u64(seed);

    let markets = (0..num_markets)
        .map(|index| {
            let opening_hour: i8 = rng.random_range(8..16);
            let closing_hour = (opening_hour + rng.random_range(1..=6)).min(22);

            MarketBuilder::new(
                (index as u32 + 1) * 10,
                time(opening_hour, 0, 0, 0),
                time(closing_hour, 0, 0, 0),
            )
            .with_lat_lon(
                48.1 + rng.random_range(0.0..0.2),
                16.2 + rng.random_range(0.0..0.3),
            )
            .build()
        })
        .collect::<Vec<_>>();

    let num_nodes = num_markets + usize::from(with_start);
    let mut matrix = TravelTimeMatrix::new(num_nodes);
    for from in 0..num_nodes {
        for to in 0..num_markets {
            if from == to {
                continue;
            }

            let is_start = from == num_markets;
            if is_start || !rng.random_bool(0.1) {
                matrix.set(from, to, rng.random_range(5.0..60.0));
            }
        }
    }

    let mut builder = ProblemBuilder::default();
    builder
        .set_markets(markets)
        .set_travel_times(matrix)
        .set_day_window(time(8, 0, 0, 0), time(22, 0, 0, 0))
        .set_stay_duration(SignedDuration::from_mins(30))
        .set_transfer_buffer(SignedDuration::from_mins(5));

    if with_start {
        builder.set_start_location(StartLocation::new("Hotel", 48.2, 16.37));
    }

    builder.build().unwrap()
}

/// Checks every route invariant a solver must uphold on the given day.
pub fn assert_valid_solution(view: &DayView, solution: &Solution) {
    let problem = view.problem();

    assert!(solution.is_feasible());
    assert!(solution.is_consistent_with(view));
    assert_eq!(solution.score(), solution.stops().len());

    let mut position = Position::Start;
    let mut clock = view.day_start();
    for stop in solution.stops() {
        let market = problem.market(stop.market);
        let leg = problem.leg_duration(position, stop.market).unwrap();

        assert_eq!(stop.arrival, clock.checked_add(leg).unwrap());
        assert!(stop.service_start >= market.opening());
        assert!(stop.service_start >= stop.arrival);
        assert!(stop.departure <= market.closing());
        assert!(stop.departure <= problem.day_end());
        assert_eq!(stop.service_duration(), view.stay_duration());

        position = Position::Market(stop.market);
        clock = stop.departure;
    }
}

pub struct MockRng {
    data: Vec<u64>,
    index: usize,
}

impl MockRng {
    pub fn new(data: Vec<u64>) -> Self {
        MockRng { data, index: 0 }
    }
}

impl RngCore for MockRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.data[self.index % self.data.len()];
        self.index = (self.index + 1) % self.data.len();
        value
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for byte in dst.iter_mut() {
            *byte = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_rng_cycles() {
        let data = vec![1, 2, 3, 4];
        let mut rng = MockRng::new(data.clone());

        for &expected in data.iter().cycle().take(8) {
            assert_eq!(rng.next_u64(), expected);
        }
    }

    #[test]
    fn test_random_problem_is_reproducible() {
        let first = create_random_problem(12, 5, true);
        let second = create_random_problem(12, 5, true);

        assert_eq!(first.num_markets(), 12);
        assert!(first.start_location().is_some());
        assert_eq!(first.travel_times().num_nodes(), 13);
        assert_eq!(
            first.travel_times().entries().collect::<Vec<_>>(),
            second.travel_times().entries().collect::<Vec<_>>()
        );
        assert!(first.markets().iter().all(|market| market.id() % 10 == 0));
    }
}
