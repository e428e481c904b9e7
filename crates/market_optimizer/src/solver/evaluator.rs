use jiff::{SignedDuration, civil::Time};

use crate::problem::{
    market::MarketIdx,
    market_problem::{Position, Problem},
};

use super::solution::stop::Stop;

/// Why a market cannot be appended to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No travel time is known from the current position.
    Unreachable,
    /// Service would still be running when the market closes.
    ClosesBeforeServiceEnd,
    /// Service would end after the end of the day.
    ExceedsDayBudget,
}

/// Computes the visit of `candidate` when leaving `from` at `clock`.
///
/// The arrival is `clock + travel + buffer`; service starts at the later of
/// arrival and opening and lasts `stay_duration`. The visit is feasible when
/// the service ends no later than both the closing time and the end of day.
pub fn evaluate_visit(
    problem: &Problem,
    stay_duration: SignedDuration,
    from: Position,
    clock: Time,
    candidate: MarketIdx,
) -> Result<Stop, Rejection> {
    let market = problem.market(candidate);

    let travel_time = problem
        .leg_duration(from, candidate)
        .ok_or(Rejection::Unreachable)?;

    // Past midnight is past any day end.
    let arrival = clock
        .checked_add(travel_time)
        .map_err(|_| Rejection::ExceedsDayBudget)?;
    let service_start = arrival.max(market.opening());
    let departure = service_start
        .checked_add(stay_duration)
        .map_err(|_| Rejection::ExceedsDayBudget)?;

    if departure > market.closing() {
        return Err(Rejection::ClosesBeforeServiceEnd);
    }

    if departure > problem.day_end() {
        return Err(Rejection::ExceedsDayBudget);
    }

    Ok(Stop {
        market: candidate,
        market_id: market.id(),
        travel_time,
        arrival,
        wait: service_start.duration_since(arrival),
        service_start,
        departure,
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;

    use super::*;
    use crate::{
        problem::{
            market::MarketBuilder, market_problem::ProblemBuilder,
            travel_time_matrix::TravelTimeMatrix,
        },
        test_utils::{create_scenario_problem, market_a, market_b, market_c},
    };

    const STAY: SignedDuration = SignedDuration::from_mins(30);

    #[test]
    fn test_first_visit_from_unconstrained_start() {
        let problem = create_scenario_problem();

        let stop = evaluate_visit(
            &problem,
            STAY,
            Position::Start,
            time(9, 0, 0, 0),
            market_a(),
        )
        .unwrap();

        assert_eq!(stop.market_id, 1);
        assert_eq!(stop.travel_time, SignedDuration::ZERO);
        assert_eq!(stop.arrival, time(9, 0, 0, 0));
        assert_eq!(stop.wait, SignedDuration::ZERO);
        assert_eq!(stop.service_start, time(9, 0, 0, 0));
        assert_eq!(stop.departure, time(9, 30, 0, 0));
    }

    #[test]
    fn test_waits_for_opening() {
        let problem = create_scenario_problem();

        let stop = evaluate_visit(
            &problem,
            STAY,
            Position::Market(market_b()),
            time(10, 10, 0, 0),
            market_c(),
        )
        .unwrap();

        assert_eq!(stop.arrival, time(10, 30, 0, 0));
        assert_eq!(stop.wait, SignedDuration::from_mins(30));
        assert_eq!(stop.service_start, time(11, 0, 0, 0));
        // Ends exactly at closing, which is allowed.
        assert_eq!(stop.departure, time(11, 30, 0, 0));
    }

    #[test]
    fn test_missing_entry_is_unreachable() {
        let problem = create_scenario_problem();

        assert_eq!(
            evaluate_visit(
                &problem,
                STAY,
                Position::Market(market_a()),
                time(9, 30, 0, 0),
                market_c()
            ),
            Err(Rejection::Unreachable)
        );
    }

    #[test]
    fn test_service_past_closing() {
        let problem = create_scenario_problem();

        assert_eq!(
            evaluate_visit(
                &problem,
                STAY,
                Position::Start,
                time(9, 31, 0, 0),
                market_a()
            ),
            Err(Rejection::ClosesBeforeServiceEnd)
        );
    }

    #[test]
    fn test_service_past_day_end() {
        let mut builder = ProblemBuilder::default();
        builder
            .add_market(MarketBuilder::new(1, time(9, 0, 0, 0), time(20, 0, 0, 0)).build())
            .set_day_window(time(9, 0, 0, 0), time(12, 0, 0, 0));
        let problem = builder.build().unwrap();

        assert_eq!(
            evaluate_visit(
                &problem,
                STAY,
                Position::Start,
                time(11, 40, 0, 0),
                MarketIdx::new(0)
            ),
            Err(Rejection::ExceedsDayBudget)
        );
        assert!(
            evaluate_visit(
                &problem,
                STAY,
                Position::Start,
                time(11, 30, 0, 0),
                MarketIdx::new(0)
            )
            .is_ok()
        );
    }

    #[test]
    fn test_clock_past_midnight_exceeds_day() {
        let mut matrix = TravelTimeMatrix::new(2);
        matrix.set(0, 1, 180.0);

        let mut builder = ProblemBuilder::default();
        builder
            .add_market(MarketBuilder::new(1, time(20, 0, 0, 0), time(23, 0, 0, 0)).build())
            .add_market(MarketBuilder::new(2, time(20, 0, 0, 0), time(23, 59, 0, 0)).build())
            .set_travel_times(matrix);
        let problem = builder.build().unwrap();

        assert_eq!(
            evaluate_visit(
                &problem,
                STAY,
                Position::Market(MarketIdx::new(0)),
                time(22, 30, 0, 0),
                MarketIdx::new(1)
            ),
            Err(Rejection::ExceedsDayBudget)
        );
    }

    #[test]
    fn test_transfer_buffer_added_to_every_move() {
        let mut builder = ProblemBuilder::default();
        let mut matrix = TravelTimeMatrix::new(2);
        matrix.set(0, 1, 10.0);
        builder
            .add_market(MarketBuilder::new(1, time(9, 0, 0, 0), time(20, 0, 0, 0)).build())
            .add_market(MarketBuilder::new(2, time(9, 0, 0, 0), time(20, 0, 0, 0)).build())
            .set_transfer_buffer(SignedDuration::from_mins(5))
            .set_travel_times(matrix);
        let problem = builder.build().unwrap();

        let stop = evaluate_visit(
            &problem,
            STAY,
            Position::Market(MarketIdx::new(0)),
            time(10, 0, 0, 0),
            MarketIdx::new(1),
        )
        .unwrap();

        assert_eq!(stop.travel_time, SignedDuration::from_mins(15));
        assert_eq!(stop.arrival, time(10, 15, 0, 0));
    }
}
