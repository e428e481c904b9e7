use fxhash::FxHashMap;
use jiff::{
    SignedDuration,
    civil::{Time, time},
};
use serde::Serialize;

use super::{
    market::{Market, MarketId, MarketIdx},
    travel_time_matrix::TravelTimeMatrix,
    validation_error::ValidationError,
};

pub const DEFAULT_STAY_DURATION: SignedDuration = SignedDuration::from_mins(30);
pub const DEFAULT_TRANSFER_BUFFER: SignedDuration = SignedDuration::from_mins(5);

/// Day window used when neither the input nor any market sets one.
pub const DEFAULT_DAY_START: Time = time(0, 0, 0, 0);
pub const DEFAULT_DAY_END: Time = time(23, 59, 59, 0);

/// Where a route currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Position {
    /// Before the first market, either at the fixed start location or nowhere yet.
    Start,
    Market(MarketIdx),
}

/// A virtual, zero-duration node the day starts from.
#[derive(Debug, Clone)]
pub struct StartLocation {
    name: String,
    point: geo::Point,
}

impl StartLocation {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        StartLocation {
            name: name.into(),
            point: geo::Point::new(lon, lat),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn point(&self) -> geo::Point {
        self.point
    }
}

/// The read-only input of every optimizer run.
pub struct Problem {
    markets: Vec<Market>,
    travel_times: TravelTimeMatrix,
    day_start: Time,
    day_end: Time,
    stay_duration: SignedDuration,
    transfer_buffer: SignedDuration,
    start_location: Option<StartLocation>,
    market_index: FxHashMap<MarketId, MarketIdx>,
}

impl Problem {
    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn markets_iter(&self) -> impl Iterator<Item = (MarketIdx, &Market)> {
        self.markets
            .iter()
            .enumerate()
            .map(|(index, market)| (MarketIdx::new(index), market))
    }

    pub fn num_markets(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn market(&self, index: MarketIdx) -> &Market {
        &self.markets[index]
    }

    pub fn market_idx(&self, id: MarketId) -> Option<MarketIdx> {
        self.market_index.get(&id).copied()
    }

    pub fn travel_times(&self) -> &TravelTimeMatrix {
        &self.travel_times
    }

    pub fn day_start(&self) -> Time {
        self.day_start
    }

    pub fn day_end(&self) -> Time {
        self.day_end
    }

    pub fn day_length(&self) -> SignedDuration {
        self.day_end.duration_since(self.day_start)
    }

    pub fn stay_duration(&self) -> SignedDuration {
        self.stay_duration
    }

    pub fn transfer_buffer(&self) -> SignedDuration {
        self.transfer_buffer
    }

    pub fn start_location(&self) -> Option<&StartLocation> {
        self.start_location.as_ref()
    }

    fn node(&self, position: Position) -> usize {
        match position {
            Position::Start => self.markets.len(),
            Position::Market(index) => index.get(),
        }
    }

    /// Raw matrix travel time, without the transfer buffer.
    ///
    /// From an unconstrained start this is zero: the day begins at the first market.
    pub fn travel_time(&self, from: Position, to: MarketIdx) -> Option<SignedDuration> {
        if from == Position::Start && self.start_location.is_none() {
            return Some(SignedDuration::ZERO);
        }

        self.travel_times.travel_time(self.node(from), to.get())
    }

    /// Duration of a move, including the transfer buffer. `None` when unreachable.
    pub fn leg_duration(&self, from: Position, to: MarketIdx) -> Option<SignedDuration> {
        if from == Position::Start && self.start_location.is_none() {
            return Some(SignedDuration::ZERO);
        }

        self.travel_time(from, to)?
            .checked_add(self.transfer_buffer)
    }
}

#[derive(Default)]
pub struct ProblemBuilder {
    markets: Option<Vec<Market>>,
    travel_times: Option<TravelTimeMatrix>,
    day_start: Option<Time>,
    day_end: Option<Time>,
    stay_duration: Option<SignedDuration>,
    transfer_buffer: Option<SignedDuration>,
    start_location: Option<StartLocation>,
}

impl ProblemBuilder {
    pub fn set_markets(&mut self, markets: Vec<Market>) -> &mut ProblemBuilder {
        self.markets = Some(markets);
        self
    }

    pub fn add_market(&mut self, market: Market) -> &mut ProblemBuilder {
        if let Some(markets) = &mut self.markets {
            markets.push(market);
        } else {
            self.markets = Some(vec![market]);
        }

        self
    }

    pub fn set_travel_times(&mut self, travel_times: TravelTimeMatrix) -> &mut ProblemBuilder {
        self.travel_times = Some(travel_times);
        self
    }

    pub fn set_day_window(&mut self, start: Time, end: Time) -> &mut ProblemBuilder {
        self.day_start = Some(start);
        self.day_end = Some(end);
        self
    }

    pub fn set_stay_duration(&mut self, stay_duration: SignedDuration) -> &mut ProblemBuilder {
        self.stay_duration = Some(stay_duration);
        self
    }

    pub fn set_transfer_buffer(&mut self, transfer_buffer: SignedDuration) -> &mut ProblemBuilder {
        self.transfer_buffer = Some(transfer_buffer);
        self
    }

    pub fn set_start_location(&mut self, start_location: StartLocation) -> &mut ProblemBuilder {
        self.start_location = Some(start_location);
        self
    }

    /// Validates the inputs and builds the problem.
    ///
    /// Without an explicit day window, the day spans from the earliest opening
    /// to the latest closing across all markets, or the whole day when there
    /// are no markets.
    pub fn build(self) -> Result<Problem, ValidationError> {
        let markets = self.markets.unwrap_or_default();

        let mut market_index = FxHashMap::default();
        for (index, market) in markets.iter().enumerate() {
            if market_index
                .insert(market.id(), MarketIdx::new(index))
                .is_some()
            {
                return Err(ValidationError::DuplicateMarketId(market.id()));
            }

            if market.opening() >= market.closing() {
                return Err(ValidationError::InvalidTimeWindow {
                    market: market.id(),
                    opening: market.opening(),
                    closing: market.closing(),
                });
            }
        }

        let day_start = self
            .day_start
            .or_else(|| markets.iter().map(Market::opening).min())
            .unwrap_or(DEFAULT_DAY_START);
        let day_end = self
            .day_end
            .or_else(|| markets.iter().map(Market::closing).max())
            .unwrap_or(DEFAULT_DAY_END);

        if day_end <= day_start {
            return Err(ValidationError::InvalidDayWindow {
                start: day_start,
                end: day_end,
            });
        }

        let stay_duration = self.stay_duration.unwrap_or(DEFAULT_STAY_DURATION);
        if stay_duration.is_negative() {
            return Err(ValidationError::NegativeStayDuration(stay_duration));
        }

        let transfer_buffer = self.transfer_buffer.unwrap_or(DEFAULT_TRANSFER_BUFFER);
        if transfer_buffer.is_negative() {
            return Err(ValidationError::NegativeTransferBuffer(transfer_buffer));
        }

        let expected_nodes = markets.len() + usize::from(self.start_location.is_some());
        let travel_times = self
            .travel_times
            .unwrap_or_else(|| TravelTimeMatrix::new(expected_nodes));

        if travel_times.num_nodes() != expected_nodes {
            return Err(ValidationError::MatrixDimensionMismatch {
                expected: expected_nodes,
                actual: travel_times.num_nodes(),
            });
        }

        if let Some((from, to, minutes)) = travel_times
            .entries()
            .find(|&(_, _, minutes)| minutes.is_nan() || minutes < 0.0)
        {
            return Err(ValidationError::InvalidTravelTime { from, to, minutes });
        }

        Ok(Problem {
            markets,
            travel_times,
            day_start,
            day_end,
            stay_duration,
            transfer_buffer,
            start_location: self.start_location,
            market_index,
        })
    }
}
