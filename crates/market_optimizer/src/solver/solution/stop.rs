use jiff::{SignedDuration, civil::Time};
use serde::Serialize;

use crate::problem::market::{MarketId, MarketIdx};

/// One scheduled visit of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stop {
    pub market: MarketIdx,
    pub market_id: MarketId,
    /// Duration of the move that led here, transfer buffer included.
    pub travel_time: SignedDuration,
    pub arrival: Time,
    pub wait: SignedDuration,
    pub service_start: Time,
    pub departure: Time,
}

impl Stop {
    pub fn service_end(&self) -> Time {
        self.departure
    }

    pub fn service_duration(&self) -> SignedDuration {
        self.departure.duration_since(self.service_start)
    }
}
