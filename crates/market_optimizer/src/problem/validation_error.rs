use jiff::{SignedDuration, civil::Time};
use thiserror::Error;

use super::market::MarketId;

/// A malformed problem, rejected before any optimizer runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Market id {0} is used more than once")]
    DuplicateMarketId(MarketId),

    #[error("Market {market} opens at {opening} but closes at {closing}")]
    InvalidTimeWindow {
        market: MarketId,
        opening: Time,
        closing: Time,
    },

    #[error("Day ends at {end}, which is not after its start at {start}")]
    InvalidDayWindow { start: Time, end: Time },

    #[error("Stay duration must not be negative, got {0:?}")]
    NegativeStayDuration(SignedDuration),

    #[error("Transfer buffer must not be negative, got {0:?}")]
    NegativeTransferBuffer(SignedDuration),

    #[error("Travel time matrix has {actual} nodes, expected {expected}")]
    MatrixDimensionMismatch { expected: usize, actual: usize },

    #[error("Travel time from node {from} to node {to} is invalid: {minutes}")]
    InvalidTravelTime {
        from: usize,
        to: usize,
        minutes: f64,
    },

    #[error("Unknown market referenced: {0}")]
    UnknownMarket(String),
}
