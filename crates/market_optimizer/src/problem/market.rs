use std::fmt;

use geo::{Distance, Haversine};
use jiff::civil::Time;
use serde::Serialize;

/// External identifier of a market, as given by the input data.
pub type MarketId = u32;

/// Position of a market inside [`Problem::markets`](super::market_problem::Problem::markets).
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MarketIdx(usize);

impl MarketIdx {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MarketIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for MarketIdx {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::ops::Index<MarketIdx> for [Market] {
    type Output = Market;
    fn index(&self, index: MarketIdx) -> &Self::Output {
        &self[index.0]
    }
}

impl std::ops::Index<MarketIdx> for Vec<Market> {
    type Output = Market;
    fn index(&self, index: MarketIdx) -> &Self::Output {
        &self[index.0]
    }
}

/// A market with its daily opening window.
#[derive(Debug, Clone)]
pub struct Market {
    id: MarketId,
    name: String,
    point: geo::Point,
    opening: Time,
    closing: Time,
    description: Option<String>,
}

impl Market {
    pub fn id(&self) -> MarketId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn point(&self) -> geo::Point {
        self.point
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn opening(&self) -> Time {
        self.opening
    }

    pub fn closing(&self) -> Time {
        self.closing
    }

    pub fn is_open_at(&self, time: Time) -> bool {
        self.opening <= time && time <= self.closing
    }

    pub fn haversine_distance(&self, to: &Market) -> f64 {
        Haversine.distance(self.point, to.point)
    }
}

pub struct MarketBuilder {
    id: MarketId,
    name: Option<String>,
    point: geo::Point,
    opening: Time,
    closing: Time,
    description: Option<String>,
}

impl MarketBuilder {
    pub fn new(id: MarketId, opening: Time, closing: Time) -> Self {
        MarketBuilder {
            id,
            name: None,
            point: geo::Point::new(0.0, 0.0),
            opening,
            closing,
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_lat_lon(mut self, lat: f64, lon: f64) -> Self {
        self.point = geo::Point::new(lon, lat);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn build(self) -> Market {
        Market {
            name: self.name.unwrap_or_else(|| format!("Market {}", self.id)),
            id: self.id,
            point: self.point,
            opening: self.opening,
            closing: self.closing,
            description: self.description,
        }
    }
}
