use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use fxhash::FxHashMap;
use jiff::civil::Time;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::problem::{
    market::{Market, MarketBuilder, MarketId},
    market_problem::StartLocation,
    travel_time_matrix::TravelTimeMatrix,
    validation_error::ValidationError,
};

use super::json_error::JsonError;

/// Key of the start location in a travel time file.
pub const START_KEY: &str = "start";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "Market")]
pub struct JsonMarket {
    pub id: MarketId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `HH:MM`
    pub opening_time: String,
    /// `HH:MM`
    pub closing_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JsonMarket {
    pub fn to_market(&self) -> Result<Market, JsonError> {
        let mut builder = MarketBuilder::new(
            self.id,
            parse_clock_time(&self.opening_time)?,
            parse_clock_time(&self.closing_time)?,
        )
        .with_name(self.name.as_str())
        .with_lat_lon(self.latitude, self.longitude);

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            builder = builder.with_description(description);
        }

        Ok(builder.build())
    }
}

pub fn parse_markets(json: &str) -> Result<Vec<JsonMarket>, JsonError> {
    Ok(serde_json::from_str(json)?)
}

pub fn read_markets(path: impl AsRef<Path>) -> Result<Vec<JsonMarket>, JsonError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Travel times in minutes keyed by origin then destination market id.
///
/// `null` or a missing destination means the pair is unreachable. The start
/// location, when configured, uses the key `"start"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "TravelTimes")]
pub struct JsonTravelTimes {
    pub times: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

impl JsonTravelTimes {
    pub fn from_json(json: &str) -> Result<Self, JsonError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, JsonError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Lays the entries out over the markets, with the start location as the last node.
    pub fn to_matrix(
        &self,
        markets: &[Market],
        has_start: bool,
    ) -> Result<TravelTimeMatrix, JsonError> {
        let num_markets = markets.len();
        let index = markets
            .iter()
            .enumerate()
            .map(|(index, market)| (market.id(), index))
            .collect::<FxHashMap<_, _>>();

        let node = |key: &str| -> Result<Option<usize>, JsonError> {
            let key = key.trim();
            if key == START_KEY {
                return Ok(has_start.then_some(num_markets));
            }

            key.parse::<MarketId>()
                .ok()
                .and_then(|id| index.get(&id).copied())
                .map(Some)
                .ok_or_else(|| ValidationError::UnknownMarket(key.to_owned()).into())
        };

        let mut matrix = TravelTimeMatrix::new(num_markets + usize::from(has_start));
        let mut ignored_start_entries = 0;

        for (from_key, row) in &self.times {
            let from = node(from_key)?;
            for (to_key, minutes) in row {
                let to = node(to_key)?;
                match (from, to, minutes) {
                    (Some(from), Some(to), Some(minutes)) => matrix.set(from, to, *minutes),
                    (None, _, _) | (_, None, _) => ignored_start_entries += 1,
                    _ => {}
                }
            }
        }

        if ignored_start_entries > 0 {
            warn!(
                "Ignoring {} start location travel times, no start location is configured",
                ignored_start_entries
            );
        }

        Ok(matrix)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "StartLocation")]
pub struct JsonStartLocation {
    #[serde(default = "default_start_name")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

fn default_start_name() -> String {
    String::from("Start")
}

impl From<&JsonStartLocation> for StartLocation {
    fn from(value: &JsonStartLocation) -> Self {
        StartLocation::new(value.name.as_str(), value.latitude, value.longitude)
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(value: &str) -> Result<Time, JsonError> {
    let invalid = || JsonError::InvalidTime(value.to_owned());

    let parts = value
        .trim()
        .split(':')
        .map(|part| part.parse::<i8>().ok())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;

    let (hour, minute, second) = match parts.as_slice() {
        [hour, minute] => (*hour, *minute, 0),
        [hour, minute, second] => (*hour, *minute, *second),
        _ => return Err(invalid()),
    };

    Time::new(hour, minute, second, 0).map_err(|_| invalid())
}
