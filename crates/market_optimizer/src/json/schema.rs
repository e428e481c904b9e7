use schemars::schema_for;

use super::{
    config::OptimizerConfig,
    types::{JsonMarket, JsonTravelTimes},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Markets,
    TravelTimes,
    Config,
}

pub fn generate_json_schema(kind: SchemaKind) -> Result<String, serde_json::Error> {
    let schema = match kind {
        SchemaKind::Markets => schema_for!(Vec<JsonMarket>),
        SchemaKind::TravelTimes => schema_for!(JsonTravelTimes),
        SchemaKind::Config => schema_for!(OptimizerConfig),
    };

    serde_json::to_string_pretty(&schema)
}
