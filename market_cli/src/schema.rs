use std::path::PathBuf;

use clap::{Args, ValueEnum};
use market_optimizer::json::schema::{SchemaKind, generate_json_schema};

#[derive(Clone, Copy, ValueEnum)]
pub enum SchemaInput {
    Markets,
    TravelTimes,
    Config,
}

impl From<SchemaInput> for SchemaKind {
    fn from(value: SchemaInput) -> Self {
        match value {
            SchemaInput::Markets => SchemaKind::Markets,
            SchemaInput::TravelTimes => SchemaKind::TravelTimes,
            SchemaInput::Config => SchemaKind::Config,
        }
    }
}

#[derive(Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = SchemaInput::Markets)]
    input: SchemaInput,

    /// Writes the schema to this file instead of stdout
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

pub fn run(args: SchemaArgs) -> Result<(), anyhow::Error> {
    let schema = generate_json_schema(args.input.into())?;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }

            std::fs::write(out, schema)?;
        }
        None => println!("{schema}"),
    }

    Ok(())
}
