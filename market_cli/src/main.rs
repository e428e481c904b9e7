use clap::{Parser, Subcommand};

use crate::{optimize::OptimizeArgs, schema::SchemaArgs};

mod optimize;
mod report;
mod schema;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plans a market tour over one or more days
    #[command(visible_alias = "o")]
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
    /// Prints the JSON Schema of an input file
    Schema {
        #[command(flatten)]
        args: SchemaArgs,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Optimize { args } => optimize::run(args)?,
        Commands::Schema { args } => schema::run(args)?,
    }

    Ok(())
}
