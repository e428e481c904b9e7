use std::{fs::File, io::BufWriter, path::PathBuf, sync::Arc, time::Duration};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use market_optimizer::{
    json::{
        config::{AlgorithmKind, OptimizerConfig},
        types::{JsonTravelTimes, read_markets},
    },
    solver::multi_day::{algorithm::Algorithm, scheduler::MultiDayScheduler},
};
use tracing::info;

use crate::report;

#[derive(Args)]
pub struct OptimizeArgs {
    /// Markets JSON file
    #[arg(short, long)]
    markets: PathBuf,

    /// Travel times JSON file, estimated from coordinates when omitted
    #[arg(short, long)]
    travel_times: Option<PathBuf>,

    /// Optimizer config JSON file, flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    algorithm: Option<AlgorithmKind>,

    #[arg(long)]
    days: Option<usize>,

    /// Ant colony threads, 0 uses every core
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Fills a missing travel time with the one of the reverse direction
    #[arg(long)]
    symmetric: bool,

    /// Writes the plan as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl OptimizeArgs {
    fn load_config(&self) -> Result<OptimizerConfig, anyhow::Error> {
        let mut config = match &self.config {
            Some(path) => OptimizerConfig::from_file(path)?,
            None => OptimizerConfig::default(),
        };

        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(days) = self.days {
            config.problem.num_days = days;
        }
        if let Some(threads) = self.threads {
            config.aco.threads = threads;
        }
        if let Some(seed) = self.seed {
            config.aco.seed = seed;
        }

        Ok(config)
    }
}

pub fn run(args: OptimizeArgs) -> Result<(), anyhow::Error> {
    let config = args.load_config()?;

    let markets = read_markets(&args.markets)?;
    let travel_times = args
        .travel_times
        .as_ref()
        .map(JsonTravelTimes::from_file)
        .transpose()?;
    info!("Loaded {} markets from {:?}", markets.len(), args.markets);

    let problem = Arc::new(config.problem.build_problem(
        &markets,
        travel_times.as_ref(),
        args.symmetric,
    )?);
    let algorithm = config.to_algorithm()?;
    let params = config.problem.multi_day_params()?;

    let progress = match &algorithm {
        Algorithm::AntColony(aco) => {
            let bar = ProgressBar::new(progress_len(aco.num_iterations, params.num_days));
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40}] {pos}/{len} iterations ({elapsed}) {msg}")?,
            );
            bar.enable_steady_tick(Duration::from_millis(250));
            Some(bar)
        }
        Algorithm::Greedy(_) => None,
    };

    let mut scheduler = MultiDayScheduler::new(Arc::clone(&problem), algorithm, params)?;
    if let Some(bar) = &progress {
        let bar = bar.clone();
        scheduler.on_iteration(move |day, info| {
            bar.inc(1);
            bar.set_message(format!("day {day}, best = {}", info.row.best_so_far));
        });
    }

    let solution = scheduler.solve()?;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    report::print_solution(&problem, &solution);

    if let Some(output) = args.output {
        let writer = BufWriter::new(File::create(&output)?);
        serde_json::to_writer_pretty(writer, &solution)?;
        info!("Plan written to {:?}", output);
    }

    Ok(())
}

/// Upper bound of iteration callbacks over the whole tour.
fn progress_len(num_iterations: usize, num_days: usize) -> u64 {
    u64::try_from(num_iterations.saturating_mul(num_days)).unwrap_or(u64::MAX)
}
