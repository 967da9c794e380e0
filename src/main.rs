use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use ::rand::SeedableRng;
use anyhow::{Context, Result};
use clap::Parser;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use flapper::{
    Episode, EpisodeConfig, GenerationHistory, GenerationRecord, LinearController,
    TerminationReason, TraceRenderer,
};

#[derive(Parser)]
#[command(name = "flapper")]
#[command(about = "Evaluate controller populations in the headless side-scroller")]
struct Cli {
    /// Episode config (JSON); missing fields use built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Controllers per generation
    #[arg(long, default_value_t = 100)]
    population: usize,

    /// Number of generations to evaluate
    #[arg(long, default_value_t = 50)]
    generations: u32,

    /// Overrides the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Emit a per-frame trace event every N ticks
    #[arg(long, default_value_t = 0)]
    trace_every: u64,

    /// Print each generation's report as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EpisodeConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EpisodeConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut history = GenerationHistory::new(cli.generations as usize);
    let mut renderer = TraceRenderer {
        every: cli.trace_every,
    };
    let stop = AtomicBool::new(false);

    for generation in 1..=cli.generations {
        let controllers: Vec<LinearController> = (0..cli.population)
            .map(|_| LinearController::random(&mut rng))
            .collect();
        let episode_config = EpisodeConfig {
            seed: config.seed.wrapping_add(generation as u64),
            ..config.clone()
        };

        let mut episode = Episode::new(episode_config, generation, controllers)
            .context("building episode")?;
        episode.run_with(&mut renderer, &stop);
        let report = episode.into_report();

        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        }

        let record = GenerationRecord::from(&report);
        info!(
            generation,
            ticks = record.ticks,
            score = record.score,
            reason = ?record.reason,
            best = record.fitness.max,
            mean = record.fitness.mean,
            p90 = record.fitness.p90,
            "generation evaluated"
        );
        let solved = record.reason == TerminationReason::Solved;
        history.push(record);

        if solved {
            info!(generation, "score ceiling reached");
            break;
        }
    }

    if let Some(best) = history.best() {
        info!(
            generation = best.generation,
            fitness = best.fitness.max,
            score = best.score,
            evaluated = history.len(),
            "best generation"
        );
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
