//! Command line driver for repeated prisoner's dilemma experiments.
//!
//! Runs a stock preset or a TOML-configured experiment and optionally writes
//! every recorded state as JSON lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dilemma::{DilemmaError, Experiment, ExperimentConfig, RunResult, StateSummary};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// 500 steps, 3 runs per parameter set
    Base,
    /// 1000 steps, 10 runs per parameter set
    Long,
}

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "dilemma")]
#[command(about = "Repeated prisoner's dilemma with evolving goodwill")]
struct Args {
    /// TOML experiment configuration (overrides --preset)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stock experiment to run when no config file is given
    #[arg(long, value_enum, default_value_t = Preset::Base)]
    preset: Preset,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Monte Carlo runs per parameter set
    #[arg(long)]
    runs: Option<usize>,

    /// Number of steps to simulate
    #[arg(long)]
    timesteps: Option<usize>,

    /// Population size
    #[arg(long)]
    agents: Option<usize>,

    /// Write recorded states as JSON lines to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log the final state summary of every run
    #[arg(long)]
    summary: bool,
}

impl Args {
    fn load_config(&self) -> Result<ExperimentConfig, DilemmaError> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)?,
            None => match self.preset {
                Preset::Base => ExperimentConfig::base_simulation(),
                Preset::Long => ExperimentConfig::long_simulation(),
            },
        };
        let settings = &mut config.experiment;
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(runs) = self.runs {
            settings.runs = runs;
        }
        if let Some(timesteps) = self.timesteps {
            settings.timesteps = timesteps;
        }
        if let Some(agents) = self.agents {
            settings.agents = agents;
        }
        Ok(config)
    }
}

fn write_records(path: &Path, results: &[RunResult]) -> Result<(), DilemmaError> {
    let mut out = BufWriter::new(File::create(path)?);
    for record in results.iter().flat_map(|r| r.records.iter()) {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

async fn run(args: Args) -> Result<(), DilemmaError> {
    let config = args.load_config()?;
    let experiment = Experiment::new(config)?;
    let results = experiment.run().await?;
    let name = &experiment.config().experiment.name;

    if args.summary {
        for result in &results {
            if let Some(state) = result.final_state() {
                let summary = StateSummary::of(state);
                info!(
                    experiment = %name,
                    param_set = result.param_set,
                    run = result.run,
                    mean_goodwill = summary.mean_goodwill,
                    cooperation_rate = summary.cooperation_rate.unwrap_or(f64::NAN),
                    total_reward = summary.total_reward,
                    reward_spread = summary.reward_spread(),
                    "final state"
                );
            }
        }
    }

    if let Some(path) = &args.output {
        write_records(path, &results)?;
        info!(experiment = %name, path = %path.display(), "records written");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "experiment failed");
            ExitCode::FAILURE
        }
    }
}
