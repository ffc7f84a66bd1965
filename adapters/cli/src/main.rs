#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives stackbots warehouse runs.

mod config;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use stackbots_core::{SimulationConfig, SimulationState};
use stackbots_rendering::{render_frame, status_label, RenderingBackend, TextBackend};
use stackbots_simulation::{SessionId, SessionStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigFile, Overrides};

#[derive(Debug, Parser)]
#[command(
    name = "stackbots",
    version,
    about = "Simulate robots consolidating warehouse items into stacks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run simulations until they succeed or exhaust their step budget.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML file holding a `[simulation]` table.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Grid columns, perimeter included.
    #[arg(long)]
    width: Option<u32>,
    /// Grid rows, perimeter included.
    #[arg(long)]
    height: Option<u32>,
    /// Number of robots.
    #[arg(long)]
    robots: Option<u32>,
    /// Number of items.
    #[arg(long)]
    items: Option<u32>,
    /// Step budget per run.
    #[arg(long)]
    max_steps: Option<u64>,
    /// Seed of the first run; later runs use the following seeds.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of independent runs.
    #[arg(long, default_value_t = 1)]
    runs: u64,
    /// What to print while the runs progress.
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
}

impl RunArgs {
    fn resolve_config(&self) -> Result<SimulationConfig> {
        let base = match &self.config {
            Some(path) => ConfigFile::load(path)?.simulation,
            None => SimulationConfig::default(),
        };
        let overrides = Overrides {
            width: self.width,
            height: self.height,
            robots: self.robots,
            items: self.items,
            max_steps: self.max_steps,
            seed: self.seed,
        };
        Ok(overrides.apply(base))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per finished run.
    Summary,
    /// One JSON state per step.
    Json,
    /// A text picture of the floor per step.
    Frames,
}

/// Entry point for the stackbots command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(args: &RunArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let mut store = SessionStore::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for index in 0..args.runs {
        let run_config = SimulationConfig {
            seed: config.seed.wrapping_add(index),
            ..config
        };
        let id = store
            .create(run_config)
            .with_context(|| format!("failed to start run with seed {}", run_config.seed))?;
        info!(session = %id, seed = run_config.seed, "run started");

        let last = drive(&mut store, id, &run_config, args.format, &mut out)?;
        if args.format == OutputFormat::Summary {
            writeln!(out, "{}", summary_line(&run_config, &last))?;
        }
        let _ = store.remove(id)?;
    }

    out.flush()?;
    Ok(())
}

fn drive<W: Write>(
    store: &mut SessionStore,
    id: SessionId,
    config: &SimulationConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<SimulationState> {
    let mut backend = TextBackend::new(out);
    let mut state = store.state(id)?;
    present(&mut backend, config, format, &state)?;

    while store.is_running(id)? {
        state = store.step(id)?;
        present(&mut backend, config, format, &state)?;
    }

    Ok(state)
}

fn present<W: Write>(
    backend: &mut TextBackend<W>,
    config: &SimulationConfig,
    format: OutputFormat,
    state: &SimulationState,
) -> Result<()> {
    match format {
        OutputFormat::Summary => Ok(()),
        OutputFormat::Json => {
            let line = serde_json::to_string(state).context("failed to encode state")?;
            writeln!(backend.writer_mut(), "{line}")?;
            Ok(())
        }
        OutputFormat::Frames => {
            let frame = render_frame(state, config.width, config.height)?;
            backend.present(&frame)
        }
    }
}

fn summary_line(config: &SimulationConfig, state: &SimulationState) -> String {
    let total = config.items;
    let lone = state
        .stacks
        .iter()
        .filter(|stack| stack.item_count == 1)
        .count();
    let stacks = state
        .stacks
        .iter()
        .filter(|stack| stack.item_count > 1)
        .count();
    format!(
        "seed={} status={} steps={} robot_moves={} stacks={stacks} lone_items={lone} items={total}",
        config.seed,
        status_label(state.status).replace(' ', "_"),
        state.step,
        state.robot_moves,
    )
}
