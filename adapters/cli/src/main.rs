#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the warehouse floor until every box sits in
//! a complete tower or the tick budget runs out.

mod render;
mod settings;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warehouse_simulation::{RunOutcome, WarehouseModel};
use warehouse_world::query;

use crate::settings::SettingsLayer;

/// Flags accepted by the `warehouse` binary.
#[derive(Debug, Parser)]
#[command(name = "warehouse", about = "Robots stacking boxes into towers of five")]
struct Cli {
    /// TOML file providing any of the run parameters.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of columns on the floor.
    #[arg(long)]
    width: Option<u32>,
    /// Number of rows on the floor.
    #[arg(long)]
    height: Option<u32>,
    /// Number of robots.
    #[arg(long)]
    robots: Option<u32>,
    /// Number of boxes.
    #[arg(long)]
    boxes: Option<u32>,
    /// Seed for the run's random generator.
    #[arg(long)]
    seed: Option<u64>,
    /// Give up after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Write the per-tick floor history as JSON to this file.
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,
}

impl Cli {
    fn layer(&self) -> SettingsLayer {
        SettingsLayer {
            width: self.width,
            height: self.height,
            robots: self.robots,
            boxes: self.boxes,
            seed: self.seed,
            max_ticks: self.max_ticks,
        }
    }
}

/// Entry point for the warehouse command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => SettingsLayer::load(path)?,
        None => SettingsLayer::default(),
    };
    let settings = base.overlay(cli.layer()).resolve()?;
    info!(
        width = settings.config.width,
        height = settings.config.height,
        robots = settings.config.robots,
        boxes = settings.config.boxes,
        seed = settings.seed,
        max_ticks = settings.max_ticks,
        "configuration loaded"
    );

    let mut model = WarehouseModel::seeded(settings.config, settings.seed)
        .context("failed to populate the warehouse floor")?;
    model.record_history(cli.history.is_some());
    match model
        .run_until_done(settings.max_ticks)
        .context("simulation aborted")?
    {
        RunOutcome::Completed { ticks } => info!(ticks, "every box is stacked"),
        RunOutcome::TickLimit { ticks } => {
            warn!(ticks, "tick budget exhausted before the floor settled");
        }
    }

    let floor = query::floor_snapshot(model.world());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", render::render_floor(&floor)).context("failed to print the floor")?;
    writeln!(
        out,
        "ticks={} towers={} carried={} {}",
        model.tick_index(),
        query::towers(model.world()).len(),
        query::count_carried_boxes(model.world()),
        render::summarize(&floor)
    )
    .context("failed to print the summary")?;

    if let Some(path) = &cli.history {
        let file = File::create(path)
            .with_context(|| format!("failed to create history file at {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, model.history())
            .with_context(|| format!("failed to write history to {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to flush history to {}", path.display()))?;
        info!(snapshots = model.history().len(), path = %path.display(), "history written");
    }

    Ok(())
}
