//! Headless flock driver

use anyhow::{Context, Result};
use boidgrid_core::{init_tracing, FlockConfig, NeighborStrategy, SimulationController};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "boidgrid")]
#[command(about = "Run a grid-indexed flocking simulation without a display", long_about = None)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Population size
    #[arg(short = 'n', long)]
    boids: Option<usize>,

    #[arg(long)]
    speed: Option<f32>,

    /// Perception radius
    #[arg(long)]
    range: Option<f32>,

    /// Angular noise in degrees
    #[arg(long)]
    noise: Option<f32>,

    #[arg(long)]
    width: Option<f32>,

    #[arg(long)]
    height: Option<f32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Scan the whole population instead of using the grid
    #[arg(long)]
    full_scan: bool,

    /// Include trails in snapshots
    #[arg(long)]
    trails: bool,

    /// Log the alignment metric every N ticks
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Write JSON-lines frame snapshots to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Snapshot every N ticks
    #[arg(long, default_value_t = 10)]
    snapshot_every: u64,

    /// tracing env-filter directive
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn flock_config(&self) -> Result<FlockConfig> {
        let mut config = match &self.config {
            Some(path) => FlockConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => FlockConfig::default(),
        };
        if let Some(n) = self.boids {
            config.num_boids = n;
        }
        if let Some(v) = self.speed {
            config.speed = v;
        }
        if let Some(v) = self.range {
            config.visual_range = v;
        }
        if let Some(v) = self.noise {
            config.noise_degrees = v;
        }
        if let Some(v) = self.width {
            config.width = v;
        }
        if let Some(v) = self.height {
            config.height = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.full_scan {
            config.neighbor_strategy = NeighborStrategy::FullScan;
        }
        if self.trails {
            config.draw_trail = true;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = cli.flock_config()?;
    let mut controller = SimulationController::new(config).context("invalid simulation parameters")?;

    let mut sink = match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let cfg = controller.config();
    info!(
        "🚀 [Driver] {} ticks, {} boids, speed {}, range {}, noise {}°",
        cli.ticks, cfg.num_boids, cfg.speed, cfg.visual_range, cfg.noise_degrees
    );

    let started = Instant::now();
    for tick in 1..=cli.ticks {
        let stats = controller.step();

        if cli.report_every > 0 && tick % cli.report_every == 0 {
            info!(
                "📈 [Driver] tick {:>6}  alignment {:.3}  neighbors {:.1}  cells {}  {}µs",
                stats.tick, stats.alignment, stats.mean_neighbors, stats.occupied_cells, stats.elapsed_micros
            );
        }

        if let Some(out) = sink.as_mut() {
            if cli.snapshot_every > 0 && tick % cli.snapshot_every == 0 {
                let line = controller.snapshot().to_json().context("serializing snapshot")?;
                writeln!(out, "{}", line).context("writing snapshot")?;
            }
        }
    }

    if let Some(mut out) = sink {
        out.flush().context("flushing snapshots")?;
    }

    info!(
        "✅ [Driver] Done in {:.2}s, final alignment {:.3}",
        started.elapsed().as_secs_f64(),
        controller.alignment()
    );
    Ok(())
}
