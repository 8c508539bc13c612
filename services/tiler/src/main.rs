//! AIGFS raster tile generation service.
//!
//! Watches a tree of downloaded model output and maintains a directory of
//! web-displayable raster tiles, per-tile stats sidecars, and per-variable
//! legend colorbars. Downloading source files and serving the artifacts
//! are other programs' jobs.

mod config;
mod decode;
mod output;
mod scheduler;
mod scratch;
#[cfg(test)]
mod testing;
mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use raster::legend::render_legend;
use raster::render_spec;
use tiles_common::{RenderVariable, TileError};

use config::TilerConfig;
use decode::Grib2Decoder;
use output::TileWriter;
use scheduler::Scheduler;

#[derive(Parser, Debug)]
#[command(name = "tiler")]
#[command(about = "AIGFS raster tile generation service")]
struct Args {
    /// Configuration file path (YAML). Environment variables are used
    /// when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single scan cycle and exit (vs continuous operation)
    #[arg(long)]
    once: bool,

    /// Rewrite tiles even when cached artifacts already exist
    #[arg(long)]
    force: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting tile generation service");

    let mut config = match &args.config {
        Some(path) => TilerConfig::from_yaml(path)?,
        None => TilerConfig::from_env()?,
    };
    if args.force {
        config.force_rewrite = true;
    }
    info!(
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        workers = config.workers,
        regions = config.regions.len(),
        force_rewrite = config.force_rewrite,
        "Loaded configuration"
    );

    let writer = Arc::new(
        TileWriter::new(&config.output_dir, config.force_rewrite)
            .context("output directory not usable")?,
    );

    // Legends depend only on the render registry; render them once per
    // process start, before any forecast data is touched.
    write_legends(&writer).context("legend generation failed")?;

    let decoder = Arc::new(Grib2Decoder::new());
    let scheduler = Scheduler::new(Arc::new(config), decoder, writer);

    if args.once {
        let stats = scheduler.run_cycle().await?;
        info!(
            files = stats.files,
            written = stats.tiles_written,
            failed = stats.tiles_failed,
            "single cycle complete"
        );
        return Ok(());
    }

    tokio::select! {
        result = scheduler.run_forever() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}

/// Render and persist the standalone colorbar for every variable.
fn write_legends(writer: &TileWriter) -> Result<()> {
    for variable in RenderVariable::ALL {
        let spec = render_spec(variable);
        let png = render_legend(spec).map_err(TileError::Write)?;
        writer.write_legend(variable, &png, spec)?;
        info!(variable = variable.id(), "legend written");
    }
    Ok(())
}
