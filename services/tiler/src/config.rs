//! Tiler service configuration.
//!
//! Built once at startup from environment variables or a YAML file, then
//! threaded immutably through every component. Nothing reads configuration
//! from ambient global state after startup.

use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use tiles_common::region::{builtin_regions, RegionSpec};
use tiles_common::{TileError, TileResult};

/// Immutable service configuration.
#[derive(Debug, Clone)]
pub struct TilerConfig {
    /// Root of the source tree (`<data_dir>/<YYYYMMDD>_<HH>/*.grib2`).
    pub data_dir: PathBuf,

    /// Directory tiles, sidecars, and legends are written to.
    pub output_dir: PathBuf,

    /// Re-render tiles even when the cached artifacts already exist.
    pub force_rewrite: bool,

    /// Worker pool size; 1 means fully serial processing.
    pub workers: usize,

    /// Available-memory floor in bytes. Tasks are deferred, not started,
    /// while the system is below it.
    pub memory_floor_bytes: u64,

    /// Maximum file tasks admitted per scheduling cycle.
    pub max_tasks_per_cycle: usize,

    /// Sleep after a cycle that produced tiles.
    pub busy_interval_secs: u64,

    /// Sleep after an idle cycle.
    pub idle_interval_secs: u64,

    /// Output region table.
    pub regions: Vec<RegionSpec>,
}

/// On-disk YAML shape; every field optional with the same defaults as the
/// environment path.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    data_dir: Option<PathBuf>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(default)]
    force_rewrite: Option<bool>,
    #[serde(default)]
    workers: Option<usize>,
    #[serde(default)]
    memory_floor_mb: Option<u64>,
    #[serde(default)]
    max_tasks_per_cycle: Option<usize>,
    #[serde(default)]
    busy_interval_secs: Option<u64>,
    #[serde(default)]
    idle_interval_secs: Option<u64>,
    #[serde(default)]
    regions: Option<Vec<RegionSpec>>,
}

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT_DIR: &str = "static/maps";
const DEFAULT_WORKERS: usize = 2;
const DEFAULT_MEMORY_FLOOR_MB: u64 = 512;
const DEFAULT_MAX_TASKS: usize = 16;
const DEFAULT_BUSY_INTERVAL_SECS: u64 = 60;
const DEFAULT_IDLE_INTERVAL_SECS: u64 = 600;

impl TilerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> TileResult<Self> {
        let config = Self {
            data_dir: env_path("TILER_DATA_DIR", DEFAULT_DATA_DIR),
            output_dir: env_path("TILER_OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            force_rewrite: env_flag("TILER_FORCE_REWRITE"),
            workers: env_parsed("TILER_WORKERS", DEFAULT_WORKERS),
            memory_floor_bytes: env_parsed("TILER_MEMORY_FLOOR_MB", DEFAULT_MEMORY_FLOOR_MB)
                * 1024
                * 1024,
            max_tasks_per_cycle: env_parsed("TILER_MAX_TASKS_PER_CYCLE", DEFAULT_MAX_TASKS),
            busy_interval_secs: env_parsed("TILER_BUSY_INTERVAL_SECS", DEFAULT_BUSY_INTERVAL_SECS),
            idle_interval_secs: env_parsed("TILER_IDLE_INTERVAL_SECS", DEFAULT_IDLE_INTERVAL_SECS),
            regions: builtin_regions(),
        };
        config.validate()
    }

    /// Load configuration from a YAML file. Fields left out fall back to
    /// the same defaults as the environment path.
    pub fn from_yaml(path: &std::path::Path) -> TileResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TileError::Config(format!("cannot read {}: {e}", path.display())))?;
        let file: ConfigFile = serde_yaml::from_str(&contents)
            .map_err(|e| TileError::Config(format!("cannot parse {}: {e}", path.display())))?;

        let config = Self {
            data_dir: file.data_dir.unwrap_or_else(|| DEFAULT_DATA_DIR.into()),
            output_dir: file.output_dir.unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into()),
            force_rewrite: file.force_rewrite.unwrap_or(false),
            workers: file.workers.unwrap_or(DEFAULT_WORKERS),
            memory_floor_bytes: file.memory_floor_mb.unwrap_or(DEFAULT_MEMORY_FLOOR_MB)
                * 1024
                * 1024,
            max_tasks_per_cycle: file.max_tasks_per_cycle.unwrap_or(DEFAULT_MAX_TASKS),
            busy_interval_secs: file.busy_interval_secs.unwrap_or(DEFAULT_BUSY_INTERVAL_SECS),
            idle_interval_secs: file.idle_interval_secs.unwrap_or(DEFAULT_IDLE_INTERVAL_SECS),
            regions: file.regions.unwrap_or_else(builtin_regions),
        };
        config.validate()
    }

    fn validate(self) -> TileResult<Self> {
        if self.workers == 0 {
            return Err(TileError::Config("workers must be at least 1".into()));
        }
        if self.max_tasks_per_cycle == 0 {
            return Err(TileError::Config(
                "max_tasks_per_cycle must be at least 1".into(),
            ));
        }
        if self.regions.is_empty() {
            return Err(TileError::Config("no regions configured".into()));
        }
        for region in &self.regions {
            if region.id.is_empty() || region.id.contains('_') {
                return Err(TileError::Config(format!(
                    "region id {:?} is not a valid filename token",
                    region.id
                )));
            }
            if region.bounds.west >= region.bounds.east
                || region.bounds.south >= region.bounds.north
            {
                return Err(TileError::Config(format!(
                    "region {} has an empty bounding box",
                    region.id
                )));
            }
        }
        Ok(self)
    }
}

fn env_path(name: &str, default: &str) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or_else(|_| default.into())
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
