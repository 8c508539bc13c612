//! Source discovery and the bounded worker pool.
//!
//! Each cycle: rescan the data tree, build a per-file task for everything
//! with uncached work, run the tasks on a bounded blocking pool with a
//! memory-floor admission gate, then sweep orphaned scratch indexes. The
//! loop sleeps a short interval after productive cycles and a long one
//! after idle cycles.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use tiles_common::{RenderVariable, SourceKey, TileResult};

use crate::config::TilerConfig;
use crate::decode::FieldDecoder;
use crate::output::TileWriter;
use crate::scratch::sweep_orphaned_indexes;
use crate::worker::{process_file, FileReport};

/// Outcome counts for one scheduling cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleStats {
    /// Files whose task ran to completion.
    pub files: usize,
    pub tiles_written: usize,
    pub tiles_skipped: usize,
    pub tiles_failed: usize,
    /// File tasks deferred by the memory gate, retried next cycle.
    pub deferred: usize,
    /// Orphaned scratch indexes removed by the post-batch sweep.
    pub swept: usize,
}

pub struct Scheduler<D> {
    config: Arc<TilerConfig>,
    decoder: Arc<D>,
    writer: Arc<TileWriter>,
}

impl<D> Scheduler<D>
where
    D: FieldDecoder + 'static,
{
    pub fn new(config: Arc<TilerConfig>, decoder: Arc<D>, writer: Arc<TileWriter>) -> Self {
        Self {
            config,
            decoder,
            writer,
        }
    }

    /// Run scan cycles until the task is cancelled.
    pub async fn run_forever(&self) -> Result<()> {
        loop {
            let stats = self.run_cycle().await?;

            let sleep_secs = if stats.tiles_written > 0 {
                self.config.busy_interval_secs
            } else {
                self.config.idle_interval_secs
            };
            info!(
                files = stats.files,
                written = stats.tiles_written,
                skipped = stats.tiles_skipped,
                failed = stats.tiles_failed,
                deferred = stats.deferred,
                swept = stats.swept,
                sleep_secs,
                "cycle complete"
            );
            tokio::time::sleep(Duration::from_secs(sleep_secs)).await;
        }
    }

    /// Run a single scan/process/sweep cycle.
    pub async fn run_cycle(&self) -> Result<CycleStats> {
        let mut stats = CycleStats::default();

        let sources = discover_sources(&self.config.data_dir);
        let candidates: Vec<(PathBuf, SourceKey)> = sources
            .into_iter()
            .filter(|(_, key)| self.has_pending_work(key))
            .collect();

        if candidates.len() > self.config.max_tasks_per_cycle {
            info!(
                pending = candidates.len(),
                admitted = self.config.max_tasks_per_cycle,
                "more work than one cycle admits, remainder picked up next scan"
            );
        }

        let mut queue = candidates
            .into_iter()
            .take(self.config.max_tasks_per_cycle);
        let mut pool: JoinSet<TileResult<FileReport>> = JoinSet::new();

        for (path, key) in queue.by_ref() {
            // Keep the pool bounded before admitting more work.
            while pool.len() >= self.config.workers {
                if let Some(joined) = pool.join_next().await {
                    absorb(&mut stats, joined)?;
                }
            }

            // Admission gate: when RAM is scarce, defer instead of
            // starting. The task carries no state, so retrying it on the
            // next cycle is free.
            let available = available_memory_bytes();
            if available < self.config.memory_floor_bytes {
                warn!(
                    available_mb = available / (1024 * 1024),
                    floor_mb = self.config.memory_floor_bytes / (1024 * 1024),
                    "available memory below floor, deferring remaining tasks"
                );
                stats.deferred = 1 + queue.len();
                break;
            }

            let config = Arc::clone(&self.config);
            let decoder = Arc::clone(&self.decoder);
            let writer = Arc::clone(&self.writer);
            pool.spawn_blocking(move || {
                process_file(&config, decoder.as_ref(), &writer, &path, key)
            });
        }

        while let Some(joined) = pool.join_next().await {
            absorb(&mut stats, joined)?;
        }

        stats.swept = sweep_orphaned_indexes(&self.config.data_dir);

        Ok(stats)
    }

    /// Whether any (region, variable) pair for this file still needs a
    /// render. Lead times beyond a region's horizon are never attempted.
    fn has_pending_work(&self, key: &SourceKey) -> bool {
        self.config.regions.iter().any(|region| {
            region.admits_lead(key.lead_hours)
                && RenderVariable::ALL
                    .iter()
                    .any(|&variable| self.writer.needs_render(&region.id, key, variable))
        })
    }
}

/// Fold one finished task into the cycle stats. Fatal errors (failed
/// writes) propagate and stop the service; everything else is counted.
fn absorb(
    stats: &mut CycleStats,
    joined: Result<TileResult<FileReport>, tokio::task::JoinError>,
) -> Result<()> {
    match joined {
        Ok(Ok(report)) => {
            stats.files += 1;
            stats.tiles_written += report.written;
            stats.tiles_skipped += report.skipped;
            stats.tiles_failed += report.failed;
            Ok(())
        }
        Ok(Err(e)) if e.is_fatal() => Err(e.into()),
        Ok(Err(e)) => {
            warn!(error = %e, "file task failed");
            stats.tiles_failed += 1;
            Ok(())
        }
        Err(join_error) => {
            error!(error = %join_error, "file task panicked");
            stats.tiles_failed += 1;
            Ok(())
        }
    }
}

/// Recursively scan the data tree for files matching the model's naming
/// convention. Anything unparseable is ignored.
pub fn discover_sources(data_dir: &Path) -> Vec<(PathBuf, SourceKey)> {
    let mut sources: Vec<(PathBuf, SourceKey)> = WalkDir::new(data_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let path = entry.into_path();
            let key = SourceKey::from_source_path(&path)?;
            Some((path, key))
        })
        .collect();

    sources.sort_by(|a, b| a.0.cmp(&b.0));
    sources
}

/// Available system memory in bytes, from /proc/meminfo. On platforms
/// without it the gate is disabled (everything is admitted).
pub fn available_memory_bytes() -> u64 {
    if let Ok(meminfo) = std::fs::read_to_string("/proc/meminfo") {
        for line in meminfo.lines() {
            if line.starts_with("MemAvailable:") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 {
                    if let Ok(kb) = parts[1].parse::<u64>() {
                        return kb * 1024;
                    }
                }
            }
        }
    }
    u64::MAX
}
