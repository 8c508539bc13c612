//! Scoped scratch indexes for decode calls.
//!
//! Every decode gets a uniquely named `.idx` sidecar next to its source
//! file, keyed by (source, variable, task id), so concurrent decodes of
//! different variables from the same file never clobber a shared index.
//! The guard removes the file when the decode call ends, on success and
//! failure alike; the post-batch sweep catches anything left behind by a
//! crash once its parent source file is gone.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walkdir::WalkDir;

/// A uniquely named scratch index path, removed on drop.
#[derive(Debug)]
pub struct ScratchIndex {
    path: PathBuf,
}

impl ScratchIndex {
    /// Reserve a scratch index path for one (source, variable, task)
    /// decode. The task id comes from the caller so every decode in a task
    /// shares one identity in logs; it is never an OS pid.
    pub fn create(source: &Path, variable: &str, task_id: Uuid) -> Self {
        let source_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("source");
        let name = format!("{}.{}.{}.idx", source_name, variable, task_id.simple());
        Self {
            path: source.with_file_name(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchIndex {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "scratch index not removed");
            }
        }
    }
}

/// Remove leftover scratch indexes whose parent source file no longer
/// exists. Indexes whose source is still present are left untouched: they
/// belong to a decode that is either in flight or about to be retried.
///
/// Returns the number of indexes removed.
pub fn sweep_orphaned_indexes(data_dir: &Path) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(data_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.ends_with(".idx") {
            continue;
        }
        // Scratch names are `<source>.grib2.<variable>.<taskid>.idx`;
        // everything up to and including `.grib2` names the parent.
        let Some(pos) = name.find(".grib2") else {
            continue;
        };
        let source_name = &name[..pos + ".grib2".len()];
        let source_path = entry.path().with_file_name(source_name);

        if source_path.exists() {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::info!(path = %entry.path().display(), "removed orphaned scratch index");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "orphan sweep failed");
            }
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_unique_per_variable_and_task() {
        let source = Path::new("/data/20260103_00/aigfs.t00z.sfc.f006.grib2");
        let task_a = Uuid::new_v4();
        let task_b = Uuid::new_v4();

        let t2m_a = ScratchIndex::create(source, "t2m", task_a);
        let u10_a = ScratchIndex::create(source, "u10", task_a);
        let t2m_b = ScratchIndex::create(source, "t2m", task_b);

        assert_ne!(t2m_a.path(), u10_a.path());
        assert_ne!(t2m_a.path(), t2m_b.path());
        assert_eq!(t2m_a.path().parent(), source.parent());
    }

    #[test]
    fn test_guard_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("aigfs.t00z.sfc.f000.grib2");
        fs::write(&source, b"stub").unwrap();

        let scratch = ScratchIndex::create(&source, "t2m", Uuid::new_v4());
        fs::write(scratch.path(), b"index").unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_sweep_removes_only_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("20260103_00");
        fs::create_dir_all(&run_dir).unwrap();

        // Live source with its index: stays.
        let live = run_dir.join("aigfs.t00z.sfc.f000.grib2");
        fs::write(&live, b"stub").unwrap();
        let live_idx = run_dir.join("aigfs.t00z.sfc.f000.grib2.t2m.deadbeef.idx");
        fs::write(&live_idx, b"index").unwrap();

        // Orphan: parent source was cleaned up between cycles.
        let orphan_idx = run_dir.join("aigfs.t00z.sfc.f006.grib2.u10.cafebabe.idx");
        fs::write(&orphan_idx, b"index").unwrap();

        let removed = sweep_orphaned_indexes(dir.path());
        assert_eq!(removed, 1);
        assert!(live_idx.exists());
        assert!(!orphan_idx.exists());
    }
}
