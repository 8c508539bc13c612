//! Idempotent artifact output.
//!
//! Owns the artifact naming grammar and the atomic persistence of tiles,
//! stats sidecars, and legends. A downstream catalog reconstructs region,
//! run, lead time, and variable purely by splitting file names on `_`, so
//! the token layout here is load-bearing.

use std::fs;
use std::path::{Path, PathBuf};

use raster::{RenderSpec, TileStats};
use serde::{Deserialize, Serialize};
use tiles_common::{RenderVariable, SourceKey, TileError, TileResult};
use uuid::Uuid;

/// Leading token of every tile artifact name.
pub const ARTIFACT_PREFIX: &str = "aigfs";

/// Scalar summary persisted next to each tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSidecar {
    pub minimum: f32,
    pub maximum: f32,
    pub unit: String,
}

/// Base name (no extension) for one tile artifact:
/// `aigfs_<region>_<YYYYMMDD>_<HH>_<FFF>_<variable>`.
pub fn tile_stem(region_id: &str, key: &SourceKey, variable: RenderVariable) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}",
        ARTIFACT_PREFIX,
        region_id,
        key.date_token(),
        key.run_token(),
        key.lead_token(),
        variable.id()
    )
}

/// Writes artifacts into the output directory with atomic renames.
pub struct TileWriter {
    out_dir: PathBuf,
    force_rewrite: bool,
}

impl TileWriter {
    /// Create the writer, creating the output directory if needed. Failure
    /// here is an infrastructure error and stops the service.
    pub fn new(out_dir: &Path, force_rewrite: bool) -> TileResult<Self> {
        fs::create_dir_all(out_dir).map_err(|e| {
            TileError::Write(format!("cannot create output dir {}: {e}", out_dir.display()))
        })?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            force_rewrite,
        })
    }

    pub fn tile_path(&self, region_id: &str, key: &SourceKey, variable: RenderVariable) -> PathBuf {
        self.out_dir
            .join(format!("{}.png", tile_stem(region_id, key, variable)))
    }

    pub fn sidecar_path(
        &self,
        region_id: &str,
        key: &SourceKey,
        variable: RenderVariable,
    ) -> PathBuf {
        self.out_dir
            .join(format!("{}.json", tile_stem(region_id, key, variable)))
    }

    /// Whether the artifact pair for this key is already complete on disk.
    pub fn is_cached(&self, region_id: &str, key: &SourceKey, variable: RenderVariable) -> bool {
        self.tile_path(region_id, key, variable).exists()
            && self.sidecar_path(region_id, key, variable).exists()
    }

    /// Whether this key must go through the render path at all.
    pub fn needs_render(&self, region_id: &str, key: &SourceKey, variable: RenderVariable) -> bool {
        self.force_rewrite || !self.is_cached(region_id, key, variable)
    }

    /// Persist a tile and its stats sidecar.
    ///
    /// Both are written to temporary names and renamed into place, sidecar
    /// first: a reader can never observe a tile without a matching
    /// sidecar, or a half-written artifact under the final name.
    pub fn write_tile(
        &self,
        region_id: &str,
        key: &SourceKey,
        variable: RenderVariable,
        png: &[u8],
        stats: TileStats,
        unit: &str,
    ) -> TileResult<()> {
        let sidecar = StatsSidecar {
            minimum: stats.minimum,
            maximum: stats.maximum,
            unit: unit.to_string(),
        };
        let sidecar_bytes = serde_json::to_vec(&sidecar)
            .map_err(|e| TileError::Write(format!("sidecar encode: {e}")))?;

        self.write_atomic(&self.sidecar_path(region_id, key, variable), &sidecar_bytes)?;
        self.write_atomic(&self.tile_path(region_id, key, variable), png)?;
        Ok(())
    }

    /// Persist a legend image and its levels/unit sidecar for a variable.
    pub fn write_legend(
        &self,
        variable: RenderVariable,
        png: &[u8],
        spec: &RenderSpec,
    ) -> TileResult<()> {
        let entries = serde_json::json!({
            "levels": spec.levels,
            "unit": spec.unit,
        });

        self.write_atomic(
            &self.out_dir.join(format!("legend_{}.json", variable.id())),
            entries.to_string().as_bytes(),
        )?;
        self.write_atomic(
            &self.out_dir.join(format!("legend_{}.png", variable.id())),
            png,
        )?;
        Ok(())
    }

    fn write_atomic(&self, final_path: &Path, bytes: &[u8]) -> TileResult<()> {
        let file_name = final_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TileError::Write(format!("bad artifact path {}", final_path.display())))?;
        let tmp_path = self
            .out_dir
            .join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

        fs::write(&tmp_path, bytes)
            .map_err(|e| TileError::Write(format!("{}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, final_path).map_err(|e| {
            // Leave no temp file behind on a failed rename.
            let _ = fs::remove_file(&tmp_path);
            TileError::Write(format!("rename to {}: {e}", final_path.display()))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key() -> SourceKey {
        SourceKey::new(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(), 0, 6)
    }

    #[test]
    fn test_tile_name_grammar() {
        let stem = tile_stem("conus", &key(), RenderVariable::Temperature2m);
        assert_eq!(stem, "aigfs_conus_20260103_00_006_t2m");
        // The catalog splits on `_` into exactly six tokens.
        assert_eq!(stem.split('_').count(), 6);
    }

    #[test]
    fn test_write_then_cached() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TileWriter::new(dir.path(), false).unwrap();
        let var = RenderVariable::Mslp;

        assert!(writer.needs_render("conus", &key(), var));

        let stats = TileStats {
            minimum: 1001.5,
            maximum: 1022.0,
        };
        writer
            .write_tile("conus", &key(), var, b"\x89PNGstub", stats, "hPa")
            .unwrap();

        assert!(writer.is_cached("conus", &key(), var));
        assert!(!writer.needs_render("conus", &key(), var));

        let sidecar: StatsSidecar = serde_json::from_slice(
            &fs::read(writer.sidecar_path("conus", &key(), var)).unwrap(),
        )
        .unwrap();
        assert_eq!(sidecar.unit, "hPa");
        assert!((sidecar.minimum - 1001.5).abs() < 1e-6);

        // No temporary files left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_force_rewrite_ignores_cache() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TileWriter::new(dir.path(), true).unwrap();
        let var = RenderVariable::Precip;

        let stats = TileStats {
            minimum: 0.0,
            maximum: 4.2,
        };
        writer
            .write_tile("utah", &key(), var, b"png", stats, "mm")
            .unwrap();
        assert!(writer.is_cached("utah", &key(), var));
        assert!(writer.needs_render("utah", &key(), var));
    }

    #[test]
    fn test_legend_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TileWriter::new(dir.path(), false).unwrap();
        let spec = raster::render_spec(RenderVariable::Precip);

        writer
            .write_legend(RenderVariable::Precip, b"png", spec)
            .unwrap();

        assert!(dir.path().join("legend_precip.png").exists());
        let entries: serde_json::Value = serde_json::from_slice(
            &fs::read(dir.path().join("legend_precip.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(entries["unit"], "mm");
        assert_eq!(entries["levels"].as_array().unwrap().len(), spec.levels.len());
    }
}
