//! The external decoder boundary.
//!
//! The pipeline consumes decoding through [`FieldDecoder`]; everything
//! behind it (the GRIB2 container format, packing schemes, code tables) is
//! someone else's problem. [`Grib2Decoder`] adapts the `grib` crate to the
//! trait for the fixed AIGFS surface grid.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use grid_pipeline::ScalarField;
use thiserror::Error;
use tiles_common::FieldFilter;

/// Errors from one decode call, matching how callers treat them.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The filter matched nothing in this file. Expected and benign; the
    /// dependent renders are skipped silently.
    #[error("no message matches the variable filter")]
    VariableNotFound,

    /// The source is unreadable or corrupt. Logged; the variable is
    /// skipped and the rest of the file continues.
    #[error("source unreadable: {0}")]
    Read(String),
}

/// Decodes one physical variable out of a multi-message source file.
pub trait FieldDecoder: Send + Sync {
    /// Decode the message selected by `filter` from the file at `path`.
    ///
    /// `scratch_index` is a caller-owned path reserved for this call's
    /// scratch state. It is unique per (file, variable, task), so
    /// concurrent decodes against the same source file never touch each
    /// other's scratch; the caller removes it when the decode call ends.
    fn decode(
        &self,
        path: &Path,
        filter: &FieldFilter,
        scratch_index: &Path,
    ) -> Result<ScalarField, DecodeError>;
}

/// The regular lat/lon grid a model writes its surface fields on.
#[derive(Debug, Clone, Copy)]
pub struct ModelGrid {
    pub nlon: usize,
    pub nlat: usize,
    pub first_lon: f64,
    pub first_lat: f64,
    pub dlon: f64,
    pub dlat: f64,
}

impl ModelGrid {
    /// AIGFS 0.25° global grid: lon 0..360 east, lat 90..-90 north to
    /// south, 1440x721 points.
    pub fn aigfs_0p25() -> Self {
        Self {
            nlon: 1440,
            nlat: 721,
            first_lon: 0.0,
            first_lat: 90.0,
            dlon: 0.25,
            dlat: -0.25,
        }
    }

    fn lons(&self) -> Vec<f64> {
        (0..self.nlon)
            .map(|i| self.first_lon + i as f64 * self.dlon)
            .collect()
    }

    fn lats(&self) -> Vec<f64> {
        (0..self.nlat)
            .map(|j| self.first_lat + j as f64 * self.dlat)
            .collect()
    }
}

/// GRIB2 decoder backed by the `grib` crate.
pub struct Grib2Decoder {
    grid: ModelGrid,
}

impl Grib2Decoder {
    pub fn new() -> Self {
        Self {
            grid: ModelGrid::aigfs_0p25(),
        }
    }
}

impl Default for Grib2Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldDecoder for Grib2Decoder {
    fn decode(
        &self,
        path: &Path,
        filter: &FieldFilter,
        scratch_index: &Path,
    ) -> Result<ScalarField, DecodeError> {
        let file = File::open(path).map_err(|e| DecodeError::Read(e.to_string()))?;
        let reader = BufReader::new(file);
        let grib2 =
            grib::from_reader(reader).map_err(|e| DecodeError::Read(format!("{e:?}")))?;

        let mut scanned = 0usize;
        let mut matched = None;
        for (_index, submessage) in grib2.iter() {
            scanned += 1;

            if submessage.indicator().discipline != filter.discipline {
                continue;
            }
            let prod_def = submessage.prod_def();
            if prod_def.parameter_category() != Some(filter.category)
                || prod_def.parameter_number() != Some(filter.number)
            {
                continue;
            }
            let surface_matches = match prod_def.fixed_surfaces() {
                Some((first, _second)) => {
                    first.surface_type == filter.surface_type
                        && filter
                            .surface_value
                            .map_or(true, |want| (first.value() - want).abs() < 1e-6)
                }
                None => false,
            };
            if !surface_matches {
                continue;
            }

            matched = Some(submessage);
            break;
        }

        write_scratch_index(scratch_index, path, filter, scanned, matched.is_some());

        let submessage = matched.ok_or(DecodeError::VariableNotFound)?;

        let decoder = grib::Grib2SubmessageDecoder::from(submessage)
            .map_err(|e| DecodeError::Read(format!("{e:?}")))?;
        let values: Vec<f32> = decoder
            .dispatch()
            .map_err(|e| DecodeError::Read(format!("{e:?}")))?
            .collect();

        if values.len() != self.grid.nlon * self.grid.nlat {
            return Err(DecodeError::Read(format!(
                "decoded {} values, expected {}x{} grid",
                values.len(),
                self.grid.nlat,
                self.grid.nlon
            )));
        }

        ScalarField::new(self.grid.lats(), self.grid.lons(), values)
            .map_err(|e| DecodeError::Read(e.to_string()))
    }
}

/// Record what this decode call scanned into its scratch index. The file
/// is scratch state scoped to the call; failures to write it only cost a
/// cold rescan, so they are logged and swallowed.
fn write_scratch_index(
    scratch_index: &Path,
    source: &Path,
    filter: &FieldFilter,
    messages_scanned: usize,
    matched: bool,
) {
    let index = serde_json::json!({
        "source": source.display().to_string(),
        "parameter": [filter.discipline, filter.category, filter.number],
        "surface": [filter.surface_type, filter.surface_value],
        "messages_scanned": messages_scanned,
        "matched": matched,
    });
    if let Err(e) = std::fs::write(scratch_index, index.to_string()) {
        tracing::debug!(path = %scratch_index.display(), error = %e, "scratch index write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aigfs_grid_axes() {
        let grid = ModelGrid::aigfs_0p25();
        let lons = grid.lons();
        let lats = grid.lats();

        assert_eq!(lons.len(), 1440);
        assert_eq!(lats.len(), 721);
        assert_eq!(lons[0], 0.0);
        assert!((lons[1439] - 359.75).abs() < 1e-9);
        assert_eq!(lats[0], 90.0);
        assert_eq!(lats[720], -90.0);
    }

    #[test]
    fn test_unreadable_source_is_read_error() {
        let decoder = Grib2Decoder::new();
        let filter = tiles_common::Primitive::Temperature2m.filter();
        let scratch = std::env::temp_dir().join("tiler-test-missing.idx");

        let result = decoder.decode(Path::new("/nonexistent/aigfs.grib2"), &filter, &scratch);
        assert!(matches!(result, Err(DecodeError::Read(_))));
    }
}
