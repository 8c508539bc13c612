//! Per-file processing.
//!
//! A worker owns one source file end-to-end: decode the primitives the
//! pending tiles need, normalize, derive composites, then crop/render/write
//! every (region × variable) pair that is not already cached. Failures are
//! isolated per variable and per tile; only write errors propagate.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use grid_pipeline::{composite, crop_and_resample, normalize, ScalarField};
use raster::png::create_png_indexed;
use raster::{quantize, render_spec};
use tiles_common::variable::FieldSource;
use tiles_common::{Primitive, RegionSpec, RenderVariable, SourceKey, TileError, TileResult};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TilerConfig;
use crate::decode::{DecodeError, FieldDecoder};
use crate::output::TileWriter;
use crate::scratch::ScratchIndex;

/// What happened to one (region, variable) tile key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    /// Rendered and persisted.
    Written,
    /// Nothing to do: cached, variable absent, or region not covered.
    Skipped,
    /// A recoverable failure (decode, degenerate grid) ate this tile.
    Failed,
}

/// Aggregated outcomes for one source file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FileReport {
    fn record(&mut self, outcome: TileOutcome) {
        match outcome {
            TileOutcome::Written => self.written += 1,
            TileOutcome::Skipped => self.skipped += 1,
            TileOutcome::Failed => self.failed += 1,
        }
    }
}

/// Process one source file: every eligible (region × variable) tile that
/// is not already cached.
///
/// Returns `Err` only for infrastructure failures (artifact writes); every
/// per-variable and per-tile failure is absorbed into the report.
pub fn process_file<D: FieldDecoder + ?Sized>(
    config: &TilerConfig,
    decoder: &D,
    writer: &TileWriter,
    path: &Path,
    key: SourceKey,
) -> TileResult<FileReport> {
    let mut report = FileReport::default();

    // Build the pending work list up front; a fully cached file never
    // touches the decoder.
    let mut pending: Vec<(&RegionSpec, RenderVariable)> = Vec::new();
    for region in &config.regions {
        if !region.admits_lead(key.lead_hours) {
            continue;
        }
        for variable in RenderVariable::ALL {
            if writer.needs_render(&region.id, &key, variable) {
                pending.push((region, variable));
            } else {
                report.record(TileOutcome::Skipped);
            }
        }
    }

    if pending.is_empty() {
        debug!(file = %path.display(), "all tiles cached, skipping file");
        return Ok(report);
    }

    let task_id = Uuid::new_v4();
    info!(
        file = %path.display(),
        task = %task_id.simple(),
        pending = pending.len(),
        "processing source file"
    );

    // Decode each primitive any pending tile depends on, behind a scoped
    // scratch index unique to this (file, variable, task).
    let needed: HashSet<Primitive> = pending
        .iter()
        .flat_map(|(_, variable)| variable.required_primitives())
        .collect();

    let mut fields: HashMap<Primitive, ScalarField> = HashMap::new();
    let mut failed_sources: HashSet<&'static str> = HashSet::new();

    for primitive in needed {
        let scratch = ScratchIndex::create(path, primitive.id(), task_id);
        let decoded = decoder.decode(path, &primitive.filter(), scratch.path());
        drop(scratch);

        match decoded {
            Ok(raw) => match normalize(raw) {
                Ok(field) => {
                    fields.insert(primitive, field);
                }
                Err(e) => {
                    warn!(file = %path.display(), variable = primitive.id(), error = %e, "field rejected");
                    failed_sources.insert(primitive.id());
                }
            },
            Err(DecodeError::VariableNotFound) => {
                debug!(file = %path.display(), variable = primitive.id(), "variable not in file");
            }
            Err(e) => {
                warn!(file = %path.display(), variable = primitive.id(), error = %e, "decode failed");
                failed_sources.insert(primitive.id());
            }
        }
    }

    // Derive the composites now that every constituent has either loaded
    // or been confirmed absent.
    let mut composites: HashMap<tiles_common::Composite, ScalarField> = HashMap::new();
    let wanted: HashSet<tiles_common::Composite> = pending
        .iter()
        .filter_map(|(_, variable)| match variable.source() {
            FieldSource::Composite(c) => Some(c),
            FieldSource::Primitive(_) => None,
        })
        .collect();
    for comp in wanted {
        match composite::derive(comp, &fields) {
            Some(Ok(field)) => {
                composites.insert(comp, field);
            }
            Some(Err(e)) => {
                warn!(file = %path.display(), composite = comp.id(), error = %e, "composite rejected");
                failed_sources.insert(comp.id());
            }
            None => {} // constituent absent: dependent tiles skip silently
        }
    }

    // Render each pending (region, variable) pair.
    for (region, variable) in pending {
        let field = match variable.source() {
            FieldSource::Primitive(p) => fields.get(&p),
            FieldSource::Composite(c) => composites.get(&c),
        };

        let Some(field) = field else {
            let outcome = if source_failed(variable, &failed_sources) {
                TileOutcome::Failed
            } else {
                TileOutcome::Skipped
            };
            report.record(outcome);
            continue;
        };

        let Some(resampled) = crop_and_resample(field, region) else {
            report.record(TileOutcome::Skipped);
            continue;
        };

        let spec = render_spec(variable);
        let raster = quantize(&resampled.values, spec);
        let png = create_png_indexed(
            resampled.width,
            resampled.height,
            &raster.palette,
            &raster.indices,
        )
        .map_err(TileError::Write)?;

        writer.write_tile(&region.id, &key, variable, &png, raster.stats, spec.unit)?;
        report.record(TileOutcome::Written);
    }

    info!(
        file = %path.display(),
        written = report.written,
        skipped = report.skipped,
        failed = report.failed,
        "source file done"
    );

    Ok(report)
}

/// Whether a missing field traces back to a recorded failure rather than a
/// benignly absent variable.
fn source_failed(variable: RenderVariable, failed_sources: &HashSet<&'static str>) -> bool {
    match variable.source() {
        FieldSource::Primitive(p) => failed_sources.contains(p.id()),
        FieldSource::Composite(c) => {
            failed_sources.contains(c.id())
                || c.constituents()
                    .iter()
                    .any(|p| failed_sources.contains(p.id()))
        }
    }
}
