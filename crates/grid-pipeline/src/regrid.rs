//! Regional cropping and bilinear regridding.
//!
//! Takes a normalized field, crops it to a region's bounding box with a
//! padding margin, and resamples onto the region's fixed-resolution output
//! raster. Sampling happens at pixel centers, row 0 at the northern edge.
//! Pixel centers outside the field's coordinate range stay NaN — values are
//! interpolated, never extrapolated.

use tiles_common::RegionSpec;

use crate::field::ScalarField;

/// Extra samples kept on each side of the crop so every in-range pixel has
/// its four interpolation neighbors.
const CROP_MARGIN: usize = 2;

/// A field resampled onto a region's output raster, row-major from the
/// north-west corner.
#[derive(Debug, Clone)]
pub struct ResampledGrid {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

/// Crop `field` to `region` and resample onto the region's pixel grid.
///
/// Returns `None` when the region's bounding box does not intersect the
/// field's coordinate range at all — callers skip tile generation for that
/// (region, variable) pair without treating it as an error.
pub fn crop_and_resample(field: &ScalarField, region: &RegionSpec) -> Option<ResampledGrid> {
    let bounds = region.bounds;
    if !bounds.intersects(&field.bounds()) {
        tracing::debug!(
            region = %region.id,
            field_bounds = ?field.bounds(),
            "region outside field coverage, no tile"
        );
        return None;
    }

    // Crop to the bounding box plus margin. partition_point on the sorted
    // axes finds the in-box index range; the margin widens it.
    let i0 = field
        .lons
        .partition_point(|&lon| lon < bounds.west)
        .saturating_sub(CROP_MARGIN);
    let i1 = (field.lons.partition_point(|&lon| lon <= bounds.east) + CROP_MARGIN)
        .min(field.nlon());
    let j0 = field
        .lats
        .partition_point(|&lat| lat < bounds.south)
        .saturating_sub(CROP_MARGIN);
    let j1 = (field.lats.partition_point(|&lat| lat <= bounds.north) + CROP_MARGIN)
        .min(field.nlat());

    if i0 >= i1 || j0 >= j1 {
        return None;
    }

    let lons = &field.lons[i0..i1];
    let lats = &field.lats[j0..j1];

    let width = region.tile_width;
    let height = region.tile_height;
    let mut values = vec![f32::NAN; width * height];

    for out_y in 0..height {
        // Pixel center, top row at the northern edge.
        let lat = bounds.north - (out_y as f64 + 0.5) * bounds.height() / height as f64;
        let Some((j_lo, j_hi, ty)) = bracket(lats, lat) else {
            continue;
        };

        for out_x in 0..width {
            let lon = bounds.west + (out_x as f64 + 0.5) * bounds.width() / width as f64;
            let Some((i_lo, i_hi, tx)) = bracket(lons, lon) else {
                continue;
            };

            let v00 = field.value(j0 + j_lo, i0 + i_lo);
            let v01 = field.value(j0 + j_lo, i0 + i_hi);
            let v10 = field.value(j0 + j_hi, i0 + i_lo);
            let v11 = field.value(j0 + j_hi, i0 + i_hi);

            let tx = tx as f32;
            let ty = ty as f32;
            let south_edge = v00 * (1.0 - tx) + v01 * tx;
            let north_edge = v10 * (1.0 - tx) + v11 * tx;
            // NaN in any corner propagates, leaving the pixel transparent.
            values[out_y * width + out_x] = south_edge * (1.0 - ty) + north_edge * ty;
        }
    }

    Some(ResampledGrid {
        width,
        height,
        values,
    })
}

/// Find the two axis samples bracketing `coord` and the interpolation
/// fraction between them. `None` when `coord` lies outside the axis range.
fn bracket(axis: &[f64], coord: f64) -> Option<(usize, usize, f64)> {
    let last = *axis.last()?;
    if coord < axis[0] || coord > last {
        return None;
    }

    let k = axis.partition_point(|&v| v <= coord);
    let hi = k.min(axis.len() - 1);
    let lo = hi.saturating_sub(1);
    let t = if hi > lo {
        (coord - axis[lo]) / (axis[hi] - axis[lo])
    } else {
        0.0
    };
    Some((lo, hi, t))
}
