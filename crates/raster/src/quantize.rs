//! Boundary-bucket quantization of resampled values to palette indices.
//!
//! Rendering goes straight to palette indices (1 byte/pixel) with the
//! palette computed once from the variable's render spec; the PNG encoder
//! consumes both without ever materializing an RGBA buffer. Palette entry 0
//! is reserved for transparent pixels (NaN samples and masked values).

use rayon::prelude::*;

use crate::variables::{Masking, RenderSpec};

/// Minimum samples to benefit from parallel quantization.
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Scalar summary of a rendered tile, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStats {
    pub minimum: f32,
    pub maximum: f32,
}

/// A quantized raster: per-pixel palette indices plus the RGBA palette.
#[derive(Debug, Clone)]
pub struct QuantizedRaster {
    /// Palette index per pixel, row-major.
    pub indices: Vec<u8>,
    /// RGBA palette; entry 0 is fully transparent.
    pub palette: Vec<(u8, u8, u8, u8)>,
    /// Min/max of the converted, pre-quantization values, NaN excluded.
    pub stats: TileStats,
}

/// The color bucket a converted value falls in: the number of boundary
/// levels at or below it. Values below the lowest boundary map to bucket 0
/// and values at or above the highest to the last bucket (extend both ends).
#[inline]
pub fn bucket_of(levels: &[f32], value: f32) -> usize {
    levels.partition_point(|&level| level <= value)
}

/// Build the RGBA palette for a render spec: transparent entry 0 followed
/// by the ramp colors with the masking policy's alpha applied.
pub fn palette_for(spec: &RenderSpec) -> Vec<(u8, u8, u8, u8)> {
    let alpha = match spec.masking {
        Masking::Opaque | Masking::SuppressBelow(_) => 255,
        Masking::UniformAlpha(a) => a,
    };

    let mut palette = Vec::with_capacity(spec.ramp.len() + 1);
    palette.push((0, 0, 0, 0));
    palette.extend(spec.ramp.iter().map(|c| c.with_alpha(alpha)));
    palette
}

/// Unit-convert and quantize a resampled value array.
///
/// Stats are computed on the converted array before quantization, excluding
/// NaN; if every sample is NaN, min = max = 0 and every pixel is
/// transparent (the tile is still written).
pub fn quantize(values: &[f32], spec: &RenderSpec) -> QuantizedRaster {
    let index_of = |value: f32| -> u8 {
        let converted = spec.transform.apply(value);
        if converted.is_nan() {
            return 0;
        }
        if let Masking::SuppressBelow(threshold) = spec.masking {
            if converted < threshold {
                return 0;
            }
        }
        (1 + bucket_of(spec.levels, converted)) as u8
    };

    let indices: Vec<u8> = if values.len() >= PARALLEL_THRESHOLD {
        values.par_iter().map(|&v| index_of(v)).collect()
    } else {
        values.iter().map(|&v| index_of(v)).collect()
    };

    let (minimum, maximum) = values
        .iter()
        .map(|&v| spec.transform.apply(v))
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let stats = if minimum.is_finite() {
        TileStats { minimum, maximum }
    } else {
        TileStats {
            minimum: 0.0,
            maximum: 0.0,
        }
    };

    QuantizedRaster {
        indices,
        palette: palette_for(spec),
        stats,
    }
}
