//! Standalone colorbar legends.
//!
//! One horizontal colorbar per variable, rendered from its render spec
//! alone: a band of bucket colors with tick marks at the boundary levels.
//! The numeric level values and unit label ship in the legend's JSON
//! sidecar for the catalog frontend to typeset.

use crate::png::create_png_indexed;
use crate::variables::RenderSpec;

/// Width of one color bucket in pixels.
const BUCKET_WIDTH: usize = 18;
/// Total legend height: color band plus the tick strip below it.
const LEGEND_HEIGHT: usize = 28;
/// Rows occupied by the color band.
const BAND_HEIGHT: usize = 20;

const TICK_COLOR: (u8, u8, u8, u8) = (64, 64, 64, 255);

/// Render the colorbar for a render spec as an indexed PNG.
///
/// The band shows every bucket at full opacity, including buckets the
/// masking policy would hide on tiles, so the whole ramp stays legible.
pub fn render_legend(spec: &RenderSpec) -> Result<Vec<u8>, String> {
    let buckets = spec.ramp.len();
    let width = buckets * BUCKET_WIDTH;
    let height = LEGEND_HEIGHT;

    // Palette: transparent background, opaque bucket colors, tick color.
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(buckets + 2);
    palette.push((0, 0, 0, 0));
    palette.extend(spec.ramp.iter().map(|c| c.with_alpha(255)));
    palette.push(TICK_COLOR);
    let tick_index = (buckets + 1) as u8;

    let mut indices = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let bucket = x / BUCKET_WIDTH;
            let index = if y < BAND_HEIGHT {
                (1 + bucket) as u8
            } else if x % BUCKET_WIDTH == 0 && x > 0 {
                // Boundary between bucket k-1 and k sits at spec.levels[k-1].
                tick_index
            } else {
                0
            };
            indices[y * width + x] = index;
        }
    }

    create_png_indexed(width, height, &palette, &indices)
}
