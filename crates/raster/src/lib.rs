//! Raster rendering for gridded forecast data.
//!
//! Turns a resampled value array into a quantized, indexed-color RGBA
//! raster and encodes it as PNG. Also renders the standalone per-variable
//! legend colorbars.

pub mod color;
pub mod legend;
pub mod png;
pub mod quantize;
pub mod variables;

pub use color::Color;
pub use quantize::{quantize, QuantizedRaster, TileStats};
pub use variables::{render_spec, Masking, RenderSpec, UnitTransform};
