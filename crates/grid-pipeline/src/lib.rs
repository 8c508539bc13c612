//! Grid processing for decoded model fields.
//!
//! Stages, in pipeline order:
//! - coordinate normalization (longitude domain + axis ordering)
//! - composite derivation (fields computed from other fields)
//! - regional crop + bilinear regrid onto a fixed output raster

pub mod composite;
pub mod field;
pub mod normalize;
pub mod regrid;

pub use field::ScalarField;
pub use normalize::normalize;
pub use regrid::{crop_and_resample, ResampledGrid};
