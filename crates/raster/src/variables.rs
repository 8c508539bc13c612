//! The variable render registry.
//!
//! One static `RenderSpec` per renderable variable: unit transform,
//! quantization boundary levels, color ramp, masking policy, display unit.
//! The set is closed and the table exhaustively matchable; there is no
//! runtime colormap authoring.

use tiles_common::RenderVariable;

use crate::color::Color;

/// Unit transformation for converting raw decoded values to display values.
/// Supports subtraction (K→C), division (Pa→hPa), and linear (scale + offset).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitTransform {
    /// No transformation
    None,
    /// Subtract a value (e.g., K→C: subtract 273.15)
    Subtract(f32),
    /// Divide by a value (e.g., Pa→hPa: divide by 100)
    Divide(f32),
    /// Linear transform: value * scale + offset (e.g., K→°F)
    Linear { scale: f32, offset: f32 },
}

impl UnitTransform {
    /// Apply the transformation to a value.
    pub fn apply(&self, value: f32) -> f32 {
        match self {
            Self::None => value,
            Self::Subtract(offset) => value - offset,
            Self::Divide(divisor) => value / divisor,
            Self::Linear { scale, offset } => value * scale + offset,
        }
    }
}

/// Per-variable alpha policy, applied at quantization time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Masking {
    /// Full opacity for every data pixel.
    Opaque,
    /// Pixels whose converted value falls below the threshold are fully
    /// transparent; at or above it, full bucket opacity. Used for
    /// accumulation-type variables so the empty background drops out.
    SuppressBelow(f32),
    /// A constant translucency on every data pixel, for continuous fields
    /// drawn over a basemap.
    UniformAlpha(u8),
}

/// Render rules for one variable.
///
/// `ramp` always holds `levels.len() + 1` colors: values below the lowest
/// boundary take the first color and values at or above the highest take
/// the last (extend both ends).
#[derive(Debug)]
pub struct RenderSpec {
    pub transform: UnitTransform,
    pub levels: &'static [f32],
    pub ramp: &'static [Color],
    pub masking: Masking,
    pub unit: &'static str,
}

/// The alpha used for translucent overlay variables.
const OVERLAY_ALPHA: u8 = 216;

static T2M_LEVELS: [f32; 20] = [
    -30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 26.0, 32.0, 38.0, 44.0, 50.0, 56.0, 62.0, 68.0, 74.0,
    80.0, 86.0, 92.0, 98.0, 104.0,
];

static T2M_RAMP: [Color; 21] = [
    Color::new(75, 0, 130),
    Color::new(102, 0, 214),
    Color::new(0, 51, 255),
    Color::new(0, 128, 255),
    Color::new(0, 191, 255),
    Color::new(0, 255, 255),
    Color::new(0, 255, 191),
    Color::new(0, 255, 128),
    Color::new(0, 255, 0),
    Color::new(128, 255, 0),
    Color::new(191, 255, 0),
    Color::new(255, 255, 0),
    Color::new(255, 220, 0),
    Color::new(255, 191, 0),
    Color::new(255, 128, 0),
    Color::new(255, 64, 0),
    Color::new(255, 0, 0),
    Color::new(214, 0, 0),
    Color::new(178, 0, 0),
    Color::new(139, 0, 0),
    Color::new(100, 0, 0),
];

static WIND_LEVELS: [f32; 10] = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 75.0];

static WIND_RAMP: [Color; 11] = [
    Color::new(200, 200, 200),
    Color::new(160, 200, 220),
    Color::new(0, 200, 255),
    Color::new(0, 255, 200),
    Color::new(0, 255, 0),
    Color::new(255, 255, 0),
    Color::new(255, 191, 0),
    Color::new(255, 128, 0),
    Color::new(255, 64, 0),
    Color::new(214, 0, 0),
    Color::new(139, 0, 0),
];

static PRMSL_LEVELS: [f32; 11] = [
    960.0, 968.0, 976.0, 984.0, 992.0, 1000.0, 1008.0, 1016.0, 1024.0, 1032.0, 1040.0,
];

static PRMSL_RAMP: [Color; 12] = [
    Color::new(75, 0, 130),
    Color::new(87, 0, 174),
    Color::new(0, 0, 255),
    Color::new(0, 128, 255),
    Color::new(0, 200, 255),
    Color::new(0, 255, 128),
    Color::new(0, 255, 0),
    Color::new(128, 255, 0),
    Color::new(255, 255, 0),
    Color::new(255, 165, 0),
    Color::new(255, 0, 0),
    Color::new(139, 0, 0),
];

static PRECIP_LEVELS: [f32; 10] = [0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 20.0, 30.0, 50.0];

static PRECIP_RAMP: [Color; 11] = [
    Color::new(228, 228, 228),
    Color::new(180, 215, 230),
    Color::new(120, 190, 235),
    Color::new(60, 150, 240),
    Color::new(0, 100, 245),
    Color::new(0, 200, 100),
    Color::new(255, 255, 0),
    Color::new(255, 165, 0),
    Color::new(255, 60, 0),
    Color::new(200, 0, 0),
    Color::new(140, 0, 60),
];

static TEMPERATURE_2M: RenderSpec = RenderSpec {
    transform: UnitTransform::Linear {
        scale: 1.8,
        offset: -459.67,
    },
    levels: &T2M_LEVELS,
    ramp: &T2M_RAMP,
    masking: Masking::UniformAlpha(OVERLAY_ALPHA),
    unit: "°F",
};

static WIND_SPEED_10M: RenderSpec = RenderSpec {
    transform: UnitTransform::Linear {
        scale: 2.236_936,
        offset: 0.0,
    },
    levels: &WIND_LEVELS,
    ramp: &WIND_RAMP,
    masking: Masking::UniformAlpha(OVERLAY_ALPHA),
    unit: "mph",
};

static MSLP: RenderSpec = RenderSpec {
    transform: UnitTransform::Divide(100.0),
    levels: &PRMSL_LEVELS,
    ramp: &PRMSL_RAMP,
    masking: Masking::UniformAlpha(OVERLAY_ALPHA),
    unit: "hPa",
};

// Accumulated precipitation is treated as an opaque, already-accumulated
// quantity in mm at decode time.
static PRECIP: RenderSpec = RenderSpec {
    transform: UnitTransform::None,
    levels: &PRECIP_LEVELS,
    ramp: &PRECIP_RAMP,
    masking: Masking::SuppressBelow(0.1),
    unit: "mm",
};

/// Look up the render rules for a variable.
pub fn render_spec(variable: RenderVariable) -> &'static RenderSpec {
    match variable {
        RenderVariable::Temperature2m => &TEMPERATURE_2M,
        RenderVariable::WindSpeed10m => &WIND_SPEED_10M,
        RenderVariable::Mslp => &MSLP,
        RenderVariable::Precip => &PRECIP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_transform_apply() {
        assert_eq!(UnitTransform::None.apply(5.0), 5.0);
        assert!((UnitTransform::Subtract(273.15).apply(273.15)).abs() < 1e-4);
        assert!((UnitTransform::Divide(100.0).apply(101_325.0) - 1013.25).abs() < 1e-3);
    }

    #[test]
    fn test_kelvin_to_fahrenheit() {
        let spec = render_spec(RenderVariable::Temperature2m);
        assert!((spec.transform.apply(270.0) - 26.33).abs() < 0.01);
        assert!((spec.transform.apply(290.0) - 62.33).abs() < 0.01);
        assert!((spec.transform.apply(273.15) - 32.0).abs() < 0.01);
    }

    #[test]
    fn test_ramps_extend_both_ends() {
        for var in RenderVariable::ALL {
            let spec = render_spec(var);
            assert_eq!(
                spec.ramp.len(),
                spec.levels.len() + 1,
                "ramp/levels mismatch for {}",
                var.id()
            );
            assert!(
                spec.levels.windows(2).all(|w| w[0] < w[1]),
                "levels not ascending for {}",
                var.id()
            );
        }
    }
}
