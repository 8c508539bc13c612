//! Named output regions.

use serde::{Deserialize, Serialize};

use crate::bounds::LatLonBounds;

/// A named geographic window that tiles are produced for.
///
/// Static configuration: built once at startup and immutable for the
/// process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Region identifier, used as a filename token. Must not contain the
    /// `_` delimiter the catalog splits on.
    pub id: String,

    /// Geographic window covered by this region's tiles.
    pub bounds: LatLonBounds,

    /// Maximum lead time (hours, inclusive) for which tiles are produced.
    pub max_lead_hours: u32,

    /// Output raster width in pixels.
    #[serde(default = "default_tile_width")]
    pub tile_width: usize,

    /// Output raster height in pixels.
    #[serde(default = "default_tile_height")]
    pub tile_height: usize,
}

fn default_tile_width() -> usize {
    720
}

fn default_tile_height() -> usize {
    480
}

impl RegionSpec {
    /// Whether tiles are produced for this lead time at all.
    pub fn admits_lead(&self, lead_hours: u32) -> bool {
        lead_hours <= self.max_lead_hours
    }
}

/// Default region table used when no configuration file overrides it.
pub fn builtin_regions() -> Vec<RegionSpec> {
    vec![
        RegionSpec {
            id: "conus".to_string(),
            bounds: LatLonBounds::new(-130.0, 20.0, -60.0, 55.0),
            max_lead_hours: 384,
            tile_width: 1000,
            tile_height: 500,
        },
        RegionSpec {
            id: "utah".to_string(),
            bounds: LatLonBounds::new(-114.5, 36.5, -108.5, 42.5),
            max_lead_hours: 240,
            tile_width: 600,
            tile_height: 600,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_time_horizon_is_inclusive() {
        let region = &builtin_regions()[1];
        assert!(region.admits_lead(0));
        assert!(region.admits_lead(240));
        assert!(!region.admits_lead(246));
    }

    #[test]
    fn test_builtin_ids_are_delimiter_safe() {
        for region in builtin_regions() {
            assert!(!region.id.contains('_'), "region id {}", region.id);
        }
    }
}
