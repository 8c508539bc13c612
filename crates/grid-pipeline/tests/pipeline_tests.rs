//! End-to-end tests for normalize + crop/regrid on model-shaped grids.

use grid_pipeline::{crop_and_resample, normalize};
use test_utils::generators::{axis, field_from_fn, global_quarter_degree};
use tiles_common::{LatLonBounds, RegionSpec};

fn region(id: &str, bounds: LatLonBounds, width: usize, height: usize) -> RegionSpec {
    RegionSpec {
        id: id.to_string(),
        bounds,
        max_lead_hours: 384,
        tile_width: width,
        tile_height: height,
    }
}

#[test]
fn normalized_global_grid_covers_western_hemisphere_region() {
    // Raw model grid: lon 0..360, lat descending. Encode the raw longitude
    // in the values so the wrap is observable after normalization.
    let field = global_quarter_degree(|lon, _lat| lon as f32);
    let field = normalize(field).expect("global grid normalizes");

    assert!(field.lons.first().copied().unwrap() >= -180.0);
    assert!(field.lons.last().copied().unwrap() < 180.0);
    assert!(field.lats.windows(2).all(|w| w[0] < w[1]));

    // Utah sits entirely in raw-longitude territory 245.5..251.5.
    let utah = region("utah", LatLonBounds::new(-114.5, 36.5, -108.5, 42.5), 60, 60);
    let grid = crop_and_resample(&field, &utah).expect("region covered");

    for (i, &v) in grid.values.iter().enumerate() {
        assert!(v.is_finite(), "pixel {i} not covered");
        assert!(
            (245.5..251.5).contains(&(v as f64)),
            "pixel {i} carries raw lon {v}"
        );
    }
}

#[test]
fn latitude_rows_run_north_to_south() {
    let field = global_quarter_degree(|_lon, lat| lat as f32);
    let field = normalize(field).unwrap();

    let conus = region("conus", LatLonBounds::new(-130.0, 20.0, -60.0, 55.0), 100, 50);
    let grid = crop_and_resample(&field, &conus).unwrap();

    let top = grid.values[0];
    let bottom = grid.values[(grid.height - 1) * grid.width];
    assert!(top > bottom, "row 0 should be the northern edge");
    assert!((top - 55.0).abs() < 1.0);
    assert!((bottom - 20.0).abs() < 1.0);
}

#[test]
fn region_beyond_regional_grid_produces_no_tile() {
    // A regional (non-global) grid around Europe; a CONUS request misses it
    // entirely and must yield no data rather than an error.
    let field = field_from_fn(axis(35.0, 0.5, 20), axis(0.0, 0.5, 30), |_, _| 1.0);
    let field = normalize(field).unwrap();

    let conus = region("conus", LatLonBounds::new(-130.0, 20.0, -60.0, 55.0), 64, 32);
    assert!(crop_and_resample(&field, &conus).is_none());
}
