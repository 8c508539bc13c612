//! Coordinate normalization for decoded fields.
//!
//! Model output commonly arrives with longitudes in [0, 360) and latitudes
//! descending from the pole. Downstream interpolation requires both axes
//! strictly ascending and longitudes in the canonical [-180, 180) domain,
//! so every field passes through here exactly once, right after decode.

use std::cmp::Ordering;

use tiles_common::{TileError, TileResult};

use crate::field::ScalarField;

/// Remap a longitude into [-180, 180).
#[inline]
pub fn canonical_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Canonicalize a field's longitude domain and sort both axes ascending,
/// permuting the value matrix to match. Pure transform: consumes the field
/// and returns the normalized one.
///
/// A field whose axes contain non-finite or duplicate coordinates after
/// remapping violates the input contract and fails fast.
pub fn normalize(field: ScalarField) -> TileResult<ScalarField> {
    let ScalarField { lats, lons, values } = field;

    let lons: Vec<f64> = lons.into_iter().map(canonical_lon).collect();

    if lats.iter().chain(lons.iter()).any(|c| !c.is_finite()) {
        return Err(TileError::DegenerateGrid(
            "non-finite coordinate value".into(),
        ));
    }

    let lat_order = sort_order(&lats);
    let lon_order = sort_order(&lons);

    let nlon = lons.len();
    let mut out = Vec::with_capacity(values.len());
    for &j in &lat_order {
        for &i in &lon_order {
            out.push(values[j * nlon + i]);
        }
    }

    let sorted_lats: Vec<f64> = lat_order.iter().map(|&j| lats[j]).collect();
    let sorted_lons: Vec<f64> = lon_order.iter().map(|&i| lons[i]).collect();

    ensure_strictly_ascending(&sorted_lats, "latitude")?;
    ensure_strictly_ascending(&sorted_lons, "longitude")?;

    ScalarField::new(sorted_lats, sorted_lons, out)
}

fn sort_order(axis: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..axis.len()).collect();
    order.sort_by(|&a, &b| axis[a].partial_cmp(&axis[b]).unwrap_or(Ordering::Equal));
    order
}

fn ensure_strictly_ascending(axis: &[f64], name: &str) -> TileResult<()> {
    for pair in axis.windows(2) {
        if pair[1] <= pair[0] {
            return Err(TileError::DegenerateGrid(format!(
                "duplicate {name} coordinate {} after normalization",
                pair[0]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_lon_range() {
        // For all longitudes the output lies in [-180, 180).
        for raw in [-720.0, -360.0, -180.0, -0.25, 0.0, 179.75, 180.0, 359.75, 540.0] {
            let lon = canonical_lon(raw);
            assert!((-180.0..180.0).contains(&lon), "{raw} -> {lon}");
        }
        assert_eq!(canonical_lon(0.0), 0.0);
        assert_eq!(canonical_lon(359.75), -0.25);
        assert_eq!(canonical_lon(180.0), -180.0);
        assert_eq!(canonical_lon(270.0), -90.0);
    }

    #[test]
    fn test_normalize_wraps_and_sorts_longitudes() {
        // 0..360 grid: [0, 90, 180, 270] becomes [-180, -90, 0, 90] with
        // the columns carried along.
        let field = ScalarField::new(
            vec![0.0],
            vec![0.0, 90.0, 180.0, 270.0],
            vec![10.0, 11.0, 12.0, 13.0],
        )
        .unwrap();

        let normalized = normalize(field).unwrap();
        assert_eq!(normalized.lons, vec![-180.0, -90.0, 0.0, 90.0]);
        assert_eq!(normalized.values, vec![12.0, 13.0, 10.0, 11.0]);
    }

    #[test]
    fn test_normalize_flips_descending_latitudes() {
        // North-to-south scan order becomes ascending with rows reversed.
        let field = ScalarField::new(
            vec![60.0, 30.0, 0.0],
            vec![10.0, 20.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();

        let normalized = normalize(field).unwrap();
        assert_eq!(normalized.lats, vec![0.0, 30.0, 60.0]);
        assert_eq!(normalized.values, vec![5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_normalize_is_stable_on_canonical_input() {
        let field = ScalarField::new(
            vec![0.0, 30.0],
            vec![-10.0, 0.0, 10.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        let normalized = normalize(field.clone()).unwrap();
        assert_eq!(normalized, field);
    }

    #[test]
    fn test_normalize_rejects_duplicate_coordinates() {
        // 0 and 360 collapse onto the same canonical longitude.
        let field = ScalarField::new(vec![0.0], vec![0.0, 360.0], vec![1.0, 2.0]).unwrap();
        assert!(normalize(field).is_err());
    }

    #[test]
    fn test_normalize_rejects_non_finite_axis() {
        let field = ScalarField::new(vec![0.0], vec![0.0, f64::NAN], vec![1.0, 2.0]).unwrap();
        assert!(normalize(field).is_err());
    }
}
