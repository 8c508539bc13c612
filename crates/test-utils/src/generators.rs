//! Synthetic field generators for tests.

use grid_pipeline::ScalarField;

/// Build a regular axis of `n` points starting at `start` with spacing
/// `step` (negative for descending axes).
pub fn axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Build a field by evaluating `f(lon, lat)` at every grid point.
pub fn field_from_fn(
    lats: Vec<f64>,
    lons: Vec<f64>,
    f: impl Fn(f64, f64) -> f32,
) -> ScalarField {
    let mut values = Vec::with_capacity(lats.len() * lons.len());
    for &lat in &lats {
        for &lon in &lons {
            values.push(f(lon, lat));
        }
    }
    ScalarField::new(lats, lons, values).expect("synthetic grid shape")
}

/// Build a field holding the same value everywhere.
pub fn uniform_field(lats: Vec<f64>, lons: Vec<f64>, value: f32) -> ScalarField {
    field_from_fn(lats, lons, |_, _| value)
}

/// A 0.25-degree global grid in the raw model convention: longitudes
/// 0..360, latitudes descending from the north pole.
pub fn global_quarter_degree(f: impl Fn(f64, f64) -> f32) -> ScalarField {
    field_from_fn(axis(90.0, -0.25, 721), axis(0.0, 0.25, 1440), f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis() {
        assert_eq!(axis(0.0, 0.5, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(axis(90.0, -90.0, 3), vec![90.0, 0.0, -90.0]);
    }

    #[test]
    fn test_field_from_fn_layout() {
        let field = field_from_fn(vec![0.0, 1.0], vec![10.0, 11.0], |lon, lat| {
            (lon + lat) as f32
        });
        assert_eq!(field.value(0, 0), 10.0);
        assert_eq!(field.value(1, 1), 12.0);
    }
}
