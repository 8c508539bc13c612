//! Decoded scalar fields on a regular lat/lon grid.

use tiles_common::{LatLonBounds, TileError, TileResult};

/// One decoded scalar grid: a latitude axis, a longitude axis, and a
/// row-major value matrix (`values[j * nlon + i]`, `j` indexing latitude).
///
/// Axes arrive in whatever order and longitude domain the source uses;
/// [`crate::normalize`] canonicalizes both before anything downstream
/// touches the field.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub values: Vec<f32>,
}

impl ScalarField {
    /// Create a field, checking that the value matrix matches the axes.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>, values: Vec<f32>) -> TileResult<Self> {
        if lats.is_empty() || lons.is_empty() {
            return Err(TileError::DegenerateGrid("empty coordinate axis".into()));
        }
        if values.len() != lats.len() * lons.len() {
            return Err(TileError::DegenerateGrid(format!(
                "value count {} does not match {}x{} grid",
                values.len(),
                lats.len(),
                lons.len()
            )));
        }
        Ok(Self { lats, lons, values })
    }

    pub fn nlat(&self) -> usize {
        self.lats.len()
    }

    pub fn nlon(&self) -> usize {
        self.lons.len()
    }

    /// Value at (latitude index, longitude index).
    pub fn value(&self, j: usize, i: usize) -> f32 {
        self.values[j * self.lons.len() + i]
    }

    /// Coordinate extent of the grid. Only meaningful once the axes are
    /// sorted ascending (post-normalization).
    pub fn bounds(&self) -> LatLonBounds {
        LatLonBounds::new(
            self.lons[0],
            self.lats[0],
            self.lons[self.lons.len() - 1],
            self.lats[self.lats.len() - 1],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_shape() {
        assert!(ScalarField::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0; 4]).is_ok());
        assert!(ScalarField::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0; 3]).is_err());
        assert!(ScalarField::new(vec![], vec![0.0], vec![]).is_err());
    }

    #[test]
    fn test_value_indexing() {
        let field = ScalarField::new(
            vec![0.0, 1.0],
            vec![10.0, 11.0, 12.0],
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap();
        assert_eq!(field.value(0, 2), 2.0);
        assert_eq!(field.value(1, 0), 3.0);
    }
}
