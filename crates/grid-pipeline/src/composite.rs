//! Derived fields computed from primitives already loaded for one file.

use std::collections::HashMap;

use tiles_common::{Composite, Primitive, TileError, TileResult};

use crate::field::ScalarField;

/// Derive a composite from the decoded primitives for one source file.
///
/// Returns `None` when a required constituent is absent — the composite is
/// silently skipped, along with every render that depends on it. Returns
/// `Some(Err(..))` when the constituents are present but do not share an
/// identical coordinate grid.
pub fn derive(
    composite: Composite,
    primitives: &HashMap<Primitive, ScalarField>,
) -> Option<TileResult<ScalarField>> {
    for constituent in composite.constituents() {
        if !primitives.contains_key(constituent) {
            tracing::debug!(
                composite = composite.id(),
                missing = constituent.id(),
                "constituent absent, skipping composite"
            );
            return None;
        }
    }

    match composite {
        Composite::WindSpeed10m => {
            let u = &primitives[&Primitive::WindU10];
            let v = &primitives[&Primitive::WindV10];
            Some(wind_speed(u, v))
        }
    }
}

/// Pointwise vector magnitude √(u² + v²) of two orthogonal components.
///
/// The coordinate arrays are taken verbatim from the first constituent —
/// never recomputed — so the composite cannot drift off its parents' grid.
pub fn wind_speed(u: &ScalarField, v: &ScalarField) -> TileResult<ScalarField> {
    if u.lats != v.lats || u.lons != v.lons {
        return Err(TileError::DegenerateGrid(
            "wind components are on different grids".into(),
        ));
    }

    let values = u
        .values
        .iter()
        .zip(&v.values)
        .map(|(&a, &b)| (a * a + b * b).sqrt())
        .collect();

    ScalarField::new(u.lats.clone(), u.lons.clone(), values)
}
