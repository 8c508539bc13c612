//! The closed set of variables the pipeline knows how to decode and render.

/// GRIB2 message selector for one physical variable/level.
///
/// Passed to the external decoder to pick a single message out of a
/// multi-message source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldFilter {
    /// GRIB2 discipline (Code Table 0.0).
    pub discipline: u8,
    /// Parameter category within the discipline (Code Table 4.1).
    pub category: u8,
    /// Parameter number within the category (Code Table 4.2).
    pub number: u8,
    /// First fixed surface type (Code Table 4.5).
    pub surface_type: u8,
    /// First fixed surface value, when the surface type carries one
    /// (e.g. 2 m, 10 m above ground).
    pub surface_value: Option<f64>,
}

/// A primitive field decoded directly from the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Temperature2m,
    WindU10,
    WindV10,
    Mslp,
    Precip,
}

impl Primitive {
    pub const ALL: [Primitive; 5] = [
        Primitive::Temperature2m,
        Primitive::WindU10,
        Primitive::WindV10,
        Primitive::Mslp,
        Primitive::Precip,
    ];

    /// Identifier used in scratch-index names and logs. No underscores:
    /// artifact names are split on `_` by the catalog.
    pub fn id(&self) -> &'static str {
        match self {
            Primitive::Temperature2m => "t2m",
            Primitive::WindU10 => "u10",
            Primitive::WindV10 => "v10",
            Primitive::Mslp => "prmsl",
            Primitive::Precip => "apcp",
        }
    }

    /// The decoder filter that selects this variable.
    pub fn filter(&self) -> FieldFilter {
        match self {
            Primitive::Temperature2m => FieldFilter {
                discipline: 0,
                category: 0,
                number: 0,
                surface_type: 103,
                surface_value: Some(2.0),
            },
            Primitive::WindU10 => FieldFilter {
                discipline: 0,
                category: 2,
                number: 2,
                surface_type: 103,
                surface_value: Some(10.0),
            },
            Primitive::WindV10 => FieldFilter {
                discipline: 0,
                category: 2,
                number: 3,
                surface_type: 103,
                surface_value: Some(10.0),
            },
            Primitive::Mslp => FieldFilter {
                discipline: 0,
                category: 3,
                number: 1,
                surface_type: 101,
                surface_value: None,
            },
            Primitive::Precip => FieldFilter {
                discipline: 0,
                category: 1,
                number: 8,
                surface_type: 1,
                surface_value: None,
            },
        }
    }
}

/// A field derived pointwise from primitives already loaded for the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composite {
    /// 10 m wind speed, the magnitude of the u/v components.
    WindSpeed10m,
}

impl Composite {
    pub fn id(&self) -> &'static str {
        match self {
            Composite::WindSpeed10m => "wind10",
        }
    }

    /// Primitives this composite is a pure function of.
    pub fn constituents(&self) -> &'static [Primitive] {
        match self {
            Composite::WindSpeed10m => &[Primitive::WindU10, Primitive::WindV10],
        }
    }
}

/// A variable that is rendered to tiles and carries a render spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderVariable {
    Temperature2m,
    WindSpeed10m,
    Mslp,
    Precip,
}

impl RenderVariable {
    pub const ALL: [RenderVariable; 4] = [
        RenderVariable::Temperature2m,
        RenderVariable::WindSpeed10m,
        RenderVariable::Mslp,
        RenderVariable::Precip,
    ];

    /// Filename token for this variable.
    pub fn id(&self) -> &'static str {
        match self {
            RenderVariable::Temperature2m => "t2m",
            RenderVariable::WindSpeed10m => "wind10",
            RenderVariable::Mslp => "prmsl",
            RenderVariable::Precip => "precip",
        }
    }

    /// The source of this variable's grid: a decoded primitive or a
    /// derived composite.
    pub fn source(&self) -> FieldSource {
        match self {
            RenderVariable::Temperature2m => FieldSource::Primitive(Primitive::Temperature2m),
            RenderVariable::WindSpeed10m => FieldSource::Composite(Composite::WindSpeed10m),
            RenderVariable::Mslp => FieldSource::Primitive(Primitive::Mslp),
            RenderVariable::Precip => FieldSource::Primitive(Primitive::Precip),
        }
    }

    /// Every primitive that must be decoded before this variable can
    /// render.
    pub fn required_primitives(&self) -> Vec<Primitive> {
        match self.source() {
            FieldSource::Primitive(p) => vec![p],
            FieldSource::Composite(c) => c.constituents().to_vec(),
        }
    }
}

/// Where a renderable variable's grid comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Primitive(Primitive),
    Composite(Composite),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_delimiter_safe() {
        for var in RenderVariable::ALL {
            assert!(!var.id().contains('_'), "variable id {}", var.id());
        }
    }

    #[test]
    fn test_composite_dependencies() {
        let needed = RenderVariable::WindSpeed10m.required_primitives();
        assert_eq!(needed, vec![Primitive::WindU10, Primitive::WindV10]);
        assert_eq!(
            RenderVariable::Temperature2m.required_primitives(),
            vec![Primitive::Temperature2m]
        );
    }

    #[test]
    fn test_filters_are_distinct() {
        let prims = Primitive::ALL;
        for (i, a) in prims.iter().enumerate() {
            for b in prims.iter().skip(i + 1) {
                assert_ne!(a.filter(), b.filter(), "{:?} vs {:?}", a, b);
            }
        }
    }
}
