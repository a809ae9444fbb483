#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::Vec2;

/// Per-coordinate flags inherited from the source map document.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordFlags {
    /// The segment leading into this coordinate is a gap: no boundary is
    /// emitted for it.
    pub gap: bool,
    /// The segment leading into this coordinate is a dash. Per this
    /// crate's policy, dashes are rasterized as solid (see
    /// [`crate::RasterWarning::DashTreatedAsSolid`]).
    pub dash: bool,
    /// This coordinate is a Bezier curve-start control point. Curves are
    /// flattened to straight segments between control points.
    pub curve_start: bool,
}

impl CoordFlags {
    /// Decode the bitfield used by the map document: bit 0 = gap, bit 1 =
    /// dash, bit 2 = curve-start.
    #[inline]
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        Self {
            gap: bits & 0b001 != 0,
            dash: bits & 0b010 != 0,
            curve_start: bits & 0b100 != 0,
        }
    }
}

/// A single map-internal coordinate paired with the flags on the segment
/// leading into it.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureCoord {
    pub point: Vec2,
    pub flags: CoordFlags,
}

/// A closed ring (outer boundary or hole) of a polygon feature.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub coords: Vec<FeatureCoord>,
}

impl Ring {
    #[inline]
    #[must_use]
    pub fn new(coords: Vec<FeatureCoord>) -> Self {
        Self { coords }
    }

    /// Twice the signed area of the ring (shoelace formula), used both to
    /// detect degenerate (zero-area) rings and to determine winding.
    #[must_use]
    pub fn signed_area_x2(&self) -> f32 {
        let n = self.coords.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.coords[i].point;
            let b = self.coords[(i + 1) % n].point;
            sum += a.x * b.y - b.x * a.y;
        }
        sum
    }
}

/// The geometry carried by a [`Feature`].
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Vec2),
    Polyline(Vec<FeatureCoord>),
    Polygon { outer: Ring, holes: Vec<Ring> },
}

/// A parsed map primitive, tagged by symbol code and source layer.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub symbol_code: String,
    pub layer: String,
    pub geometry: Geometry,
}

impl Feature {
    #[inline]
    #[must_use]
    pub fn new(symbol_code: impl Into<String>, layer: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            symbol_code: symbol_code.into(),
            layer: layer.into(),
            geometry,
        }
    }

    /// True if any coordinate in this feature carries the curve-start flag.
    #[must_use]
    pub fn has_curve_start(&self) -> bool {
        match &self.geometry {
            Geometry::Point(_) => false,
            Geometry::Polyline(coords) => coords.iter().any(|c| c.flags.curve_start),
            Geometry::Polygon { outer, holes } => {
                outer.coords.iter().any(|c| c.flags.curve_start)
                    || holes.iter().any(|r| r.coords.iter().any(|c| c.flags.curve_start))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bevy_math::vec2;

    fn coord(x: f32, y: f32) -> FeatureCoord {
        FeatureCoord {
            point: vec2(x, y),
            flags: CoordFlags::default(),
        }
    }

    #[test]
    fn test_coord_flags_from_bits() {
        let flags = CoordFlags::from_bits(0b101);
        assert!(flags.gap);
        assert!(!flags.dash);
        assert!(flags.curve_start);
    }

    #[test]
    fn test_ring_signed_area_square() {
        let ring = Ring::new(vec![
            coord(0.0, 0.0),
            coord(4.0, 0.0),
            coord(4.0, 4.0),
            coord(0.0, 4.0),
        ]);
        assert!((ring.signed_area_x2().abs() - 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_ring_has_zero_area() {
        let ring = Ring::new(vec![coord(0.0, 0.0), coord(1.0, 0.0)]);
        assert_eq!(ring.signed_area_x2(), 0.0);
    }

    #[test]
    fn test_has_curve_start() {
        let mut coords = vec![coord(0.0, 0.0), coord(1.0, 1.0)];
        coords[1].flags.curve_start = true;
        let feature = Feature::new("201", "terrain", Geometry::Polyline(coords));
        assert!(feature.has_curve_start());
    }
}
