//! Shape type codes

use std::fmt;

/// Shape type code as stored in the file header and in every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ShapeType {
    NullShape = 0,
    Point = 1,
    Polyline = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolylineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolylineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
    MultiPatch = 31,
}

/// Geometry layout shared by the plain, Z and M variants of a shape type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeFamily {
    Null,
    Point,
    Polyline,
    Polygon,
    MultiPoint,
    MultiPatch,
}

impl ShapeType {
    /// Every known shape type.
    pub const ALL: [ShapeType; 14] = [
        ShapeType::NullShape,
        ShapeType::Point,
        ShapeType::Polyline,
        ShapeType::Polygon,
        ShapeType::MultiPoint,
        ShapeType::PointZ,
        ShapeType::PolylineZ,
        ShapeType::PolygonZ,
        ShapeType::MultiPointZ,
        ShapeType::PointM,
        ShapeType::PolylineM,
        ShapeType::PolygonM,
        ShapeType::MultiPointM,
        ShapeType::MultiPatch,
    ];

    /// Look up a raw code. Returns `None` for codes the format does not define.
    pub fn from_i32(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| *t as i32 == code)
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn family(self) -> ShapeFamily {
        match self {
            ShapeType::NullShape => ShapeFamily::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeFamily::Point,
            ShapeType::Polyline | ShapeType::PolylineZ | ShapeType::PolylineM => {
                ShapeFamily::Polyline
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeFamily::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeFamily::MultiPoint
            }
            ShapeType::MultiPatch => ShapeFamily::MultiPatch,
        }
    }

    /// Z types (and MultiPatch) carry elevations.
    pub fn has_z(self) -> bool {
        matches!(
            self,
            ShapeType::PointZ
                | ShapeType::PolylineZ
                | ShapeType::PolygonZ
                | ShapeType::MultiPointZ
                | ShapeType::MultiPatch
        )
    }

    /// Whether an M block may follow the geometry. It is mandatory for M
    /// types and optional for Z types.
    pub fn may_have_m(self) -> bool {
        self.has_z()
            || matches!(
                self,
                ShapeType::PointM
                    | ShapeType::PolylineM
                    | ShapeType::PolygonM
                    | ShapeType::MultiPointM
            )
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Part type of a MultiPatch part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchPartType {
    TriangleStrip,
    TriangleFan,
    OuterRing,
    InnerRing,
    FirstRing,
    Ring,
}

impl PatchPartType {
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(PatchPartType::TriangleStrip),
            1 => Some(PatchPartType::TriangleFan),
            2 => Some(PatchPartType::OuterRing),
            3 => Some(PatchPartType::InnerRing),
            4 => Some(PatchPartType::FirstRing),
            5 => Some(PatchPartType::Ring),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(ShapeType::from_i32(5), Some(ShapeType::Polygon));
        assert_eq!(ShapeType::from_i32(31), Some(ShapeType::MultiPatch));
        assert_eq!(ShapeType::from_i32(2), None);
        assert_eq!(ShapeType::from_i32(99), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(ShapeType::PolygonZ.family(), ShapeFamily::Polygon);
        assert_eq!(ShapeType::MultiPointM.family(), ShapeFamily::MultiPoint);
        assert!(ShapeType::PointZ.has_z());
        assert!(!ShapeType::PointM.has_z());
        assert!(ShapeType::PointM.may_have_m());
        assert!(!ShapeType::Polyline.may_have_m());
    }
}
