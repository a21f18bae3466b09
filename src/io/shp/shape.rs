//! Decoded shape records

use crate::types::{BoundingBox2D, Range, Vector2};

use super::shape_type::{PatchPartType, ShapeType};

/// Closed sequence of coordinates (first point equals last point).
pub type Ring = Vec<Vector2>;

/// Per-vertex Z or M values with their declared range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measures {
    pub range: Range,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointShape {
    pub shape_type: ShapeType,
    pub point: Vector2,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineShape {
    pub shape_type: ShapeType,
    pub bounding_box: BoundingBox2D,
    /// Index of the first point of every part.
    pub parts: Vec<usize>,
    pub points: Vec<Vector2>,
    pub z: Option<Measures>,
    pub m: Option<Measures>,
}

impl PolylineShape {
    /// Points of each part, in order.
    pub fn part_points(&self) -> Vec<&[Vector2]> {
        super::polygon::part_slices(&self.points, &self.parts)
    }
}

/// An outer ring with the holes it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonPart {
    pub outer: Ring,
    pub holes: Vec<Ring>,
}

impl PolygonPart {
    pub fn new(outer: Ring) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub shape_type: ShapeType,
    pub bounding_box: BoundingBox2D,
    pub parts: Vec<usize>,
    pub points: Vec<Vector2>,
    pub z: Option<Measures>,
    pub m: Option<Measures>,
    /// Rings regrouped into outer boundaries and their holes.
    pub polygons: Vec<PolygonPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPointShape {
    pub shape_type: ShapeType,
    pub bounding_box: BoundingBox2D,
    pub points: Vec<Vector2>,
    pub z: Option<Measures>,
    pub m: Option<Measures>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPatchShape {
    pub bounding_box: BoundingBox2D,
    pub parts: Vec<usize>,
    pub part_types: Vec<PatchPartType>,
    pub points: Vec<Vector2>,
    pub z: Measures,
    pub m: Option<Measures>,
}

/// One decoded geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(PointShape),
    Polyline(PolylineShape),
    Polygon(PolygonShape),
    MultiPoint(MultiPointShape),
    MultiPatch(MultiPatchShape),
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Point(s) => s.shape_type,
            Shape::Polyline(s) => s.shape_type,
            Shape::Polygon(s) => s.shape_type,
            Shape::MultiPoint(s) => s.shape_type,
            Shape::MultiPatch(_) => ShapeType::MultiPatch,
        }
    }

    /// Number of vertices.
    pub fn point_count(&self) -> usize {
        match self {
            Shape::Point(_) => 1,
            Shape::Polyline(s) => s.points.len(),
            Shape::Polygon(s) => s.points.len(),
            Shape::MultiPoint(s) => s.points.len(),
            Shape::MultiPatch(s) => s.points.len(),
        }
    }
}

/// A shape together with the record number it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub record_number: i32,
    pub shape: Shape,
}
