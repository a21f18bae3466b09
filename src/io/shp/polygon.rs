//! Polygon reconstruction from raw ring data.
//!
//! A polygon record is a flat point list cut into rings by its part indices.
//! Outer boundaries are stored clockwise and holes counter-clockwise
//! (y axis pointing up), but nothing in the record says which hole belongs to
//! which boundary. The winding of every ring is recovered from its signed
//! area, then every hole is attached to the first outer ring that contains it.

use crate::types::Vector2;

use super::shape::{PolygonPart, Ring};

/// Where a point lies relative to a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Outside,
    Boundary,
    Inside,
}

/// Cut `points` into the slices delimited by `parts`.
///
/// `parts` holds the start index of each part; each part runs up to the next
/// start, the last one to the end of `points`. Indices are expected to be
/// validated (ascending, within bounds).
pub fn part_slices<'a>(points: &'a [Vector2], parts: &[usize]) -> Vec<&'a [Vector2]> {
    parts
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let end = parts.get(index + 1).copied().unwrap_or(points.len());
            &points[start..end]
        })
        .collect()
}

/// Signed area of a ring with the shoelace formula, positive when the ring
/// is clockwise (y up). The closing edge is included, so the ring does not
/// need to repeat its first point.
pub fn ring_signed_area(ring: &[Vector2]) -> f64 {
    let Some(last) = ring.last() else {
        return 0.0;
    };
    let mut previous = *last;
    let mut sum = 0.0;
    for point in ring {
        sum += previous.y * point.x - previous.x * point.y;
        previous = *point;
    }
    sum / 2.0
}

/// Points of the smallest closed ring, a triangle repeating its first point.
pub const MIN_RING_POINTS: usize = 4;

/// Outer boundary test: at least 4 points (a closed triangle) and a
/// non-negative signed area.
pub fn is_outer_ring(ring: &[Vector2]) -> bool {
    ring.len() >= MIN_RING_POINTS && ring_signed_area(ring) >= 0.0
}

/// Whether `point` lies on the segment `a`-`b`, endpoints included.
pub fn point_on_segment(point: Vector2, a: Vector2, b: Vector2) -> bool {
    let ab = b - a;
    let ap = point - a;
    if ab.x == 0.0 && ab.y == 0.0 {
        return ap.x == 0.0 && ap.y == 0.0;
    }
    if ab.cross(&ap) != 0.0 {
        return false;
    }
    let t = ab.dot(&ap);
    t >= 0.0 && t <= ab.dot(&ab)
}

/// Ray-casting point-in-polygon test.
///
/// Points on an edge are reported as [`Containment::Boundary`] before the
/// crossing parity is consulted.
pub fn ring_contains(ring: &[Vector2], point: Vector2) -> Containment {
    let n = ring.len();
    if n == 0 {
        return Containment::Outside;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = ring[i];
        let pj = ring[j];
        if point_on_segment(point, pi, pj) {
            return Containment::Boundary;
        }
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }

    if inside {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

/// Whether `hole` lies inside `outer`.
///
/// The first hole vertex that is not on the outer boundary decides. A hole
/// whose vertices all touch the boundary counts as contained.
pub fn ring_contains_ring(outer: &[Vector2], hole: &[Vector2]) -> bool {
    for point in hole {
        match ring_contains(outer, *point) {
            Containment::Boundary => continue,
            Containment::Inside => return true,
            Containment::Outside => return false,
        }
    }
    true
}

/// Group rings into outer boundaries with their holes.
///
/// Ring order is kept: outer rings appear in file order, a hole that no
/// outer ring contains is appended as its own part with no holes. Rings of
/// fewer than 4 points enclose no area and are left out.
pub fn assemble_polygons(rings: Vec<Ring>) -> Vec<PolygonPart> {
    let mut polygons: Vec<PolygonPart> = Vec::new();
    let mut holes: Vec<Ring> = Vec::new();

    for ring in rings {
        if ring.len() < MIN_RING_POINTS {
            continue;
        }
        if is_outer_ring(&ring) {
            polygons.push(PolygonPart::new(ring));
        } else {
            holes.push(ring);
        }
    }

    for hole in holes {
        match polygons
            .iter_mut()
            .find(|polygon| ring_contains_ring(&polygon.outer, &hole))
        {
            Some(polygon) => polygon.holes.push(hole),
            None => polygons.push(PolygonPart::new(hole)),
        }
    }

    polygons
}
