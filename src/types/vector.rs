//! Coordinate types shared by the decoders

use std::fmt;
use std::ops::{Add, Sub};

/// Planar coordinate, as stored in shapefile point arrays
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    /// Create a new 2D coordinate
    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    /// Origin
    pub const ZERO: Vector2 = Vector2::new(0.0, 0.0);

    /// Scalar cross product of `self` and `other` seen as vectors
    pub fn cross(&self, other: &Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Dot product
    pub fn dot(&self, other: &Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Spatial coordinate, used for point-cloud samples and offsets
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Create a new 3D coordinate
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// Origin
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector2_cross_sign() {
        let east = Vector2::new(1.0, 0.0);
        let north = Vector2::new(0.0, 1.0);
        assert_eq!(east.cross(&north), 1.0);
        assert_eq!(north.cross(&east), -1.0);
    }

    #[test]
    fn test_vector2_sub_dot() {
        let v = Vector2::new(3.0, 4.0) - Vector2::new(1.0, 1.0);
        assert_eq!(v, Vector2::new(2.0, 3.0));
        assert_eq!(v.dot(&v), 13.0);
    }

    #[test]
    fn test_vector3_offset() {
        let p = Vector3::new(600201.5, 131402.0, 61.0);
        let offset = Vector3::new(600200.0, 131400.0, 60.0);
        assert_eq!(p - offset, Vector3::new(1.5, 2.0, 1.0));
        assert_eq!((p - offset) + offset, p);
    }
}
