//! Core geometric types

mod bounds;
mod vector;

pub use bounds::{BoundingBox2D, BoundingBox3D, Range};
pub use vector::{Vector2, Vector3};
