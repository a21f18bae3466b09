//! Point batches and the sink they are delivered to

use crate::error::Result;
use crate::types::{BoundingBox3D, Vector3};

use super::schema::{PointAttributes, PointSample};

/// Color given to points that have none.
pub const PLACEHOLDER_COLOR: [f32; 3] = [0.1, 0.2, 0.5];

/// A flushed group of points, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointBatch {
    /// Offset positions, xyz interleaved.
    pub positions: Vec<f32>,
    /// Colors in 0..1, rgb interleaved.
    pub colors: Vec<f32>,
    /// Present when the file schema has intensities; 0 for points without.
    pub intensities: Option<Vec<f32>>,
    /// Present when the file schema has normals, xyz interleaved.
    pub normals: Option<Vec<f32>>,
    /// Schema of the file when the batch was flushed.
    pub attributes: PointAttributes,
}

impl PointBatch {
    /// Build a batch from raw samples, subtracting `offset` from every
    /// position.
    pub fn from_samples(samples: &[PointSample], offset: Vector3, attributes: PointAttributes) -> Self {
        let mut positions = Vec::with_capacity(samples.len() * 3);
        let mut colors = Vec::with_capacity(samples.len() * 3);
        let mut intensities = attributes
            .contains(PointAttributes::INTENSITY)
            .then(|| Vec::with_capacity(samples.len()));
        let mut normals = attributes
            .contains(PointAttributes::NORMAL)
            .then(|| Vec::with_capacity(samples.len() * 3));

        for sample in samples {
            let p = sample.position - offset;
            positions.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);

            match sample.color {
                Some([r, g, b]) => colors.extend_from_slice(&[
                    (r / 255.0) as f32,
                    (g / 255.0) as f32,
                    (b / 255.0) as f32,
                ]),
                None => colors.extend_from_slice(&PLACEHOLDER_COLOR),
            }

            if let Some(values) = intensities.as_mut() {
                values.push(sample.intensity.unwrap_or(0.0) as f32);
            }
            if let Some(values) = normals.as_mut() {
                let n = sample.normal.unwrap_or(Vector3::ZERO);
                values.extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
            }
        }

        Self {
            positions,
            colors,
            intensities,
            normals,
            attributes,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of point `index`, offset applied.
    pub fn position(&self, index: usize) -> Option<[f32; 3]> {
        let slice = self.positions.get(index * 3..index * 3 + 3)?;
        Some([slice[0], slice[1], slice[2]])
    }
}

/// Receives the batches of a decode, in input order.
pub trait PointBatchSink {
    fn accept(&mut self, batch: PointBatch) -> Result<()>;
}

impl PointBatchSink for Vec<PointBatch> {
    fn accept(&mut self, batch: PointBatch) -> Result<()> {
        self.push(batch);
        Ok(())
    }
}

/// Center of the bounding box of `samples`.
pub(crate) fn samples_center(samples: &[PointSample]) -> Option<Vector3> {
    BoundingBox3D::from_points(samples.iter().map(|s| &s.position)).map(|b| b.center())
}
