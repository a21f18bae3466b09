//! ASC line layouts and line parsing

use bitflags::bitflags;

use crate::error::{GeoError, Result};
use crate::types::Vector3;

bitflags! {
    /// Optional per-point attributes present in a file.
    ///
    /// A file's schema is the union of the attributes of all its lines, so it
    /// only ever grows while decoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointAttributes: u8 {
        /// Only x, y, z.
        const NONE = 0x0;
        /// One intensity column after z.
        const INTENSITY = 0x1;
        /// Red, green and blue columns, 0..255.
        const COLOR = 0x2;
        /// Normal vector columns after the color.
        const NORMAL = 0x4;
    }
}

impl PointAttributes {
    /// Layout of a line with `count` columns.
    pub fn from_column_count(count: usize) -> Option<Self> {
        match count {
            3 => Some(Self::NONE),
            4 => Some(Self::INTENSITY),
            6 => Some(Self::COLOR),
            7 => Some(Self::INTENSITY | Self::COLOR),
            9 => Some(Self::COLOR | Self::NORMAL),
            10 => Some(Self::INTENSITY | Self::COLOR | Self::NORMAL),
            _ => None,
        }
    }

    /// Number of columns of a line carrying exactly these attributes.
    pub fn column_count(self) -> usize {
        3 + usize::from(self.contains(Self::INTENSITY))
            + if self.contains(Self::COLOR) { 3 } else { 0 }
            + if self.contains(Self::NORMAL) { 3 } else { 0 }
    }
}

/// One decoded line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointSample {
    pub position: Vector3,
    pub intensity: Option<f64>,
    /// Raw color components as written in the file.
    pub color: Option<[f64; 3]>,
    pub normal: Option<Vector3>,
}

impl PointSample {
    pub fn attributes(&self) -> PointAttributes {
        let mut attributes = PointAttributes::NONE;
        attributes.set(PointAttributes::INTENSITY, self.intensity.is_some());
        attributes.set(PointAttributes::COLOR, self.color.is_some());
        attributes.set(PointAttributes::NORMAL, self.normal.is_some());
        attributes
    }
}

/// Parse one whitespace-separated line.
///
/// The column count selects the layout: xyz, then intensity, then rgb, then
/// the normal, each present only in the layouts that have it.
pub fn parse_line(line: &str) -> Result<PointSample> {
    let mut values = [0.0f64; 10];
    let mut count = 0;
    for token in line.split_whitespace() {
        if count == values.len() {
            count += 1;
            break;
        }
        values[count] = token
            .parse()
            .map_err(|_| GeoError::Parse(format!("invalid number '{token}'")))?;
        count += 1;
    }

    let attributes = PointAttributes::from_column_count(count).ok_or_else(|| {
        GeoError::Parse(format!(
            "{} column(s), expected 3, 4, 6, 7, 9 or 10",
            line.split_whitespace().count()
        ))
    })?;

    let mut columns = values[..count].iter().copied();
    let mut next = || columns.next().unwrap_or_default();

    let position = Vector3::new(next(), next(), next());
    let intensity = attributes.contains(PointAttributes::INTENSITY).then(&mut next);
    let color = attributes
        .contains(PointAttributes::COLOR)
        .then(|| [next(), next(), next()]);
    let normal = attributes
        .contains(PointAttributes::NORMAL)
        .then(|| Vector3::new(next(), next(), next()));

    Ok(PointSample {
        position,
        intensity,
        color,
        normal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xyz_only() {
        let sample = parse_line("1.0 2.0 3.0").unwrap();
        assert_eq!(sample.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(sample.attributes(), PointAttributes::NONE);
    }

    #[test]
    fn test_all_attributes() {
        let sample = parse_line("1 2 3 4 5 6 7 8 9 10").unwrap();
        assert_eq!(sample.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(sample.intensity, Some(4.0));
        assert_eq!(sample.color, Some([5.0, 6.0, 7.0]));
        assert_eq!(sample.normal, Some(Vector3::new(8.0, 9.0, 10.0)));
        assert_eq!(sample.attributes(), PointAttributes::all());
    }

    #[test]
    fn test_color_without_intensity() {
        let sample = parse_line("1 2 3 255 128 0").unwrap();
        assert_eq!(sample.intensity, None);
        assert_eq!(sample.color, Some([255.0, 128.0, 0.0]));

        let sample = parse_line("1 2 3 0.5 255 128 0").unwrap();
        assert_eq!(sample.intensity, Some(0.5));
        assert_eq!(sample.color, Some([255.0, 128.0, 0.0]));
    }

    #[test]
    fn test_tabs_and_repeated_spaces() {
        let sample = parse_line("  1\t2   3  ").unwrap();
        assert_eq!(sample.position, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rejected_lines() {
        assert!(matches!(parse_line("1 2 3 4 5"), Err(GeoError::Parse(_))));
        assert!(matches!(parse_line("1 2"), Err(GeoError::Parse(_))));
        assert!(matches!(parse_line("1 2 3 4 5 6 7 8 9 10 11"), Err(GeoError::Parse(_))));
        assert!(matches!(parse_line("1 two 3"), Err(GeoError::Parse(_))));
    }

    #[test]
    fn test_column_counts() {
        for count in [3, 4, 6, 7, 9, 10] {
            let attributes = PointAttributes::from_column_count(count).unwrap();
            assert_eq!(attributes.column_count(), count);
        }
    }
}
