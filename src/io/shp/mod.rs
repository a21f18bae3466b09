//! ESRI Shapefile (.shp) geometry decoding

mod header;
pub mod polygon;
mod reader;
mod shape;
mod shape_type;

pub use header::{ShapeHeader, FILE_CODE, HEADER_SIZE, MIN_FILE_LENGTH, MIN_VERSION};
pub use reader::{read_shapes, ShapeFile, ShpReader, ShpReaderConfiguration};
pub use shape::{
    Measures, MultiPatchShape, MultiPointShape, PointShape, PolygonPart, PolygonShape,
    PolylineShape, Ring, Shape, ShapeRecord,
};
pub use shape_type::{PatchPartType, ShapeFamily, ShapeType};
