//! ASCII point-cloud (.asc) streaming decoder

mod batch;
mod reader;
mod schema;

pub use batch::{PointBatch, PointBatchSink, PLACEHOLDER_COLOR};
pub use reader::{
    AscCloud, AscReader, AscReaderConfiguration, AscSummary, DEFAULT_CHUNK_SIZE,
    DEFAULT_MAX_BATCH_POINTS, DEFAULT_MAX_LINE_LENGTH, DEFAULT_OFFSET,
};
pub use schema::{parse_line, PointAttributes, PointSample};
