//! Streaming ASCII point-cloud (.asc) reader.
//!
//! The source is pulled one chunk at a time. Lines are split on `\n`; the
//! trailing partial line of each chunk is carried over and completed by the
//! next chunk, so a line is always parsed whole. Points are accumulated and
//! flushed to a [`PointBatchSink`] in batches of bounded size.
//!
//! # Usage
//!
//! ```rust,ignore
//! use geofile::io::asc::{AscReader, AscReaderConfiguration};
//!
//! let cloud = AscReader::from_file("scan.asc")?
//!     .with_configuration(AscReaderConfiguration {
//!         auto_offset: true,
//!         ..Default::default()
//!     })
//!     .read()?;
//! println!("{} points in {} batches", cloud.summary.point_count, cloud.batches.len());
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::cancellation::{self, CancellationToken};
use crate::error::{GeoError, Result};
use crate::notification::NotificationCollection;
use crate::types::{BoundingBox3D, Vector3};

use super::batch::{samples_center, PointBatch, PointBatchSink};
use super::schema::{parse_line, PointAttributes, PointSample};

/// Default number of bytes pulled from the source at once (128 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 134_217_728;
/// Default upper bound of a single line, carry-over included.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1 << 20;
/// Default number of points per flushed batch.
pub const DEFAULT_MAX_BATCH_POINTS: usize = 1_000_000;
/// Default offset subtracted from every point.
pub const DEFAULT_OFFSET: Vector3 = Vector3::new(600200.0, 131400.0, 60.0);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration options for the point-cloud reader.
#[derive(Debug, Clone)]
pub struct AscReaderConfiguration {
    /// Bytes requested from the source per chunk.
    pub chunk_size: usize,

    /// Longest accepted line. Longer lines are dropped.
    pub max_line_length: usize,

    /// Points per batch handed to the sink.
    pub max_batch_points: usize,

    /// Percentage of lines to keep, in (0, 100]. Every
    /// `round(100 / sampling)`-th line is kept.
    ///
    /// Default: 100.
    pub sampling: f64,

    /// Subtracted from every point unless `auto_offset` is set.
    pub offset: Vector3,

    /// Use the bounding-box center of the first batch as the offset for the
    /// whole file.
    ///
    /// Default: `false`.
    pub auto_offset: bool,

    /// Checked before every chunk.
    pub cancellation: Option<CancellationToken>,
}

impl Default for AscReaderConfiguration {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_batch_points: DEFAULT_MAX_BATCH_POINTS,
            sampling: 100.0,
            offset: DEFAULT_OFFSET,
            auto_offset: false,
            cancellation: None,
        }
    }
}

impl AscReaderConfiguration {
    /// Use a fixed offset. Turns `auto_offset` off.
    pub fn set_offset(&mut self, offset: Vector3) -> &mut Self {
        self.offset = offset;
        self.auto_offset = false;
        self
    }

    /// Line decimation modulo derived from `sampling`.
    pub fn sampling_modulo(&self) -> Result<u64> {
        if !(self.sampling > 0.0 && self.sampling <= 100.0) {
            return Err(GeoError::InvalidConfiguration(format!(
                "sampling must be in (0, 100], got {}",
                self.sampling
            )));
        }
        Ok(((100.0 / self.sampling).round() as u64).max(1))
    }

    fn validate(&self) -> Result<u64> {
        if self.chunk_size == 0 {
            return Err(GeoError::InvalidConfiguration("chunk size must not be zero".into()));
        }
        if self.max_batch_points == 0 {
            return Err(GeoError::InvalidConfiguration(
                "batch size must not be zero".into(),
            ));
        }
        self.sampling_modulo()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Statistics of a finished decode.
#[derive(Debug, Clone, Default)]
pub struct AscSummary {
    /// Bytes consumed from the source.
    pub bytes_read: u64,
    /// Non-blank lines seen, kept or not.
    pub line_count: u64,
    /// Points delivered to the sink.
    pub point_count: u64,
    /// Lines dropped because they could not be parsed or were too long.
    pub skipped_lines: u64,
    pub batch_count: usize,
    /// Union of the attributes of all parsed lines.
    pub attributes: PointAttributes,
    /// Offset subtracted from the delivered positions.
    pub offset: Vector3,
    /// Bounds of the points before offsetting.
    pub bounding_box: Option<BoundingBox3D>,
    pub notifications: NotificationCollection,
}

/// All batches of a file, collected in memory.
#[derive(Debug, Clone)]
pub struct AscCloud {
    pub batches: Vec<PointBatch>,
    pub summary: AscSummary,
}

impl AscCloud {
    pub fn point_count(&self) -> usize {
        self.batches.iter().map(PointBatch::len).sum()
    }
}

// ---------------------------------------------------------------------------
// AscReader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Next chunk must be pulled from the source.
    AwaitingChunk,
    /// Source exhausted with an unterminated last line pending.
    HaveCarryover,
    /// Source exhausted, remaining points must be flushed.
    Flushing,
    Done,
}

/// Streaming point-cloud reader.
pub struct AscReader<R: Read> {
    source: R,
    config: AscReaderConfiguration,
    progress: Option<Box<dyn FnMut(u64)>>,
}

impl AscReader<File> {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::open(path.as_ref())?))
    }
}

impl<R: Read> AscReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            config: AscReaderConfiguration::default(),
            progress: None,
        }
    }

    pub fn with_configuration(mut self, config: AscReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Called after every chunk with the total number of bytes consumed.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: FnMut(u64) + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Decode the whole source into memory.
    pub fn read(self) -> Result<AscCloud> {
        let mut batches = Vec::new();
        let summary = self.read_into(&mut batches)?;
        Ok(AscCloud { batches, summary })
    }

    /// Decode the source, handing every batch to `sink`.
    pub fn read_into<S: PointBatchSink>(mut self, sink: &mut S) -> Result<AscSummary> {
        let modulo = self.config.validate()?;
        let mut decoder = LineDecoder::new(&self.config, modulo);
        let mut chunk = Vec::new();
        let mut state = DecodeState::AwaitingChunk;

        while state != DecodeState::Done {
            state = match state {
                DecodeState::AwaitingChunk => {
                    cancellation::check(self.config.cancellation.as_ref())?;

                    chunk.clear();
                    let read = (&mut self.source)
                        .take(self.config.chunk_size as u64)
                        .read_to_end(&mut chunk)?;

                    if read == 0 {
                        if decoder.has_carryover() {
                            DecodeState::HaveCarryover
                        } else {
                            DecodeState::Flushing
                        }
                    } else {
                        decoder.summary.bytes_read += read as u64;
                        decoder.feed(&chunk, sink)?;
                        if let Some(progress) = self.progress.as_mut() {
                            progress(decoder.summary.bytes_read);
                        }
                        DecodeState::AwaitingChunk
                    }
                }
                DecodeState::HaveCarryover => {
                    decoder.finish_carryover(sink)?;
                    DecodeState::Flushing
                }
                DecodeState::Flushing => {
                    decoder.flush(sink)?;
                    DecodeState::Done
                }
                DecodeState::Done => DecodeState::Done,
            };
        }

        let summary = decoder.summary;
        log::debug!(
            "asc: {} points in {} batch(es) from {} bytes, {} line(s) skipped",
            summary.point_count,
            summary.batch_count,
            summary.bytes_read,
            summary.skipped_lines
        );
        Ok(summary)
    }
}

/// Line splitting, decimation, accumulation and flushing.
struct LineDecoder {
    max_line_length: usize,
    max_batch_points: usize,
    modulo: u64,
    fixed_offset: Option<Vector3>,
    carryover: Vec<u8>,
    /// Inside an overlong line; bytes are dropped up to the next newline.
    discarding: bool,
    /// Index of the next non-blank line, across chunks.
    line_index: u64,
    points: Vec<PointSample>,
    summary: AscSummary,
}

impl LineDecoder {
    fn new(config: &AscReaderConfiguration, modulo: u64) -> Self {
        Self {
            max_line_length: config.max_line_length,
            max_batch_points: config.max_batch_points,
            modulo,
            fixed_offset: (!config.auto_offset).then_some(config.offset),
            carryover: Vec::new(),
            discarding: false,
            line_index: 0,
            points: Vec::with_capacity(config.max_batch_points.min(DEFAULT_MAX_BATCH_POINTS)),
            summary: AscSummary::default(),
        }
    }

    fn has_carryover(&self) -> bool {
        !self.carryover.is_empty()
    }

    fn feed<S: PointBatchSink>(&mut self, chunk: &[u8], sink: &mut S) -> Result<()> {
        let mut start = 0;
        while let Some(newline) = chunk[start..].iter().position(|&b| b == b'\n') {
            let piece = &chunk[start..start + newline];
            start += newline + 1;

            if self.discarding {
                self.discarding = false;
            } else if self.carryover.is_empty() {
                self.handle_line(piece, sink)?;
            } else {
                let mut line = std::mem::take(&mut self.carryover);
                line.extend_from_slice(piece);
                self.handle_line(&line, sink)?;
            }
        }

        let tail = &chunk[start..];
        if self.discarding || tail.is_empty() {
            return Ok(());
        }
        // A trailing `\r` is stripped once the line is complete and does not
        // count against the limit.
        let limit = match tail.last() {
            Some(b'\r') => self.max_line_length + 1,
            _ => self.max_line_length,
        };
        if self.carryover.len() + tail.len() > limit {
            self.drop_overlong_line();
            self.carryover.clear();
            self.discarding = true;
        } else {
            self.carryover.extend_from_slice(tail);
        }
        Ok(())
    }

    fn finish_carryover<S: PointBatchSink>(&mut self, sink: &mut S) -> Result<()> {
        let line = std::mem::take(&mut self.carryover);
        self.handle_line(&line, sink)
    }

    fn handle_line<S: PointBatchSink>(&mut self, raw: &[u8], sink: &mut S) -> Result<()> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.len() > self.max_line_length {
            self.drop_overlong_line();
            return Ok(());
        }

        let text = String::from_utf8_lossy(raw);
        let line = text.trim();
        if line.is_empty() {
            return Ok(());
        }

        let index = self.line_index;
        self.line_index += 1;
        self.summary.line_count += 1;
        if index % self.modulo != 0 {
            return Ok(());
        }

        match parse_line(line) {
            Ok(sample) => {
                self.summary.attributes |= sample.attributes();
                self.points.push(sample);
                if self.points.len() >= self.max_batch_points {
                    self.flush(sink)?;
                }
            }
            Err(e) => {
                self.summary.skipped_lines += 1;
                self.summary
                    .notifications
                    .error(format!("line {} skipped: {e}", index + 1));
            }
        }
        Ok(())
    }

    fn drop_overlong_line(&mut self) {
        let index = self.line_index;
        self.line_index += 1;
        self.summary.line_count += 1;
        self.summary.skipped_lines += 1;
        self.summary.notifications.error(format!(
            "line {} skipped: longer than {} bytes",
            index + 1,
            self.max_line_length
        ));
    }

    fn flush<S: PointBatchSink>(&mut self, sink: &mut S) -> Result<()> {
        if self.points.is_empty() {
            return Ok(());
        }

        let offset = match self.fixed_offset {
            Some(offset) => offset,
            None => {
                let center = samples_center(&self.points).unwrap_or(Vector3::ZERO);
                self.fixed_offset = Some(center);
                center
            }
        };

        for sample in &self.points {
            match self.summary.bounding_box.as_mut() {
                Some(bbox) => bbox.expand_to_include(sample.position),
                None => {
                    self.summary.bounding_box =
                        Some(BoundingBox3D::new(sample.position, sample.position))
                }
            }
        }

        let batch = PointBatch::from_samples(&self.points, offset, self.summary.attributes);
        log::trace!("asc: flushing {} points", batch.len());
        self.summary.point_count += self.points.len() as u64;
        self.summary.batch_count += 1;
        self.summary.offset = offset;
        self.points.clear();
        sink.accept(batch)
    }
}
