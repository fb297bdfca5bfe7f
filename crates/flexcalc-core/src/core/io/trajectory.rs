use crate::core::models::frame::{Frame, FrameBuilder, FrameError};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;
use tracing::trace;

pub const DEFAULT_HEADER_MARKER: char = '>';

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}{}: {kind}", describe_frame(.header))]
    Parse {
        line: usize,
        header: Option<String>,
        kind: ParseErrorKind,
    },
    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("Expected 3 whitespace-separated coordinates, found {found} fields")]
    WrongFieldCount { found: usize },
    #[error("Invalid {axis} coordinate (value: '{value}')")]
    InvalidFloat { axis: &'static str, value: String },
    #[error("Coordinate line appears before the first header line")]
    OutsideFrame,
    #[error("Coordinate line is not valid UTF-8")]
    InvalidEncoding,
}

fn describe_frame(header: &Option<String>) -> String {
    match header {
        Some(header) => format!(" in frame '{}'", header),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReaderState {
    /// Nothing read yet in this pass; the first header line opens the first frame.
    Fresh,
    /// The header line of the next frame was consumed while finishing the previous one.
    Pending(String),
    Exhausted,
}

/// A restartable, lazy sequence of [`Frame`]s over a rewindable text stream.
///
/// Only the frame currently being parsed is held in memory. Between calls the reader keeps
/// exactly one line of lookahead: the header that terminated the previous frame.
#[derive(Debug)]
pub struct FrameSource<R> {
    reader: R,
    marker: char,
    state: ReaderState,
    line: Vec<u8>,
    line_number: usize,
    capacity_hint: usize,
}

impl FrameSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead + Seek> FrameSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            marker: DEFAULT_HEADER_MARKER,
            state: ReaderState::Fresh,
            line: Vec::new(),
            line_number: 0,
            capacity_hint: 0,
        }
    }

    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// Rearms the parser for a new pass. Must be paired with repositioning the underlying
    /// stream at its start; [`FrameSource::rewind`] does both.
    pub fn reset(&mut self) {
        self.state = ReaderState::Fresh;
        self.line.clear();
        self.line_number = 0;
    }

    /// Seeks the underlying stream to byte 0 and resets the parser.
    pub fn rewind(&mut self) -> Result<(), TrajectoryError> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.reset();
        Ok(())
    }

    /// Reads the next frame of the current pass, or `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Parse`] for a malformed coordinate line or a coordinate line
    /// outside of any frame, and [`TrajectoryError::Frame`] if the frame cannot be allocated.
    /// After an error the current pass is over; rewind before reading again.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, TrajectoryError> {
        let header = match std::mem::replace(&mut self.state, ReaderState::Exhausted) {
            ReaderState::Exhausted => return Ok(None),
            ReaderState::Pending(header) => header,
            ReaderState::Fresh => match self.read_first_header()? {
                Some(header) => header,
                None => return Ok(None),
            },
        };

        let mut builder = FrameBuilder::with_capacity(header, self.capacity_hint)?;
        while self.read_line()? {
            let line = trim_line_ending(&self.line);
            if let Some(next_header) = strip_marker(line, self.marker) {
                self.state = ReaderState::Pending(decode_header(next_header));
                break;
            }
            let position = std::str::from_utf8(line)
                .map_err(|_| ParseErrorKind::InvalidEncoding)
                .and_then(|text| {
                    if text.trim().is_empty() {
                        Ok(None)
                    } else {
                        parse_coordinates(text).map(Some)
                    }
                })
                .map_err(|kind| TrajectoryError::Parse {
                    line: self.line_number,
                    header: Some(builder.header().to_string()),
                    kind,
                })?;
            if let Some(position) = position {
                builder.push(position)?;
            }
        }

        trace!(
            header = builder.header(),
            atoms = builder.len(),
            end_line = self.line_number,
            "Frame parsed."
        );
        self.capacity_hint = builder.len();
        Ok(Some(builder.build()))
    }

    /// Iterates over the remaining frames of the current pass.
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames { source: self }
    }

    /// Counts header lines from the current stream position to the end without parsing any
    /// coordinates. Leaves the parser exhausted.
    pub fn count_headers(&mut self) -> Result<usize, TrajectoryError> {
        let mut count = 0;
        while self.read_line()? {
            if strip_marker(&self.line, self.marker).is_some() {
                count += 1;
            }
        }
        self.state = ReaderState::Exhausted;
        trace!(count, "Header lines counted.");
        Ok(count)
    }

    fn read_first_header(&mut self) -> Result<Option<String>, TrajectoryError> {
        while self.read_line()? {
            let line = trim_line_ending(&self.line);
            if let Some(header) = strip_marker(line, self.marker) {
                return Ok(Some(decode_header(header)));
            }
            if !line.iter().all(u8::is_ascii_whitespace) {
                return Err(TrajectoryError::Parse {
                    line: self.line_number,
                    header: None,
                    kind: ParseErrorKind::OutsideFrame,
                });
            }
        }
        Ok(None)
    }

    fn read_line(&mut self) -> Result<bool, TrajectoryError> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }
}

pub struct Frames<'a, R> {
    source: &'a mut FrameSource<R>,
}

impl<R: BufRead + Seek> Iterator for Frames<'_, R> {
    type Item = Result<Frame, TrajectoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_frame().transpose()
    }
}

fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }
    line
}

fn strip_marker(line: &[u8], marker: char) -> Option<&[u8]> {
    let mut buf = [0; 4];
    line.strip_prefix(marker.encode_utf8(&mut buf).as_bytes())
}

/// Headers are free text; bytes that are not UTF-8 are replaced rather than rejected.
fn decode_header(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn parse_coordinates(line: &str) -> Result<Point3<f64>, ParseErrorKind> {
    let found = line.split_whitespace().count();
    if found != 3 {
        return Err(ParseErrorKind::WrongFieldCount { found });
    }

    let mut xyz = [0.0; 3];
    for ((axis, token), value) in ["x", "y", "z"]
        .into_iter()
        .zip(line.split_whitespace())
        .zip(xyz.iter_mut())
    {
        *value = token.parse().map_err(|_| ParseErrorKind::InvalidFloat {
            axis,
            value: token.to_string(),
        })?;
    }
    Ok(Point3::new(xyz[0], xyz[1], xyz[2]))
}

/// Writes `frame` in the header-delimited text format read by [`FrameSource`].
pub fn write_frame(writer: &mut impl Write, frame: &Frame, marker: char) -> io::Result<()> {
    writeln!(writer, "{}{}", marker, frame.header())?;
    for p in frame.positions() {
        writeln!(writer, "{:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    Ok(())
}
