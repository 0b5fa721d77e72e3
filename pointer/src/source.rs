//! Landmark frame input.
//!
//! The landmark detector runs outside this crate.  Frames arrive as JSON
//! lines, one per frame:
//!
//! ```text
//! {"t": 0.033, "hand": [[0.5, 0.4], ...], "hand_score": 0.92, "face": null}
//! ```
//!
//! Only `t` is required.  `capture` marks frames where the user confirmed a
//! calibration point.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tracking::landmarks::LandmarkSet;

/// One frame of landmark output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time in seconds, monotonic within a stream.
    #[serde(rename = "t")]
    pub timestamp: f64,
    #[serde(default)]
    pub hand: Option<LandmarkSet>,
    /// Detector tracking confidence for `hand`.
    #[serde(default)]
    pub hand_score: Option<f64>,
    #[serde(default)]
    pub face: Option<LandmarkSet>,
    #[serde(default)]
    pub capture: bool,
}

impl Frame {
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }
}

/// Something that yields frames until exhausted.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Frames parsed from newline-delimited JSON.
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line: String,
    line_number: u64,
    /// Lines that failed to parse and were skipped.
    pub skipped: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            skipped: 0,
        }
    }

    pub fn lines_read(&self) -> u64 {
        self.line_number
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!("Frame input read failed at line {}: {}", self.line_number + 1, e);
                    return None;
                }
            }
            self.line_number += 1;

            let text = self.line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<Frame>(text) {
                Ok(frame) if frame.timestamp.is_finite() => return Some(frame),
                Ok(_) => {
                    warn!("Skipping frame on line {}: non-finite timestamp", self.line_number);
                    self.skipped += 1;
                }
                Err(e) => {
                    warn!("Skipping malformed frame on line {}: {}", self.line_number, e);
                    self.skipped += 1;
                }
            }
        }
    }
}

/// Frames from an in-memory list, in order.
impl FrameSource for std::vec::IntoIter<Frame> {
    fn next_frame(&mut self) -> Option<Frame> {
        let frame = self.next();
        if frame.is_none() {
            debug!("Frame list exhausted");
        }
        frame
    }
}
