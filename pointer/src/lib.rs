//! Touchless pointer: hand-gesture and gaze driven cursor control.
//!
//! Landmarks from an external detector go through the gesture machine,
//! cursor mapping and smoothing, and come out as commands on a
//! `CommandSink`.

pub mod calibration;
pub mod config;
pub mod cursor;
pub mod frame_timing;
pub mod pipeline;
pub mod source;
pub mod tracking;

pub use calibration::{CalibrationProfile, CalibrationSession};
pub use config::{Config, PointerSource};
pub use pipeline::{FrameReport, Pipeline, PointerStatus, RunSummary};
pub use source::{Frame, FrameSource, JsonLinesSource};
