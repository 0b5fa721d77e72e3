//! Landmark tracking: the per-frame recognition side of the pipeline.
//!
//! Provides:
//! - `landmarks`: hand and face landmark model
//! - `filters`: numeric helpers and point filters
//! - `gesture`: hand gesture state machine producing `IntentEvent`s
//! - `gaze`: eye-landmark gaze normalizer

pub mod filters;
pub mod gaze;
pub mod gesture;
pub mod landmarks;

pub use gaze::GazeTracker;
pub use gesture::{GestureConfig, GestureKind, GestureMachine, IntentEvent};
pub use landmarks::{LandmarkSet, Point2D};
