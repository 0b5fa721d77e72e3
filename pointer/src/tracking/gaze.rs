//! Gaze estimation from face-mesh eye landmarks.
//!
//! Locates each iris within its eye opening and averages both eyes into a
//! normalized gaze point, then applies exponential smoothing.  The result
//! is raw (uncalibrated); see `calibration` for the screen correction.

use tracing::debug;

use super::filters::{clamp, normalized_ratio, ExponentialFilter};
use super::landmarks::{
    LandmarkSet, Point2D, LEFT_EYE_INNER, LEFT_EYE_LOWER, LEFT_EYE_OUTER, LEFT_EYE_UPPER,
    LEFT_IRIS, RIGHT_EYE_INNER, RIGHT_EYE_LOWER, RIGHT_EYE_OUTER, RIGHT_EYE_UPPER, RIGHT_IRIS,
};

/// Landmark ids describing one eye.
struct EyeRegion {
    iris: [usize; 4],
    corner_a: usize,
    corner_b: usize,
    lid_upper: usize,
    lid_lower: usize,
}

const LEFT_EYE: EyeRegion = EyeRegion {
    iris: LEFT_IRIS,
    corner_a: LEFT_EYE_OUTER,
    corner_b: LEFT_EYE_INNER,
    lid_upper: LEFT_EYE_UPPER,
    lid_lower: LEFT_EYE_LOWER,
};

const RIGHT_EYE: EyeRegion = EyeRegion {
    iris: RIGHT_IRIS,
    corner_a: RIGHT_EYE_INNER,
    corner_b: RIGHT_EYE_OUTER,
    lid_upper: RIGHT_EYE_UPPER,
    lid_lower: RIGHT_EYE_LOWER,
};

/// Smoothed gaze estimator.
#[derive(Debug, Clone)]
pub struct GazeTracker {
    /// Camera frame width in pixels.
    pub frame_width: f64,
    /// Camera frame height in pixels.
    pub frame_height: f64,
    filter: ExponentialFilter,
}

impl GazeTracker {
    pub fn new(alpha: f64, frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width: frame_width as f64,
            frame_height: frame_height as f64,
            filter: ExponentialFilter::new(alpha),
        }
    }

    /// Landmark position in frame pixels.  Caller guarantees `idx` is in range.
    fn pixel(&self, face: &LandmarkSet, idx: usize) -> Point2D {
        let p = face.get(idx).unwrap_or_default();
        Point2D::new(p.x * self.frame_width, p.y * self.frame_height)
    }

    /// Iris position within the eye opening, per axis, unclamped.
    fn eye_ratio(&self, face: &LandmarkSet, eye: &EyeRegion) -> Point2D {
        let iris = eye.iris.map(|i| self.pixel(face, i));
        let cx = iris.iter().map(|p| p.x).sum::<f64>() / iris.len() as f64;
        let cy = iris.iter().map(|p| p.y).sum::<f64>() / iris.len() as f64;

        let a = self.pixel(face, eye.corner_a).x;
        let b = self.pixel(face, eye.corner_b).x;
        let upper = self.pixel(face, eye.lid_upper).y;
        let lower = self.pixel(face, eye.lid_lower).y;

        Point2D::new(
            normalized_ratio(cx, a.min(b), a.max(b)),
            normalized_ratio(cy, upper.min(lower), upper.max(lower)),
        )
    }

    /// Unsmoothed gaze for one face, or None if the mesh lacks iris points.
    pub fn raw_gaze(&self, face: &LandmarkSet) -> Option<Point2D> {
        if !face.is_complete_face() {
            return None;
        }
        let left = self.eye_ratio(face, &LEFT_EYE);
        let right = self.eye_ratio(face, &RIGHT_EYE);
        Some(Point2D::new(
            clamp((left.x + right.x) * 0.5, 0.0, 1.0),
            clamp((left.y + right.y) * 0.5, 0.0, 1.0),
        ))
    }

    /// Estimate smoothed gaze.  An absent or incomplete face resets smoothing.
    pub fn estimate(&mut self, face: Option<&LandmarkSet>) -> Option<Point2D> {
        match face.and_then(|f| self.raw_gaze(f)) {
            Some(gaze) => Some(self.filter.update(gaze)),
            None => {
                if self.filter.value().is_some() {
                    debug!("Gaze lost; smoothing reset");
                }
                self.filter.reset();
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
    }
}
