//! Numeric primitives and point filters shared by the gaze and cursor paths.

use std::collections::VecDeque;

use super::landmarks::Point2D;

/// Denominators below this are treated as zero-length ranges.
const RATIO_EPSILON: f64 = 1e-6;

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Euclidean distance between two points.
pub fn distance_2d(a: Point2D, b: Point2D) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Position of `value` within `[start, end]` as a fraction.
///
/// Returns 0.5 for a zero-length range.  The result is not clamped.
pub fn normalized_ratio(value: f64, start: f64, end: f64) -> f64 {
    let denom = end - start;
    if denom.abs() < RATIO_EPSILON {
        return 0.5;
    }
    (value - start) / denom
}

// ── Exponential filter ─────────────────────────────────────

/// Single-pole low-pass filter: `new = alpha * sample + (1 - alpha) * prev`.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    /// Weight of the newest sample (1.0 = no smoothing).
    pub alpha: f64,
    value: Option<Point2D>,
}

impl ExponentialFilter {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    /// Feed a sample.  The first sample after a reset passes through.
    pub fn update(&mut self, point: Point2D) -> Point2D {
        let next = match self.value {
            Some(prev) => Point2D::new(
                lerp(prev.x, point.x, self.alpha),
                lerp(prev.y, point.y, self.alpha),
            ),
            None => point,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<Point2D> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

// ── Moving average ─────────────────────────────────────────

/// Trailing arithmetic mean over the last `window_size` points.
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    window_size: usize,
    buffer: VecDeque<Point2D>,
}

impl MovingAverageFilter {
    /// A window of 0 behaves as a window of 1.
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }

    pub fn update(&mut self, point: Point2D) -> Point2D {
        self.buffer.push_back(point);
        while self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }
        let count = self.buffer.len() as f64;
        let (sx, sy) = self
            .buffer
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2D::new(sx / count, sy / count)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of points currently held.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
