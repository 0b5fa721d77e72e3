//! Two-stage cursor trajectory smoothing.

use crate::tracking::filters::{ExponentialFilter, MovingAverageFilter};
use crate::tracking::landmarks::Point2D;

/// Exponential filter feeding a trailing moving average.
///
/// Call `reset` whenever pointer tracking is interrupted so history from
/// the previous run does not drag the next one.
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    exp: ExponentialFilter,
    avg: MovingAverageFilter,
}

impl CursorSmoother {
    pub fn new(alpha: f64, window_size: usize) -> Self {
        Self {
            exp: ExponentialFilter::new(alpha),
            avg: MovingAverageFilter::new(window_size),
        }
    }

    pub fn update(&mut self, point: Point2D) -> Point2D {
        self.avg.update(self.exp.update(point))
    }

    pub fn reset(&mut self) {
        self.exp.reset();
        self.avg.reset();
    }

    /// Whether either stage holds history.
    pub fn is_primed(&self) -> bool {
        self.exp.value().is_some() || !self.avg.is_empty()
    }
}
