//! Frame timing from the per-frame timestamps.
//!
//! Uses the timestamps carried by the frames rather than a wall clock, so
//! replayed input reports the rate it was recorded at.

use std::collections::VecDeque;

/// Shortest interval counted, so a repeated timestamp cannot divide by zero.
const MIN_INTERVAL_S: f64 = 1e-6;

/// Rolling frame interval statistics.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Recent frame intervals in seconds.
    pub intervals: VecDeque<f64>,
    /// Maximum number of intervals to keep.
    pub window_size: usize,
    /// Total frames recorded.
    pub total_frames: u64,
    /// Intervals that were zero or negative (out-of-order timestamps).
    pub clamped_intervals: u64,
    last_timestamp: Option<f64>,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameTiming {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            intervals: VecDeque::with_capacity(window_size),
            window_size,
            total_frames: 0,
            clamped_intervals: 0,
            last_timestamp: None,
        }
    }

    /// Record a frame at `timestamp` seconds.
    pub fn record_frame(&mut self, timestamp: f64) {
        if let Some(prev) = self.last_timestamp {
            let mut interval = timestamp - prev;
            if !(interval > 0.0) {
                self.clamped_intervals += 1;
                interval = MIN_INTERVAL_S;
            }
            self.intervals.push_back(interval.max(MIN_INTERVAL_S));
            if self.intervals.len() > self.window_size {
                self.intervals.pop_front();
            }
        }
        self.last_timestamp = Some(timestamp);
        self.total_frames += 1;
    }

    /// Mean interval over the window in milliseconds, 0 with no intervals.
    pub fn mean_interval_ms(&self) -> f64 {
        if self.intervals.is_empty() {
            return 0.0;
        }
        self.intervals.iter().sum::<f64>() / self.intervals.len() as f64 * 1000.0
    }

    /// Frames per second over the window; 0 before the second frame.
    pub fn fps(&self) -> f64 {
        let mean_ms = self.mean_interval_ms();
        if mean_ms > 0.0 {
            1000.0 / mean_ms
        } else {
            0.0
        }
    }

    /// Rate implied by the most recent interval alone.
    pub fn instant_fps(&self) -> f64 {
        self.intervals.back().map_or(0.0, |dt| 1.0 / dt)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.window_size);
    }

    /// Format stats as an s-expression.
    pub fn stats_sexp(&self) -> String {
        format!(
            "(:fps {:.1} :interval-ms {:.1} :total-frames {} :clamped {})",
            self.fps(),
            self.mean_interval_ms(),
            self.total_frames,
            self.clamped_intervals,
        )
    }
}
