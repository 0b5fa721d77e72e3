//! Gaze calibration: a guided five-point session and the per-axis affine
//! profile it produces.
//!
//! The fit is a min/max bounding-box match between observed and expected
//! points, independently per axis.  A single extreme outlier moves the
//! whole fit.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::source::FrameSource;
use crate::tracking::filters::clamp;
use crate::tracking::landmarks::Point2D;
use crate::tracking::GazeTracker;

/// Screen targets, in visiting order.
pub const CALIBRATION_POINTS: [Point2D; 5] = [
    Point2D { x: 0.1, y: 0.1 },
    Point2D { x: 0.9, y: 0.1 },
    Point2D { x: 0.5, y: 0.5 },
    Point2D { x: 0.1, y: 0.9 },
    Point2D { x: 0.9, y: 0.9 },
];

/// Samples a target needs before it can be captured.
pub const MIN_SAMPLES_PER_POINT: usize = 8;

/// Observed points needed for a fit.
pub const MIN_OBSERVED_POINTS: usize = 3;

/// Observed ranges narrower than this are treated as degenerate.
const DEGENERATE_RANGE: f64 = 1e-4;

// ── Profile ────────────────────────────────────────────────

/// `screen = raw * scale + offset` per axis, clamped to [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::identity()
    }
}

impl CalibrationProfile {
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn apply(&self, raw: Point2D) -> Point2D {
        Point2D::new(
            clamp(raw.x * self.scale_x + self.offset_x, 0.0, 1.0),
            clamp(raw.y * self.scale_y + self.offset_y, 0.0, 1.0),
        )
    }

    /// Write the profile as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize calibration")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write calibration to {}", path.display()))?;
        info!("Calibration saved to {}", path.display());
        Ok(())
    }

    /// Load a profile.  Never fails: a missing or unreadable file gives the
    /// identity profile, and each missing or non-numeric field falls back to
    /// its identity value on its own.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No calibration at {}; using identity", path.display());
                return Self::identity();
            }
            Err(e) => {
                warn!("Cannot read calibration {}: {}; using identity", path.display(), e);
                return Self::identity();
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!("Malformed calibration {}: {}; using identity", path.display(), e);
                return Self::identity();
            }
        };
        let profile = Self::from_json(&value);
        info!(
            "Calibration loaded from {}: {}",
            path.display(),
            profile.sexp()
        );
        profile
    }

    fn from_json(value: &serde_json::Value) -> Self {
        let field = |name: &str, fallback: f64| -> f64 {
            match value.get(name) {
                Some(v) => match v.as_f64().filter(|f| f.is_finite()) {
                    Some(f) => f,
                    None => {
                        warn!("Calibration field {} is not a number: {}", name, v);
                        fallback
                    }
                },
                None => {
                    warn!("Calibration field {} missing", name);
                    fallback
                }
            }
        };
        let id = Self::identity();
        Self {
            scale_x: field("scale_x", id.scale_x),
            scale_y: field("scale_y", id.scale_y),
            offset_x: field("offset_x", id.offset_x),
            offset_y: field("offset_y", id.offset_y),
        }
    }

    pub fn sexp(&self) -> String {
        format!(
            "(:scale-x {:.4} :scale-y {:.4} :offset-x {:.4} :offset-y {:.4})",
            self.scale_x, self.scale_y, self.offset_x, self.offset_y,
        )
    }
}

// ── Session ────────────────────────────────────────────────

/// A five-point calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    active: bool,
    current_index: usize,
    samples: Vec<Vec<Point2D>>,
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationSession {
    /// An inactive session with empty buffers.
    pub fn new() -> Self {
        Self {
            active: false,
            current_index: 0,
            samples: vec![Vec::new(); CALIBRATION_POINTS.len()],
        }
    }

    /// Clear all samples and activate the first target.
    pub fn start(&mut self) {
        self.active = true;
        self.current_index = 0;
        self.samples = vec![Vec::new(); CALIBRATION_POINTS.len()];
        info!("Calibration started ({} points)", CALIBRATION_POINTS.len());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Target the user should be looking at, while active.
    pub fn current_target(&self) -> Option<Point2D> {
        if !self.active {
            return None;
        }
        CALIBRATION_POINTS.get(self.current_index).copied()
    }

    /// Samples gathered for the current target.
    pub fn current_sample_count(&self) -> usize {
        self.samples.get(self.current_index).map_or(0, Vec::len)
    }

    /// Record a raw observation for the current target.  Ignored while
    /// inactive or when the sample is absent.
    pub fn add_sample(&mut self, sample: Option<Point2D>) {
        let Some(point) = sample else { return };
        if !self.active {
            return;
        }
        if let Some(buf) = self.samples.get_mut(self.current_index) {
            buf.push(point);
        }
    }

    /// Advance past the current target once it has enough samples.
    /// Returns true when the final target completes, which ends the session.
    pub fn capture_current_point(&mut self) -> bool {
        if !self.active {
            return false;
        }
        let count = self.current_sample_count();
        if count < MIN_SAMPLES_PER_POINT {
            debug!(
                "Calibration point {} has {} samples, need {}",
                self.current_index, count, MIN_SAMPLES_PER_POINT
            );
            return false;
        }
        info!("Calibration point {} captured ({} samples)", self.current_index, count);
        self.current_index += 1;
        if self.current_index >= CALIBRATION_POINTS.len() {
            self.active = false;
            info!("Calibration collection complete");
            return true;
        }
        false
    }

    /// Mean of each target's samples; targets with no samples are skipped.
    fn observed_points(&self) -> Vec<Point2D> {
        self.samples
            .iter()
            .filter(|buf| !buf.is_empty())
            .map(|buf| {
                let n = buf.len() as f64;
                Point2D::new(
                    buf.iter().map(|p| p.x).sum::<f64>() / n,
                    buf.iter().map(|p| p.y).sum::<f64>() / n,
                )
            })
            .collect()
    }

    /// Fit the profile, consuming the session.  Too few observed points or
    /// a collapsed observed axis yields the identity profile.
    pub fn build_profile(self) -> CalibrationProfile {
        let observed = self.observed_points();
        if observed.len() < MIN_OBSERVED_POINTS {
            warn!(
                "Calibration has {} observed points, need {}; using identity",
                observed.len(),
                MIN_OBSERVED_POINTS
            );
            return CalibrationProfile::identity();
        }

        let (obs_min_x, obs_max_x) = bounds(observed.iter().map(|p| p.x));
        let (obs_min_y, obs_max_y) = bounds(observed.iter().map(|p| p.y));
        let (exp_min_x, exp_max_x) = bounds(CALIBRATION_POINTS.iter().map(|p| p.x));
        let (exp_min_y, exp_max_y) = bounds(CALIBRATION_POINTS.iter().map(|p| p.y));

        if (obs_max_x - obs_min_x).abs() < DEGENERATE_RANGE
            || (obs_max_y - obs_min_y).abs() < DEGENERATE_RANGE
        {
            warn!("Calibration samples span no range on one axis; using identity");
            return CalibrationProfile::identity();
        }

        let scale_x = (exp_max_x - exp_min_x) / (obs_max_x - obs_min_x);
        let scale_y = (exp_max_y - exp_min_y) / (obs_max_y - obs_min_y);
        let profile = CalibrationProfile {
            scale_x,
            scale_y,
            offset_x: exp_min_x - obs_min_x * scale_x,
            offset_y: exp_min_y - obs_min_y * scale_y,
        };
        info!("Calibration fit: {}", profile.sexp());
        profile
    }

    pub fn status_sexp(&self) -> String {
        let target = match self.current_target() {
            Some(p) => format!("({:.2} {:.2})", p.x, p.y),
            None => "nil".to_string(),
        };
        format!(
            "(:active {} :point {} :of {} :samples {} :target {})",
            if self.active { "t" } else { "nil" },
            self.current_index,
            CALIBRATION_POINTS.len(),
            self.current_sample_count(),
            target,
        )
    }
}

// ── Replay ─────────────────────────────────────────────────

/// Run a whole session from recorded frames.  Every frame's gaze is a
/// sample; frames flagged `capture` confirm the current target.  Fails if
/// the frames run out before the last target is captured.
pub fn calibrate_from(
    source: &mut dyn FrameSource,
    tracker: &mut GazeTracker,
) -> anyhow::Result<CalibrationProfile> {
    let mut session = CalibrationSession::new();
    session.start();
    let mut frames = 0u64;

    while let Some(frame) = source.next_frame() {
        frames += 1;
        let gaze = tracker.estimate(frame.face.as_ref());
        session.add_sample(gaze);
        if frame.capture && session.capture_current_point() {
            info!("Calibration finished after {} frames", frames);
            return Ok(session.build_profile());
        }
    }

    anyhow::bail!(
        "Input ended after {} frames with calibration at point {} of {}",
        frames,
        session.current_index() + 1,
        CALIBRATION_POINTS.len()
    )
}

/// (min, max) of a non-empty sequence.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
