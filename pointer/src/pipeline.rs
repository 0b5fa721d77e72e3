//! Per-frame processing: landmarks in, cursor commands out.
//!
//! One `process` call runs a complete pass for one frame:
//!
//! 1. gate the hand on detector confidence, update the gesture machine
//! 2. estimate gaze; feed an active calibration session
//! 3. pick the pointer target (fingertip or calibrated gaze)
//! 4. map, smooth and step the cursor toward it
//! 5. dispatch click, drag and scroll commands
//! 6. record frame timing
//!
//! Processing is total: every frame produces a report and never fails.

use tracing::{debug, info};

use crate::calibration::{CalibrationProfile, CalibrationSession};
use crate::config::{Config, PointerSource};
use crate::cursor::{CommandSink, CursorController, CursorMapper, CursorSmoother};
use crate::frame_timing::FrameTiming;
use crate::source::{Frame, FrameSource};
use crate::tracking::{GazeTracker, GestureMachine, IntentEvent, LandmarkSet, Point2D};

/// Tracking state shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerStatus {
    /// No usable hand this frame.
    HandLost,
    /// Open palm: pointer released to other input.
    Paused,
    /// Hand tracked and steering.
    PenActive,
}

impl PointerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandLost => "hand-lost",
            Self::Paused => "paused",
            Self::PenActive => "pen-active",
        }
    }

    fn from_intent(intent: &IntentEvent) -> Self {
        if !intent.hand_present {
            Self::HandLost
        } else if intent.paused {
            Self::Paused
        } else {
            Self::PenActive
        }
    }
}

/// Outcome of one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub intent: IntentEvent,
    pub status: PointerStatus,
    /// Smoothed pixel target the cursor stepped toward, if any.
    pub target: Option<(i32, i32)>,
    /// Step actually issued this frame.
    pub step: (i32, i32),
    /// Smoothed, uncalibrated gaze.
    pub gaze: Option<Point2D>,
    /// True on the frame that captured the final calibration point.
    pub calibration_complete: bool,
    pub fps: f64,
}

/// Frames between periodic status log lines in `run`.
const STATUS_INTERVAL_FRAMES: u64 = 300;

/// Totals for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub hand_lost_frames: u64,
    pub clicks: u64,
    pub drags: u64,
    pub fps: f64,
}

impl RunSummary {
    pub fn sexp(&self) -> String {
        format!(
            "(:frames {} :hand-lost {} :clicks {} :drags {} :fps {:.1})",
            self.frames, self.hand_lost_frames, self.clicks, self.drags, self.fps,
        )
    }
}

/// The gesture-to-cursor pipeline.
pub struct Pipeline {
    pointer_source: PointerSource,
    min_hand_score: f64,
    gestures: GestureMachine,
    smoother: CursorSmoother,
    mapper: CursorMapper,
    controller: CursorController,
    gaze: GazeTracker,
    profile: CalibrationProfile,
    calibration: Option<CalibrationSession>,
    timing: FrameTiming,
    last_timestamp: f64,
    /// Frames whose hand was dropped for low confidence.
    pub low_confidence_hands: u64,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        info!(
            "Pipeline: source={} screen={}x{} max_step={}",
            config.pointer_source.as_str(),
            config.screen_width,
            config.screen_height,
            config.max_cursor_step_px,
        );
        Self {
            pointer_source: config.pointer_source,
            min_hand_score: config.hand_min_tracking_confidence,
            gestures: GestureMachine::new(config.gesture_config()),
            smoother: CursorSmoother::new(config.smoothing_alpha, config.moving_average_window),
            mapper: CursorMapper::new(config.mapper_config()),
            controller: CursorController::new(config.max_cursor_step_px),
            gaze: GazeTracker::new(config.gaze_alpha, config.frame_width, config.frame_height),
            profile: CalibrationProfile::identity(),
            calibration: None,
            timing: FrameTiming::default(),
            last_timestamp: 0.0,
            low_confidence_hands: 0,
        }
    }

    pub fn pointer_source(&self) -> PointerSource {
        self.pointer_source
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Replace the gaze correction wholesale.
    pub fn set_profile(&mut self, profile: CalibrationProfile) {
        debug!("Calibration profile set: {}", profile.sexp());
        self.profile = profile;
    }

    pub fn gestures(&self) -> &GestureMachine {
        &self.gestures
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    // ── Calibration ────────────────────────────────────────

    /// Begin a fresh calibration run, discarding any previous one.
    pub fn start_calibration(&mut self) {
        let mut session = CalibrationSession::new();
        session.start();
        self.calibration = Some(session);
    }

    pub fn calibration(&self) -> Option<&CalibrationSession> {
        self.calibration.as_ref()
    }

    /// Fit and install a profile from the current session.  Returns None
    /// when there is no session to finish.
    pub fn finish_calibration(&mut self) -> Option<CalibrationProfile> {
        let session = self.calibration.take()?;
        let profile = session.build_profile();
        self.set_profile(profile);
        Some(profile)
    }

    /// Drop the current session without changing the profile.
    pub fn cancel_calibration(&mut self) {
        if self.calibration.take().is_some() {
            info!("Calibration cancelled");
        }
    }

    // ── Frame pass ─────────────────────────────────────────

    /// Hand landmarks, or None when missing or below the tracking threshold.
    fn gate_hand<'a>(&mut self, frame: &'a Frame) -> Option<&'a LandmarkSet> {
        let hand = frame.hand.as_ref()?;
        match frame.hand_score {
            Some(score) if !(score >= self.min_hand_score) => {
                self.low_confidence_hands += 1;
                debug!(
                    "Hand score {:.2} below {:.2}; treating as absent",
                    score, self.min_hand_score
                );
                None
            }
            _ => Some(hand),
        }
    }

    /// Normalized screen point the cursor should follow this frame.
    fn pointer_target(&self, intent: &IntentEvent, gaze: Option<Point2D>) -> Option<(i32, i32)> {
        match self.pointer_source {
            PointerSource::Hand => intent.pointer.map(|p| self.mapper.to_screen(p)),
            PointerSource::Gaze => {
                if intent.paused || intent.scroll_mode {
                    return None;
                }
                gaze.map(|g| self.mapper.pixels(self.profile.apply(g)))
            }
        }
    }

    /// Run one frame through the pipeline.
    pub fn process(&mut self, frame: &Frame, sink: &mut dyn CommandSink) -> FrameReport {
        let now = frame.timestamp;
        self.last_timestamp = now;

        let hand = self.gate_hand(frame);
        let intent = self.gestures.update(hand, now);

        let gaze = self.gaze.estimate(frame.face.as_ref());
        let mut calibration_complete = false;
        if let Some(session) = self.calibration.as_mut().filter(|s| s.is_active()) {
            session.add_sample(gaze);
            if frame.capture {
                calibration_complete = session.capture_current_point();
            }
        }

        let mut step = (0, 0);
        let target = match self.pointer_target(&intent, gaze) {
            Some((x, y)) => {
                let smoothed = self.smoother.update(Point2D::new(x as f64, y as f64));
                let target = (smoothed.x as i32, smoothed.y as i32);
                step = self.controller.move_toward(sink, target);
                Some(target)
            }
            None => {
                self.smoother.reset();
                None
            }
        };

        if intent.click {
            self.controller.left_click(sink);
        }
        if intent.drag_down {
            self.controller.drag_down(sink);
        }
        if intent.drag_up {
            self.controller.drag_up(sink);
        }
        if intent.scroll_mode && intent.scroll_delta != 0 {
            self.controller.scroll(sink, intent.scroll_delta);
        }

        self.timing.record_frame(now);

        FrameReport {
            status: PointerStatus::from_intent(&intent),
            intent,
            target,
            step,
            gaze,
            calibration_complete,
            fps: self.timing.fps(),
        }
    }

    /// Process frames until the source is exhausted, then release held
    /// state.
    pub fn run(&mut self, source: &mut dyn FrameSource, sink: &mut dyn CommandSink) -> RunSummary {
        let mut summary = RunSummary::default();
        while let Some(frame) = source.next_frame() {
            let report = self.process(&frame, sink);
            summary.frames += 1;
            if report.status == PointerStatus::HandLost {
                summary.hand_lost_frames += 1;
            }
            summary.clicks += report.intent.click as u64;
            summary.drags += report.intent.drag_down as u64;
            if report.calibration_complete {
                info!("Calibration points captured at {:.3}s", frame.timestamp);
            }
            if summary.frames % STATUS_INTERVAL_FRAMES == 0 {
                info!(
                    "Status: frames={} fps={:.1} status={}",
                    summary.frames,
                    report.fps,
                    report.status.as_str()
                );
            }
        }
        self.shutdown(sink);
        summary.fps = self.timing.fps();
        summary
    }

    /// Release held state, e.g. when input ends mid-drag.
    pub fn shutdown(&mut self, sink: &mut dyn CommandSink) {
        if self.gestures.is_dragging() {
            info!("Releasing drag on shutdown");
            self.controller.drag_up(sink);
        }
        self.gestures.reset();
        self.smoother.reset();
        self.gaze.reset();
    }

    /// Generate s-expression for status output.
    pub fn status_sexp(&self) -> String {
        let calibration = match &self.calibration {
            Some(session) => session.status_sexp(),
            None => "nil".to_string(),
        };
        format!(
            "(:type :response :status :ok :source {} :gestures {} :timing {} :profile {} :calibration {} :low-confidence {})",
            self.pointer_source.as_str(),
            self.gestures.status_sexp(self.last_timestamp),
            self.timing.stats_sexp(),
            self.profile.sexp(),
            calibration,
            self.low_confidence_hands,
        )
    }
}
