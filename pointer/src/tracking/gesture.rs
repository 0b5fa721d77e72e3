//! Gesture recognition from hand landmarks.
//!
//! Classifies pinch, two-finger, fist, and open-palm poses per frame, then
//! applies hold-to-confirm timing and click cooldown to turn the raw
//! classification into pointer, click, drag, and scroll intents.
//! Timestamps are supplied by the caller (seconds, monotonic).

use tracing::{debug, warn};

use super::filters::distance_2d;
use super::landmarks::{Finger, HandLandmark, HandView, LandmarkSet, Point2D};

// ── Gesture types ──────────────────────────────────────────

/// Pose recognized for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Hand present, no recognized pose.
    None,
    /// Thumb and index fingertips close together.
    Pinch,
    /// Index and middle extended, ring and pinky curled.
    TwoFingers,
    /// No finger extended.
    Fist,
    /// All four fingers extended.
    OpenPalm,
}

impl GestureKind {
    /// String representation for status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pinch => "pinch",
            Self::TwoFingers => "two-fingers",
            Self::Fist => "fist",
            Self::OpenPalm => "open-palm",
        }
    }
}

/// Classify a hand pose.  Rules are checked in priority order.
pub fn classify(hand: &HandView<'_>, pinch_threshold: f64) -> GestureKind {
    let pinch_distance = distance_2d(
        hand.point(HandLandmark::ThumbTip),
        hand.point(HandLandmark::IndexTip),
    );
    if pinch_distance < pinch_threshold {
        return GestureKind::Pinch;
    }

    let extended = Finger::ALL.map(|f| hand.is_extended(f));
    let count = extended.iter().filter(|&&e| e).count();

    match (extended, count) {
        // [index, middle, ring, pinky]
        ([true, true, false, false], _) => GestureKind::TwoFingers,
        (_, 0) => GestureKind::Fist,
        (_, 4) => GestureKind::OpenPalm,
        _ => GestureKind::None,
    }
}

// ── Events ─────────────────────────────────────────────────

/// Per-frame intent produced by the gesture machine.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentEvent {
    /// False when no (complete) hand was detected this frame.
    pub hand_present: bool,
    /// Raw classification for this frame (`None` when the hand is absent).
    pub gesture: GestureKind,
    /// Whether `gesture` has been held for the confirmation time.
    pub stable: bool,
    /// Open palm: pointer frozen, hands-off pause.
    pub paused: bool,
    /// Pointer target (index fingertip) when pointer movement is active.
    pub pointer: Option<Point2D>,
    pub click: bool,
    pub drag_down: bool,
    pub drag_up: bool,
    pub scroll_mode: bool,
    /// Scroll amount, positive when the fingertip moved up.
    pub scroll_delta: i32,
    /// Drag state after this frame.
    pub dragging: bool,
}

impl IntentEvent {
    fn absent(dragging: bool) -> Self {
        Self {
            hand_present: false,
            gesture: GestureKind::None,
            stable: false,
            paused: false,
            pointer: None,
            click: false,
            drag_down: false,
            drag_up: false,
            scroll_mode: false,
            scroll_delta: 0,
            dragging,
        }
    }

    pub fn pointer_active(&self) -> bool {
        self.pointer.is_some()
    }
}

// ── Config ─────────────────────────────────────────────────

/// Gesture thresholds and timing.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Maximum normalized thumb-index distance for a pinch.
    pub pinch_threshold: f64,
    /// Seconds a pose must persist before it triggers actions.
    pub hold_seconds: f64,
    /// Minimum seconds between two clicks.
    pub click_cooldown_seconds: f64,
    /// Scroll units per normalized fingertip travel (scaled by 100).
    pub scroll_gain: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.055,
            hold_seconds: 0.22,
            click_cooldown_seconds: 0.45,
            scroll_gain: 65.0,
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Frame-to-frame gesture state for the tracked hand.
#[derive(Debug, Clone, Default)]
struct GestureState {
    /// Pose being held; `None` means no hand.
    active: Option<GestureKind>,
    /// Timestamp the current `active` value began.
    started_at: f64,
    /// Timestamp of the last emitted click.
    last_click_at: Option<f64>,
    dragging: bool,
    /// Index-tip y from the previous stable two-finger frame.
    prev_index_y: Option<f64>,
    prev_index: Option<Point2D>,
    /// Set while consecutive frames carry a truncated landmark set.
    short_frames: bool,
}

/// Gesture state machine for a single hand.
pub struct GestureMachine {
    /// Configuration.
    pub config: GestureConfig,
    state: GestureState,
}

impl GestureMachine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
        }
    }

    /// Advance the hold timer.  Returns how long the current value has held.
    fn update_hold(&mut self, kind: Option<GestureKind>, now: f64) -> f64 {
        if kind != self.state.active {
            debug!(
                "Gesture {} -> {}",
                self.state.active.map_or("no-hand", |g| g.as_str()),
                kind.map_or("no-hand", |g| g.as_str()),
            );
            self.state.active = kind;
            self.state.started_at = now;
        }
        now - self.state.started_at
    }

    /// Process one frame.  `hand` is `None` when no hand was detected.
    pub fn update(&mut self, hand: Option<&LandmarkSet>, now: f64) -> IntentEvent {
        let view = match hand {
            Some(set) => {
                let view = HandView::new(set);
                if view.is_none() && !self.state.short_frames {
                    warn!("Hand landmark set has {} points; treating as absent", set.len());
                }
                self.state.short_frames = view.is_none();
                view
            }
            None => {
                self.state.short_frames = false;
                None
            }
        };

        match view {
            Some(view) => self.update_present(&view, now),
            None => self.update_absent(now),
        }
    }

    fn update_absent(&mut self, now: f64) -> IntentEvent {
        self.update_hold(None, now);
        let mut event = IntentEvent::absent(self.state.dragging);

        if self.state.dragging {
            debug!("Hand lost while dragging; releasing");
            event.drag_up = true;
            self.state.dragging = false;
        }
        self.state.prev_index_y = None;
        self.state.prev_index = None;

        event.dragging = self.state.dragging;
        event
    }

    fn update_present(&mut self, hand: &HandView<'_>, now: f64) -> IntentEvent {
        let raw = classify(hand, self.config.pinch_threshold);
        let held_for = self.update_hold(Some(raw), now);
        let stable = held_for >= self.config.hold_seconds;
        let index_tip = hand.point(HandLandmark::IndexTip);

        let mut event = IntentEvent::absent(self.state.dragging);
        event.hand_present = true;
        event.gesture = raw;
        event.stable = stable;
        event.paused = raw == GestureKind::OpenPalm;

        if raw == GestureKind::Pinch && stable {
            let cooled = self
                .state
                .last_click_at
                .map_or(true, |t| now - t >= self.config.click_cooldown_seconds);
            if cooled {
                debug!("Click at {:.3}s", now);
                event.click = true;
                self.state.last_click_at = Some(now);
            }
        }

        if raw == GestureKind::Fist && stable && !self.state.dragging {
            debug!("Drag engaged at {:.3}s", now);
            event.drag_down = true;
            self.state.dragging = true;
        }

        // Release follows the raw pose, not the held one.
        if self.state.dragging && raw != GestureKind::Fist {
            debug!("Drag released at {:.3}s ({})", now, raw.as_str());
            event.drag_up = true;
            self.state.dragging = false;
        }

        if raw == GestureKind::TwoFingers && stable {
            event.scroll_mode = true;
            if let Some(prev_y) = self.state.prev_index_y {
                let delta = (prev_y - index_tip.y) * self.config.scroll_gain * 100.0;
                event.scroll_delta = delta as i32;
            }
            self.state.prev_index_y = Some(index_tip.y);
        } else {
            self.state.prev_index_y = None;
        }

        let fist_holding = raw == GestureKind::Fist && self.state.dragging;
        if raw != GestureKind::OpenPalm && !event.scroll_mode && !fist_holding {
            event.pointer = Some(index_tip);
        }

        self.state.prev_index = Some(index_tip);
        event.dragging = self.state.dragging;
        event
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Pose currently being held, `None` when no hand is tracked.
    pub fn active_gesture(&self) -> Option<GestureKind> {
        self.state.active
    }

    /// Index fingertip from the last frame with a hand.
    pub fn previous_index(&self) -> Option<Point2D> {
        self.state.prev_index
    }

    /// Reset all gesture state.
    pub fn reset(&mut self) {
        self.state = GestureState::default();
    }

    /// Generate s-expression for status output.
    pub fn status_sexp(&self, now: f64) -> String {
        let gesture = self.state.active.map_or("no-hand", |g| g.as_str());
        let held = if self.state.active.is_some() {
            (now - self.state.started_at).max(0.0)
        } else {
            0.0
        };
        format!(
            "(:gesture {} :held-s {:.2} :dragging {} :scrolling {})",
            gesture,
            held,
            if self.state.dragging { "t" } else { "nil" },
            if self.state.prev_index_y.is_some() { "t" } else { "nil" },
        )
    }

    /// Generate s-expression for the active configuration.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:pinch-threshold {:.3} :hold-s {:.2} :click-cooldown-s {:.2} :scroll-gain {:.1})",
            self.config.pinch_threshold,
            self.config.hold_seconds,
            self.config.click_cooldown_seconds,
            self.config.scroll_gain,
        )
    }
}

// ── Test helpers ───────────────────────────────────────────


// ── Tests ──────────────────────────────────────────────────
