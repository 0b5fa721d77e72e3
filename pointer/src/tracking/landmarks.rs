//! Landmark data model for hand and face tracking.
//!
//! Models the 21 hand landmarks and the face-mesh indices (with iris
//! refinement) produced by the external detector.  Coordinates are
//! normalized to the camera frame: (0, 0) top-left, (1, 1) bottom-right,
//! y grows downward.

use serde::{Deserialize, Serialize};

// ── Points ─────────────────────────────────────────────────

/// A 2D point.  Normalized [0,1] or pixels depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(p: (f64, f64)) -> Self {
        Self::new(p.0, p.1)
    }
}

// ── Hand landmarks ─────────────────────────────────────────

/// The 21 hand landmarks, in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Number of landmarks in a complete hand set.
pub const HAND_LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

/// A non-thumb finger, used for the "extended" test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    pub fn tip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexTip,
            Self::Middle => HandLandmark::MiddleTip,
            Self::Ring => HandLandmark::RingTip,
            Self::Pinky => HandLandmark::PinkyTip,
        }
    }

    /// Proximal interphalangeal joint, the bend reference.
    pub fn pip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexPip,
            Self::Middle => HandLandmark::MiddlePip,
            Self::Ring => HandLandmark::RingPip,
            Self::Pinky => HandLandmark::PinkyPip,
        }
    }
}

// ── Face landmarks ─────────────────────────────────────────

/// Minimum face-mesh size with iris refinement.
pub const FACE_LANDMARK_COUNT: usize = 478;

pub const LEFT_IRIS: [usize; 4] = [474, 475, 476, 477];
pub const RIGHT_IRIS: [usize; 4] = [469, 470, 471, 472];
pub const LEFT_EYE_OUTER: usize = 33;
pub const LEFT_EYE_INNER: usize = 133;
pub const RIGHT_EYE_INNER: usize = 362;
pub const RIGHT_EYE_OUTER: usize = 263;
pub const LEFT_EYE_UPPER: usize = 159;
pub const LEFT_EYE_LOWER: usize = 145;
pub const RIGHT_EYE_UPPER: usize = 386;
pub const RIGHT_EYE_LOWER: usize = 374;

// ── Landmark set ───────────────────────────────────────────

/// Ordered landmarks for one frame, indexed by anatomical id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Point2D>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point2D> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Whether this set holds a complete hand.
    pub fn is_complete_hand(&self) -> bool {
        self.points.len() >= HAND_LANDMARK_COUNT
    }

    /// Whether this set holds a complete face mesh with irises.
    pub fn is_complete_face(&self) -> bool {
        self.points.len() >= FACE_LANDMARK_COUNT
    }
}

/// A validated hand: guaranteed to hold all 21 landmarks.
#[derive(Debug, Clone, Copy)]
pub struct HandView<'a> {
    points: &'a [Point2D],
}

impl<'a> HandView<'a> {
    /// Wrap a landmark set, or None if it is too short to be a hand.
    pub fn new(set: &'a LandmarkSet) -> Option<Self> {
        if set.is_complete_hand() {
            Some(Self { points: set.points() })
        } else {
            None
        }
    }

    pub fn point(&self, landmark: HandLandmark) -> Point2D {
        self.points[landmark.index()]
    }

    /// Tip strictly above its pip joint in image space.
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.point(finger.tip()).y < self.point(finger.pip()).y
    }
}
