// A stand-in for the hand tracker: plausible 21-point hands built from the
// mouse and keyboard, so the app runs without a detector. Tests use the same
// geometry as fixtures.
// Visual expectation: the cursor follows the mouse and the held key picks the pose.

use crate::error::Result;
use crate::landmarks::{LANDMARK_COUNT, LandmarkSnapshot, LandmarkSource};
use crate::pose::FingerState;
use crate::types::Point2D;

/// Thumb reach used for every pose except the pinch.
pub const DEFAULT_THUMB_REACH: i32 = 40;
const MIN_THUMB_REACH: i32 = 1;
const MAX_THUMB_REACH: i32 = 190;

// Upright right hand seen in a mirrored image: index column on the left,
// pinky on the right, thumb sticking out to the left.
const FINGER_COLUMNS: [i32; 4] = [0, 22, 44, 64]; // index, middle, ring, pinky
const KNUCKLE_DROP: i32 = 90; // extended fingertip to knuckle row

/// Build an upright hand whose index fingertip (if extended) sits at `index_tip`.
/// `thumb_reach` is how far an extended thumb tip sticks out past its IP joint.
pub fn hand_at(index_tip: Point2D, fingers: FingerState, thumb_reach: i32) -> LandmarkSnapshot {
    let (x, y) = (index_tip.x, index_tip.y);
    let by = y + KNUCKLE_DROP;
    let mut pts = [Point2D::default(); LANDMARK_COUNT];

    pts[0] = Point2D::new(x + 32, by + 80); // wrist

    // Thumb: CMC, MCP, IP, TIP
    pts[1] = Point2D::new(x + 15, by + 60);
    pts[2] = Point2D::new(x, by + 45);
    pts[3] = Point2D::new(x - 10, by + 25);
    pts[4] = if fingers.0[0] {
        Point2D::new(x - 10 - thumb_reach, y + 20)
    } else {
        Point2D::new(x + 5, by + 10)
    };

    // Fingers: MCP, PIP, DIP, TIP
    for (f, &dx) in FINGER_COLUMNS.iter().enumerate() {
        let cx = x + dx;
        let base = 5 + f * 4;
        pts[base] = Point2D::new(cx, by);
        pts[base + 1] = Point2D::new(cx, by - 35);
        if fingers.0[f + 1] {
            pts[base + 2] = Point2D::new(cx, by - 60);
            pts[base + 3] = Point2D::new(cx, by - KNUCKLE_DROP);
        } else {
            pts[base + 2] = Point2D::new(cx, by - 20);
            pts[base + 3] = Point2D::new(cx, by - 5);
        }
    }

    LandmarkSnapshot::new(pts.to_vec())
}

/// Poses the simulator can hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimPose {
    /// Hand in view, no recognised pose.
    #[default]
    Relaxed,
    Point,
    Peace,
    Pinch,
    OpenPalm,
    Fist,
}

impl SimPose {
    pub fn fingers(self) -> FingerState {
        FingerState::from_bits(match self {
            SimPose::Relaxed => 0b01110,
            SimPose::Point => 0b01000,
            SimPose::Peace => 0b01100,
            SimPose::Pinch => 0b11000,
            SimPose::OpenPalm => 0b11111,
            SimPose::Fist => 0b00000,
        })
    }
}

/// Pointer-driven hand. The window glue feeds it input once per frame.
#[derive(Debug)]
pub struct SimulatedHand {
    cursor: Option<Point2D>,
    pose: SimPose,
    reach: i32,
}

impl Default for SimulatedHand {
    fn default() -> Self {
        Self { cursor: None, pose: SimPose::Relaxed, reach: DEFAULT_THUMB_REACH }
    }
}

impl SimulatedHand {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cursor = None` takes the hand out of view. `scroll` widens (positive)
    /// or narrows the pinch.
    pub fn update(&mut self, cursor: Option<Point2D>, pose: SimPose, scroll: f32) {
        self.cursor = cursor;
        self.pose = pose;
        self.reach = (self.reach + scroll.round() as i32).clamp(MIN_THUMB_REACH, MAX_THUMB_REACH);
    }

    pub fn thumb_reach(&self) -> i32 {
        self.reach
    }
}

impl LandmarkSource for SimulatedHand {
    fn next_snapshot(&mut self) -> Result<Option<LandmarkSnapshot>> {
        let reach = if self.pose == SimPose::Pinch { self.reach } else { DEFAULT_THUMB_REACH };
        Ok(self.cursor.map(|at| hand_at(at, self.pose.fingers(), reach)))
    }
}
