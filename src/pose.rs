// Static finger-pose classification: a 21-point hand in, five "is this
// finger extended" flags and one Gesture out. Nothing here remembers frames.
// Visual expectation: none directly; the HUD mode name follows what this
// reports once the debouncer agrees.

use std::fmt;

use crate::error::Result;
use crate::landmarks::{
    INDEX_MCP, LANDMARK_COUNT, MIDDLE_MCP, PINKY_MCP, THUMB_IP, THUMB_TIP, TIP_IDS, WRIST,
    LandmarkSnapshot,
};
use crate::types::Point2D;

/// `[thumb, index, middle, ring, pinky]`, `true` = extended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    /// Bit 4 is the thumb, bit 0 the pinky, so `0b01000` is "index only".
    pub const fn from_bits(bits: u8) -> Self {
        let mut fingers = [false; 5];
        let mut i = 0;
        while i < 5 {
            fingers[i] = bits & (1 << (4 - i)) != 0;
            i += 1;
        }
        Self(fingers)
    }

    pub fn thumb(self) -> bool {
        self.0[0]
    }

    pub fn index(self) -> bool {
        self.0[1]
    }

    /// How many fingers are up (0..=5).
    pub fn count(self) -> usize {
        self.0.iter().filter(|&&up| up).count()
    }
}

impl fmt::Display for FingerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [t, i, m, r, p] = self.0.map(u8::from);
        write!(f, "[{t},{i},{m},{r},{p}]")
    }
}

/// The closed set of poses the app reacts to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    Draw,
    Select,
    PinchAdjust,
    ClearAll,
    Fist,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::None,
        Gesture::Draw,
        Gesture::Select,
        Gesture::PinchAdjust,
        Gesture::ClearAll,
        Gesture::Fist,
    ];

    /// One-shot gestures act on their rising edge only; the rest act every
    /// frame they are held.
    pub fn is_edge_triggered(self) -> bool {
        matches!(self, Gesture::ClearAll)
    }

    pub fn name(self) -> &'static str {
        match self {
            Gesture::None => "none",
            Gesture::Draw => "draw",
            Gesture::Select => "select",
            Gesture::PinchAdjust => "pinch",
            Gesture::ClearAll => "clear",
            Gesture::Fist => "fist",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Finger flags for this frame's hand; `Ok(None)` when no hand was seen.
/// A snapshot without exactly 21 points is rejected as malformed.
pub fn classify(snapshot: Option<&LandmarkSnapshot>) -> Result<Option<FingerState>> {
    match snapshot {
        None => Ok(None),
        Some(s) => Ok(Some(finger_state(s.hand()?))),
    }
}

/// Map finger flags to a gesture. The thumb-out pinch pattern is matched
/// exactly, so "index only" means thumb tucked.
pub fn gesture_for(fingers: FingerState) -> Gesture {
    match fingers.0 {
        [false, true, false, false, false] => Gesture::Draw,
        [true, true, false, false, false] => Gesture::PinchAdjust,
        [_, true, true, false, false] => Gesture::Select,
        [true, true, true, true, true] => Gesture::ClearAll,
        [false, false, false, false, false] => Gesture::Fist,
        _ => Gesture::None,
    }
}

/// `classify` then `gesture_for`; no hand reads as `Gesture::None`.
pub fn classify_gesture(snapshot: Option<&LandmarkSnapshot>) -> Result<Gesture> {
    Ok(classify(snapshot)?.map_or(Gesture::None, gesture_for))
}

/// Which way the hand points, reduced to its dominant image axis.
#[derive(Clone, Copy, Debug)]
struct HandAxis {
    horizontal: bool,
    // +1 / -1 along the dominant axis, wrist towards knuckles
    dir: i32,
}

impl HandAxis {
    fn of(hand: &[Point2D; LANDMARK_COUNT]) -> Self {
        let Point2D { x: ax, y: ay } = delta(hand[WRIST], hand[MIDDLE_MCP]);
        if ax.unsigned_abs() > ay.unsigned_abs() {
            Self { horizontal: true, dir: ax.signum() }
        } else if ay != 0 {
            Self { horizontal: false, dir: ay.signum() }
        } else {
            // degenerate hand; read it as upright
            Self { horizontal: false, dir: -1 }
        }
    }

    fn along(self, v: Point2D) -> i32 {
        if self.horizontal { v.x } else { v.y }
    }

    fn across(self, v: Point2D) -> i32 {
        if self.horizontal { v.y } else { v.x }
    }
}

fn delta(from: Point2D, to: Point2D) -> Point2D {
    Point2D::new(to.x.saturating_sub(from.x), to.y.saturating_sub(from.y))
}

/// Fingers: the tip lies further along the wrist→knuckle axis than the PIP
/// joint. Thumb: the tip lies further to the thumb side (away from the pinky)
/// than the IP joint.
pub fn finger_state(hand: &[Point2D; LANDMARK_COUNT]) -> FingerState {
    let axis = HandAxis::of(hand);
    let mut fingers = [false; 5];

    let thumb_side = axis.across(delta(hand[PINKY_MCP], hand[INDEX_MCP])).signum();
    let thumb_reach = axis.across(delta(hand[THUMB_IP], hand[THUMB_TIP]));
    fingers[0] = if thumb_side == 0 {
        hand[THUMB_TIP].x < hand[THUMB_IP].x
    } else {
        thumb_reach.signum() == thumb_side
    };

    for (slot, &tip) in fingers.iter_mut().zip(TIP_IDS.iter()).skip(1) {
        let pip = tip - 2;
        *slot = axis.along(delta(hand[pip], hand[tip])).signum() == axis.dir;
    }

    FingerState(fingers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sim::hand_at;

    const TABLE: [(u8, Gesture); 7] = [
        (0b01000, Gesture::Draw),
        (0b01100, Gesture::Select),
        (0b11100, Gesture::Select),
        (0b11000, Gesture::PinchAdjust),
        (0b11111, Gesture::ClearAll),
        (0b00000, Gesture::Fist),
        (0b00111, Gesture::None),
    ];

    #[test]
    fn table_patterns_map_to_listed_gestures() {
        for (bits, expected) in TABLE {
            let fingers = FingerState::from_bits(bits);
            assert_eq!(gesture_for(fingers), expected, "pattern {fingers}");
        }
    }

    #[test]
    fn every_pattern_maps_to_exactly_one_gesture() {
        let mut seen = std::collections::HashMap::new();
        for bits in 0u8..32 {
            let g = gesture_for(FingerState::from_bits(bits));
            assert!(Gesture::ALL.contains(&g));
            *seen.entry(g).or_insert(0) += 1;
        }
        assert_eq!(seen.values().sum::<i32>(), 32);
        assert_eq!(seen[&Gesture::Draw], 1);
        assert_eq!(seen[&Gesture::Select], 2);
        assert_eq!(seen[&Gesture::PinchAdjust], 1);
        assert_eq!(seen[&Gesture::ClearAll], 1);
        assert_eq!(seen[&Gesture::Fist], 1);
        assert_eq!(seen[&Gesture::None], 26);
    }

    #[test]
    fn synthetic_hands_classify_back_to_their_pose() {
        for bits in 0u8..32 {
            let fingers = FingerState::from_bits(bits);
            let snap = hand_at(Point2D::new(200, 150), fingers, 40);
            assert_eq!(classify(Some(&snap)).unwrap(), Some(fingers), "pattern {fingers}");
        }
    }

    #[test]
    fn classification_follows_hand_rotation() {
        // Rotate an upright hand a quarter turn so it points along the x axis.
        for bits in [0b01000, 0b11000, 0b11111, 0b00000, 0b10101] {
            let fingers = FingerState::from_bits(bits);
            let upright = hand_at(Point2D::new(200, 150), fingers, 40);
            let sideways = LandmarkSnapshot::new(
                upright.points().iter().map(|p| Point2D::new(-p.y, p.x)).collect(),
            );
            assert_eq!(classify(Some(&sideways)).unwrap(), Some(fingers), "pattern {fingers}");
        }
    }

    #[test]
    fn absent_hand_is_no_gesture() {
        assert_eq!(classify(None).unwrap(), None);
        assert_eq!(classify_gesture(None).unwrap(), Gesture::None);
    }

    #[test]
    fn short_snapshot_fails_fast() {
        let snap = LandmarkSnapshot::new(vec![Point2D::default(); 19]);
        assert!(matches!(
            classify(Some(&snap)),
            Err(Error::MalformedSnapshot { expected: 21, got: 19 })
        ));
    }

    #[test]
    fn finger_count_and_display() {
        let f = FingerState::from_bits(0b01100);
        assert_eq!(f.count(), 2);
        assert_eq!(f.to_string(), "[0,1,1,0,0]");
        assert!(f.index() && !f.thumb());
    }
}
