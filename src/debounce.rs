// Frame-to-frame gesture smoothing.
// A raw gesture must be seen for `confirm_frames` frames in a row before it
// counts, and ends the first frame the raw reading differs.
// Visual expectation: a pose flickering for a frame or two changes nothing
// on screen; holding it steady switches the mode.

use tracing::debug;

use crate::pose::Gesture;

/// Frames a raw gesture must persist before it is confirmed.
pub const CONFIRM_FRAMES: u32 = 3;

/// Where the confirmed gesture is in its life this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Edge {
    /// Nothing confirmed and nothing just ended.
    #[default]
    Quiet,
    /// `gesture` became confirmed this frame.
    Rising,
    /// `gesture` was already confirmed and is still held.
    Held,
    /// The previous gesture ended this frame and nothing replaced it yet.
    Falling,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebouncedGestureState {
    /// Confirmed gesture, `Gesture::None` when nothing is confirmed.
    pub gesture: Gesture,
    /// Consecutive raw frames of `gesture` so far (0 while nothing is confirmed).
    pub frames: u32,
    pub edge: Edge,
    /// The gesture that ended on this frame, if any.
    pub exited: Option<Gesture>,
}

impl DebouncedGestureState {
    /// `g` was confirmed on exactly this frame.
    pub fn is_rising(&self, g: Gesture) -> bool {
        self.edge == Edge::Rising && self.gesture == g
    }

    /// `g` is confirmed (newly or still held).
    pub fn is_active(&self, g: Gesture) -> bool {
        self.gesture == g && matches!(self.edge, Edge::Rising | Edge::Held)
    }

    /// The confirmed gesture should fire its action this frame: every held
    /// frame for level gestures, the rising frame only for one-shot ones.
    pub fn fires(&self, g: Gesture) -> bool {
        if g.is_edge_triggered() { self.is_rising(g) } else { self.is_active(g) }
    }
}

#[derive(Debug, Clone)]
pub struct GestureDebouncer {
    confirm_frames: u32,
    candidate: Gesture,
    run: u32,
    confirmed: Gesture,
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        Self::new(CONFIRM_FRAMES)
    }
}

impl GestureDebouncer {
    /// `confirm_frames` below 1 is treated as 1.
    pub fn new(confirm_frames: u32) -> Self {
        Self {
            confirm_frames: confirm_frames.max(1),
            candidate: Gesture::None,
            run: 0,
            confirmed: Gesture::None,
        }
    }

    pub fn confirm_frames(&self) -> u32 {
        self.confirm_frames
    }

    pub fn confirmed(&self) -> Gesture {
        self.confirmed
    }

    /// Feed this frame's raw gesture. No hand counts as `Gesture::None`.
    pub fn update(&mut self, raw: Gesture) -> DebouncedGestureState {
        if raw == self.candidate {
            self.run = self.run.saturating_add(1);
        } else {
            self.candidate = raw;
            self.run = 1;
        }

        let mut exited = None;
        if self.confirmed != Gesture::None && raw != self.confirmed {
            exited = Some(self.confirmed);
            debug!(gesture = %self.confirmed, "gesture ended");
            self.confirmed = Gesture::None;
        }

        let mut edge = if exited.is_some() { Edge::Falling } else { Edge::Quiet };
        if raw != Gesture::None {
            if self.confirmed == raw {
                edge = Edge::Held;
            } else if self.run >= self.confirm_frames {
                self.confirmed = raw;
                edge = Edge::Rising;
                debug!(gesture = %raw, frames = self.run, "gesture confirmed");
            }
        }

        DebouncedGestureState {
            gesture: self.confirmed,
            frames: if self.confirmed == Gesture::None { 0 } else { self.run },
            edge,
            exited,
        }
    }

    /// Forget everything, as if the hand had never been seen.
    pub fn reset(&mut self) {
        self.candidate = Gesture::None;
        self.run = 0;
        self.confirmed = Gesture::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(d: &mut GestureDebouncer, seq: &[Gesture]) -> Vec<DebouncedGestureState> {
        seq.iter().map(|&g| d.update(g)).collect()
    }

    #[test]
    fn short_flicker_never_confirms() {
        let mut d = GestureDebouncer::new(CONFIRM_FRAMES);
        let mut seq = vec![Gesture::Draw; (CONFIRM_FRAMES - 1) as usize];
        seq.push(Gesture::None);
        seq.push(Gesture::None);

        for s in feed(&mut d, &seq) {
            assert_ne!(s.edge, Edge::Rising);
            assert_eq!(s.gesture, Gesture::None);
        }
    }

    #[test]
    fn confirms_on_the_nth_frame() {
        let mut d = GestureDebouncer::new(3);
        let states = feed(&mut d, &[Gesture::Select; 5]);
        assert_eq!(states[1].gesture, Gesture::None);
        assert!(states[2].is_rising(Gesture::Select));
        assert_eq!(states[2].frames, 3);
        assert_eq!(states[4].edge, Edge::Held);
        assert_eq!(states[4].frames, 5);
    }

    #[test]
    fn held_clear_fires_once() {
        let mut d = GestureDebouncer::new(3);
        let mut seq = vec![Gesture::ClearAll; 2];
        seq.extend([Gesture::ClearAll; 10]);
        let fired = feed(&mut d, &seq).iter().filter(|s| s.fires(Gesture::ClearAll)).count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn level_gestures_fire_every_held_frame() {
        let mut d = GestureDebouncer::new(2);
        let fired = feed(&mut d, &[Gesture::Draw; 6]).iter().filter(|s| s.fires(Gesture::Draw)).count();
        assert_eq!(fired, 5);
    }

    #[test]
    fn direct_switch_ends_previous_and_restarts_count() {
        let mut d = GestureDebouncer::new(2);
        feed(&mut d, &[Gesture::Draw, Gesture::Draw]);
        assert_eq!(d.confirmed(), Gesture::Draw);

        let s = d.update(Gesture::Select);
        assert_eq!(s.edge, Edge::Falling);
        assert_eq!(s.exited, Some(Gesture::Draw));
        assert_eq!(s.gesture, Gesture::None);

        let s = d.update(Gesture::Select);
        assert!(s.is_rising(Gesture::Select));
        assert_eq!(s.exited, None);
    }

    #[test]
    fn single_frame_confirmation_switches_in_one_frame() {
        let mut d = GestureDebouncer::new(1);
        assert!(d.update(Gesture::Draw).is_rising(Gesture::Draw));
        let s = d.update(Gesture::Fist);
        assert!(s.is_rising(Gesture::Fist));
        assert_eq!(s.exited, Some(Gesture::Draw));
    }

    #[test]
    fn lost_hand_ends_gesture_immediately() {
        let mut d = GestureDebouncer::new(2);
        feed(&mut d, &[Gesture::Fist; 4]);
        let s = d.update(Gesture::None);
        assert_eq!(s.edge, Edge::Falling);
        assert_eq!(s.exited, Some(Gesture::Fist));
        assert_eq!(d.update(Gesture::None).edge, Edge::Quiet);
    }

    #[test]
    fn reset_forgets_partial_runs() {
        let mut d = GestureDebouncer::new(3);
        feed(&mut d, &[Gesture::Draw, Gesture::Draw]);
        d.reset();
        assert_eq!(d.update(Gesture::Draw).gesture, Gesture::None);
    }
}
