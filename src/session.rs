// Per-frame orchestration: hand in, composited frame out.
//
//   Idle --(Draw confirmed)--> Drawing --(held)--> Drawing, one stroke step per frame
//   Idle/Drawing/Selecting/Adjusting --(ClearAll rising)--> Idle, canvas cleared once
//   Idle/Drawing/Selecting --(Fist confirmed)--> Erasing
//   Idle/Drawing/Selecting --(PinchAdjust confirmed)--> Adjusting
//   any --(hand lost / None)--> Idle
//
// Every mode change lifts the pen.
// Visual expectation: the returned frame is what goes to the window.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::brush::{BrushController, BrushSettings, BrushState};
use crate::canvas::{CanvasEngine, CanvasOp};
use crate::debounce::{CONFIRM_FRAMES, DebouncedGestureState, GestureDebouncer};
use crate::error::{Error, Result};
use crate::landmarks::{INDEX_TIP, LANDMARK_COUNT, LandmarkSnapshot, MIDDLE_MCP, THUMB_TIP};
use crate::palette::Swatch;
use crate::pose::{FingerState, Gesture, classify, gesture_for};
use crate::types::{FrameBuffer, Point2D, Rgb};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Idle,
    Drawing,
    Selecting,
    Erasing,
    Adjusting,
}

impl Mode {
    /// Mode a confirmed gesture leads to.
    pub fn for_gesture(g: Gesture) -> Mode {
        match g {
            Gesture::Draw => Mode::Drawing,
            Gesture::Select => Mode::Selecting,
            Gesture::Fist => Mode::Erasing,
            Gesture::PinchAdjust => Mode::Adjusting,
            Gesture::ClearAll | Gesture::None => Mode::Idle,
        }
    }

    /// Modes that leave marks on the canvas.
    pub fn inks(self) -> bool {
        matches!(self, Mode::Drawing | Mode::Erasing)
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Idle => "IDLE",
            Mode::Drawing => "DRAWING",
            Mode::Selecting => "SELECT",
            Mode::Erasing => "ERASING",
            Mode::Adjusting => "ADJUST",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub confirm_frames: u32,
    pub brush: BrushSettings,
    pub background: Rgb,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { confirm_frames: CONFIRM_FRAMES, brush: BrushSettings::default(), background: Rgb::BLACK }
    }
}

/// Everything the caller needs to show one processed frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// Live frame with the drawing on top.
    pub frame: FrameBuffer,
    pub mode: Mode,
    pub gesture: DebouncedGestureState,
    /// `None` when no hand was seen.
    pub fingers: Option<FingerState>,
    /// Index fingertip, when a hand was seen.
    pub cursor: Option<Point2D>,
    pub ops: Vec<CanvasOp>,
}

pub struct DrawingSessionController {
    debouncer: GestureDebouncer,
    brush: BrushController,
    canvas: CanvasEngine,
    mode: Mode,
}

impl DrawingSessionController {
    pub fn new(width: usize, height: usize, settings: SessionSettings) -> Self {
        let mut brush_settings = settings.brush;
        brush_settings.eraser_color = settings.background;
        Self {
            debouncer: GestureDebouncer::new(settings.confirm_frames),
            brush: BrushController::new(brush_settings),
            canvas: CanvasEngine::new(width, height, settings.background),
            mode: Mode::Idle,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn brush(&self) -> &BrushController {
        &self.brush
    }

    pub fn brush_state(&self) -> BrushState {
        self.brush.state()
    }

    pub fn canvas(&self) -> &CanvasEngine {
        &self.canvas
    }

    /// Run one frame. On error the session drops back to `Idle` with the pen
    /// up and the canvas and brush untouched; the next frame starts clean.
    pub fn process_frame(&mut self, snapshot: Option<&LandmarkSnapshot>, live: &FrameBuffer) -> Result<FrameReport> {
        self.canvas.begin_frame();

        if live.dimensions() != self.canvas.dimensions() {
            return Err(Error::FrameMismatch { expected: self.canvas.dimensions(), got: live.dimensions() });
        }

        let fingers = match classify(snapshot) {
            Ok(f) => f,
            Err(e) => {
                self.fall_back_to_idle();
                return Err(e);
            }
        };
        let hand = snapshot.and_then(|s| s.hand().ok());
        let gesture = self.debouncer.update(fingers.map_or(Gesture::None, gesture_for));

        let ops = match self.step(&gesture, hand) {
            Ok(ops) => ops,
            Err(e) => {
                self.fall_back_to_idle();
                return Err(e);
            }
        };

        Ok(FrameReport {
            frame: self.canvas.composite(live)?,
            mode: self.mode,
            gesture,
            fingers,
            cursor: hand.map(|h| h[INDEX_TIP]),
            ops,
        })
    }

    fn step(&mut self, gesture: &DebouncedGestureState, hand: Option<&[Point2D; LANDMARK_COUNT]>) -> Result<Vec<CanvasOp>> {
        let mut ops = Vec::new();

        if gesture.fires(Gesture::ClearAll) {
            info!("open palm: clearing canvas");
            self.canvas.clear();
            ops.push(CanvasOp::Clear);
        }

        self.enter(Mode::for_gesture(gesture.gesture));

        let Some(hand) = hand else { return Ok(ops) };
        match self.mode {
            Mode::Drawing => {
                let op = self.canvas.stroke_to(hand[INDEX_TIP], self.brush.active_color(), self.brush.active_thickness())?;
                ops.push(op);
            }
            Mode::Erasing => {
                let background = self.canvas.background();
                let op = self.canvas.stroke_to(hand[MIDDLE_MCP], background, self.brush.eraser_thickness())?;
                ops.push(op);
            }
            Mode::Adjusting => {
                self.brush.adjust_from_pinch(hand[THUMB_TIP].distance(hand[INDEX_TIP]));
            }
            Mode::Selecting | Mode::Idle => {}
        }
        Ok(ops)
    }

    fn enter(&mut self, next: Mode) {
        if next == self.mode {
            return;
        }
        debug!(from = %self.mode, to = %next, "mode change");
        self.canvas.disarm();
        if next.inks() {
            self.canvas.arm();
        }
        self.mode = next;
    }

    fn fall_back_to_idle(&mut self) {
        warn!(mode = %self.mode, "frame rejected, returning to idle");
        self.debouncer.reset();
        self.canvas.disarm();
        self.mode = Mode::Idle;
    }

    /// Palette pick from the UI layer.
    pub fn apply_swatch(&mut self, swatch: Swatch) {
        match swatch {
            Swatch::Color(c) => self.brush.set_color(c),
            Swatch::Eraser => self.brush.set_eraser(true),
        }
    }

    pub fn select_color(&mut self, color: Rgb) {
        self.brush.set_color(color);
    }

    pub fn set_thickness(&mut self, thickness: i32) -> u32 {
        self.brush.set_thickness(thickness)
    }

    pub fn toggle_eraser(&mut self) -> bool {
        self.brush.toggle_eraser()
    }

    /// Wipe the drawing outside the gesture path (keyboard).
    pub fn clear(&mut self) {
        info!("canvas cleared");
        self.canvas.clear();
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.canvas.save_png(path)
    }
}
