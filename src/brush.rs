// Brush color, size and eraser.
// Visual expectation: the cursor dot shows the active color, and the HUD
// shows the active size.

use tracing::{debug, info};

use crate::types::Rgb;

pub const MIN_BRUSH: u32 = 5;
pub const MAX_BRUSH: u32 = 50;
pub const DEFAULT_BRUSH: u32 = 15;
pub const ERASER_THICKNESS: u32 = 50;

/// Thumb-to-index spread (pixels) mapped onto `MIN_BRUSH..=MAX_BRUSH`.
pub const PINCH_MIN_DISTANCE: f32 = 20.0;
pub const PINCH_MAX_DISTANCE: f32 = 200.0;

#[derive(Clone, Debug, PartialEq)]
pub struct BrushSettings {
    pub min_thickness: u32,
    pub max_thickness: u32,
    pub thickness: u32,
    pub eraser_thickness: u32,
    pub pinch_min_distance: f32,
    pub pinch_max_distance: f32,
    pub color: Rgb,
    /// What the eraser paints with: the canvas background.
    pub eraser_color: Rgb,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            min_thickness: MIN_BRUSH,
            max_thickness: MAX_BRUSH,
            thickness: DEFAULT_BRUSH,
            eraser_thickness: ERASER_THICKNESS,
            pinch_min_distance: PINCH_MIN_DISTANCE,
            pinch_max_distance: PINCH_MAX_DISTANCE,
            color: Rgb::PURPLE,
            eraser_color: Rgb::BLACK,
        }
    }
}

/// What the brush currently paints with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushState {
    /// Last color the user picked. Kept while the eraser is on.
    pub color: Rgb,
    pub thickness: u32,
    pub eraser: bool,
}

#[derive(Clone, Debug)]
pub struct BrushController {
    settings: BrushSettings,
    state: BrushState,
}

impl Default for BrushController {
    fn default() -> Self {
        Self::new(BrushSettings::default())
    }
}

impl BrushController {
    pub fn new(mut settings: BrushSettings) -> Self {
        if settings.min_thickness > settings.max_thickness {
            std::mem::swap(&mut settings.min_thickness, &mut settings.max_thickness);
        }
        let thickness = settings.thickness.clamp(settings.min_thickness, settings.max_thickness);
        let state = BrushState { color: settings.color, thickness, eraser: false };
        Self { settings, state }
    }

    pub fn state(&self) -> BrushState {
        self.state
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    /// Pick a color. Picking a color also leaves eraser mode.
    pub fn set_color(&mut self, color: Rgb) {
        if color != self.state.color || self.state.eraser {
            info!(%color, "brush color");
        }
        self.state.color = color;
        self.state.eraser = false;
    }

    /// Set the size, clamped into the configured range. Returns the stored value.
    pub fn set_thickness(&mut self, thickness: i32) -> u32 {
        let lo = self.settings.min_thickness as i64;
        let hi = self.settings.max_thickness as i64;
        self.state.thickness = (thickness as i64).clamp(lo, hi) as u32;
        self.state.thickness
    }

    pub fn set_eraser(&mut self, on: bool) {
        if self.state.eraser != on {
            info!(eraser = on, "eraser toggled");
        }
        self.state.eraser = on;
    }

    /// Flip the eraser; returns the new flag.
    pub fn toggle_eraser(&mut self) -> bool {
        self.set_eraser(!self.state.eraser);
        self.state.eraser
    }

    /// Pinch spread to size. A held spread always gives the same size.
    pub fn adjust_from_pinch(&mut self, distance: f32) -> u32 {
        let t = self.thickness_for_pinch(distance);
        if t != self.state.thickness {
            debug!(distance, thickness = t, "pinch resize");
        }
        self.state.thickness = t;
        t
    }

    /// Linear map of `pinch_min_distance..=pinch_max_distance` onto the size
    /// range, clamped at both ends.
    pub fn thickness_for_pinch(&self, distance: f32) -> u32 {
        let s = &self.settings;
        let span = (s.pinch_max_distance - s.pinch_min_distance).max(f32::EPSILON);
        let t = ((distance - s.pinch_min_distance) / span).clamp(0.0, 1.0);
        let t = if t.is_nan() { 0.0 } else { t };
        let range = (s.max_thickness - s.min_thickness) as f32;
        s.min_thickness + (t * range).round() as u32
    }

    /// Color strokes are painted with right now.
    pub fn active_color(&self) -> Rgb {
        if self.state.eraser { self.settings.eraser_color } else { self.state.color }
    }

    /// Size strokes are painted with right now.
    pub fn active_thickness(&self) -> u32 {
        if self.state.eraser { self.settings.eraser_thickness } else { self.state.thickness }
    }

    pub fn eraser_thickness(&self) -> u32 {
        self.settings.eraser_thickness
    }
}
