// The persistent drawing and how it sits on top of the live video.
// Strokes only connect two consecutive pen-down frames; after a lift the next
// mark is a fresh dot.
// Visual expectation: smooth lines while the finger stays in draw pose, and
// no stray line across the frame when drawing resumes somewhere else.

use std::path::Path;

use image::{Rgb as ImageRgb, RgbImage};
use tracing::{debug, info, trace};

use crate::draw::{clip_line, fill_disc, walk_line};
use crate::error::{Error, Result};
use crate::types::{FrameBuffer, Point2D, Rgb};

/// Pen position carried between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeState {
    #[default]
    PenUp,
    PenDown(Point2D),
}

/// A mutation applied to the canvas, reported back per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasOp {
    /// A stroke started with a single dab.
    Point { at: Point2D },
    /// A stroke continued from the previous frame's position.
    Segment { from: Point2D, to: Point2D },
    Clear,
}

pub struct CanvasEngine {
    buffer: FrameBuffer,
    background: Rgb,
    stroke: StrokeState,
    armed: bool,
    frame: u64,
    clears: u64,
}

impl CanvasEngine {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            buffer: FrameBuffer::filled(width, height, background),
            background,
            stroke: StrokeState::PenUp,
            armed: false,
            frame: 0,
            clears: 0,
        }
    }

    /// Per-frame bookkeeping hook; the raster is untouched.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        trace!(frame = self.frame, stroke = ?self.stroke, "canvas frame");
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.buffer.dimensions()
    }

    pub fn stroke(&self) -> StrokeState {
        self.stroke
    }

    /// How many times the canvas has been wiped.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    /// True when nothing but background is on the canvas.
    pub fn is_blank(&self) -> bool {
        let bg = self.background.to_pixel();
        self.buffer.pixels.iter().all(|&p| p == bg)
    }

    /// Allow marks; called when entering a drawing or erasing mode.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Forbid marks and lift the pen.
    pub fn disarm(&mut self) {
        self.armed = false;
        self.lift_pen();
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// End the current stroke.
    pub fn lift_pen(&mut self) {
        if self.stroke != StrokeState::PenUp {
            trace!("pen up");
        }
        self.stroke = StrokeState::PenUp;
    }

    fn require_armed(&self, action: &'static str) -> Result<()> {
        if self.armed {
            Ok(())
        } else {
            Err(Error::InvalidStateTransition { mode: "pen is disarmed", action })
        }
    }

    /// Start a stroke at `at` with a single round dab.
    pub fn draw_point(&mut self, at: Point2D, color: Rgb, thickness: u32) -> Result<()> {
        self.require_armed("draw a point")?;
        let r = self.radius(thickness);
        fill_disc(&mut self.buffer, at.x, at.y, r, color.to_pixel());
        self.stroke = StrokeState::PenDown(at);
        Ok(())
    }

    /// Continue the stroke from `from` (which must be where the pen is down)
    /// to `to`.
    pub fn draw_segment(&mut self, from: Point2D, to: Point2D, color: Rgb, thickness: u32) -> Result<()> {
        self.require_armed("draw a segment")?;
        match self.stroke {
            StrokeState::PenDown(last) if last == from => {}
            StrokeState::PenDown(_) => {
                return Err(Error::InvalidStateTransition {
                    mode: "pen is down elsewhere",
                    action: "draw a segment",
                });
            }
            StrokeState::PenUp => {
                return Err(Error::InvalidStateTransition { mode: "pen is up", action: "draw a segment" });
            }
        }

        // Only the stretch whose dabs can reach the buffer gets walked.
        let r = self.radius(thickness);
        let (w, h) = (self.buffer.width as i32, self.buffer.height as i32);
        let reach = (-r, -r, (w - 1).saturating_add(r), (h - 1).saturating_add(r));
        if let Some((x0, y0, x1, y1)) = clip_line(from.x, from.y, to.x, to.y, reach) {
            let px = color.to_pixel();
            let buffer = &mut self.buffer;
            walk_line(x0, y0, x1, y1, |x, y| fill_disc(buffer, x, y, r, px));
        }
        self.stroke = StrokeState::PenDown(to);
        Ok(())
    }

    /// Put the pen at `to`: a segment if the stroke is live, otherwise a new
    /// stroke. Returns what was drawn.
    pub fn stroke_to(&mut self, to: Point2D, color: Rgb, thickness: u32) -> Result<CanvasOp> {
        match self.stroke {
            StrokeState::PenDown(from) => {
                self.draw_segment(from, to, color, thickness)?;
                Ok(CanvasOp::Segment { from, to })
            }
            StrokeState::PenUp => {
                self.draw_point(to, color, thickness)?;
                Ok(CanvasOp::Point { at: to })
            }
        }
    }

    /// Disc radius for a brush `thickness` pixels across, capped where a dab
    /// would cover the whole buffer anyway.
    fn radius(&self, thickness: u32) -> i32 {
        let cap = (self.buffer.width + self.buffer.height).min(i32::MAX as usize) as u32;
        (thickness / 2).min(cap) as i32
    }

    /// Wipe everything back to the background and lift the pen.
    pub fn clear(&mut self) {
        self.buffer.pixels.fill(self.background.to_pixel());
        self.lift_pen();
        self.clears += 1;
        debug!(clears = self.clears, "canvas cleared");
    }

    /// `live` with every non-background canvas pixel painted over it.
    /// Neither input is modified.
    pub fn composite(&self, live: &FrameBuffer) -> Result<FrameBuffer> {
        if live.dimensions() != self.buffer.dimensions() {
            return Err(Error::FrameMismatch {
                expected: self.buffer.dimensions(),
                got: live.dimensions(),
            });
        }
        let bg = self.background.to_pixel();
        let mut out = live.clone();
        for (o, &c) in out.pixels.iter_mut().zip(self.buffer.pixels.iter()) {
            if c != bg {
                *o = c;
            }
        }
        Ok(out)
    }

    /// Write the drawing (without the video) as a PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let w = self.buffer.width;
        let img = RgbImage::from_fn(w as u32, self.buffer.height as u32, |x, y| {
            let c = Rgb::from_pixel(self.buffer.pixels[y as usize * w + x as usize]);
            ImageRgb([c.r, c.g, c.b])
        });
        img.save(path)?;
        info!("drawing saved to {}", path.display());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn armed(w: usize, h: usize) -> CanvasEngine {
        let mut c = CanvasEngine::new(w, h, Rgb::BLACK);
        c.arm();
        c
    }

    #[test]
    fn marks_need_an_armed_pen() {
        let mut c = CanvasEngine::new(20, 20, Rgb::BLACK);
        assert!(matches!(
            c.draw_point(Point2D::new(5, 5), Rgb::RED, 3),
            Err(Error::InvalidStateTransition { .. })
        ));
        assert!(c.is_blank());
    }

    #[test]
    fn segment_refuses_to_connect_from_pen_up() {
        let mut c = armed(20, 20);
        let err = c.draw_segment(Point2D::new(1, 1), Point2D::new(10, 10), Rgb::RED, 1);
        assert!(matches!(err, Err(Error::InvalidStateTransition { .. })));
        assert!(c.is_blank());
    }

    #[test]
    fn segment_must_start_at_pen_position() {
        let mut c = armed(20, 20);
        c.draw_point(Point2D::new(2, 2), Rgb::RED, 1).unwrap();
        assert!(c.draw_segment(Point2D::new(9, 9), Point2D::new(12, 12), Rgb::RED, 1).is_err());
        c.draw_segment(Point2D::new(2, 2), Point2D::new(6, 2), Rgb::RED, 1).unwrap();
        assert_eq!(c.stroke(), StrokeState::PenDown(Point2D::new(6, 2)));
        for x in 2..=6 {
            assert_eq!(c.buffer().get(x, 2), Some(Rgb::RED.to_pixel()));
        }
    }

    #[test]
    fn stroke_to_starts_then_continues() {
        let mut c = armed(40, 40);
        let a = Point2D::new(10, 10);
        let b = Point2D::new(12, 10);
        assert_eq!(c.stroke_to(a, Rgb::RED, 3).unwrap(), CanvasOp::Point { at: a });
        assert_eq!(c.stroke_to(b, Rgb::RED, 3).unwrap(), CanvasOp::Segment { from: a, to: b });
        c.lift_pen();
        let d = Point2D::new(30, 30);
        assert_eq!(c.stroke_to(d, Rgb::RED, 3).unwrap(), CanvasOp::Point { at: d });
        // nothing was drawn between b and d
        assert_eq!(c.buffer().get(20, 20), Some(Rgb::BLACK.to_pixel()));
    }

    #[test]
    fn thickness_sets_dab_size() {
        let mut c = armed(40, 40);
        c.draw_point(Point2D::new(20, 20), Rgb::GREEN, 15).unwrap();
        assert_eq!(c.buffer().get(27, 20), Some(Rgb::GREEN.to_pixel()));
        assert_eq!(c.buffer().get(28, 20), Some(Rgb::BLACK.to_pixel()));
    }

    #[test]
    fn far_segment_paints_only_the_visible_stretch() {
        let mut c = armed(30, 30);
        let a = Point2D::new(10, 15);
        let far = Point2D::new(2_000_000_000, 15);
        c.draw_point(a, Rgb::RED, 3).unwrap();
        c.draw_segment(a, far, Rgb::RED, 3).unwrap();

        assert_eq!(c.stroke(), StrokeState::PenDown(far));
        assert!((10..30).all(|x| c.buffer().get(x, 15) == Some(Rgb::RED.to_pixel())));
        assert_eq!(c.buffer().get(5, 15), Some(Rgb::BLACK.to_pixel()));

        // entirely off the buffer: nothing to paint, but the pen still moves
        let gone = Point2D::new(-5_000, -9_000);
        c.draw_segment(far, gone, Rgb::BLUE, 3).unwrap();
        assert_eq!(c.stroke(), StrokeState::PenDown(gone));
        assert!(!c.buffer().pixels.contains(&Rgb::BLUE.to_pixel()));
    }

    #[test]
    fn oversized_brush_covers_the_buffer() {
        let mut c = armed(12, 9);
        c.draw_point(Point2D::new(3, 3), Rgb::GREEN, u32::MAX).unwrap();
        assert!(c.buffer().pixels.iter().all(|&p| p == Rgb::GREEN.to_pixel()));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut c = armed(16, 16);
        c.draw_point(Point2D::new(8, 8), Rgb::BLUE, 5).unwrap();
        c.clear();
        let once = c.buffer().clone();
        c.clear();
        assert_eq!(c.buffer(), &once);
        assert!(c.is_blank());
        assert_eq!(c.stroke(), StrokeState::PenUp);
        assert_eq!(c.clear_count(), 2);
    }

    #[test]
    fn composite_overlays_only_ink() {
        let mut c = armed(8, 8);
        c.draw_point(Point2D::new(3, 3), Rgb::YELLOW, 1).unwrap();
        let live = FrameBuffer::filled(8, 8, Rgb::new(10, 20, 30));
        let before = live.clone();
        let canvas_before = c.buffer().clone();

        let out = c.composite(&live).unwrap();
        assert_eq!(out.get(3, 3), Some(Rgb::YELLOW.to_pixel()));
        assert_eq!(out.get(0, 0), Some(Rgb::new(10, 20, 30).to_pixel()));
        assert_eq!(live, before);
        assert_eq!(c.buffer(), &canvas_before);
    }

    #[test]
    fn composite_rejects_other_sizes() {
        let c = CanvasEngine::new(8, 8, Rgb::BLACK);
        let live = FrameBuffer::filled(4, 8, Rgb::WHITE);
        assert!(matches!(c.composite(&live), Err(Error::FrameMismatch { .. })));
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("drawing.png");
        let mut c = armed(12, 9);
        c.draw_point(Point2D::new(4, 4), Rgb::RED, 1).unwrap();
        c.save_png(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (12, 9));
        assert_eq!(img.get_pixel(4, 4).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
