// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the live camera image with the drawing on top.
// 2) Mouse/keyboard input, including the poses for the simulated hand.
// 3) Pixel, line, disc and rectangle primitives shared with the canvas.
// 4) A tiny 5x7 bitmap font to render HUD text on top of the video.

use crate::error::Error;
use crate::sim::SimPose;
use crate::types::{FrameBuffer, Point2D};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

const COLOR_KEYS: [Key; 5] = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5];

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the camera feed.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image (live video).
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// ESC or Q ends the session.
    pub fn quit_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape) || self.window.is_key_down(Key::Q)
    }

    /// Current mouse position in window pixel coordinates (None when outside).
    pub fn mouse_pos(&self) -> Option<Point2D> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point2D::new(x.max(0.0) as i32, y.max(0.0) as i32))
    }

    /// Vertical scroll since the last frame (0 when the wheel is idle).
    pub fn scroll(&self) -> f32 {
        self.window.get_scroll_wheel().map_or(0.0, |(_, dy)| dy)
    }

    /// Pose for the simulated hand.
    /// LMB point (draw), RMB peace (select), F fist, P pinch, O open palm.
    pub fn sim_pose(&self) -> SimPose {
        let w = &self.window;
        if w.is_key_down(Key::O) {
            SimPose::OpenPalm
        } else if w.is_key_down(Key::F) {
            SimPose::Fist
        } else if w.is_key_down(Key::P) {
            SimPose::Pinch
        } else if w.get_mouse_down(MouseButton::Right) {
            SimPose::Peace
        } else if w.get_mouse_down(MouseButton::Left) {
            SimPose::Point
        } else {
            SimPose::Relaxed
        }
    }

    // Visual: when pressed, the drawing vanishes from the video.
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    // Saves the drawing to disk; nothing changes on screen.
    pub fn s_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::S, KeyRepeat::No)
    }

    // Visual: the cursor marker switches to the eraser (or back to the color).
    pub fn e_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::E, KeyRepeat::No)
    }

    /// Palette shortcut: 1..5 -> Some(0..4).
    pub fn color_key_pressed(&self) -> Option<usize> {
        COLOR_KEYS.iter().position(|&k| self.window.is_key_pressed(k, KeyRepeat::No))
    }
}

/* ---------- Software drawing: pixels, lines, discs, rects, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Visit every pixel on the Bresenham line from (x0,y0) to (x1,y1), both ends included.
/// Callers clip first: the walk visits every pixel in between, on screen or not.
pub fn walk_line(x0: i32, y0: i32, x1: i32, y1: i32, mut visit: impl FnMut(i32, i32)) {
    let (mut x, mut y) = (x0 as i64, y0 as i64);
    let (x1, y1) = (x1 as i64, y1 as i64);
    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        visit(x as i32, y as i32);
        if x == x1 && y == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x += sx; }
        if e2 <= dx { err += dx; y += sy; }
    }
}

/// Cut the segment (x0,y0)-(x1,y1) down to the part inside the inclusive box
/// `(xmin, ymin, xmax, ymax)` (Liang-Barsky). `None` when it misses the box.
pub fn clip_line(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    (xmin, ymin, xmax, ymax): (i32, i32, i32, i32),
) -> Option<(i32, i32, i32, i32)> {
    if xmin > xmax || ymin > ymax {
        return None;
    }
    let (fx, fy) = (x0 as f64, y0 as f64);
    let (dx, dy) = (x1 as f64 - fx, y1 as f64 - fy);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-dx, fx - xmin as f64),
        (dx, xmax as f64 - fx),
        (-dy, fy - ymin as f64),
        (dy, ymax as f64 - fy),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 { return None; }
            t0 = t0.max(t);
        } else {
            if t < t0 { return None; }
            t1 = t1.min(t);
        }
    }
    let at = |t: f64| {
        let x = (fx + t * dx).round() as i32;
        let y = (fy + t * dy).round() as i32;
        (x.clamp(xmin, xmax), y.clamp(ymin, ymax))
    };
    let (ax, ay) = at(t0);
    let (bx, by) = at(t1);
    Some((ax, ay, bx, by))
}

/// Draw a thin line between (x0,y0) and (x1,y1).
/// Visual: a straight 1-pixel line appears on top of the camera image.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let frame = (0, 0, fb.width as i32 - 1, fb.height as i32 - 1);
    if let Some((x0, y0, x1, y1)) = clip_line(x0, y0, x1, y1, frame) {
        walk_line(x0, y0, x1, y1, |x, y| put_pixel(fb, x, y, color));
    }
}

/// Fill a solid disc of `radius` pixels around (cx,cy), clipped to the frame.
/// Visual: a round dab of paint; radius 0 is a single pixel.
pub fn fill_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    let (w, h) = (fb.width as i64, fb.height as i64);
    // anything wider than w + h already covers the whole frame
    let r = (radius.max(0) as i64).min(w + h);
    let (cx, cy) = (cx as i64, cy as i64);
    let r2 = r * r;
    let (x0, x1) = ((cx - r).max(0), (cx + r).min(w - 1));
    let (y0, y1) = ((cy - r).max(0), (cy + r).min(h - 1));
    for y in y0..=y1 {
        let dy = y - cy;
        for x in x0..=x1 {
            let dx = x - cx;
            if dx * dx + dy * dy <= r2 {
                fb.pixels[(y * w + x) as usize] = color;
            }
        }
    }
}

/// Fill the rectangle with corners (x1,y1) and (x2,y2), inclusive.
pub fn fill_rect(fb: &mut FrameBuffer, x1: i32, y1: i32, x2: i32, y2: i32, color: u32) {
    for y in y1.min(y2)..=y1.max(y2) {
        for x in x1.min(x2)..=x1.max(x2) {
            put_pixel(fb, x, y, color);
        }
    }
}

/// Outline a rectangle with a border `thickness` pixels wide, drawn inwards.
/// Visual: a frame around a palette box or the selection cursor.
pub fn stroke_rect(fb: &mut FrameBuffer, x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32, color: u32) {
    for i in 0..thickness.max(1) {
        let (l, t, r, b) = (x1 + i, y1 + i, x2 - i, y2 - i);
        if l > r || t > b { break; }
        draw_line(fb, l, t, r, t, color);
        draw_line(fb, l, b, r, b, color);
        draw_line(fb, l, t, l, b, color);
        draw_line(fb, r, t, r, b, color);
    }
}

/// Draw a small crosshair centered at (cx,cy).
/// Visual: a "+" shape (with a tiny gap at the center) follows the fingertip.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    // Horizontal line (left part)
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    // Horizontal line (right part)
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    // Vertical line (top part)
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    // Vertical line (bottom part)
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    // Small center dot to anchor the crosshair visually
    put_pixel(fb, cx, cy, color);
}

/* ---------- 5x7 bitmap font (ASCII subset used by the HUD and palette) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Uppercase letters used by mode names, HUD and palette labels
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation: space, vertical bar, colon, dot, dash
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph appears with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass: offset by (1,1) in black to improve readability
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32 + 1, y + ry as i32 + 1, 0x00000000);
                }
            }
        }

        // Foreground pass: actual glyph in chosen color
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs (lowercase is shown as uppercase).
/// Visual: a compact HUD string appears; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch.to_ascii_uppercase(), color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}

/// Width in pixels of `text` as drawn by `draw_text_5x7`.
pub fn text_width_5x7(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(w: usize, h: usize) -> FrameBuffer {
        FrameBuffer { width: w, height: h, pixels: vec![0; w * h] }
    }

    #[test]
    fn line_visits_both_ends() {
        let mut pts = Vec::new();
        walk_line(0, 0, 3, 0, |x, y| pts.push((x, y)));
        assert_eq!(pts, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn disc_is_clipped_to_frame() {
        let mut fb = blank(10, 10);
        fill_disc(&mut fb, 0, 0, 3, 7);
        assert_eq!(fb.get(0, 0), Some(7));
        assert_eq!(fb.get(3, 0), Some(7));
        assert_eq!(fb.get(3, 3), Some(0)); // outside the circle
    }

    #[test]
    fn huge_disc_fills_the_frame() {
        let mut fb = blank(8, 6);
        fill_disc(&mut fb, 4, 3, 100_000, 5);
        assert!(fb.pixels.iter().all(|&p| p == 5));

        let mut fb = blank(8, 6);
        fill_disc(&mut fb, i32::MAX, i32::MIN, i32::MAX, 5);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn clip_keeps_the_visible_part() {
        let frame = (0, 0, 9, 9);
        assert_eq!(clip_line(2, 3, 7, 3, frame), Some((2, 3, 7, 3)));
        assert_eq!(clip_line(-10, 5, 20, 5, frame), Some((0, 5, 9, 5)));
        assert_eq!(clip_line(5, 5, 2_000_000_000, 5, frame), Some((5, 5, 9, 5)));
        assert_eq!(clip_line(20, 20, 30, 30, frame), None);
        assert_eq!(clip_line(-5, -5, -5, 50, frame), None);
    }

    #[test]
    fn far_line_draws_only_on_screen() {
        let mut fb = blank(10, 10);
        draw_line(&mut fb, i32::MIN, 4, i32::MAX, 4, 9);
        assert!((0..10).all(|x| fb.get(x, 4) == Some(9)));
        assert_eq!(fb.pixels.iter().filter(|&&p| p == 9).count(), 10);
    }

    #[test]
    fn hud_text_uses_known_glyphs() {
        for text in ["IDLE", "DRAWING", "SELECT", "ERASING", "ADJUST", "SIZE: 15", "FPS: 29.9", "ERASER"] {
            for ch in text.chars() {
                assert!(glyph5x7(ch).is_some(), "missing glyph {ch:?} in {text}");
            }
        }
    }
}
