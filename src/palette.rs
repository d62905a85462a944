// Color palette header: a row of swatches across the top of the frame.
// Visual: colored boxes along the top edge; hovering one with two fingers up
// picks it, and the active one gets a white inner frame.

use crate::draw::{draw_text_5x7, fill_rect, stroke_rect, text_width_5x7};
use crate::types::{FrameBuffer, Point2D, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Swatch {
    Color(Rgb),
    Eraser,
}

/// One box in the header, corners inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwatchBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub swatch: Swatch,
}

impl SwatchBox {
    fn contains(&self, p: Point2D) -> bool {
        (self.x1..=self.x2).contains(&p.x) && (self.y1..=self.y2).contains(&p.y)
    }
}

pub struct Palette {
    boxes: Vec<SwatchBox>,
    header_height: i32,
    eraser_color: Rgb,
}

impl Palette {
    /// Lay the swatches out in equal-width boxes over `frame_width`; with
    /// `eraser` set, one more box at the end picks the eraser.
    pub fn new(frame_width: usize, header_height: usize, colors: &[Rgb], eraser: bool, eraser_color: Rgb) -> Self {
        let mut swatches: Vec<Swatch> = colors.iter().copied().map(Swatch::Color).collect();
        if eraser {
            swatches.push(Swatch::Eraser);
        }
        let count = swatches.len();
        let box_width = (frame_width / count.max(1)) as i32;
        let right_edge = frame_width as i32 - 1;
        let boxes = swatches
            .into_iter()
            .enumerate()
            .map(|(i, swatch)| {
                let x1 = i as i32 * box_width;
                // the last box takes the columns the division left over
                let x2 = if i + 1 == count { right_edge.max(x1) } else { (i as i32 + 1) * box_width };
                SwatchBox { x1, y1: 0, x2, y2: header_height as i32, swatch }
            })
            .collect();
        Self { boxes, header_height: header_height as i32, eraser_color }
    }

    pub fn boxes(&self) -> &[SwatchBox] {
        &self.boxes
    }

    pub fn header_height(&self) -> i32 {
        self.header_height
    }

    /// Swatch under `p`, if `p` is inside the header. Shared edges go to the
    /// left box.
    pub fn hit(&self, p: Point2D) -> Option<Swatch> {
        if p.y > self.header_height {
            return None;
        }
        self.boxes.iter().find(|b| b.contains(p)).map(|b| b.swatch)
    }

    /// The `n`th color swatch (0-based), for keyboard shortcuts.
    pub fn color(&self, n: usize) -> Option<Rgb> {
        self.boxes
            .iter()
            .filter_map(|b| match b.swatch {
                Swatch::Color(c) => Some(c),
                Swatch::Eraser => None,
            })
            .nth(n)
    }

    /// Paint the header onto `fb`, highlighting `active`.
    /// Visual: filled boxes with white borders; the eraser box is labelled.
    pub fn draw(&self, fb: &mut FrameBuffer, active: Swatch) {
        let white = Rgb::WHITE.to_pixel();
        for b in &self.boxes {
            let fill = match b.swatch {
                Swatch::Color(c) => c,
                Swatch::Eraser => self.eraser_color,
            };
            fill_rect(fb, b.x1, b.y1, b.x2, b.y2, fill.to_pixel());
            stroke_rect(fb, b.x1, b.y1, b.x2, b.y2, 2, white);

            if b.swatch == active {
                stroke_rect(fb, b.x1 + 5, b.y1 + 5, b.x2 - 5, b.y2 - 5, 4, white);
            }

            if b.swatch == Swatch::Eraser {
                let label = "ERASER";
                let x = (b.x1 + b.x2 - text_width_5x7(label)) / 2;
                let y = (b.y1 + b.y2 - 7) / 2;
                draw_text_5x7(fb, x, y, label, white);
            }
        }
    }
}
