// Core value types shared by the gesture core and the window/camera glue.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A packed RGB frame: what the camera delivers, what the canvas stores and
/// what the window shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A frame filled with one color.
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self { width, height, pixels: vec![color.to_pixel(); width * height] }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Pixel at (x,y), or None outside the frame.
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Mirror the frame left-to-right in place (selfie view).
    pub fn mirror_horizontal(&mut self) {
        for row in self.pixels.chunks_mut(self.width.max(1)) {
            row.reverse();
        }
    }
}

/// Integer pixel position in frame space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(self, other: Point2D) -> f32 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.hypot(dy) as f32
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An RGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const PURPLE: Rgb = Rgb::new(255, 0, 255);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from wide channel values, rejecting anything outside 0..=255.
    pub fn from_channels(r: i32, g: i32, b: i32) -> Result<Self, Error> {
        let channel = |v: i32| {
            u8::try_from(v).map_err(|_| Error::InvalidColor(format!("({r}, {g}, {b})")))
        };
        Ok(Self::new(channel(r)?, channel(g)?, channel(b)?))
    }

    /// Pack as 0x00RRGGBB.
    #[inline]
    pub const fn to_pixel(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub const fn from_pixel(px: u32) -> Self {
        Self::new(((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
    }
}

impl TryFrom<[i32; 3]> for Rgb {
    type Error = Error;

    fn try_from([r, g, b]: [i32; 3]) -> Result<Self, Self::Error> {
        Rgb::from_channels(r, g, b)
    }
}

/// Parses `#RRGGBB` (the leading `#` is optional).
impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_string()));
        }
        let v = u32::from_str_radix(hex, 16).map_err(|_| Error::InvalidColor(s.to_string()))?;
        Ok(Rgb::from_pixel(v))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_packing_matches_minifb_layout() {
        assert_eq!(Rgb::PURPLE.to_pixel(), 0x00FF00FF);
        assert_eq!(Rgb::from_pixel(0x0012_3456), Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn out_of_range_channels_are_rejected() {
        assert!(matches!(Rgb::from_channels(256, 0, 0), Err(Error::InvalidColor(_))));
        assert!(matches!(Rgb::try_from([0, -1, 0]), Err(Error::InvalidColor(_))));
        assert_eq!(Rgb::try_from([255, 0, 0]).unwrap(), Rgb::RED);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!("#FF00FF".parse::<Rgb>().unwrap(), Rgb::PURPLE);
        assert_eq!("00ff00".parse::<Rgb>().unwrap(), Rgb::GREEN);
        assert!("#FF00F".parse::<Rgb>().is_err());
        assert!("#GG0000".parse::<Rgb>().is_err());
        assert_eq!(Rgb::YELLOW.to_string(), "#FFFF00");
    }

    #[test]
    fn mirror_reverses_rows() {
        let mut fb = FrameBuffer { width: 3, height: 2, pixels: vec![1, 2, 3, 4, 5, 6] };
        fb.mirror_horizontal();
        assert_eq!(fb.pixels, vec![3, 2, 1, 6, 5, 4]);
    }
}
