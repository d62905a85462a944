// Live video sources for the area behind the drawing.
// Visual expectation: each `next_frame()` gives a Vec<u32> of 0x00RRGGBB
// pixels, ready to have the drawing composited on top and pushed to the screen.

use crate::error::Error;
use crate::types::{FrameBuffer, Rgb};

/// Anything that produces one background frame per loop iteration.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<FrameBuffer, Error>;
    fn resolution(&self) -> (u32, u32);
}

/// A flat colored frame, used when no camera is available.
/// Visual: the drawing appears over a plain dark background.
pub struct Backdrop {
    frame: FrameBuffer,
}

impl Backdrop {
    pub fn new(width: u32, height: u32, color: Rgb) -> Self {
        Self { frame: FrameBuffer::filled(width as usize, height as usize, color) }
    }
}

impl FrameSource for Backdrop {
    fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        Ok(self.frame.clone())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.frame.width as u32, self.frame.height as u32)
    }
}

#[cfg(feature = "camera")]
pub use capture::CameraCapture;

#[cfg(feature = "camera")]
mod capture {
    use super::FrameSource;
    use crate::error::Error;
    use crate::types::FrameBuffer;

    // Bring in nokhwa types for camera control.
    use nokhwa::{
        Camera,
        pixel_format::RgbFormat,
        utils::{
            CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
        },
    };
    use tracing::info;

    // A small wrapper around nokhwa::Camera so our main loop stays clean.
    pub struct CameraCapture {
        cam: Camera,
        width: u32,
        height: u32,
        mirror: bool,
    }

    impl CameraCapture {
        /// Open camera `index` at a target resolution (falls back if not exact).
        /// With `mirror` set, frames come out flipped like a selfie view.
        pub fn new(index: u32, width: u32, height: u32, mirror: bool) -> Result<Self, Error> {
            // 1) Choose the device (0 = default webcam)
            let idx = CameraIndex::Index(index);

            let fmt = CameraFormat::new(
                Resolution::new(width, height),
                FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
                30,                // target FPS
            );

            // 2) Ask for RGB frames at the closest format to our request.
            let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

            // 3) Create the camera (this might fail if no device exists).
            let mut cam = Camera::new(idx, req)
                .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

            // 4) Start streaming frames from the camera.
            cam.open_stream()
                .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

            // 5) The actual stream might choose a slightly different resolution.
            let actual = cam.resolution();
            info!(width = actual.width(), height = actual.height(), "camera opened");

            Ok(Self { cam, width: actual.width(), height: actual.height(), mirror })
        }
    }

    impl FrameSource for CameraCapture {
        /// Grab one frame from the camera and convert it to 0x00RRGGBB pixels.
        fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
            // 1) Pull a frame from the camera (this blocks until a new frame is ready).
            let frame = self
                .cam
                .frame()
                .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

            // 2) Decode to an ImageBuffer<Rgb<u8>, Vec<u8>>.
            let rgb_img = frame
                .decode_image::<RgbFormat>()
                .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

            // 3) Pack each pixel as 0x00RRGGBB.
            let (w, h) = rgb_img.dimensions();
            let pixels = rgb_img
                .pixels()
                .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
                .collect();

            let mut out = FrameBuffer { width: w as usize, height: h as usize, pixels };
            if self.mirror {
                out.mirror_horizontal();
            }
            Ok(out)
        }

        /// Report the actual resolution the camera is delivering.
        fn resolution(&self) -> (u32, u32) {
            (self.width, self.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backdrop_repeats_the_same_frame() {
        let mut b = Backdrop::new(4, 3, Rgb::new(9, 9, 9));
        assert_eq!(b.resolution(), (4, 3));
        let f = b.next_frame().unwrap();
        assert_eq!(f.pixels.len(), 12);
        assert_eq!(f, b.next_frame().unwrap());
    }
}
