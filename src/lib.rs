//! Air canvas: draw over a live webcam feed with hand gestures.
//!
//! Per frame, a hand from a [`landmarks::LandmarkSource`] is classified into a
//! [`pose::Gesture`], smoothed by [`debounce::GestureDebouncer`], and turned into
//! brush and canvas actions by [`session::DrawingSessionController`], which hands
//! back the live frame with the drawing composited on top.

pub mod brush;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod debounce;
pub mod draw;
pub mod error;
pub mod landmarks;
pub mod palette;
pub mod pose;
pub mod session;
pub mod sim;
pub mod types;

pub use brush::{BrushController, BrushSettings, BrushState};
pub use canvas::{CanvasEngine, CanvasOp, StrokeState};
pub use config::AppConfig;
pub use debounce::{DebouncedGestureState, Edge, GestureDebouncer};
pub use error::{Error, Result};
pub use landmarks::{LandmarkSnapshot, LandmarkSource, LandmarkStream, Pacing};
pub use pose::{FingerState, Gesture};
pub use session::{DrawingSessionController, FrameReport, Mode, SessionSettings};
pub use types::{FrameBuffer, Point2D, Rgb};
