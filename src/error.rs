// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed

    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed

    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed

    #[error("Landmark stream error: {0}")]
    LandmarkStream(String), // The external detector sent something unreadable

    #[error("Malformed landmark snapshot: expected {expected} points, got {got}")]
    MalformedSnapshot { expected: usize, got: usize },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid state transition: cannot {action} while {mode}")]
    InvalidStateTransition { mode: &'static str, action: &'static str },

    #[error("Frame size mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, got.0, got.1)]
    FrameMismatch { expected: (usize, usize), got: (usize, usize) },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
