use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::brush::{
    BrushSettings, DEFAULT_BRUSH, ERASER_THICKNESS, MAX_BRUSH, MIN_BRUSH, PINCH_MAX_DISTANCE,
    PINCH_MIN_DISTANCE,
};
use crate::debounce::CONFIRM_FRAMES;
use crate::session::SessionSettings;
use crate::types::Rgb;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub landmarks: LandmarkConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Camera device index (e.g., 0 for /dev/video0)
    #[serde(default)]
    pub index: u32,

    /// Requested capture width; the device may pick something close
    #[serde(default = "default_camera_width")]
    pub width: u32,

    #[serde(default = "default_camera_height")]
    pub height: u32,

    /// Flip frames left-to-right so the view behaves like a mirror
    #[serde(default = "default_true")]
    pub mirror: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GestureConfig {
    /// Consecutive frames before a pose counts as a gesture
    #[serde(default = "default_confirm_frames")]
    pub confirm_frames: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BrushConfig {
    #[serde(default = "default_thickness")]
    pub thickness: u32,

    #[serde(default = "default_min_thickness")]
    pub min_thickness: u32,

    #[serde(default = "default_max_thickness")]
    pub max_thickness: u32,

    #[serde(default = "default_eraser_thickness")]
    pub eraser_thickness: u32,

    /// Thumb-index spread (pixels) that maps to the thinnest brush
    #[serde(default = "default_pinch_min_distance")]
    pub pinch_min_distance: f32,

    /// Thumb-index spread (pixels) that maps to the thickest brush
    #[serde(default = "default_pinch_max_distance")]
    pub pinch_max_distance: f32,

    /// Starting color, `#RRGGBB`
    #[serde(default = "default_brush_color")]
    pub color: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CanvasConfig {
    /// Canvas background; pixels of this color let the video show through
    #[serde(default = "default_background")]
    pub background: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaletteConfig {
    #[serde(default = "default_header_height")]
    pub header_height: u32,

    #[serde(default = "default_palette_colors")]
    pub colors: Vec<String>,

    /// Add an eraser box after the colors
    #[serde(default = "default_true")]
    pub eraser_swatch: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Where saved drawings go
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LandmarkConfig {
    /// `simulated`, `stdin`, or a recorded JSON-lines file (replayed one line per frame)
    #[serde(default = "default_landmark_source")]
    pub source: String,
}

impl AppConfig {
    /// Load configuration from the default file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("air-canvas.toml")
    }

    /// Load configuration from a TOML file, overridden by `AIR_CANVAS__*` variables
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        debug!("Loading configuration from {}", path_str);

        let settings = Config::builder()
            .add_source(File::with_name(&path_str).required(false))
            .add_source(Environment::with_prefix("AIR_CANVAS").prefix_separator("__").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        info!("Configuration loaded");
        Ok(config)
    }

    /// Reject settings the app cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Message("camera width and height must be non-zero".into()));
        }
        if self.gesture.confirm_frames == 0 {
            return Err(ConfigError::Message("gesture.confirm_frames must be at least 1".into()));
        }

        let b = &self.brush;
        if b.min_thickness == 0 || b.min_thickness > b.max_thickness {
            return Err(ConfigError::Message(format!(
                "brush thickness range {}..={} is empty",
                b.min_thickness, b.max_thickness
            )));
        }
        if !(b.min_thickness..=b.max_thickness).contains(&b.thickness) {
            return Err(ConfigError::Message(format!(
                "brush.thickness {} outside {}..={}",
                b.thickness, b.min_thickness, b.max_thickness
            )));
        }
        let ceiling = self.camera.width.min(self.camera.height);
        if b.max_thickness > ceiling || b.eraser_thickness > ceiling {
            return Err(ConfigError::Message(format!(
                "brush.max_thickness and brush.eraser_thickness must not exceed {ceiling} (the shorter camera side)"
            )));
        }
        if b.eraser_thickness == 0 {
            return Err(ConfigError::Message("brush.eraser_thickness must be at least 1".into()));
        }
        if !(b.pinch_min_distance < b.pinch_max_distance) {
            return Err(ConfigError::Message("brush.pinch_min_distance must be below pinch_max_distance".into()));
        }

        self.brush_color()?;
        self.background()?;
        self.palette_colors()?;
        Ok(())
    }

    pub fn brush_color(&self) -> Result<Rgb, ConfigError> {
        parse_color("brush.color", &self.brush.color)
    }

    pub fn background(&self) -> Result<Rgb, ConfigError> {
        parse_color("canvas.background", &self.canvas.background)
    }

    pub fn palette_colors(&self) -> Result<Vec<Rgb>, ConfigError> {
        self.palette.colors.iter().map(|c| parse_color("palette.colors", c)).collect()
    }

    /// Gesture core settings derived from this config
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        let background = self.background()?;
        Ok(SessionSettings {
            confirm_frames: self.gesture.confirm_frames,
            background,
            brush: BrushSettings {
                min_thickness: self.brush.min_thickness,
                max_thickness: self.brush.max_thickness,
                thickness: self.brush.thickness,
                eraser_thickness: self.brush.eraser_thickness,
                pinch_min_distance: self.brush.pinch_min_distance,
                pinch_max_distance: self.brush.pinch_max_distance,
                color: self.brush_color()?,
                eraser_color: background,
            },
        })
    }
}

fn parse_color(field: &str, value: &str) -> Result<Rgb, ConfigError> {
    value.parse::<Rgb>().map_err(|e| ConfigError::Message(format!("{field}: {e}")))
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, width: default_camera_width(), height: default_camera_height(), mirror: true }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { confirm_frames: default_confirm_frames() }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            thickness: default_thickness(),
            min_thickness: default_min_thickness(),
            max_thickness: default_max_thickness(),
            eraser_thickness: default_eraser_thickness(),
            pinch_min_distance: default_pinch_min_distance(),
            pinch_max_distance: default_pinch_max_distance(),
            color: default_brush_color(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { background: default_background() }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self { header_height: default_header_height(), colors: default_palette_colors(), eraser_swatch: true }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self { source: default_landmark_source() }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_camera_width() -> u32 { 640 }
fn default_camera_height() -> u32 { 480 }
fn default_confirm_frames() -> u32 { CONFIRM_FRAMES }
fn default_thickness() -> u32 { DEFAULT_BRUSH }
fn default_min_thickness() -> u32 { MIN_BRUSH }
fn default_max_thickness() -> u32 { MAX_BRUSH }
fn default_eraser_thickness() -> u32 { ERASER_THICKNESS }
fn default_pinch_min_distance() -> f32 { PINCH_MIN_DISTANCE }
fn default_pinch_max_distance() -> f32 { PINCH_MAX_DISTANCE }
fn default_brush_color() -> String { "#FF00FF".to_string() }
fn default_background() -> String { "#000000".to_string() }
fn default_header_height() -> u32 { 80 }
fn default_palette_colors() -> Vec<String> {
    ["#FF00FF", "#0000FF", "#00FF00", "#FF0000", "#FFFF00"].iter().map(|s| s.to_string()).collect()
}
fn default_output_dir() -> String { "output".to_string() }
fn default_landmark_source() -> String { "simulated".to_string() }
