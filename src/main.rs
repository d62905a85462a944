// What you SEE:
// • Live camera is always the base image, with your drawing on top.
// • Index finger up: draw. Index + middle: select (hover the palette to pick a color).
// • Thumb + index: pinch to resize the brush. Open palm: clear. Fist: erase.
// • Keys: C clear, S save, E eraser, 1-5 colors, Q/ESC quit.
// • Without a detector, the mouse plays the hand: LMB draw, RMB select,
//   P pinch (scroll to spread), O open palm, F fist.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use air_canvas::camera::{Backdrop, FrameSource};
use air_canvas::config::AppConfig;
use air_canvas::draw::{Drawer, draw_crosshair, draw_text_5x7, fill_disc, stroke_rect};
use air_canvas::landmarks::{LandmarkSnapshot, LandmarkSource, LandmarkStream};
use air_canvas::palette::{Palette, Swatch};
use air_canvas::session::{DrawingSessionController, Mode};
use air_canvas::sim::SimulatedHand;
use air_canvas::types::Rgb;

#[derive(Parser, Debug)]
#[command(name = "air-canvas")]
#[command(about = "Draw in the air over a live webcam feed using hand gestures")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "air-canvas.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Where hands come from: simulated, stdin (live), or a recorded JSON-lines file
    #[arg(
        long,
        value_name = "SOURCE",
        help = "Landmark source: simulated, stdin (live detector), or a file path (replayed one line per frame)"
    )]
    landmarks: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", toml::to_string_pretty(&AppConfig::default())?);
        return Ok(());
    }

    init_logging(&args)?;
    info!("Starting air-canvas v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match AppConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            if args.validate_config {
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
            return Err(e).context("loading configuration");
        }
    };
    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }
    if let Some(source) = args.landmarks {
        config.landmarks.source = source;
    }

    run(&config)
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("air_canvas={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer().json().with_target(true).boxed(),
        Some("pretty") => fmt::layer().pretty().boxed(),
        Some("compact") | None => fmt::layer().compact().with_target(false).boxed(),
        Some(other) => anyhow::bail!("unknown log format: {other}"),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}

/// The camera, or a plain backdrop when there is none.
fn open_frame_source(config: &AppConfig) -> Box<dyn FrameSource> {
    #[cfg(feature = "camera")]
    {
        let cam = &config.camera;
        match air_canvas::camera::CameraCapture::new(cam.index, cam.width, cam.height, cam.mirror) {
            Ok(capture) => return Box::new(capture),
            Err(e) => warn!("{e}; drawing over a plain backdrop instead"),
        }
    }
    Box::new(Backdrop::new(config.camera.width, config.camera.height, Rgb::new(32, 32, 32)))
}

/// Where this run gets its hands from.
enum HandTracker {
    Simulated(SimulatedHand),
    Stream(LandmarkStream),
}

impl HandTracker {
    fn open(source: &str, width: usize, height: usize, mirror: bool) -> Result<Self> {
        Ok(match source {
            "simulated" => {
                info!("simulated hand: LMB draw, RMB select, P pinch, O palm, F fist");
                HandTracker::Simulated(SimulatedHand::new())
            }
            "stdin" | "-" => HandTracker::Stream(LandmarkStream::stdin(width, height, mirror)),
            path => HandTracker::Stream(
                LandmarkStream::open(path, width, height, mirror)
                    .with_context(|| format!("opening landmark file {path}"))?,
            ),
        })
    }

    fn next(&mut self, drawer: &Drawer) -> air_canvas::Result<Option<LandmarkSnapshot>> {
        match self {
            HandTracker::Simulated(hand) => {
                hand.update(drawer.mouse_pos(), drawer.sim_pose(), drawer.scroll());
                hand.next_snapshot()
            }
            HandTracker::Stream(stream) => stream.next_snapshot(),
        }
    }
}

fn run(config: &AppConfig) -> Result<()> {
    /* --- Camera + window setup ---
       Visual: window opens with live camera feed. */
    let mut frames = open_frame_source(config);
    let (w, h) = frames.resolution();
    let (w, h) = (w as usize, h as usize);
    let mut drawer = Drawer::new("Air Canvas", w, h)?;

    /* --- Gesture core + palette ---
       Visual: nothing yet; the canvas starts empty. */
    let settings = config.session_settings()?;
    let background = settings.background;
    let mut session = DrawingSessionController::new(w, h, settings);
    let palette = Palette::new(
        w,
        config.palette.header_height as usize,
        &config.palette_colors()?,
        config.palette.eraser_swatch,
        background,
    );
    let mut tracker = HandTracker::open(&config.landmarks.source, w, h, config.camera.mirror)?;

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.quit_pressed() {
        let now = Instant::now();

        /* 1) Grab a fresh live frame (what the camera sees right now). */
        let live = frames.next_frame()?;

        /* 2) Keyboard shortcuts */
        if drawer.c_pressed_once() {
            session.clear(); // visual: drawing vanishes
        }
        if drawer.e_pressed_once() {
            session.toggle_eraser(); // visual: cursor dot turns to background color
        }
        if let Some(color) = drawer.color_key_pressed().and_then(|n| palette.color(n)) {
            session.select_color(color);
        }
        if drawer.s_pressed_once() {
            let name = format!("drawing_{}.png", chrono::Local::now().format("%Y%m%d_%H%M%S"));
            if let Err(e) = session.save(Path::new(&config.output.dir).join(name)) {
                warn!("could not save drawing: {e}");
            }
        }

        /* 3) Where is the hand this frame? */
        let snapshot = tracker.next(&drawer).unwrap_or_else(|e| {
            warn!("no hand this frame: {e}");
            None
        });

        /* 4) Gestures -> brush/canvas, then the drawing over the live frame. */
        let report = match session.process_frame(snapshot.as_ref(), &live) {
            Ok(report) => report,
            Err(e) => {
                warn!("frame skipped: {e}");
                drawer.present(&live)?; // visual: plain video for one frame
                continue;
            }
        };

        /* 5) Hovering a palette box in select mode picks it. */
        if report.mode == Mode::Selecting {
            if let Some(swatch) = report.cursor.and_then(|p| palette.hit(p)) {
                session.apply_swatch(swatch);
            }
        }

        /* 6) Palette, fingertip cursor, HUD */
        let mut screen = report.frame;
        let brush = session.brush_state();
        let active = if brush.eraser { Swatch::Eraser } else { Swatch::Color(brush.color) };
        palette.draw(&mut screen, active);

        if let Some(p) = report.cursor {
            let ink = session.brush().active_color().to_pixel();
            if report.mode == Mode::Selecting {
                // visual: hollow square around the fingertip
                stroke_rect(&mut screen, p.x - 15, p.y - 15, p.x + 15, p.y + 15, 2, ink);
            } else {
                // visual: dot in the brush color + crosshair
                fill_disc(&mut screen, p.x, p.y, 6, ink);
                draw_crosshair(&mut screen, p.x, p.y, 12, 0x00_FF_CC_33);
            }
        }

        let hud = format!(
            "{} | SIZE: {} | {}",
            report.mode,
            session.brush().active_thickness(),
            hud_fps_text
        );
        draw_text_5x7(&mut screen, 8, palette.header_height() + 8, &hud, 0x00_FF_FF_FF);

        /* 7) Present to the window (this is when the on-screen image updates). */
        drawer.present(&screen)?;

        /* 8) FPS counter (logged + HUD once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            tracing::debug!(fps, "frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!("window closed, exiting");
    Ok(())
}
