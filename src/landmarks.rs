// Hand landmarks as delivered by an external detector.
// Per frame: either no hand, or 21 points in a fixed anatomical order (wrist,
// then four joints per finger from the base outwards), normalized to [0, 1]
// and mapped into frame pixels before anything else looks at them.

use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use serde::Deserialize;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::types::Point2D;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Fingertip landmark per finger, `[thumb, index, middle, ring, pinky]`.
pub const TIP_IDS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// One frame's hand, in pixel coordinates.
///
/// The point count is not checked on construction: a misbehaving detector can
/// hand over a short list, and the classifier is the one that rejects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LandmarkSnapshot {
    points: Vec<Point2D>,
}

impl LandmarkSnapshot {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Map normalized detector output into a `width x height` frame.
    /// With `mirror` set, x is flipped to match a mirrored camera image.
    pub fn from_normalized(coords: &[(f32, f32)], width: usize, height: usize, mirror: bool) -> Self {
        let points = coords
            .iter()
            .map(|&(x, y)| {
                let x = if mirror { 1.0 - x } else { x };
                Point2D::new((x * width as f32) as i32, (y * height as f32) as i32)
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// The full 21-point hand, or `MalformedSnapshot` if the count is off.
    pub fn hand(&self) -> Result<&[Point2D; LANDMARK_COUNT]> {
        self.points.as_slice().try_into().map_err(|_| Error::MalformedSnapshot {
            expected: LANDMARK_COUNT,
            got: self.points.len(),
        })
    }
}

/// Anything that can report the hand seen in the current frame.
pub trait LandmarkSource {
    /// `Ok(None)` means no hand this frame.
    fn next_snapshot(&mut self) -> Result<Option<LandmarkSnapshot>>;
}

// ---------------------------------------------------------------------------
// JSON lines from an external detector
// ---------------------------------------------------------------------------

/// One line on the wire: `null`, a bare array of `[x, y(, z)]` points, or an
/// object carrying the points plus the detector's confidence.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireHand {
    Bare(Vec<Vec<f32>>),
    Tagged {
        landmarks: Vec<Vec<f32>>,
        #[serde(default)]
        confidence: Option<f32>,
    },
}

type WireMessage = std::result::Result<Option<Vec<(f32, f32)>>, String>;

/// Parse one detector line into normalized coordinates.
fn parse_line(line: &str) -> WireMessage {
    let hand: Option<WireHand> = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let raw = match hand {
        None => return Ok(None),
        Some(WireHand::Bare(points)) => points,
        Some(WireHand::Tagged { landmarks, confidence }) => {
            trace!(?confidence, "detector confidence");
            landmarks
        }
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            _ => Err(format!("landmark with {} coordinates", p.len())),
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Some)
}

/// Landmarks streamed as JSON lines (stdin or a file) by a detector process.
///
/// Lines are read on a background thread. A live stream returns the newest
/// hand received since the previous call, or repeats the previous one if
/// nothing new arrived. A replayed recording hands out one line per call.
pub struct LandmarkStream {
    rx: Receiver<WireMessage>,
    width: usize,
    height: usize,
    mirror: bool,
    pacing: Pacing,
    current: Option<LandmarkSnapshot>,
    finished: bool,
}

/// How lines are handed out relative to `next_snapshot` calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Skip to the newest line; for a detector writing in real time.
    Latest,
    /// One line per call, in order; for a recorded session.
    PerFrame,
}

impl LandmarkStream {
    pub fn from_reader<R: BufRead + Send + 'static>(
        reader: R,
        width: usize,
        height: usize,
        mirror: bool,
        pacing: Pacing,
    ) -> Self {
        let rx = match pacing {
            Pacing::Latest => {
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || pump(reader, |msg| tx.send(msg).is_ok()));
                rx
            }
            Pacing::PerFrame => {
                // a small buffer keeps the reader just ahead of the frame loop
                let (tx, rx) = mpsc::sync_channel(1);
                thread::spawn(move || pump(reader, |msg| tx.send(msg).is_ok()));
                rx
            }
        };
        Self { rx, width, height, mirror, pacing, current: None, finished: false }
    }

    pub fn stdin(width: usize, height: usize, mirror: bool) -> Self {
        info!("reading landmarks from stdin");
        Self::from_reader(BufReader::new(io::stdin()), width, height, mirror, Pacing::Latest)
    }

    /// Replay a recorded JSON-lines file, one line per frame.
    pub fn open<P: AsRef<Path>>(path: P, width: usize, height: usize, mirror: bool) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        info!("replaying landmarks from {}", path.as_ref().display());
        Ok(Self::from_reader(BufReader::new(file), width, height, mirror, Pacing::PerFrame))
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// The next message due this call, and whether the reader has gone away.
    fn receive(&self) -> (Option<WireMessage>, bool) {
        match self.pacing {
            Pacing::PerFrame => match self.rx.recv() {
                Ok(msg) => (Some(msg), false),
                Err(_) => (None, true),
            },
            Pacing::Latest => {
                let mut latest = None;
                loop {
                    match self.rx.try_recv() {
                        Ok(msg) => latest = Some(msg),
                        Err(TryRecvError::Empty) => return (latest, false),
                        Err(TryRecvError::Disconnected) => return (latest, true),
                    }
                }
            }
        }
    }
}

/// Read lines until EOF or until `send` reports the receiver is gone.
fn pump<R: BufRead>(reader: R, send: impl Fn(WireMessage) -> bool) {
    for line in reader.lines() {
        let msg = match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => parse_line(line.trim()),
            Err(e) => Err(e.to_string()),
        };
        if !send(msg) {
            break; // receiver gone, app is shutting down
        }
    }
}

impl LandmarkSource for LandmarkStream {
    fn next_snapshot(&mut self) -> Result<Option<LandmarkSnapshot>> {
        let (latest, ended) = self.receive();

        // The last hand is reported once more, then the stream reads as empty.
        if ended && latest.is_none() {
            if !self.finished {
                debug!("landmark stream ended");
                self.finished = true;
            }
            self.current = None;
        }

        match latest {
            Some(Ok(coords)) => {
                self.current = coords.map(|c| LandmarkSnapshot::from_normalized(&c, self.width, self.height, self.mirror));
            }
            Some(Err(e)) => {
                warn!("dropping unreadable landmark line: {e}");
                self.current = None;
                return Err(Error::LandmarkStream(e));
            }
            None => {}
        }
        Ok(self.current.clone())
    }
}
