//! Replays synthetic hands through the full per-frame path.

use air_canvas::canvas::CanvasOp;
use air_canvas::sim::{DEFAULT_THUMB_REACH, SimPose, hand_at};
use air_canvas::{
    BrushSettings, DrawingSessionController, Error, FrameBuffer, LandmarkSnapshot, Mode, Point2D, Rgb,
    SessionSettings,
};
use std::time::{Duration, Instant};

const W: usize = 120;
const H: usize = 120;

fn session(confirm_frames: u32) -> DrawingSessionController {
    DrawingSessionController::new(W, H, SessionSettings { confirm_frames, ..Default::default() })
}

fn live() -> FrameBuffer {
    FrameBuffer::filled(W, H, Rgb::new(50, 60, 70))
}

fn hand(pose: SimPose, x: i32, y: i32) -> LandmarkSnapshot {
    hand_at(Point2D::new(x, y), pose.fingers(), DEFAULT_THUMB_REACH)
}

/// Run `frames` and collect every canvas op in order.
fn replay(s: &mut DrawingSessionController, frames: &[Option<LandmarkSnapshot>]) -> Vec<CanvasOp> {
    let frame = live();
    frames
        .iter()
        .flat_map(|snap| s.process_frame(snap.as_ref(), &frame).unwrap().ops)
        .collect()
}

#[test]
fn select_gap_breaks_the_stroke() {
    let mut s = session(1);
    let ops = replay(
        &mut s,
        &[
            Some(hand(SimPose::Point, 10, 10)),
            Some(hand(SimPose::Point, 12, 10)),
            Some(hand(SimPose::Peace, 30, 10)),
            Some(hand(SimPose::Point, 50, 50)),
        ],
    );

    let a = Point2D::new(10, 10);
    let b = Point2D::new(12, 10);
    let c = Point2D::new(50, 50);
    assert_eq!(
        ops,
        vec![
            CanvasOp::Point { at: a },
            CanvasOp::Segment { from: a, to: b },
            CanvasOp::Point { at: c },
        ]
    );
    assert!(!ops.contains(&CanvasOp::Segment { from: b, to: c }));

    // halfway between the strokes stays empty
    let bg = Rgb::BLACK.to_pixel();
    assert_eq!(s.canvas().buffer().get(31, 30), Some(bg));
}

#[test]
fn debounced_drawing_starts_after_confirmation() {
    let mut s = session(3);
    let frames: Vec<_> = (0..5).map(|i| Some(hand(SimPose::Point, 20 + i, 40))).collect();
    let ops = replay(&mut s, &frames);

    assert_eq!(
        ops,
        vec![
            CanvasOp::Point { at: Point2D::new(22, 40) },
            CanvasOp::Segment { from: Point2D::new(22, 40), to: Point2D::new(23, 40) },
            CanvasOp::Segment { from: Point2D::new(23, 40), to: Point2D::new(24, 40) },
        ]
    );
    assert_eq!(s.mode(), Mode::Drawing);
}

#[test]
fn lost_hand_lifts_the_pen() {
    let mut s = session(1);
    let ops = replay(
        &mut s,
        &[Some(hand(SimPose::Point, 10, 60)), None, Some(hand(SimPose::Point, 90, 60))],
    );
    assert_eq!(
        ops,
        vec![CanvasOp::Point { at: Point2D::new(10, 60) }, CanvasOp::Point { at: Point2D::new(90, 60) }]
    );
}

#[test]
fn held_open_palm_clears_once() {
    let mut s = session(3);
    let mut frames = vec![Some(hand(SimPose::Point, 30, 30)); 4];
    frames.extend(vec![Some(hand(SimPose::OpenPalm, 30, 30)); 12]);
    let ops = replay(&mut s, &frames);

    assert_eq!(ops.iter().filter(|op| **op == CanvasOp::Clear).count(), 1);
    assert_eq!(s.canvas().clear_count(), 1);
    assert!(s.canvas().is_blank());
    assert_eq!(s.mode(), Mode::Idle);
}

#[test]
fn flicker_shorter_than_confirmation_draws_nothing() {
    let mut s = session(3);
    let ops = replay(
        &mut s,
        &[Some(hand(SimPose::Point, 30, 30)), Some(hand(SimPose::Point, 31, 30)), None, None],
    );
    assert!(ops.is_empty());
    assert!(s.canvas().is_blank());
}

#[test]
fn malformed_snapshot_leaves_state_untouched() {
    let mut s = session(1);
    let frame = live();
    s.process_frame(Some(&hand(SimPose::Point, 40, 40)), &frame).unwrap();
    let canvas_before = s.canvas().buffer().clone();
    let brush_before = s.brush_state();

    let short = LandmarkSnapshot::new(hand(SimPose::Point, 60, 60).points()[..19].to_vec());
    match s.process_frame(Some(&short), &frame) {
        Err(Error::MalformedSnapshot { expected: 21, got: 19 }) => {}
        other => panic!("expected MalformedSnapshot, got {:?}", other.map(|r| r.mode)),
    }
    assert_eq!(s.canvas().buffer(), &canvas_before);
    assert_eq!(s.brush_state(), brush_before);
    assert_eq!(s.mode(), Mode::Idle);

    // next good frame starts a fresh stroke rather than connecting
    let ops = replay(&mut s, &[Some(hand(SimPose::Point, 80, 80))]);
    assert_eq!(ops, vec![CanvasOp::Point { at: Point2D::new(80, 80) }]);
}

#[test]
fn composite_shows_ink_over_video() {
    let mut s = session(1);
    let frame = live();
    let report = s.process_frame(Some(&hand(SimPose::Point, 60, 60)), &frame).unwrap();

    assert_eq!(report.frame.get(60, 60), Some(Rgb::PURPLE.to_pixel()));
    assert_eq!(report.frame.get(5, 5), Some(Rgb::new(50, 60, 70).to_pixel()));
    assert_eq!(report.cursor, Some(Point2D::new(60, 60)));
}

#[test]
fn eraser_toggle_paints_background_and_keeps_color() {
    let mut s = session(1);
    s.select_color(Rgb::RED);
    let frame = live();
    s.process_frame(Some(&hand(SimPose::Point, 60, 60)), &frame).unwrap();
    assert!(!s.canvas().is_blank());

    s.toggle_eraser();
    s.process_frame(Some(&hand(SimPose::Point, 60, 60)), &frame).unwrap();
    assert!(s.canvas().is_blank());

    s.toggle_eraser();
    assert_eq!(s.brush_state().color, Rgb::RED);
}

fn shifted(snap: &LandmarkSnapshot, dx: i32) -> LandmarkSnapshot {
    LandmarkSnapshot::new(snap.points().iter().map(|p| Point2D::new(p.x + dx, p.y)).collect())
}

#[test]
fn hand_far_off_frame_is_drawn_promptly() {
    let mut s = session(1);
    let frame = live();
    let near = hand(SimPose::Point, 20, 20);
    s.process_frame(Some(&near), &frame).unwrap();

    for dx in [320_000, 2_000_000_000] {
        let started = Instant::now();
        let report = s.process_frame(Some(&shifted(&near, dx)), &frame).unwrap();
        assert!(started.elapsed() < Duration::from_secs(1), "frame took {:?}", started.elapsed());
        assert_eq!(report.mode, Mode::Drawing);
        assert_eq!(report.ops.len(), 1);
        // back on screen so the next jump starts from a visible point
        s.process_frame(Some(&near), &frame).unwrap();
    }

    // the visible part of the jump reaches the right edge
    assert_eq!(s.canvas().buffer().get(W as i32 - 1, 20), Some(Rgb::PURPLE.to_pixel()));
}

#[test]
fn oversized_eraser_wipes_without_crashing() {
    let brush = BrushSettings { eraser_thickness: 200_000, ..Default::default() };
    let mut s = DrawingSessionController::new(W, H, SessionSettings { confirm_frames: 1, brush, ..Default::default() });
    let frame = live();
    s.process_frame(Some(&hand(SimPose::Point, 60, 60)), &frame).unwrap();
    assert!(!s.canvas().is_blank());

    let report = s.process_frame(Some(&hand(SimPose::Fist, 40, 40)), &frame).unwrap();
    assert_eq!(report.mode, Mode::Erasing);
    assert!(s.canvas().is_blank());
}
