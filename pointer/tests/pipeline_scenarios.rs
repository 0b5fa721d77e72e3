//! End-to-end scenarios: frames in, recorded cursor commands out.

use std::io::Cursor;

use touchless_pointer::cursor::{Command, CommandSink, RecordingSink, SexpSink, VirtualPointer};
use touchless_pointer::tracking::landmarks::{Finger, HandLandmark, HAND_LANDMARK_COUNT};
use touchless_pointer::tracking::{LandmarkSet, Point2D};
use touchless_pointer::{Config, Frame, FrameSource, JsonLinesSource, Pipeline};

// ── Fixtures ───────────────────────────────────────────────

/// Frame step; binary-exact so hold and cooldown comparisons are exact.
const DT: f64 = 0.125;

fn config() -> Config {
    Config {
        gesture_hold_seconds: 0.25,
        click_cooldown_seconds: 0.5,
        screen_width: 1000,
        screen_height: 1000,
        ..Config::default()
    }
}

/// Hand with [index, middle, ring, pinky] extended as given.
fn make_hand(extended: [bool; 4]) -> LandmarkSet {
    let mut points = vec![Point2D::new(0.5, 0.6); HAND_LANDMARK_COUNT];
    for (i, finger) in Finger::ALL.iter().enumerate() {
        let x = 0.4 + 0.05 * i as f64;
        points[finger.pip().index()] = Point2D::new(x, 0.5);
        points[finger.tip().index()] = Point2D::new(x, if extended[i] { 0.3 } else { 0.7 });
    }
    points[HandLandmark::ThumbTip.index()] = Point2D::new(0.05, 0.95);
    LandmarkSet::new(points)
}

fn with_point(set: LandmarkSet, landmark: HandLandmark, x: f64, y: f64) -> LandmarkSet {
    let mut points = set.points().to_vec();
    points[landmark.index()] = Point2D::new(x, y);
    LandmarkSet::new(points)
}

fn fist() -> LandmarkSet {
    make_hand([false; 4])
}

fn pointing() -> LandmarkSet {
    make_hand([true, false, false, false])
}

fn open_palm() -> LandmarkSet {
    make_hand([true; 4])
}

fn pinch() -> LandmarkSet {
    let hand = with_point(open_palm(), HandLandmark::IndexTip, 0.5, 0.3);
    with_point(hand, HandLandmark::ThumbTip, 0.51, 0.3)
}

fn two_fingers(index_y: f64) -> LandmarkSet {
    with_point(make_hand([true, true, false, false]), HandLandmark::IndexTip, 0.4, index_y)
}

/// One frame per hand (None = absent), spaced `DT` apart.
fn frames(hands: Vec<Option<LandmarkSet>>) -> Vec<Frame> {
    hands
        .into_iter()
        .enumerate()
        .map(|(i, hand)| Frame {
            hand,
            ..Frame::empty(i as f64 * DT)
        })
        .collect()
}

fn buttons(sink: &RecordingSink) -> Vec<Command> {
    sink.buttons()
}

// ── Scenarios ──────────────────────────────────────────────

#[test]
fn test_hand_lost_while_dragging_releases_once() {
    let mut pipeline = Pipeline::new(&config());
    let mut sink = RecordingSink::at(500, 500);

    let mut input = vec![Some(fist()); 4];
    input.extend([None, None, None]);
    let reports: Vec<_> = frames(input)
        .iter()
        .map(|f| pipeline.process(f, &mut sink))
        .collect();

    assert!(reports[2].intent.drag_down, "drag engages once the fist is held");
    assert!(reports[3].intent.dragging);

    let lost = &reports[4..];
    assert!(lost[0].intent.drag_up);
    assert!(!lost[0].intent.dragging);
    for r in &lost[1..] {
        assert!(!r.intent.drag_up && !r.intent.drag_down);
        assert!(!r.intent.dragging);
    }
    assert_eq!(buttons(&sink), vec![Command::ButtonDown, Command::ButtonUp]);
}

#[test]
fn test_drag_engages_slowly_and_releases_immediately() {
    let mut pipeline = Pipeline::new(&config());
    let mut sink = RecordingSink::at(500, 500);

    // Fist held long enough, then a single pointing frame
    let mut input = vec![Some(fist()); 3];
    input.push(Some(pointing()));
    let reports: Vec<_> = frames(input)
        .iter()
        .map(|f| pipeline.process(f, &mut sink))
        .collect();

    assert!(!reports[0].intent.drag_down && !reports[1].intent.drag_down);
    assert!(reports[2].intent.drag_down);
    // The pose change is not yet stable, but release does not wait for it
    assert!(!reports[3].intent.stable);
    assert!(reports[3].intent.drag_up);
}

#[test]
fn test_short_fist_never_drags() {
    let mut pipeline = Pipeline::new(&config());
    let mut sink = RecordingSink::at(500, 500);
    let input = vec![Some(fist()), Some(fist()), Some(pointing()), Some(fist())];
    for f in frames(input) {
        pipeline.process(&f, &mut sink);
    }
    assert!(buttons(&sink).is_empty());
}

#[test]
fn test_held_pinch_clicks_at_cooldown_rate() {
    let mut pipeline = Pipeline::new(&config());
    let mut sink = RecordingSink::at(500, 500);
    // 0.0 .. 1.375: stable from 0.25, clicks at 0.25, 0.75 and 1.25
    for f in frames(vec![Some(pinch()); 12]) {
        pipeline.process(&f, &mut sink);
    }
    assert_eq!(buttons(&sink), vec![Command::Click; 3]);
}

#[test]
fn test_two_finger_scroll() {
    let mut pipeline = Pipeline::new(&config());
    let mut sink = RecordingSink::at(500, 500);
    let input = vec![
        Some(two_fingers(0.375)),
        Some(two_fingers(0.375)),
        Some(two_fingers(0.375)),
        // Fingertip moves up by 0.125: 0.125 * 65 * 100 = 812.5
        Some(two_fingers(0.25)),
        // Held still: no scroll command
        Some(two_fingers(0.25)),
    ];
    let reports: Vec<_> = frames(input)
        .iter()
        .map(|f| pipeline.process(f, &mut sink))
        .collect();

    assert!(reports[2].intent.scroll_mode);
    assert_eq!(reports[3].intent.scroll_delta, 812);
    assert_eq!(buttons(&sink), vec![Command::Scroll(812)]);
    // Scrolling freezes the pointer
    assert!(reports[3].target.is_none());
}

#[test]
fn test_open_palm_freezes_pointer() {
    let mut pipeline = Pipeline::new(&config());
    let mut sink = RecordingSink::at(500, 500);
    for f in frames(vec![Some(pointing()); 3]) {
        pipeline.process(&f, &mut sink);
    }
    let moves_before = sink.commands.len();
    let position = sink.position();

    let palm: Vec<Frame> = (3..8)
        .map(|i| Frame {
            hand: Some(open_palm()),
            ..Frame::empty(i as f64 * DT)
        })
        .collect();
    for f in &palm {
        pipeline.process(f, &mut sink);
    }
    assert_eq!(sink.commands.len(), moves_before);
    assert_eq!(sink.position(), position);
}

#[test]
fn test_cursor_steps_are_rate_limited() {
    let mut pipeline = Pipeline::new(&Config {
        max_cursor_step_px: 45,
        smoothing_alpha: 1.0,
        moving_average_window: 1,
        ..config()
    });
    let mut sink = RecordingSink::at(0, 0);
    for f in frames(vec![Some(pointing()); 6]) {
        let report = pipeline.process(&f, &mut sink);
        assert!(report.step.0.abs() <= 45 && report.step.1.abs() <= 45);
    }
    for command in &sink.commands {
        if let Command::MoveBy(dx, dy) = command {
            assert!(dx.abs() <= 45 && dy.abs() <= 45);
        }
    }
}

// ── Replay through the public surfaces ─────────────────────

fn json_lines(frames: &[Frame]) -> String {
    frames
        .iter()
        .map(|f| serde_json::to_string(f).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_run_from_json_lines() {
    let mut input = vec![Some(fist()); 4];
    input.extend([Some(pinch()), None]);
    let mut text = json_lines(&frames(input));
    text.push_str("\n{broken\n");

    let mut source = JsonLinesSource::new(Cursor::new(text.into_bytes()));
    let mut pipeline = Pipeline::new(&config());
    let mut sink = RecordingSink::at(500, 500);
    let summary = pipeline.run(&mut source, &mut sink);

    assert_eq!(summary.frames, 6);
    assert_eq!(summary.drags, 1);
    assert_eq!(summary.hand_lost_frames, 1);
    assert_eq!(source.skipped, 1);
    assert!(source.next_frame().is_none());
    // Released when the pinch appeared
    assert_eq!(buttons(&sink), vec![Command::ButtonDown, Command::ButtonUp]);
}

#[test]
fn test_run_into_sexp_sink() {
    let mut pipeline = Pipeline::new(&config());
    let mut sink = SexpSink::new(VirtualPointer::new(500, 500, Some((1000, 1000))), Vec::new());
    let mut source = frames(vec![Some(pointing()), Some(pointing()), Some(pinch()), Some(pinch()), Some(pinch())])
        .into_iter();
    pipeline.run(&mut source, &mut sink);

    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert!(!out.is_empty());
    for line in out.lines() {
        let value = lexpr::from_str(line).unwrap();
        assert!(value.is_cons(), "{line}");
        assert!(line.starts_with("(:type :event :event :"), "{line}");
    }
    assert_eq!(out.lines().filter(|l| l.ends_with(":click)")).count(), 1);
}
