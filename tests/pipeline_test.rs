use air_writer::canvas::{Canvas, RasterCanvas};
use air_writer::config::{AirWriterConfig, PinchConfig, StrokeConfig};
use air_writer::geometry::{CanvasPoint, Landmark};
use air_writer::gesture::{PinchDetector, PinchState};
use air_writer::source::{FrameSource, Recording};
use air_writer::stroke::{SegmentKind, StrokeRenderer};
use air_writer::DrawingSession;

const FRAME_MS: f64 = 33.0;

/// 21 landmarks with the index tip at (x, y) and the thumb tip `gap` to its right.
fn raw_hand(x: f64, y: f64, gap: f64) -> Vec<[f64; 3]> {
    let mut points = vec![[x, y + 0.2, 0.0]; 21];
    points[4] = [x + gap, y, 0.0];
    points[8] = [x, y, 0.0];
    points
}

fn recording(frames: Vec<Option<Vec<[f64; 3]>>>) -> Recording {
    let json = serde_json::json!({
        "frames": frames
            .into_iter()
            .enumerate()
            .map(|(i, hand)| serde_json::json!({ "timestamp_ms": i as f64 * FRAME_MS, "hand": hand }))
            .collect::<Vec<_>>()
    });
    serde_json::from_value(json).unwrap()
}

#[test]
fn pinch_commits_then_fast_move_is_subdivided() {
    let mut pinch = PinchDetector::new(PinchConfig::default());
    let thumb = Landmark::new(0.52, 0.5, 0.0);
    let index = Landmark::new(0.50, 0.5, 0.0);

    assert_eq!(pinch.update(&thumb, &index, 0.0), PinchState::Up);
    assert_eq!(pinch.update(&thumb, &index, FRAME_MS), PinchState::Down);

    let mut stroke = StrokeRenderer::new(StrokeConfig::default());
    assert!(stroke.extend(CanvasPoint::new(100.0, 100.0)).is_empty());

    let segments = stroke.extend(CanvasPoint::new(100.0, 130.0));
    assert_eq!(segments.len(), 4);
    assert!(segments.iter().all(|s| s.kind == SegmentKind::Interpolated));
    assert_eq!(segments[0].from, CanvasPoint::new(100.0, 100.0));
    assert_eq!(segments[3].to, CanvasPoint::new(100.0, 130.0));
    for pair in segments.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    assert_eq!(stroke.last_point(), Some(CanvasPoint::new(100.0, 130.0)));
}

#[test]
fn lost_hand_splits_strokes() {
    let pinched = |x: f64| Some(raw_hand(x, 0.5, 0.02));
    let frames = vec![
        pinched(0.50),
        pinched(0.50),
        pinched(0.49),
        pinched(0.48),
        None,
        pinched(0.30),
        pinched(0.29),
    ];

    let mut session = DrawingSession::new(AirWriterConfig::default());
    let mut started = Vec::new();
    for frame in FrameSource::from_recording(recording(frames)) {
        let frame = frame.unwrap();
        let out = session.process_frame(frame.hand.as_ref(), frame.timestamp_ms);
        started.push(out.stroke_started);
    }

    assert_eq!(started, vec![false, true, false, false, false, true, false]);
    assert_eq!(session.stats().strokes, 2);
    assert_eq!(session.stats().frames, 7);
    assert_eq!(session.stats().frames_with_hand, 6);
    assert!(session.is_drawing());
}

#[test]
fn no_segment_bridges_two_strokes() {
    let mut frames = vec![Some(raw_hand(0.5, 0.5, 0.02)); 4];
    frames.extend(vec![Some(raw_hand(0.5, 0.5, 0.2)); 6]);
    frames.extend(vec![Some(raw_hand(0.1, 0.1, 0.02)); 8]);

    let mut session = DrawingSession::new(AirWriterConfig::default());
    let mut all_segments = Vec::new();
    for frame in FrameSource::from_recording(recording(frames)).flatten() {
        let out = session.process_frame(frame.hand.as_ref(), frame.timestamp_ms);
        all_segments.extend(out.segments().copied());
    }

    assert_eq!(session.stats().strokes, 2);
    // The hand never moved while pinched, so nothing was drawn between the two spots.
    assert!(all_segments.is_empty());
    assert_eq!(session.last_point(), Some(CanvasPoint::new(1152.0, 72.0)));
}

#[test]
fn synthetic_session_leaves_ink() {
    let config = AirWriterConfig::default();
    let mut canvas = RasterCanvas::new(config.canvas.width, config.canvas.height, &config.brush).unwrap();
    let mut session = DrawingSession::new(config);

    for frame in FrameSource::synthetic(300) {
        let frame = frame.unwrap();
        let out = session.process_frame(frame.hand.as_ref(), frame.timestamp_ms);
        canvas.execute(&out.commands);
    }

    let stats = session.stats();
    assert_eq!(stats.frames, 300);
    assert!(stats.frames_with_hand < 300);
    assert!(stats.strokes >= 3);
    assert!(stats.segments > 0);

    let inked = canvas.drawing().pixels().filter(|p| p.0[3] > 0).count();
    assert!(inked > 1000);
    // Hand was out of view on the last frame, so the overlay is empty.
    assert!(canvas.overlay().pixels().all(|p| p.0[3] == 0));
}

#[test]
fn wild_landmark_renders_in_bounded_time() {
    let mut config = AirWriterConfig::default();
    config.canvas.width = 64;
    config.canvas.height = 64;
    let mut canvas = RasterCanvas::new(64, 64, &config.brush).unwrap();
    let mut session = DrawingSession::new(config);

    let frames = vec![
        Some(raw_hand(0.5, 0.5, 0.02)),
        Some(raw_hand(0.5, 0.5, 0.02)),
        Some(raw_hand(-1e12, 0.5, 0.02)),
    ];
    let mut segments = 0;
    for frame in FrameSource::from_recording(recording(frames)).drop_invalid_hands() {
        let out = session.process_frame(frame.hand.as_ref(), frame.timestamp_ms);
        segments += out.segments().count();
        canvas.execute(&out.commands);
    }

    assert_eq!(segments, 30);
    assert!(canvas.drawing().pixels().any(|p| p.0[3] > 0));
}
