// src/session.rs - One drawing session: per-frame pipeline from landmarks to render commands
use serde::Serialize;
use tracing::{info, trace};

use crate::canvas::RenderCommand;
use crate::config::AirWriterConfig;
use crate::geometry::CanvasPoint;
use crate::gesture::{PinchDetector, PinchState};
use crate::smoothing::AdaptiveSmoother;
use crate::stroke::{SegmentKind, StrokeRenderer, StrokeSegment, StrokeState};
use crate::tracking::Hand;

/// Everything one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub commands: Vec<RenderCommand>,
    pub pinch: PinchState,
    pub hand_present: bool,
    /// Raw fingertip on the canvas, if a hand was seen.
    pub cursor: Option<CanvasPoint>,
    /// Smoothed fingertip, only while pinching.
    pub smoothed: Option<CanvasPoint>,
    pub stroke_started: bool,
}

impl FrameOutput {
    pub fn segments(&self) -> impl Iterator<Item = &StrokeSegment> {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::Segment(segment) => Some(segment),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub frames: u64,
    pub frames_with_hand: u64,
    pub strokes: u64,
    pub segments: u64,
    pub interpolated_segments: u64,
}

/// Owns all mutable pipeline state. Frames must be fed in order, one at a time.
pub struct DrawingSession {
    config: AirWriterConfig,
    pinch: PinchDetector,
    smoother: AdaptiveSmoother,
    stroke: StrokeRenderer,
    canvas_width: f64,
    canvas_height: f64,
    stats: SessionStats,
}

impl DrawingSession {
    pub fn new(config: AirWriterConfig) -> Self {
        Self {
            pinch: PinchDetector::new(config.pinch.clone()),
            smoother: AdaptiveSmoother::new(config.smoothing.clone()),
            stroke: StrokeRenderer::new(config.stroke.clone()),
            canvas_width: config.canvas.width as f64,
            canvas_height: config.canvas.height as f64,
            stats: SessionStats::default(),
            config,
        }
    }

    /// Run one frame. `None` means the tracker saw no hand, which is routine:
    /// the stroke ends but the pinch history is kept across the gap.
    pub fn process_frame(&mut self, hand: Option<&Hand>, now_ms: f64) -> FrameOutput {
        self.stats.frames += 1;
        let mut commands = vec![RenderCommand::ClearOverlay];

        let Some(hand) = hand else {
            self.end_stroke();
            return FrameOutput {
                commands,
                pinch: self.pinch.state(),
                hand_present: false,
                cursor: None,
                smoothed: None,
                stroke_started: false,
            };
        };

        self.stats.frames_with_hand += 1;
        commands.push(RenderCommand::DrawHand {
            points: hand.project(self.canvas_width, self.canvas_height),
        });

        let pinch = self.pinch.update_hand(hand, now_ms);
        let position = hand.index_tip_on_canvas(self.canvas_width, self.canvas_height);

        let mut smoothed = None;
        let mut stroke_started = false;
        if pinch.is_down() {
            let point = self.smoother.add_point(position, now_ms);
            stroke_started = self.stroke.state() == StrokeState::Idle;
            if stroke_started {
                self.stats.strokes += 1;
            }
            for segment in self.stroke.extend(point) {
                self.stats.segments += 1;
                if segment.kind == SegmentKind::Interpolated {
                    self.stats.interpolated_segments += 1;
                }
                commands.push(RenderCommand::Segment(segment));
            }
            smoothed = Some(point);
        } else {
            self.end_stroke();
        }

        commands.push(RenderCommand::DrawCursor {
            position,
            pinching: pinch.is_down(),
        });

        trace!(
            now_ms,
            ?pinch,
            commands = commands.len(),
            "frame processed"
        );

        FrameOutput {
            commands,
            pinch,
            hand_present: true,
            cursor: Some(position),
            smoothed,
            stroke_started,
        }
    }

    /// The only place the smoother and the stroke cursor are reset; they always go together.
    fn end_stroke(&mut self) {
        if self.stroke.state() == StrokeState::Drawing {
            info!(strokes = self.stats.strokes, segments = self.stats.segments, "stroke finished");
        }
        self.stroke.lift();
        self.smoother.reset();
    }

    /// Resize the canvas. Any stroke in progress ends, since its points are in the old space.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.end_stroke();
        self.canvas_width = width as f64;
        self.canvas_height = height as f64;
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width as u32, self.canvas_height as u32)
    }

    pub fn pinch_state(&self) -> PinchState {
        self.pinch.state()
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.state() == StrokeState::Drawing
    }

    pub fn last_point(&self) -> Option<CanvasPoint> {
        self.stroke.last_point()
    }

    pub fn prev_point(&self) -> Option<CanvasPoint> {
        self.stroke.prev_point()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &AirWriterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::tests::hand_with_tips;

    const FRAME_MS: f64 = 33.0;

    /// Index tip at normalized (x, y); thumb `gap` away along z.
    fn hand_at(x: f64, y: f64, gap: f64) -> Hand {
        hand_with_tips([x, y, gap], [x, y, 0.0])
    }

    fn session() -> DrawingSession {
        DrawingSession::new(AirWriterConfig::default())
    }

    #[test]
    fn open_hand_draws_overlay_only() {
        let mut s = session();
        let out = s.process_frame(Some(&hand_at(0.5, 0.5, 0.2)), 0.0);
        assert_eq!(out.pinch, PinchState::Up);
        assert_eq!(out.commands.first(), Some(&RenderCommand::ClearOverlay));
        assert!(matches!(out.commands.last(), Some(RenderCommand::DrawCursor { pinching: false, .. })));
        assert_eq!(out.segments().count(), 0);
        assert_eq!(out.cursor, Some(CanvasPoint::new(640.0, 360.0)));
        assert!(!s.is_drawing());
    }

    #[test]
    fn pinch_starts_stroke_on_commit_frame() {
        let mut s = session();
        let hand = hand_at(0.5, 0.5, 0.02);
        let first = s.process_frame(Some(&hand), 0.0);
        assert_eq!(first.pinch, PinchState::Up);
        assert!(!s.is_drawing());

        let second = s.process_frame(Some(&hand), FRAME_MS);
        assert_eq!(second.pinch, PinchState::Down);
        assert!(second.stroke_started);
        assert_eq!(second.segments().count(), 0);
        assert_eq!(s.last_point(), Some(CanvasPoint::new(640.0, 360.0)));
        assert_eq!(s.prev_point(), None);
        assert_eq!(s.stats().strokes, 1);
    }

    #[test]
    fn moving_while_pinched_emits_segments() {
        let mut s = session();
        let mut t = 0.0;
        for _ in 0..2 {
            s.process_frame(Some(&hand_at(0.5, 0.5, 0.02)), t);
            t += FRAME_MS;
        }
        let mut total = 0;
        for step in 1..=10 {
            let out = s.process_frame(Some(&hand_at(0.5 - step as f64 * 0.01, 0.5, 0.02)), t);
            t += FRAME_MS;
            total += out.segments().count();
            assert!(out.smoothed.is_some());
        }
        assert!(total >= 10);
        assert_eq!(s.stats().segments as usize, total);
    }

    #[test]
    fn losing_the_hand_ends_stroke_but_keeps_pinch() {
        let mut s = session();
        let hand = hand_at(0.5, 0.5, 0.02);
        s.process_frame(Some(&hand), 0.0);
        s.process_frame(Some(&hand), FRAME_MS);
        assert!(s.is_drawing());

        let lost = s.process_frame(None, 2.0 * FRAME_MS);
        assert!(!lost.hand_present);
        assert_eq!(lost.commands, vec![RenderCommand::ClearOverlay]);
        assert!(!s.is_drawing());
        assert_eq!(s.last_point(), None);
        assert_eq!(s.pinch_state(), PinchState::Down);

        // Back in view, still pinched: a fresh stroke starts with no bridging segment.
        let back = s.process_frame(Some(&hand_at(0.2, 0.2, 0.02)), 3.0 * FRAME_MS);
        assert!(back.stroke_started);
        assert_eq!(back.segments().count(), 0);
        assert_eq!(s.prev_point(), None);
        assert_eq!(s.stats().strokes, 2);
    }

    #[test]
    fn release_ends_stroke() {
        let mut s = session();
        let pinched = hand_at(0.5, 0.5, 0.02);
        s.process_frame(Some(&pinched), 0.0);
        s.process_frame(Some(&pinched), FRAME_MS);
        let mut t = 2.0 * FRAME_MS;
        let mut released = false;
        for _ in 0..6 {
            let out = s.process_frame(Some(&hand_at(0.5, 0.5, 0.2)), t);
            t += FRAME_MS;
            if out.pinch == PinchState::Up {
                released = true;
                assert_eq!(out.smoothed, None);
                break;
            }
        }
        assert!(released);
        assert!(!s.is_drawing());
    }

    #[test]
    fn resize_ends_stroke() {
        let mut s = session();
        let hand = hand_at(0.5, 0.5, 0.02);
        s.process_frame(Some(&hand), 0.0);
        s.process_frame(Some(&hand), FRAME_MS);
        s.set_canvas_size(640, 480);
        assert!(!s.is_drawing());
        assert_eq!(s.canvas_size(), (640, 480));
        let out = s.process_frame(Some(&hand), 2.0 * FRAME_MS);
        assert_eq!(out.cursor, Some(CanvasPoint::new(320.0, 240.0)));
    }
}
