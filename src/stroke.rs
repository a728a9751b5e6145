// src/stroke.rs - Turning smoothed cursor positions into connected line segments
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::StrokeConfig;
use crate::geometry::{self, CanvasPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrokeState {
    Idle,
    Drawing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentKind {
    /// Ordinary frame-to-frame step.
    Direct,
    /// One piece of a subdivided fast jump.
    Interpolated,
}

/// A single stroke primitive for the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub from: CanvasPoint,
    pub to: CanvasPoint,
    pub kind: SegmentKind,
}

impl StrokeSegment {
    pub fn length(&self) -> f64 {
        geometry::distance_2d(&self.from, &self.to)
    }

    /// The rounded path the segment is drawn along: a quadratic from `from` to the
    /// midpoint, then a quadratic from the midpoint to `to`, each anchored on its endpoint.
    /// Returns `samples + 1` points, `from` first and `to` last.
    pub fn curve(&self, samples: usize) -> Vec<CanvasPoint> {
        let samples = samples.max(2);
        let mid = geometry::midpoint(&self.from, &self.to);
        let half = samples / 2;
        let mut points = Vec::with_capacity(samples + 1);
        for i in 0..=half {
            let t = i as f64 / half as f64;
            points.push(quadratic(&self.from, &self.from, &mid, t));
        }
        let rest = samples - half;
        for i in 1..=rest {
            let t = i as f64 / rest as f64;
            points.push(quadratic(&mid, &self.to, &self.to, t));
        }
        points
    }
}

fn quadratic(p0: &CanvasPoint, control: &CanvasPoint, p1: &CanvasPoint, t: f64) -> CanvasPoint {
    let u = 1.0 - t;
    CanvasPoint::from(p0.coords * (u * u) + control.coords * (2.0 * u * t) + p1.coords * (t * t))
}

/// Decides how each new smoothed point joins the stroke in progress.
///
/// `last_point` always lands on the true target, never on an interpolated
/// step, so subdividing a jump cannot drift the stroke.
pub struct StrokeRenderer {
    config: StrokeConfig,
    last_point: Option<CanvasPoint>,
    prev_point: Option<CanvasPoint>,
}

impl StrokeRenderer {
    pub fn new(config: StrokeConfig) -> Self {
        Self {
            config,
            last_point: None,
            prev_point: None,
        }
    }

    /// Feed the newest smoothed point. The first point of a stroke only anchors it.
    pub fn extend(&mut self, point: CanvasPoint) -> Vec<StrokeSegment> {
        let Some(last) = self.last_point else {
            debug!(x = point.x, y = point.y, "stroke started");
            self.last_point = Some(point);
            self.prev_point = None;
            return Vec::new();
        };

        let distance = geometry::distance_2d(&last, &point);
        if distance < self.config.min_distance {
            trace!(distance, "sub-pixel move dropped");
            return Vec::new();
        }

        let segments = if distance > self.config.interpolation_threshold {
            self.subdivide(&last, &point, distance)
        } else {
            vec![StrokeSegment {
                from: last,
                to: point,
                kind: SegmentKind::Direct,
            }]
        };

        self.prev_point = Some(last);
        self.last_point = Some(point);
        segments
    }

    fn subdivide(&self, from: &CanvasPoint, to: &CanvasPoint, distance: f64) -> Vec<StrokeSegment> {
        let steps = ((distance / self.config.step_length).ceil() as u32)
            .min(self.config.max_steps)
            .max(1);
        trace!(distance, steps, "interpolating fast move");

        let mut segments = Vec::with_capacity(steps as usize);
        let mut previous = *from;
        for i in 1..=steps {
            let next = if i == steps {
                *to
            } else {
                geometry::lerp(from, to, i as f64 / steps as f64)
            };
            segments.push(StrokeSegment {
                from: previous,
                to: next,
                kind: SegmentKind::Interpolated,
            });
            previous = next;
        }
        segments
    }

    /// End the stroke. Nothing is emitted; the next `extend` starts a new one.
    pub fn lift(&mut self) {
        if self.last_point.is_some() {
            debug!("stroke ended");
        }
        self.last_point = None;
        self.prev_point = None;
    }

    pub fn state(&self) -> StrokeState {
        if self.last_point.is_some() {
            StrokeState::Drawing
        } else {
            StrokeState::Idle
        }
    }

    pub fn last_point(&self) -> Option<CanvasPoint> {
        self.last_point
    }

    pub fn prev_point(&self) -> Option<CanvasPoint> {
        self.prev_point
    }
}
