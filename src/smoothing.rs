// src/smoothing.rs - Velocity-adaptive weighted average over recent fingertip positions
use serde::Serialize;

use crate::config::SmoothingConfig;
use crate::geometry::{self, CanvasPoint};
use crate::history::BoundedHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VelocityClass {
    Slow,
    Normal,
    Fast,
}

/// Smooths the drawing cursor with a geometrically decaying weight per sample age.
///
/// The decay ratio is the smoothing factor, re-chosen every frame from the
/// recent hand speed: a fast hand gets a smaller ratio so the cursor keeps
/// up, a nearly still hand gets a larger one so micro-jitter is averaged away.
pub struct AdaptiveSmoother {
    config: SmoothingConfig,
    points: BoundedHistory<CanvasPoint>,
    velocities: BoundedHistory<f64>,
    last_timestamp: Option<f64>,
}

impl AdaptiveSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            points: BoundedHistory::new(config.point_history),
            velocities: BoundedHistory::new(config.velocity_history),
            config,
            last_timestamp: None,
        }
    }

    pub fn add_point(&mut self, point: CanvasPoint, now_ms: f64) -> CanvasPoint {
        let velocity = match (self.points.latest(), self.last_timestamp) {
            (Some(last), Some(last_ms)) => {
                let dt = (now_ms - last_ms).max(1.0);
                geometry::distance_2d(&point, last) / dt * 1000.0
            }
            _ => 0.0,
        };

        self.velocities.push(velocity);
        self.points.push(point);
        self.last_timestamp = Some(now_ms);

        self.smoothed().unwrap_or(point)
    }

    /// Current smoothed position, `None` before the first sample.
    pub fn smoothed(&self) -> Option<CanvasPoint> {
        match self.points.len() {
            0 => None,
            1 => self.points.latest().copied(),
            n => {
                let factor = self.effective_factor();
                let mut total_weight = 0.0;
                let mut sum = nalgebra::Vector2::zeros();
                for (i, p) in self.points.iter().enumerate() {
                    let weight = factor.powi((n - 1 - i) as i32);
                    total_weight += weight;
                    sum += p.coords * weight;
                }
                Some(CanvasPoint::from(sum / total_weight))
            }
        }
    }

    pub fn average_velocity(&self) -> f64 {
        self.velocities.mean().unwrap_or(0.0)
    }

    pub fn velocity_class(&self) -> VelocityClass {
        let velocity = self.average_velocity();
        if velocity > self.config.fast_velocity {
            VelocityClass::Fast
        } else if velocity < self.config.slow_velocity {
            VelocityClass::Slow
        } else {
            VelocityClass::Normal
        }
    }

    pub fn effective_factor(&self) -> f64 {
        let base = self.config.base_factor;
        match self.velocity_class() {
            VelocityClass::Fast => self.config.fast_cap.min(base * self.config.fast_multiplier),
            VelocityClass::Slow => base * self.config.slow_multiplier,
            VelocityClass::Normal => base,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.velocities.clear();
        self.last_timestamp = None;
    }
}

/// Relax a finished path: endpoints stay, every interior point becomes the
/// mean of itself and its two neighbours.
pub fn smooth_path(points: &[CanvasPoint]) -> Vec<CanvasPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut smoothed = Vec::with_capacity(points.len());
    smoothed.push(points[0]);
    smoothed.extend(points.windows(3).map(|w| {
        CanvasPoint::from((w[0].coords + w[1].coords + w[2].coords) / 3.0)
    }));
    smoothed.push(points[points.len() - 1]);
    smoothed
}
