// src/geometry.rs - Distances and canvas projection shared by every stage
use nalgebra::{Point2, Point3};

/// A normalized landmark coordinate from the tracker, each axis in [0, 1].
pub type Landmark = Point3<f64>;

/// A point in canvas pixel space.
pub type CanvasPoint = Point2<f64>;

pub fn distance_2d(a: &CanvasPoint, b: &CanvasPoint) -> f64 {
    nalgebra::distance(a, b)
}

pub fn distance_3d(a: &Landmark, b: &Landmark) -> f64 {
    nalgebra::distance(a, b)
}

/// Project a landmark onto the canvas, mirrored horizontally so the
/// drawing follows the user like a mirror would.
pub fn mirror_to_canvas(landmark: &Landmark, width: f64, height: f64) -> CanvasPoint {
    CanvasPoint::new((1.0 - landmark.x) * width, landmark.y * height)
}

pub fn lerp(a: &CanvasPoint, b: &CanvasPoint, t: f64) -> CanvasPoint {
    a + (b - a) * t
}

pub fn midpoint(a: &CanvasPoint, b: &CanvasPoint) -> CanvasPoint {
    nalgebra::center(a, b)
}

pub fn is_finite(landmark: &Landmark) -> bool {
    landmark.coords.iter().all(|c| c.is_finite())
}
